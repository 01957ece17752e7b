//! Runtime configuration loaded from `raycaster.toml`.
//!
//! Every section is optional; missing keys fall back to the defaults below.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use raylib::prelude::Color;
use serde::Deserialize;

use crate::core::light::{BlinkPattern, DynamicLight, Sweep};
use crate::render::textures::TextureRole;

pub const CONFIG_PATH: &str = "raycaster.toml";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub player: PlayerConfig,
    pub assets: AssetsConfig,
    pub lights: LightsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "raycaster".to_string(),
            target_fps: 60,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RenderConfig {
    /// Internal buffer size; scaled up to the window on presentation.
    pub width: u32,
    pub height: u32,
    pub fog_density: f32,
    pub sky_color: [u8; 3],
    pub tonemap_influence: f32,
    pub tonemap_threshold: f32,
    /// Sprites farther than this many cells are culled.
    pub visibility_radius: f32,
    /// Viewmodel width as a fraction of the screen width.
    pub viewmodel_ratio: f32,
    pub trail_color: [u8; 4],
    pub glitch: bool,
    pub dither: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            fog_density: 0.2,
            sky_color: [255, 255, 255],
            tonemap_influence: 0.5,
            tonemap_threshold: 20.0,
            visibility_radius: 15.0,
            viewmodel_ratio: 0.3,
            trail_color: [0, 255, 0, 255],
            glitch: false,
            dither: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cells per second.
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    pub rot_speed: f32,
    pub pitch_speed: f32,
    pub max_pitch: f32,
    /// Camera plane length (0.66 ≈ 66° horizontal FOV).
    pub plane: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_multiplier: 1.5,
            rot_speed: 0.1,
            pitch_speed: 0.3,
            max_pitch: 90.0,
            plane: 0.66,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AssetsConfig {
    pub map: PathBuf,
    pub textures_dir: PathBuf,
    pub wall: String,
    pub floor: String,
    pub sprite: String,
    pub sky: String,
    pub viewmodel: String,
    /// Generate procedural textures for files that fail to load.
    pub procedural_fallback: bool,
    pub audio: bool,
    pub sounds_dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            map: PathBuf::from("map.txt"),
            textures_dir: PathBuf::from("assets"),
            wall: "wall1.png".to_string(),
            floor: "floor.png".to_string(),
            sprite: "enemy.png".to_string(),
            sky: "sky.png".to_string(),
            viewmodel: "weapon.png".to_string(),
            procedural_fallback: true,
            audio: true,
            sounds_dir: PathBuf::from("assets/sounds"),
        }
    }
}

impl AssetsConfig {
    pub fn texture_files(&self) -> [(TextureRole, &str); 5] {
        [
            (TextureRole::Wall, self.wall.as_str()),
            (TextureRole::Floor, self.floor.as_str()),
            (TextureRole::Sprite, self.sprite.as_str()),
            (TextureRole::Sky, self.sky.as_str()),
            (TextureRole::Viewmodel, self.viewmodel.as_str()),
        ]
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(transparent)]
pub struct LightsConfig(pub Vec<LightSpec>);

impl Default for LightsConfig {
    fn default() -> Self {
        Self(vec![LightSpec {
            x: 8.0,
            y: 8.0,
            radius: 1.5,
            color: [255, 255, 255],
            intensity: 3.0,
            pattern: BlinkPattern::Constant,
            sweep: Some(Sweep::new(4.0, 12.0, 1.5)),
        }])
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct LightSpec {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: [u8; 3],
    #[serde(default = "unit_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub pattern: BlinkPattern,
    #[serde(default)]
    pub sweep: Option<Sweep>,
}

fn unit_intensity() -> f32 {
    1.0
}

impl LightSpec {
    pub fn to_light(&self) -> DynamicLight {
        let [r, g, b] = self.color;
        DynamicLight::new(self.x, self.y, self.radius, Color::new(r, g, b, 255), self.intensity, self.pattern)
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("no {} found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        if cfg.render.width == 0 || cfg.render.height == 0 {
            bail!("render size must be non-zero, got {}x{}", cfg.render.width, cfg.render.height);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.render.width, 320);
        assert_eq!(cfg.render.height, 200);
        assert_eq!(cfg.render.fog_density, 0.2);
        assert_eq!(cfg.player.max_pitch, 90.0);
        assert_eq!(cfg.lights.0.len(), 1);
    }

    #[test]
    fn partial_sections_and_lights() {
        let cfg = Config::parse(
            r#"
            [render]
            width = 160
            dither = true

            [[lights]]
            x = 2.0
            y = 3.0
            radius = 4.0
            color = [255, 0, 0]
            pattern = "flicker"

            [[lights]]
            x = 5.0
            y = 5.0
            radius = 2.0
            color = [0, 0, 255]
            intensity = 2.0
            pattern = "pulse"
            sweep = { min_x = 1.0, max_x = 9.0, speed = 2.0 }
            "#,
        )
        .unwrap();
        assert_eq!(cfg.render.width, 160);
        assert_eq!(cfg.render.height, 200);
        assert!(cfg.render.dither);
        assert_eq!(cfg.lights.0.len(), 2);
        assert_eq!(cfg.lights.0[0].pattern, BlinkPattern::Flicker);
        assert_eq!(cfg.lights.0[0].intensity, 1.0);
        assert!(cfg.lights.0[0].sweep.is_none());
        let light = cfg.lights.0[1].to_light();
        assert_eq!(light.base_intensity, 2.0);
        assert_eq!(cfg.lights.0[1].sweep.map(|s| s.max_x), Some(9.0));
    }

    #[test]
    fn unknown_pattern_is_an_error() {
        let err = Config::parse(
            r#"
            [[lights]]
            x = 1.0
            y = 1.0
            radius = 1.0
            color = [1, 2, 3]
            pattern = "strobe"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn zero_render_size_is_rejected() {
        assert!(Config::parse("[render]\nwidth = 0").is_err());
        assert!(Config::parse("[render]\nheight = 0").is_err());
        assert!(Config::parse("[render]\nwidth = 1\nheight = 1").is_ok());
    }
}
