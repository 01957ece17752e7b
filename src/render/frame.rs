//! Frame compositor: owns the pixel buffer and the per-frame scratch tables
//! and runs every pass in order.
use rand::rngs::StdRng;
use rand::SeedableRng;
use raylib::prelude::Color;

use crate::config::RenderConfig;
use crate::core::camera::Camera;
use crate::core::grid::Grid;
use crate::core::light::LightSet;
use crate::render::casters::Trail;
use crate::render::framebuffer::Framebuffer;
use crate::render::overlay::{render_trail, render_viewmodel};
use crate::render::post::{apply_dither, apply_glitch};
use crate::render::render3d::{cast_columns, render_sky_and_floor, render_walls, WallColumn};
use crate::render::shading::Shader;
use crate::render::sprites::{collect_sprites, render_sprites, SpriteProjection};
use crate::render::textures::TextureStore;

/// Whole-frame passes toggled at runtime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PostEffects {
    pub glitch: bool,
    pub dither: bool,
}

/// Read-only world state for one frame.
pub struct FrameInput<'a> {
    pub grid: &'a Grid,
    pub camera: &'a Camera,
    pub textures: &'a TextureStore,
    pub trail: &'a Trail,
}

pub struct Renderer {
    pub framebuffer: Framebuffer,
    pub shader: Shader,
    pub post: PostEffects,
    pub visibility_radius: f32,
    pub viewmodel_ratio: f32,
    pub trail_color: Color,
    columns: Vec<WallColumn>,
    zbuffer: Vec<f32>,
    sprites: Vec<SpriteProjection>,
    rng: StdRng,
}

impl Renderer {
    /// Allocates the buffer and every per-frame table once.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            shader: Shader::default(),
            post: PostEffects::default(),
            visibility_radius: 15.0,
            viewmodel_ratio: 0.3,
            trail_color: Color::new(0, 255, 0, 255),
            columns: vec![WallColumn::default(); width as usize],
            zbuffer: vec![f32::INFINITY; width as usize],
            sprites: Vec::with_capacity(64),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_config(cfg: &RenderConfig) -> Self {
        let [r, g, b, a] = cfg.trail_color;
        Self {
            shader: Shader::from_config(cfg),
            post: PostEffects { glitch: cfg.glitch, dither: cfg.dither },
            visibility_radius: cfg.visibility_radius,
            viewmodel_ratio: cfg.viewmodel_ratio,
            trail_color: Color::new(r, g, b, a),
            ..Self::new(cfg.width, cfg.height)
        }
    }

    /// Reseeds the glitch pass, for reproducible frames.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Depth of the nearest wall per column from the last frame.
    pub fn zbuffer(&self) -> &[f32] {
        &self.zbuffer
    }

    /// Advances `lights` by `dt`, then draws one complete frame.
    pub fn render_frame(&mut self, input: &FrameInput<'_>, lights: &mut LightSet, dt: f32) {
        let FrameInput { grid, camera, textures, trail } = *input;
        let fb = &mut self.framebuffer;

        fb.clear();
        lights.advance(dt);
        let lights = &*lights;

        render_sky_and_floor(fb, camera, textures, &self.shader, lights);
        cast_columns(&mut self.columns, &mut self.zbuffer, grid, camera, textures, fb.height);
        render_walls(fb, &self.columns, camera, textures, &self.shader, lights);

        collect_sprites(&mut self.sprites, grid, camera, self.visibility_radius, fb.width, fb.height);
        render_sprites(fb, &self.sprites, &self.zbuffer, camera, textures, &self.shader, lights);

        render_trail(fb, trail, camera, &self.shader, self.trail_color);
        render_viewmodel(fb, textures, &self.shader, lights, camera, self.viewmodel_ratio);

        if self.post.glitch {
            apply_glitch(fb, &mut self.rng);
        }
        if self.post.dither {
            apply_dither(fb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Tile;
    use raylib::prelude::{Vector2, Vector3};

    fn boxed_room() -> Grid {
        let mut grid = Grid::new(8);
        for i in 0..8 {
            grid.set_tile(i, 0, Tile::Wall);
            grid.set_tile(i, 7, Tile::Wall);
            grid.set_tile(0, i, Tile::Wall);
            grid.set_tile(7, i, Tile::Wall);
        }
        grid
    }

    #[test]
    fn frame_fills_depth_buffer_inside_a_closed_room() {
        let grid = boxed_room();
        let camera = Camera::new(Vector3::new(3.5, 3.5, 0.0), Vector2::new(1.0, 0.0), Vector2::new(0.0, 0.66));
        let textures = TextureStore::with_fallbacks();
        let trail = Trail::default();
        let mut lights = LightSet::new();
        let mut renderer = Renderer::new(80, 50);

        let input = FrameInput { grid: &grid, camera: &camera, textures: &textures, trail: &trail };
        renderer.render_frame(&input, &mut lights, 1.0 / 60.0);

        assert!(renderer.zbuffer().iter().all(|z| z.is_finite() && *z > 0.0));
        // straight ahead the east wall is 3.5 cells away
        let mid = renderer.zbuffer()[40];
        assert!((mid - 3.5).abs() < 0.05, "got {mid}");
    }

    #[test]
    fn frames_are_fully_rewritten() {
        let grid = boxed_room();
        let camera = Camera::new(Vector3::new(3.5, 3.5, 0.0), Vector2::new(1.0, 0.0), Vector2::new(0.0, 0.66));
        let textures = TextureStore::with_fallbacks();
        let trail = Trail::default();
        let mut lights = LightSet::new();
        let mut renderer = Renderer::new(40, 30);
        let input = FrameInput { grid: &grid, camera: &camera, textures: &textures, trail: &trail };

        renderer.render_frame(&input, &mut lights, 0.0);
        let first = renderer.framebuffer.color_buffer.clone();
        renderer.framebuffer.color_buffer.fill(0x00AB_CDEF);
        renderer.render_frame(&input, &mut lights, 0.0);
        assert_eq!(first, renderer.framebuffer.color_buffer);
    }
}
