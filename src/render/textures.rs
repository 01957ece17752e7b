//! Texture store: named roles → CPU pixmaps with wrap-around sampling.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use raylib::prelude::*;

/// Sampled when a role was never loaded.
pub const MISSING_TEXTURE: Color = Color::new(255, 0, 255, 255);
/// Sampled from a pixmap with no pixel data.
pub const NO_PIXELS: Color = Color::new(255, 0, 0, 255);
/// Sampled from a pixmap with a zero dimension.
pub const ZERO_SIZE: Color = Color::new(255, 255, 0, 255);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Wall,
    Floor,
    Sprite,
    Sky,
    Viewmodel,
}

impl TextureRole {
    pub const ALL: [TextureRole; 5] = [
        TextureRole::Wall,
        TextureRole::Floor,
        TextureRole::Sprite,
        TextureRole::Sky,
        TextureRole::Viewmodel,
    ];
}

/// Un pixmap inmutable (CPU) para samplear por pixel.
#[derive(Clone, Debug)]
pub struct Pixmap {
    w: u32,
    h: u32,
    px: Vec<Color>,
}

impl Pixmap {
    pub fn new(w: u32, h: u32, px: Vec<Color>) -> Self {
        Self { w, h, px }
    }

    /// Both axes wrap modulo the size, negatives included.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> Color {
        if self.w == 0 || self.h == 0 {
            return ZERO_SIZE;
        }
        let xi = x.rem_euclid(self.w as i32) as usize;
        let yi = y.rem_euclid(self.h as i32) as usize;
        match self.px.get(yi * self.w as usize + xi) {
            Some(c) => *c,
            None => NO_PIXELS,
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.w, self.h)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextureStore {
    maps: HashMap<TextureRole, Pixmap>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: TextureRole, pixmap: Pixmap) {
        self.maps.insert(role, pixmap);
    }

    pub fn contains(&self, role: TextureRole) -> bool {
        self.maps.contains_key(&role)
    }

    /// Sample por pixel; si no existe el rol, magenta.
    #[inline]
    pub fn sample(&self, role: TextureRole, x: i32, y: i32) -> Color {
        match self.maps.get(&role) {
            Some(pm) => pm.sample(x, y),
            None => MISSING_TEXTURE,
        }
    }

    pub fn size(&self, role: TextureRole) -> Option<(u32, u32)> {
        self.maps.get(&role).map(Pixmap::size)
    }

    /// Loads each role's file from `dir`. Files that fail to decode are replaced by
    /// a procedural texture when `fallback` is set, and are an error otherwise.
    pub fn load(dir: &Path, files: &[(TextureRole, &str)], fallback: bool) -> Result<Self> {
        let mut store = Self::new();
        for &(role, file) in files {
            let path = dir.join(file);
            let path_str = path.to_string_lossy();
            match Image::load_image(&path_str) {
                Ok(img) => {
                    let w = img.width().max(0) as u32;
                    let h = img.height().max(0) as u32;
                    let data = img.get_image_data().to_vec();
                    tracing::info!("loaded {:?} texture {} ({}x{})", role, path.display(), w, h);
                    store.insert(role, Pixmap::new(w, h, data));
                }
                Err(e) if fallback => {
                    tracing::warn!("{}: {:?}; using procedural {:?} texture", path.display(), e, role);
                    store.insert(role, Self::procedural(role));
                }
                Err(e) => bail!("loading {}: {:?}", path.display(), e),
            }
        }
        Ok(store)
    }

    /// Every role filled with its procedural texture.
    pub fn with_fallbacks() -> Self {
        let mut store = Self::new();
        for role in TextureRole::ALL {
            store.insert(role, Self::procedural(role));
        }
        store
    }

    fn procedural(role: TextureRole) -> Pixmap {
        match role {
            TextureRole::Wall => Self::make_brick_pixmap(64, 64),
            TextureRole::Floor => Self::make_checker_pixmap(64, 64, Color::new(72, 70, 66, 255)),
            TextureRole::Sprite => Self::make_glowing_orb(64, 64, Color::new(255, 200, 60, 255)),
            TextureRole::Sky => Self::make_sky(256, 128),
            TextureRole::Viewmodel => Self::make_viewmodel(48, 40),
        }
    }

    /// Checker base
    fn make_checker_pixmap(w: u32, h: u32, base: Color) -> Pixmap {
        let mut px = vec![base; (w * h) as usize];
        let cell = 8u32;
        for y in 0..h {
            for x in 0..w {
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    let i = (y * w + x) as usize;
                    px[i] = Self::mix(px[i], Color::WHITE, 24);
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Ladrillos con mortero y un poco de ruido estable.
    fn make_brick_pixmap(w: u32, h: u32) -> Pixmap {
        let brick = Color::new(150, 62, 48, 255);
        let mortar = Color::new(90, 88, 84, 255);
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut px = vec![brick; (w * h) as usize];
        let (bw, bh) = (16u32, 8u32);
        for y in 0..h {
            let row = y / bh;
            let shift = if row % 2 == 0 { 0 } else { bw / 2 };
            for x in 0..w {
                let i = (y * w + x) as usize;
                if y % bh == 0 || (x + shift) % bw == 0 {
                    px[i] = mortar;
                } else {
                    px[i] = Self::mix(brick, Color::BLACK, rng.gen_range(0..40));
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Gradiente vertical suave.
    fn make_sky(w: u32, h: u32) -> Pixmap {
        let top = Color::new(40, 70, 140, 255);
        let horizon = Color::new(170, 200, 230, 255);
        let mut px = vec![top; (w * h) as usize];
        for y in 0..h {
            let t = y as f32 / (h - 1).max(1) as f32;
            let col = Self::mix(top, horizon, (t * 255.0) as u8);
            for x in 0..w {
                px[(y * w + x) as usize] = col;
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Orb brillante con halo semitransparente.
    fn make_glowing_orb(w: u32, h: u32, color: Color) -> Pixmap {
        let mut px = vec![Color::new(0, 0, 0, 0); (w * h) as usize];
        let cx = (w as f32) * 0.5;
        let cy = (h as f32) * 0.5;
        let r = (w.min(h) as f32) * 0.3;
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                let i = (y * w + x) as usize;
                if d <= r {
                    let t = (1.0 - (d / r)).clamp(0.0, 1.0);
                    px[i] = Self::mix(color, Color::WHITE, (t * 220.0) as u8);
                    px[i].a = 255;
                } else {
                    let t = (1.0 - ((d - r) / (r * 0.9))).clamp(0.0, 1.0);
                    if t > 0.0 {
                        px[i] = color;
                        px[i].a = (t * 180.0) as u8;
                    }
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Cañón simple centrado en la parte baja; el resto transparente.
    fn make_viewmodel(w: u32, h: u32) -> Pixmap {
        let body = Color::new(60, 60, 68, 255);
        let grip = Color::new(92, 60, 36, 255);
        let mut px = vec![Color::new(0, 0, 0, 0); (w * h) as usize];
        let cx = w / 2;
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) as usize;
                let barrel = x + 4 >= cx && x < cx + 4 && y < h * 2 / 3;
                let stock = x + 10 >= cx && x < cx + 10 && y >= h / 2;
                if barrel {
                    let shade = ((x + 4 - cx) * 12) as u8;
                    px[i] = Self::mix(body, Color::WHITE, shade);
                } else if stock {
                    px[i] = grip;
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    #[inline]
    fn mix(a: Color, b: Color, t: u8) -> Color {
        let ta = t as u16;
        let na = 255u16 - ta;
        let mixc = |x: u8, y: u8| -> u8 { (((x as u16) * na + (y as u16) * ta) / 255) as u8 };
        Color::new(mixc(a.r, b.r), mixc(a.g, b.g), mixc(a.b, b.b), mixc(a.a, b.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> Pixmap {
        let px = (0..w * h).map(|i| Color::new(i as u8, (i / w) as u8, 7, 255)).collect();
        Pixmap::new(w, h, px)
    }

    #[test]
    fn sampling_wraps_on_both_axes() {
        let pm = ramp(5, 3);
        for x in -7..7 {
            for y in -4..4 {
                let base = pm.sample(x, y);
                for k in -3..4 {
                    assert_eq!(pm.sample(x + k * 5, y), base);
                    assert_eq!(pm.sample(x, y + k * 3), base);
                }
            }
        }
        assert_eq!(pm.sample(-1, 0), pm.sample(4, 0));
    }

    #[test]
    fn missing_role_is_magenta() {
        let store = TextureStore::new();
        assert_eq!(store.sample(TextureRole::Wall, 3, 3), MISSING_TEXTURE);
        assert_eq!(store.size(TextureRole::Wall), None);
    }

    #[test]
    fn degenerate_pixmaps_use_sentinels() {
        let mut store = TextureStore::new();
        store.insert(TextureRole::Floor, Pixmap::new(0, 4, vec![]));
        store.insert(TextureRole::Sky, Pixmap::new(2, 2, vec![]));
        assert_eq!(store.sample(TextureRole::Floor, 0, 0), ZERO_SIZE);
        assert_eq!(store.sample(TextureRole::Sky, 1, 1), NO_PIXELS);
    }

    #[test]
    fn fallbacks_cover_every_role() {
        let store = TextureStore::with_fallbacks();
        for role in TextureRole::ALL {
            let (w, h) = store.size(role).unwrap();
            assert!(w > 0 && h > 0);
            assert_ne!(store.sample(role, 0, 0), MISSING_TEXTURE);
        }
        // sprite corners are transparent so the background shows through
        assert_eq!(store.sample(TextureRole::Sprite, 0, 0).a, 0);
    }
}
