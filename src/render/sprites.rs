//! Billboard sprites, one per destructible tile.
//!
//! Exposes:
//! - `collect_sprites`: cull and project sprites, sorted far to near
//! - `render_sprites`: alpha-composite them over the frame with the wall depth buffer
use raylib::prelude::Vector2;

use crate::core::camera::Camera;
use crate::core::grid::{Grid, Tile};
use crate::core::light::LightSet;
use crate::render::casters::is_visible;
use crate::render::framebuffer::Framebuffer;
use crate::render::shading::Shader;
use crate::render::textures::{TextureRole, TextureStore};

/// Sprites closer than this are skipped.
const MIN_SPRITE_DEPTH: f32 = 0.05;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpriteProjection {
    pub world_x: f32,
    pub world_y: f32,
    /// Camera-space depth (always > 0).
    pub depth: f32,
    pub screen_x: i32,
    /// Projected height and width in pixels.
    pub size: i32,
}

/// Refills `out` with the visible destructibles, farthest first.
pub fn collect_sprites(
    out: &mut Vec<SpriteProjection>,
    grid: &Grid,
    camera: &Camera,
    visibility_radius: f32,
    width: u32,
    height: u32,
) {
    out.clear();
    let eye = Vector2::new(camera.pos.x, camera.pos.y);
    for (mx, my) in grid.cells_of(Tile::Destructible) {
        let target = Vector2::new(mx as f32 + 0.5, my as f32 + 0.5);
        if !is_visible(grid, eye, target, visibility_radius) {
            continue;
        }
        let (tx, ty) = camera.to_camera_space(target.x, target.y);
        if ty <= MIN_SPRITE_DEPTH {
            continue;
        }
        out.push(SpriteProjection {
            world_x: target.x,
            world_y: target.y,
            depth: ty,
            screen_x: ((width as f32 / 2.0) * (1.0 + tx / ty)) as i32,
            size: ((height as f32 / ty) as i32).abs(),
        });
    }
    out.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Columns behind the wall in `zbuffer` are skipped; transparent texels show
/// the background through a straight alpha blend.
pub fn render_sprites(
    fb: &mut Framebuffer,
    sprites: &[SpriteProjection],
    zbuffer: &[f32],
    camera: &Camera,
    textures: &TextureStore,
    shader: &Shader,
    lights: &LightSet,
) {
    let sw = fb.width as i32;
    let sh = fb.height as i32;
    let half_h = sh as f32 / 2.0;
    let Some((tex_w, tex_h)) = textures.size(TextureRole::Sprite) else {
        return;
    };
    let (tex_w, tex_h) = (tex_w as i32, tex_h as i32);

    for s in sprites {
        if s.size <= 0 {
            continue;
        }
        let start_y = ((-(s.size as f32) / 2.0 + half_h + camera.pitch) as i32).max(0);
        let end_y = ((s.size as f32 / 2.0 + half_h + camera.pitch) as i32).min(sh - 1);
        let left = -s.size / 2 + s.screen_x;
        let start_x = left.max(0);
        let end_x = (s.size / 2 + s.screen_x).min(sw - 1);
        let real_h = fb.height as f32 / s.depth;

        for x in start_x..end_x {
            if zbuffer.get(x as usize).is_some_and(|z| s.depth >= *z) {
                continue;
            }
            // a zero-sized texture samples as its sentinel color
            let tex_x = (((x - left) * tex_w) as f32 / s.size as f32) as i32;
            let tex_x = tex_x.clamp(0, (tex_w - 1).max(0));
            for y in start_y..end_y {
                let tex_pos = ((y as f32 - half_h) + real_h / 2.0 - camera.pitch) * tex_h as f32 / real_h;
                let tex_y = (tex_pos as i32).clamp(0, (tex_h - 1).max(0));
                let texel = textures.sample(TextureRole::Sprite, tex_x, tex_y);
                if texel.a == 0 {
                    continue;
                }
                let color = shader.shade_surface(texel, s.depth, lights, s.world_x, s.world_y);
                fb.blend_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raylib::prelude::{Color, Vector3};

    fn camera_facing_east(x: f32, y: f32) -> Camera {
        Camera::new(Vector3::new(x, y, 0.0), Vector2::new(1.0, 0.0), Vector2::new(0.0, 0.66))
    }

    #[test]
    fn projects_visible_destructibles_far_to_near() {
        let mut grid = Grid::new(16);
        grid.set_tile(4, 5, Tile::Destructible);
        grid.set_tile(9, 5, Tile::Destructible);
        grid.set_tile(0, 5, Tile::Destructible); // behind
        let cam = camera_facing_east(1.5, 5.5);
        let mut out = Vec::new();
        collect_sprites(&mut out, &grid, &cam, 15.0, 320, 200);
        assert_eq!(out.len(), 2);
        assert!(out[0].depth > out[1].depth);
        assert_eq!(out[1].screen_x, 160);
        assert!(out[1].size > out[0].size);
    }

    #[test]
    fn walls_and_range_cull_sprites() {
        let mut grid = Grid::new(40);
        grid.set_tile(5, 5, Tile::Wall);
        grid.set_tile(7, 5, Tile::Destructible);
        grid.set_tile(30, 5, Tile::Destructible);
        let cam = camera_facing_east(1.5, 5.5);
        let mut out = Vec::new();
        collect_sprites(&mut out, &grid, &cam, 15.0, 320, 200);
        assert!(out.is_empty());
    }

    #[test]
    fn sprite_blends_over_background_and_respects_depth() {
        let mut grid = Grid::new(12);
        grid.set_tile(5, 5, Tile::Destructible);
        let cam = camera_facing_east(2.5, 5.5);
        let mut textures = TextureStore::new();
        let half: Vec<Color> = (0..16).map(|_| Color::new(255, 0, 0, 128)).collect();
        textures.insert(TextureRole::Sprite, crate::render::textures::Pixmap::new(4, 4, half));
        let shader = Shader { fog_density: 0.0, ..Shader::default() };
        let lights = LightSet::new();

        let mut sprites = Vec::new();
        collect_sprites(&mut sprites, &grid, &cam, 15.0, 64, 40);
        assert_eq!(sprites.len(), 1);

        let mut fb = Framebuffer::new(64, 40);
        fb.color_buffer.fill(0x00FF_0000); // blue background
        let open = vec![f32::INFINITY; 64];
        render_sprites(&mut fb, &sprites, &open, &cam, &textures, &shader, &lights);
        let c = fb.get_pixel(32, 20);
        assert!(c.r > 100 && c.b > 100, "expected a red/blue mix, got {c:?}");

        let mut fb = Framebuffer::new(64, 40);
        let wall_in_front = vec![1.0; 64];
        render_sprites(&mut fb, &sprites, &wall_in_front, &cam, &textures, &shader, &lights);
        assert!(fb.color_buffer.iter().all(|p| *p == 0));
    }
}
