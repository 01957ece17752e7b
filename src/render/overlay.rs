//! Screen-space overlays drawn after the world: the hit-scan trail and the
//! held weapon.
use raylib::prelude::Color;

use crate::core::camera::Camera;
use crate::core::light::LightSet;
use crate::render::casters::Trail;
use crate::render::framebuffer::Framebuffer;
use crate::render::line::draw_line;
use crate::render::render3d::horizon;
use crate::render::shading::Shader;
use crate::render::textures::{TextureRole, TextureStore};

const VIEWMODEL_MIN_SCALE: f32 = 0.5;
const VIEWMODEL_MAX_SCALE: f32 = 2.5;

/// Projects consecutive trail points onto the horizon row and joins them with
/// fogged line segments. Pairs with an endpoint behind the camera are skipped.
pub fn render_trail(fb: &mut Framebuffer, trail: &Trail, camera: &Camera, shader: &Shader, color: Color) {
    if trail.len() < 2 {
        return;
    }
    let half_w = fb.width as f32 / 2.0;
    let row = horizon(camera, fb.height);

    let project = |x: f32, y: f32| -> Option<(i32, Color)> {
        let (tx, ty) = camera.to_camera_space(x, y);
        if ty <= 0.0 {
            return None;
        }
        // saturates for depths near zero; draw_line clips the result
        let sx = (half_w * (1.0 + tx / ty)) as i32;
        Some((sx, shader.apply_fog(color, ty)))
    };

    for pair in trail.points().windows(2) {
        let (Some((x0, c0)), Some((x1, c1))) = (project(pair[0].x, pair[0].y), project(pair[1].x, pair[1].y)) else {
            continue;
        };
        let avg = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
        let seg = Color::new(avg(c0.r, c1.r), avg(c0.g, c1.g), avg(c0.b, c1.b), avg(c0.a, c1.a));
        draw_line(fb, x0, row, x1, row, seg);
    }
}

/// Draws the weapon bottom-centered, nearest-neighbor scaled to about
/// `ratio` of the frame width. Fully transparent texels are skipped and the
/// rest overwrite the frame. Lit at the camera position, never fogged.
pub fn render_viewmodel(
    fb: &mut Framebuffer,
    textures: &TextureStore,
    shader: &Shader,
    lights: &LightSet,
    camera: &Camera,
    ratio: f32,
) {
    let Some((ww, wh)) = textures.size(TextureRole::Viewmodel) else {
        return;
    };
    if ww == 0 || wh == 0 {
        return;
    }
    let scale = (fb.width as f32 * ratio / ww as f32).clamp(VIEWMODEL_MIN_SCALE, VIEWMODEL_MAX_SCALE);
    let dw = (ww as f32 * scale) as i32;
    let dh = (wh as f32 * scale) as i32;
    let x0 = (fb.width as i32 - dw) / 2;
    let y0 = fb.height as i32 - dh;

    for dy in 0..dh {
        let sy = ((dy as f32 / scale) as i32).min(wh as i32 - 1);
        for dx in 0..dw {
            let sx = ((dx as f32 / scale) as i32).min(ww as i32 - 1);
            let texel = textures.sample(TextureRole::Viewmodel, sx, sy);
            if texel.a == 0 {
                continue;
            }
            let c = shader.shade_overlay(texel, lights, camera.pos.x, camera.pos.y);
            fb.set_pixel_color(x0 + dx, y0 + dy, c);
        }
    }
}
