//! 3D renderer: sky and floor rows, then textured wall columns.
//!
//! Walls are cast once per column into a preallocated column table, then
//! rasterized row by row so every pass writes disjoint rows in parallel.
use rayon::prelude::*;
use raylib::prelude::{Color, Vector2};

use crate::core::camera::Camera;
use crate::core::grid::Grid;
use crate::core::light::LightSet;
use crate::render::casters::{cast_wall, Side, WallHit};
use crate::render::framebuffer::{pack_rgb, Framebuffer};
use crate::render::shading::Shader;
use crate::render::textures::{TextureRole, TextureStore};

/// Per-column wall slice for the current frame.
#[derive(Copy, Clone, Debug)]
pub struct WallColumn {
    pub hit: Option<WallHit>,
    pub ray_dir: Vector2,
    pub line_height: i32,
    /// Inclusive screen rows, already clipped.
    pub draw_start: i32,
    pub draw_end: i32,
    pub tex_x: i32,
}

impl Default for WallColumn {
    fn default() -> Self {
        Self {
            hit: None,
            ray_dir: Vector2::zero(),
            line_height: 0,
            draw_start: 0,
            draw_end: -1,
            tex_x: 0,
        }
    }
}

/// Horizontal camera offset in 16.16 fixed point, from -1.0 (left) to ~1.0 (right).
#[inline]
pub fn camera_x_fixed(x: u32, width: u32) -> i32 {
    (((2 * x as i64) << 16) / width as i64 - (1 << 16)) as i32
}

/// Horizon row after pitch, clamped to the screen.
#[inline]
pub fn horizon(camera: &Camera, height: u32) -> i32 {
    ((height / 2) as f32 + camera.pitch).clamp(0.0, height as f32) as i32
}

/// Sky above the horizon, floor below it.
pub fn render_sky_and_floor(
    fb: &mut Framebuffer,
    camera: &Camera,
    textures: &TextureStore,
    shader: &Shader,
    lights: &LightSet,
) {
    let w = fb.width;
    let h = fb.height;
    let horizon = horizon(camera, h);
    let view_angle = camera.view_angle();
    fb.color_buffer
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            if y < horizon {
                render_sky_row(row, y, view_angle, camera, textures, w, h);
            } else {
                render_floor_row(row, y, horizon, camera, textures, shader, lights, w, h);
            }
        });
}

/// Sky scrolls with yaw only; rows are clamped to the upper half of the texture.
fn render_sky_row(row: &mut [u32], y: i32, view_angle: f32, camera: &Camera, textures: &TextureStore, w: u32, h: u32) {
    let (tw, th) = textures.size(TextureRole::Sky).unwrap_or((1, 1));
    let base = (h / 2).max(1) as i32;
    let ty_unclamped = ((y as f32 - camera.pitch) as i32).clamp(0, base - 1);
    let ty = ty_unclamped * th as i32 / base;
    let per_px = 1.0 / w as f32;
    for (x, px) in row.iter_mut().enumerate() {
        let mut u = view_angle - x as f32 * per_px;
        if u < 0.0 {
            u += 1.0;
        } else if u >= 1.0 {
            u -= 1.0;
        }
        let tx = (u * tw as f32) as i32;
        *px = pack_rgb(textures.sample(TextureRole::Sky, tx, ty));
    }
}

#[allow(clippy::too_many_arguments)]
fn render_floor_row(
    row: &mut [u32],
    y: i32,
    horizon: i32,
    camera: &Camera,
    textures: &TextureStore,
    shader: &Shader,
    lights: &LightSet,
    w: u32,
    h: u32,
) {
    let (tw, th) = textures.size(TextureRole::Floor).unwrap_or((1, 1));
    let p = (y - horizon).max(1);
    let row_dist = (0.5 * h as f32) / p as f32;
    let (dir, plane, pos) = (camera.dir, camera.plane, camera.pos);

    let mut floor_x = pos.x + row_dist * (dir.x - plane.x);
    let mut floor_y = pos.y + row_dist * (dir.y - plane.y);
    let step_x = 2.0 * row_dist * plane.x / w as f32;
    let step_y = 2.0 * row_dist * plane.y / w as f32;

    for px in row.iter_mut() {
        let tx = (floor_x * tw as f32) as i32;
        let ty = (floor_y * th as f32) as i32;
        let color = textures.sample(TextureRole::Floor, tx, ty);
        *px = pack_rgb(shader.shade_surface(color, row_dist, lights, floor_x, floor_y));
        floor_x += step_x;
        floor_y += step_y;
    }
}

/// Casts one ray per column and records the slice geometry plus the depth buffer.
pub fn cast_columns(
    columns: &mut [WallColumn],
    zbuffer: &mut [f32],
    grid: &Grid,
    camera: &Camera,
    textures: &TextureStore,
    height: u32,
) {
    let width = columns.len() as u32;
    let (tw, _) = textures.size(TextureRole::Wall).unwrap_or((1, 1));
    let h = height as i32;
    columns
        .par_iter_mut()
        .zip(zbuffer.par_iter_mut())
        .enumerate()
        .for_each(|(x, (col, z))| {
            let cam_x = camera_x_fixed(x as u32, width) as f32 / 65536.0;
            let ray_dir = Vector2::new(camera.dir.x + camera.plane.x * cam_x, camera.dir.y + camera.plane.y * cam_x);
            *col = WallColumn { ray_dir, ..WallColumn::default() };
            *z = f32::INFINITY;

            let Some(hit) = cast_wall(grid, camera.pos.x, camera.pos.y, ray_dir) else {
                return;
            };
            let perp = hit.perp_distance;
            let line_height = (h as f32 / perp) as i32;
            let start = (((h >> 1) - (line_height >> 1)) as f32 + camera.pitch) as i32;
            let end = start.saturating_add(line_height);

            let mut wall_x = match hit.side {
                Side::X => camera.pos.y + perp * ray_dir.y,
                Side::Y => camera.pos.x + perp * ray_dir.x,
            };
            wall_x -= wall_x.floor();
            let mut tex_x = (wall_x * tw as f32) as i32;
            if (hit.side == Side::X && ray_dir.x > 0.0) || (hit.side == Side::Y && ray_dir.y < 0.0) {
                tex_x = tw as i32 - tex_x - 1;
            }

            *z = perp;
            *col = WallColumn {
                hit: Some(hit),
                ray_dir,
                line_height,
                draw_start: start.max(0),
                draw_end: end.min(h - 1),
                tex_x,
            };
        });
}

/// Rasterizes the column table. Y-side faces are drawn at half brightness.
pub fn render_walls(
    fb: &mut Framebuffer,
    columns: &[WallColumn],
    camera: &Camera,
    textures: &TextureStore,
    shader: &Shader,
    lights: &LightSet,
) {
    let w = fb.width as usize;
    let h = fb.height as f32;
    let (_, th) = textures.size(TextureRole::Wall).unwrap_or((1, 1));
    fb.color_buffer
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for (px, col) in row.iter_mut().zip(columns) {
                let Some(hit) = col.hit else { continue };
                if y < col.draw_start || y > col.draw_end {
                    continue;
                }
                let step = th as f32 / col.line_height.max(1) as f32;
                let tex_pos = (y as f32 - h / 2.0 + col.line_height as f32 / 2.0 - camera.pitch) * step;
                let ty = (tex_pos as i32).clamp(0, (th as i32 - 1).max(0));

                let perp = hit.perp_distance;
                let wx = camera.pos.x + col.ray_dir.x * perp;
                let wy = camera.pos.y + col.ray_dir.y * perp;
                let color = textures.sample(TextureRole::Wall, col.tex_x, ty);
                let mut c = shader.shade_surface(color, perp, lights, wx, wy);
                if hit.side == Side::Y {
                    c = Color::new(c.r >> 1, c.g >> 1, c.b >> 1, c.a);
                }
                *px = pack_rgb(c);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Tile;
    use raylib::prelude::Vector3;

    fn camera(x: f32, y: f32, dx: f32, dy: f32) -> Camera {
        Camera::new(Vector3::new(x, y, 0.0), Vector2::new(dx, dy), Vector2::new(-dy * 0.66, dx * 0.66))
    }

    #[test]
    fn fixed_point_offset_spans_the_screen() {
        assert_eq!(camera_x_fixed(0, 320), -65536);
        assert_eq!(camera_x_fixed(160, 320), 0);
        assert!(camera_x_fixed(319, 320) < 65536);
    }

    #[test]
    fn diagonal_camera_on_empty_grid_hits_nothing() {
        let grid = Grid::new(16);
        let cam = camera(0.0, 0.0, 0.7071, 0.7071);
        let textures = TextureStore::with_fallbacks();
        let mut columns = vec![WallColumn::default(); 320];
        let mut zbuffer = vec![0.0; 320];
        cast_columns(&mut columns, &mut zbuffer, &grid, &cam, &textures, 200);
        assert!(columns.iter().all(|c| c.hit.is_none()));
        assert!(zbuffer.iter().all(|z| z.is_infinite()));
    }

    #[test]
    fn center_column_of_scenario_hits_corner_wall() {
        let mut grid = Grid::new(3);
        grid.set_tile(2, 2, Tile::Wall);
        let cam = Camera::new(Vector3::new(0.5, 0.5, 0.0), Vector2::new(1.0, 1.0), Vector2::new(0.0, 0.66));
        let textures = TextureStore::with_fallbacks();
        let mut columns = vec![WallColumn::default(); 320];
        let mut zbuffer = vec![0.0; 320];
        cast_columns(&mut columns, &mut zbuffer, &grid, &cam, &textures, 200);
        let center = columns[160].hit.unwrap();
        assert_eq!((center.cell_x, center.cell_y), (2, 2));
        assert_eq!(center.side, Side::X);
        assert!(center.perp_distance > 0.0);
        assert_eq!(zbuffer[160], center.perp_distance);
    }

    #[test]
    fn nearer_walls_are_taller() {
        let mut grid = Grid::new(12);
        grid.set_tile(10, 5, Tile::Wall);
        grid.set_tile(10, 6, Tile::Wall);
        let textures = TextureStore::with_fallbacks();
        let mut far = vec![WallColumn::default(); 64];
        let mut near = vec![WallColumn::default(); 64];
        let mut z = vec![0.0; 64];
        cast_columns(&mut far, &mut z, &grid, &camera(2.5, 6.0, 1.0, 0.0), &textures, 100);
        cast_columns(&mut near, &mut z, &grid, &camera(7.5, 6.0, 1.0, 0.0), &textures, 100);
        assert!(near[32].line_height > far[32].line_height);
        assert!(near[32].draw_start <= far[32].draw_start);
        assert!(near[32].draw_end >= far[32].draw_end);
    }

    #[test]
    fn walls_overwrite_their_slice_only() {
        let mut grid = Grid::new(8);
        for y in 0..8 {
            grid.set_tile(6, y, Tile::Wall);
        }
        let cam = camera(2.5, 4.0, 1.0, 0.0);
        let textures = TextureStore::with_fallbacks();
        let shader = Shader::default();
        let lights = LightSet::new();
        let mut fb = Framebuffer::new(40, 30);
        let mut columns = vec![WallColumn::default(); 40];
        let mut z = vec![0.0; 40];
        cast_columns(&mut columns, &mut z, &grid, &cam, &textures, 30);
        render_walls(&mut fb, &columns, &cam, &textures, &shader, &lights);
        let col = columns[20];
        assert!(col.hit.is_some());
        assert_eq!(fb.color_buffer[20], 0, "row 0 above the slice stays clear");
        let mid = (col.draw_start + col.draw_end) as usize / 2;
        assert_ne!(fb.color_buffer[mid * 40 + 20], 0);
    }

    #[test]
    fn floor_and_sky_cover_the_screen() {
        let cam = camera(4.5, 4.5, -1.0, 0.0);
        let textures = TextureStore::with_fallbacks();
        let shader = Shader { fog_density: 0.0, ..Shader::default() };
        let lights = LightSet::new();
        let mut fb = Framebuffer::new(32, 20);
        render_sky_and_floor(&mut fb, &cam, &textures, &shader, &lights);
        assert!(fb.color_buffer.iter().all(|p| *p != 0));
    }

    #[test]
    fn pitch_moves_the_horizon() {
        let mut cam = camera(4.5, 4.5, -1.0, 0.0);
        assert_eq!(horizon(&cam, 200), 100);
        cam.pitch = 30.0;
        assert_eq!(horizon(&cam, 200), 130);
        cam.pitch = -150.0;
        assert_eq!(horizon(&cam, 200), 0);
    }
}
