use raylib::prelude::Color;

use crate::render::framebuffer::Framebuffer;

/// Liang–Barsky clip against the buffer rectangle. `None` when the segment
/// misses the buffer entirely.
fn clip(fb: &Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32, i32, i32)> {
    if fb.width == 0 || fb.height == 0 {
        return None;
    }
    let (max_x, max_y) = (fb.width as i32 - 1, fb.height as i32 - 1);
    let inside = |x: i32, y: i32| (0..=max_x).contains(&x) && (0..=max_y).contains(&y);
    if inside(x0, y0) && inside(x1, y1) {
        return Some((x0, y0, x1, y1));
    }

    let (fx0, fy0) = (x0 as f64, y0 as f64);
    let dx = x1 as f64 - fx0;
    let dy = y1 as f64 - fy0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-dx, fx0),
        (dx, max_x as f64 - fx0),
        (-dy, fy0),
        (dy, max_y as f64 - fy0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| -> (i32, i32) {
        let x = (fx0 + t * dx).round().clamp(0.0, max_x as f64) as i32;
        let y = (fy0 + t * dy).round().clamp(0.0, max_y as f64) as i32;
        (x, y)
    };
    let (cx0, cy0) = at(t0);
    let (cx1, cy1) = at(t1);
    Some((cx0, cy0, cx1, cy1))
}

/// Bresenham integer line, alpha-blended per pixel. Endpoints may lie anywhere
/// in `i32`; the segment is clipped to the buffer before stepping.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let Some((mut x0, mut y0, x1, y1)) = clip(fb, x0, y0, x1, y1) else {
        return;
    };
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fb.blend_pixel(x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
