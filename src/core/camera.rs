use raylib::prelude::{Vector2, Vector3};

use crate::core::grid::Grid;

/// Pose de la cámara en unidades de celda.
///
/// `dir` is the forward vector and `plane` the perpendicular screen vector whose
/// length sets the field of view. `pitch` shifts the horizon in screen pixels.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    pub pos: Vector3,
    pub dir: Vector2,
    pub plane: Vector2,
    pub pitch: f32,
}

impl Camera {
    pub fn new(pos: Vector3, dir: Vector2, plane: Vector2) -> Self {
        Self { pos, dir, plane, pitch: 0.0 }
    }

    /// Centered on the grid's spawn marker (or cell (1,1)), looking down -x.
    pub fn at_spawn(grid: &Grid, plane_len: f32) -> Self {
        let (sx, sy) = grid.spawn().unwrap_or((1, 1));
        Self::new(
            Vector3::new(sx as f32 + 0.5, sy as f32 + 0.5, 0.0),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, plane_len),
        )
    }

    /// Rotates dir and plane together by `yaw` radians and accumulates pitch.
    pub fn rotate(&mut self, yaw: f32, pitch_delta: f32, max_pitch: f32) {
        let (sin, cos) = yaw.sin_cos();
        let d = self.dir;
        let p = self.plane;
        self.dir = Vector2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
        self.plane = Vector2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos);
        self.pitch = (self.pitch + pitch_delta).clamp(-max_pitch, max_pitch);
    }

    /// Moves each axis independently so the camera slides along walls.
    pub fn move_by(&mut self, grid: &Grid, dx: f32, dy: f32) {
        let nx = self.pos.x + dx;
        if !grid.is_blocking_at(nx, self.pos.y) {
            self.pos.x = nx;
        }
        let ny = self.pos.y + dy;
        if !grid.is_blocking_at(self.pos.x, ny) {
            self.pos.y = ny;
        }
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.dir.y.atan2(self.dir.x)
    }

    /// Yaw as a fraction of a full turn in [0, 1).
    pub fn view_angle(&self) -> f32 {
        let a = self.yaw() / std::f32::consts::TAU;
        if a < 0.0 { a + 1.0 } else { a }
    }

    /// World offset → camera space (lateral, depth) through the inverse of [plane dir].
    pub fn to_camera_space(&self, wx: f32, wy: f32) -> (f32, f32) {
        let dx = wx - self.pos.x;
        let dy = wy - self.pos.y;
        let inv_det = 1.0 / (self.plane.x * self.dir.y - self.dir.x * self.plane.y);
        let tx = inv_det * (self.dir.y * dx - self.dir.x * dy);
        let ty = inv_det * (-self.plane.y * dx + self.plane.x * dy);
        (tx, ty)
    }
}
