//! Grid traversal (DDA) and the three rays built on it: wall casts, visibility
//! traces and hit-scans.
use raylib::prelude::{Vector2, Vector3};

use crate::core::camera::Camera;
use crate::core::grid::{Grid, Tile};

/// `deltaDist` for a zero direction component.
pub const DELTA_SENTINEL: f32 = 1e30;
/// Smallest perpendicular distance a wall hit reports.
pub const MIN_PERP_DISTANCE: f32 = 0.01;

/// Axis whose cell boundary was crossed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    X,
    Y,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DdaStep {
    pub cell_x: i32,
    pub cell_y: i32,
    pub side: Side,
    /// Distance along the ray (in units of `dir`) to the boundary just crossed.
    pub distance: f32,
}

/// Endless cell-by-cell walk from an origin along a direction. Exactly one
/// boundary is crossed per step; callers stop it (bounds, hits, budget).
#[derive(Clone, Debug)]
pub struct DdaWalk {
    map_x: i32,
    map_y: i32,
    step_x: i32,
    step_y: i32,
    side_dist_x: f32,
    side_dist_y: f32,
    delta_x: f32,
    delta_y: f32,
}

impl DdaWalk {
    pub fn new(ox: f32, oy: f32, dir_x: f32, dir_y: f32) -> Self {
        let map_x = ox.floor() as i32;
        let map_y = oy.floor() as i32;
        let delta_x = if dir_x == 0.0 { DELTA_SENTINEL } else { (1.0 / dir_x).abs() };
        let delta_y = if dir_y == 0.0 { DELTA_SENTINEL } else { (1.0 / dir_y).abs() };
        let (step_x, side_dist_x) = if dir_x < 0.0 {
            (-1, (ox - map_x as f32) * delta_x)
        } else {
            (1, (map_x as f32 + 1.0 - ox) * delta_x)
        };
        let (step_y, side_dist_y) = if dir_y < 0.0 {
            (-1, (oy - map_y as f32) * delta_y)
        } else {
            (1, (map_y as f32 + 1.0 - oy) * delta_y)
        };
        Self { map_x, map_y, step_x, step_y, side_dist_x, side_dist_y, delta_x, delta_y }
    }
}

impl Iterator for DdaWalk {
    type Item = DdaStep;

    fn next(&mut self) -> Option<DdaStep> {
        let (side, distance) = if self.side_dist_x < self.side_dist_y {
            let d = self.side_dist_x;
            self.side_dist_x += self.delta_x;
            self.map_x += self.step_x;
            (Side::X, d)
        } else {
            let d = self.side_dist_y;
            self.side_dist_y += self.delta_y;
            self.map_y += self.step_y;
            (Side::Y, d)
        };
        Some(DdaStep { cell_x: self.map_x, cell_y: self.map_y, side, distance })
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WallHit {
    pub cell_x: i32,
    pub cell_y: i32,
    pub side: Side,
    /// Distance along the camera's forward axis; never below `MIN_PERP_DISTANCE`.
    pub perp_distance: f32,
    pub tile: Tile,
}

/// First wall along the ray, or `None` once the ray leaves the grid.
/// The origin must lie inside the grid.
pub fn cast_wall(grid: &Grid, ox: f32, oy: f32, dir: Vector2) -> Option<WallHit> {
    for step in DdaWalk::new(ox, oy, dir.x, dir.y) {
        match grid.tile_at(step.cell_x, step.cell_y) {
            None => return None,
            Some(Tile::Wall) => {
                return Some(WallHit {
                    cell_x: step.cell_x,
                    cell_y: step.cell_y,
                    side: step.side,
                    perp_distance: step.distance.max(MIN_PERP_DISTANCE),
                    tile: Tile::Wall,
                });
            }
            Some(Tile::Empty | Tile::Destructible | Tile::Spawn) => {}
        }
    }
    None
}

/// Walks from `from` toward `to` for at most `|to - from|` cells. Clear unless a
/// blocking cell is crossed before reaching the target cell.
pub fn trace_clear(grid: &Grid, from: Vector2, to: Vector2) -> bool {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= f32::EPSILON {
        return true;
    }
    let target = (to.x.floor() as i32, to.y.floor() as i32);
    let mut remaining = dist;
    let mut walk = DdaWalk::new(from.x, from.y, dx / dist, dy / dist);
    while remaining > 0.0 {
        let Some(step) = walk.next() else { break };
        if (step.cell_x, step.cell_y) == target {
            return true;
        }
        if grid.is_blocking(step.cell_x, step.cell_y) {
            return false;
        }
        remaining -= 1.0;
    }
    true
}

/// Within `radius` of the viewer and not hidden behind a wall.
pub fn is_visible(grid: &Grid, viewer: Vector2, target: Vector2, radius: f32) -> bool {
    let dx = target.x - viewer.x;
    let dy = target.y - viewer.y;
    if dx * dx + dy * dy > radius * radius {
        return false;
    }
    trace_clear(grid, viewer, target)
}

/// Result of one hit-scan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Wall { x: i32, y: i32 },
    Destroyed { x: i32, y: i32 },
    /// Left the grid without striking anything.
    Escaped,
}

/// Cell centers crossed by the most recent hit-scan.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    points: Vec<Vector3>,
}

impl Trail {
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn push(&mut self, p: Vector3) {
        self.points.push(p);
    }

    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fires along the camera's view direction. Rebuilds `trail`; a destructible
/// tile struck by the ray becomes empty.
pub fn hit_scan(grid: &mut Grid, camera: &Camera, trail: &mut Trail) -> HitOutcome {
    trail.clear();
    let pos = camera.pos;
    for step in DdaWalk::new(pos.x, pos.y, camera.dir.x, camera.dir.y) {
        let (x, y) = (step.cell_x, step.cell_y);
        let Some(tile) = grid.tile_at(x, y) else {
            return HitOutcome::Escaped;
        };
        trail.push(Vector3::new(x as f32 + 0.5, y as f32 + 0.5, pos.z + 0.5));
        match tile {
            Tile::Wall => {
                tracing::info!("hit a wall at ({}, {})", x, y);
                return HitOutcome::Wall { x, y };
            }
            Tile::Destructible => {
                grid.set_tile(x, y, Tile::Empty);
                tracing::info!("object destroyed at ({}, {})", x, y);
                return HitOutcome::Destroyed { x, y };
            }
            Tile::Empty | Tile::Spawn => {}
        }
    }
    HitOutcome::Escaped
}
