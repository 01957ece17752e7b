//! Keyboard/mouse handling: movement, mouse look and frame commands.
use raylib::prelude::*;

use crate::config::PlayerConfig;
use crate::core::camera::Camera;
use crate::core::grid::Grid;

/// One-shot actions requested during this frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameCommands {
    /// Left click or space; edge-triggered, one hit-scan per press.
    pub fire: bool,
    pub toggle_glitch: bool,
    pub toggle_dither: bool,
}

/// WASD to move (shift sprints), mouse to look.
pub fn process_events(
    window: &mut RaylibHandle,
    camera: &mut Camera,
    grid: &Grid,
    cfg: &PlayerConfig,
    dt: f32,
) -> FrameCommands {
    let mut speed = cfg.move_speed * dt;
    if window.is_key_down(KeyboardKey::KEY_LEFT_SHIFT) {
        speed *= cfg.sprint_multiplier;
    }

    let dir = camera.dir;
    let mut dx = 0.0;
    let mut dy = 0.0;
    if window.is_key_down(KeyboardKey::KEY_W) {
        dx += dir.x * speed;
        dy += dir.y * speed;
    }
    if window.is_key_down(KeyboardKey::KEY_S) {
        dx -= dir.x * speed;
        dy -= dir.y * speed;
    }
    if window.is_key_down(KeyboardKey::KEY_A) {
        dx += -dir.y * speed;
        dy += dir.x * speed;
    }
    if window.is_key_down(KeyboardKey::KEY_D) {
        dx += dir.y * speed;
        dy += -dir.x * speed;
    }
    camera.move_by(grid, dx, dy);

    let mouse = window.get_mouse_delta();
    let yaw = cfg.rot_speed * 0.01 * -mouse.x;
    let pitch = cfg.pitch_speed * -mouse.y;
    camera.rotate(yaw, pitch, cfg.max_pitch);

    FrameCommands {
        fire: window.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT)
            || window.is_key_pressed(KeyboardKey::KEY_SPACE),
        toggle_glitch: window.is_key_pressed(KeyboardKey::KEY_G),
        toggle_dither: window.is_key_pressed(KeyboardKey::KEY_M),
    }
}
