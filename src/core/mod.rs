//! Core world types (grid, camera, lights, input).
//!
//! Re-exports:
//! - `grid`: Tile map loading and collision queries
//! - `camera`: Camera pose and movement
//! - `light`: Dynamic lights and blink patterns
//! - `process_events`: Keyboard/mouse handling

pub mod grid;
pub mod camera;
pub mod light;
pub mod process_events;
