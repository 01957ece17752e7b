//! Grid raycaster: a first-person software renderer over a 2D tile map.
pub mod audio_manager;
pub mod config;
pub mod core;
pub mod render;
