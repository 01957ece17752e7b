//! Software renderer.
//!
//! Re-exports:
//! - `framebuffer`: packed CPU pixel buffer, blending and upload
//! - `textures`: role-keyed texture store with procedural fallbacks
//! - `casters`: DDA traversal, wall casts, visibility and hit-scan
//! - `shading`: fog, tonemap and dynamic light transforms
//! - `render3d`: sky, floor and textured wall columns
//! - `sprites`: billboard projection and depth-tested compositing
//! - `line`: Bresenham integer line drawing
//! - `overlay`: hit-scan trail and viewmodel
//! - `post`: glitch and dither passes
//! - `frame`: per-frame compositor

pub mod framebuffer;
pub mod textures;
pub mod casters;
pub mod shading;
pub mod render3d;
pub mod sprites;
pub mod line;
pub mod overlay;
pub mod post;
pub mod frame;
