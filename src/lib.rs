//! matrix-cam: turns a live camera feed (or a still image) into a monospace
//! character grid that fills a resizable window, with PNG snapshots on demand.
//!
//! Pipeline, leaves first:
//! 1. [`ramp`] - brightness to glyph
//! 2. [`raster`] - cover-crop, downsample, map every sample
//! 3. [`grid_fit`] - columns/rows and exact cell size for the viewport
//! 4. [`source`] / [`camera`] - camera stream or still image, one at a time
//! 5. [`render_loop`] - one cycle per display refresh
//! 6. [`export`] - redraw the last frame to a PNG

pub mod camera;
pub mod cli;
pub mod config;
pub mod draw;
pub mod error;
pub mod export;
pub mod font;
pub mod grid_fit;
pub mod ramp;
pub mod raster;
pub mod render_loop;
pub mod settings;
pub mod source;
pub mod types;

pub use error::{Error, NotReady};
pub use types::{CharacterFrame, Color, FrameBuffer, Viewport};
