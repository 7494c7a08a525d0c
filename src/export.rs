//! Snapshot export: re-draw the last published character frame onto an offscreen
//! RGB surface and write it as a PNG.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, RgbImage};

use crate::draw::paint_frame;
use crate::error::Error;
use crate::types::{CharacterFrame, Color, FrameBuffer, Viewport};

pub const DEFAULT_PREFIX: &str = "ascii_capture";

/// Render `frame` the way it appears live: black background, bold glyphs in `color`
/// at the frame's exact cell geometry, mirrored left-right when `mirrored`.
///
/// Returns `None` when the viewport has no area (no surface to draw on).
pub fn render_snapshot(
    frame: &CharacterFrame,
    viewport: Viewport,
    color: Color,
    font_size: f32,
    mirrored: bool,
) -> Option<RgbImage> {
    if viewport.is_empty() {
        return None;
    }
    let mut surface = FrameBuffer::filled(viewport.width, viewport.height, Color::BLACK);
    paint_frame(&mut surface, frame, color, font_size, true);
    if mirrored {
        surface.mirror_horizontal();
    }
    RgbImage::from_raw(surface.width as u32, surface.height as u32, surface.to_rgb8())
}

/// `<prefix>_<unix-timestamp-ms>.png`
pub fn snapshot_file_name(prefix: &str, at: SystemTime) -> String {
    let millis = at.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    format!("{prefix}_{millis}.png")
}

/// A path in `directory` for a snapshot taken `at`. Two snapshots in the same
/// millisecond get `_1`, `_2`, ... appended instead of overwriting each other.
pub fn unique_snapshot_path(directory: &Path, prefix: &str, at: SystemTime) -> PathBuf {
    let first = directory.join(snapshot_file_name(prefix, at));
    if !first.exists() {
        return first;
    }
    let stem = snapshot_file_name(prefix, at);
    let stem = stem.trim_end_matches(".png");
    (1..)
        .map(|n| directory.join(format!("{stem}_{n}.png")))
        .find(|path| !path.exists())
        .unwrap_or(first)
}

/// Holds the most recently published frame and writes snapshots of it on demand.
#[derive(Debug)]
pub struct SnapshotExporter {
    directory: PathBuf,
    prefix: String,
    last: Option<CharacterFrame>,
}

impl SnapshotExporter {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { directory: directory.into(), prefix: prefix.into(), last: None }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Replace the cached frame with a freshly rendered one.
    pub fn publish(&mut self, frame: CharacterFrame) {
        self.last = Some(frame);
    }

    pub fn last_frame(&self) -> Option<&CharacterFrame> {
        self.last.as_ref()
    }

    /// Write a PNG of the cached frame.
    ///
    /// `Ok(None)` when there is nothing to export yet or no surface could be made;
    /// the caller may simply try again.
    pub fn capture(
        &self,
        viewport: Viewport,
        color: Color,
        font_size: f32,
        mirrored: bool,
    ) -> Result<Option<PathBuf>, Error> {
        let Some(frame) = &self.last else {
            log::debug!("capture requested before any frame was rendered");
            return Ok(None);
        };
        let Some(image) = render_snapshot(frame, viewport, color, font_size, mirrored) else {
            return Ok(None);
        };

        let path = unique_snapshot_path(&self.directory, &self.prefix, SystemTime::now());
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| Error::ExportWrite { path: path.clone(), source })?;
        log::info!("snapshot saved to {}", path.display());
        Ok(Some(path))
    }
}
