//! Frame rasterizer: cover-crop a source frame, sample it down to one pixel per
//! character cell, and map every sample through the density ramp.

use crate::grid_fit::GridGeometry;
use crate::ramp::{pixel_brightness, DensityRamp};
use crate::types::{CharacterFrame, FrameBuffer};

/// Source rectangle (in source pixels) selected by a cover fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Center-crop `src_w x src_h` so it has aspect ratio `target_aspect` (width / height).
///
/// A relatively wider target crops top and bottom; a relatively taller target crops
/// left and right. The result always lies inside the source.
pub fn cover_crop(src_w: u32, src_h: u32, target_aspect: f32) -> CropRect {
    let (sw, sh) = (src_w as f32, src_h as f32);
    let full = CropRect { x: 0.0, y: 0.0, width: sw, height: sh };
    if src_w == 0 || src_h == 0 || !target_aspect.is_finite() || target_aspect <= 0.0 {
        return full;
    }

    let source_aspect = sw / sh;
    if target_aspect > source_aspect {
        // Target wider: keep full width, crop top/bottom
        let height = sw / target_aspect;
        CropRect { x: 0.0, y: (sh - height) / 2.0, width: sw, height }
    } else {
        // Target taller: keep full height, crop left/right
        let width = sh * target_aspect;
        CropRect { x: (sw - width) / 2.0, y: 0.0, width, height: sh }
    }
}

/// Downsample the crop of `source` to exactly `columns x rows` pixels.
///
/// Nearest-neighbour at each cell center, so the result is deterministic for a given
/// frame and a source already at grid resolution maps one pixel to one cell.
pub fn sample_cover(source: &FrameBuffer, columns: usize, rows: usize, target_aspect: f32) -> FrameBuffer {
    let mut out = FrameBuffer { width: columns, height: rows, pixels: Vec::with_capacity(columns * rows) };
    if source.width == 0 || source.height == 0 {
        out.pixels.resize(columns * rows, 0);
        return out;
    }

    let crop = cover_crop(source.width as u32, source.height as u32, target_aspect);
    let step_x = crop.width / columns as f32;
    let step_y = crop.height / rows as f32;
    let max_x = source.width - 1;
    let max_y = source.height - 1;

    for row in 0..rows {
        let sy = crop.y + (row as f32 + 0.5) * step_y;
        let iy = (sy.max(0.0) as usize).min(max_y);
        for col in 0..columns {
            let sx = crop.x + (col as f32 + 0.5) * step_x;
            let ix = (sx.max(0.0) as usize).min(max_x);
            out.pixels.push(source.get(ix, iy));
        }
    }
    out
}

/// Map a sample buffer to text: one glyph per pixel, a line break after every row.
pub fn samples_to_text(samples: &FrameBuffer, ramp: &DensityRamp) -> String {
    // Glyphs may be multi-byte (e.g. 'Ñ'), so reserve generously.
    let mut text = String::with_capacity((samples.width + 1) * samples.height * 2);
    if samples.width == 0 {
        return text;
    }
    for row in samples.pixels.chunks_exact(samples.width) {
        for &px in row {
            text.push(ramp.glyph_for(pixel_brightness(px)));
        }
        text.push('\n');
    }
    text
}

/// Rasterize `source` for a fitted grid.
///
/// The crop follows the viewport's pixel aspect so cells that aren't square still show
/// an undistorted picture. Callers must only pass a ready source and a non-empty grid.
pub fn rasterize(source: &FrameBuffer, geometry: &GridGeometry, ramp: &DensityRamp) -> CharacterFrame {
    let samples = sample_cover(source, geometry.columns, geometry.rows, geometry.pixel_aspect());
    CharacterFrame {
        text: samples_to_text(&samples, ramp),
        columns: geometry.columns,
        rows: geometry.rows,
        cell_width: geometry.cell_width,
        cell_height: geometry.cell_height,
    }
}
