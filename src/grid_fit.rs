//! Grid fitting: how many glyphs fit the viewport, and the exact cell size that makes
//! the text block fill it with no gap or overflow.

use crate::error::NotReady;
use crate::types::Viewport;

/// Rendered size of one monospace glyph, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct GlyphSize {
    pub width: f32,
    pub height: f32,
}

/// Anything that can measure the reference glyph at a font size.
pub trait GlyphMetrics {
    fn measure(&self, font_size: f32) -> GlyphSize;
}

/// Fitted grid for one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub viewport: Viewport,
    pub glyph: GlyphSize,
    pub columns: usize,
    pub rows: usize,
    /// `viewport.width / columns`, always >= `glyph.width`.
    pub cell_width: f32,
    /// `viewport.height / rows`, always >= `glyph.height`.
    pub cell_height: f32,
}

impl GridGeometry {
    /// Width / height of the area the grid covers, in pixels.
    pub fn pixel_aspect(&self) -> f32 {
        (self.columns as f32 * self.cell_width) / (self.rows as f32 * self.cell_height)
    }
}

/// Fit a grid of `glyph`-sized cells into `viewport`.
pub fn fit(viewport: Viewport, glyph: GlyphSize) -> Result<GridGeometry, NotReady> {
    if !(glyph.width > 0.0 && glyph.height > 0.0) {
        return Err(NotReady::GlyphUnmeasured);
    }

    let (vw, vh) = (viewport.width as f32, viewport.height as f32);
    let columns = (vw / glyph.width).floor() as usize;
    let rows = (vh / glyph.height).floor() as usize;
    if columns == 0 || rows == 0 {
        return Err(NotReady::EmptyGrid);
    }

    Ok(GridGeometry {
        viewport,
        glyph,
        columns,
        rows,
        cell_width: vw / columns as f32,
        cell_height: vh / rows as f32,
    })
}

/// Measure and fit in one step, remembering the last geometry so changes can be
/// reported once instead of every cycle.
#[derive(Debug, Default)]
pub struct GridFitter {
    last: Option<GridGeometry>,
}

impl GridFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(
        &mut self,
        viewport: Viewport,
        metrics: &dyn GlyphMetrics,
        font_size: f32,
    ) -> Result<GridGeometry, NotReady> {
        let geometry = fit(viewport, metrics.measure(font_size))?;
        if self.last != Some(geometry) {
            log::debug!(
                "grid {}x{} in {}x{} (cell {:.3}x{:.3})",
                geometry.columns,
                geometry.rows,
                viewport.width,
                viewport.height,
                geometry.cell_width,
                geometry.cell_height
            );
            self.last = Some(geometry);
        }
        Ok(geometry)
    }
}
