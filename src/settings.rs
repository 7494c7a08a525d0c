//! Render settings and the shared snapshot the render loop reads once per cycle.

use std::sync::{Arc, Mutex};

use crate::ramp::{DensityRamp, RampKind};
use crate::types::Color;

pub const MIN_FONT_SIZE: f32 = 6.0;
pub const MAX_FONT_SIZE: f32 = 24.0;
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Palette cycled by the color control.
pub const COLOR_PRESETS: [Color; 5] = [
    Color(0x00_00_FF_41), // matrix green
    Color(0x00_FF_BF_00), // amber
    Color(0x00_00_FF_FF), // cyan
    Color(0x00_FF_FF_FF), // white
    Color(0x00_FF_33_66), // hot pink
];

/// Everything the pipeline reads from the controls.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Glyph cell height in pixels.
    pub font_size: f32,
    pub color: Color,
    pub ramp: DensityRamp,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { font_size: DEFAULT_FONT_SIZE, color: Color::default(), ramp: DensityRamp::standard() }
    }
}

impl RenderSettings {
    /// Copy with the font size moved by `delta`, kept inside the supported range.
    pub fn with_font_step(&self, delta: f32) -> Self {
        Self { font_size: (self.font_size + delta).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE), ..self.clone() }
    }

    /// Copy with the ramp switched between the two built-ins. A custom ramp switches back to "default".
    pub fn with_next_ramp(&self) -> Self {
        let ramp = match self.ramp.kind() {
            RampKind::Default => DensityRamp::complex(),
            RampKind::Complex | RampKind::Custom => DensityRamp::standard(),
        };
        Self { ramp, ..self.clone() }
    }

    /// Copy with the next preset color (the first preset if the current one isn't a preset).
    pub fn with_next_color(&self) -> Self {
        let next = COLOR_PRESETS
            .iter()
            .position(|&c| c == self.color)
            .map(|i| COLOR_PRESETS[(i + 1) % COLOR_PRESETS.len()])
            .unwrap_or(COLOR_PRESETS[0]);
        Self { color: next, ..self.clone() }
    }
}

/// Settings written by the controls at any time and read by the loop as one snapshot.
///
/// Writers swap in a whole new `RenderSettings`; readers hold their `Arc` for the
/// full cycle, so nothing changes under them mid-frame.
#[derive(Clone, Debug, Default)]
pub struct SharedSettings {
    current: Arc<Mutex<Arc<RenderSettings>>>,
}

impl SharedSettings {
    pub fn new(settings: RenderSettings) -> Self {
        Self { current: Arc::new(Mutex::new(Arc::new(settings))) }
    }

    /// The settings to use for one whole cycle.
    pub fn snapshot(&self) -> Arc<RenderSettings> {
        match self.current.lock() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the settings.
    pub fn store(&self, settings: RenderSettings) {
        let mut guard = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(settings);
    }

    /// Derive new settings from the current ones and store them.
    pub fn update(&self, f: impl FnOnce(&RenderSettings) -> RenderSettings) {
        let next = f(&self.snapshot());
        self.store(next);
    }
}
