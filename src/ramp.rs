//! Brightness to glyph mapping.
//!
//! A [`DensityRamp`] is ordered from the visually densest glyph (index 0) to the
//! sparsest (last index, usually a blank). Brightness is inverted on the way in:
//! white lands on the densest glyph and black on the blank, so a lit pixel draws ink
//! on the black background.

use crate::error::Error;
use crate::types::Color;

/// Built-in ramp used by default.
pub const DENSITY_DEFAULT: &str = "Ñ@#W$9876543210?!abc;:+=-,._ ";

/// Built-in ramp with finer gradation.
pub const DENSITY_COMPLEX: &str =
    r#"$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/|()1{}[]?-_+~<>i!lI;:,"^`'. "#;

/// Which ramp is active, as chosen by the controls or config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RampKind {
    #[default]
    Default,
    Complex,
    Custom,
}

/// An ordered, non-empty sequence of glyphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityRamp {
    chars: Vec<char>,
    kind: RampKind,
}

impl DensityRamp {
    /// Build a ramp from any non-empty string.
    pub fn new(s: &str) -> Result<Self, Error> {
        let chars: Vec<char> = s.chars().collect();
        if chars.is_empty() {
            return Err(Error::EmptyRamp);
        }
        Ok(Self { chars, kind: RampKind::Custom })
    }

    pub fn standard() -> Self {
        Self { chars: DENSITY_DEFAULT.chars().collect(), kind: RampKind::Default }
    }

    pub fn complex() -> Self {
        Self { chars: DENSITY_COMPLEX.chars().collect(), kind: RampKind::Complex }
    }

    pub fn kind(&self) -> RampKind {
        self.kind
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn densest(&self) -> char {
        self.chars[0]
    }

    pub fn sparsest(&self) -> char {
        self.chars[self.chars.len() - 1]
    }

    /// Map a brightness in [0, 255] to a glyph.
    ///
    /// Index is `floor((255 - v) * (N - 1) / 255)`, clamped to `[0, N - 1]` so
    /// out-of-range or slightly-off float inputs still land on a valid glyph.
    #[inline]
    pub fn glyph_for(&self, brightness: f32) -> char {
        let last = self.chars.len() - 1;
        let idx = ((255.0 - brightness) * last as f32 / 255.0).floor();
        let idx = if idx.is_nan() { last as f32 } else { idx };
        self.chars[(idx.max(0.0) as usize).min(last)]
    }
}

impl Default for DensityRamp {
    fn default() -> Self {
        Self::standard()
    }
}

/// Unweighted mean of the three channels.
///
/// Not perceptual luminance on purpose: the plain average is what the output is tuned for.
#[inline]
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

/// Brightness of a packed 0x00RRGGBB pixel.
#[inline]
pub fn pixel_brightness(px: u32) -> f32 {
    let (r, g, b) = Color(px).channels();
    brightness(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(v: u32, ramp: &DensityRamp) -> char {
        let n = ramp.len() as u32;
        let idx = ((255 - v) * (n - 1) / 255).min(n - 1);
        ramp.chars()[idx as usize]
    }

    #[test]
    fn white_is_densest_black_is_sparsest() {
        for ramp in [DensityRamp::standard(), DensityRamp::complex()] {
            assert_eq!(ramp.glyph_for(255.0), ramp.densest());
            assert_eq!(ramp.glyph_for(0.0), ramp.sparsest());
        }
    }

    #[test]
    fn every_integer_brightness_matches_formula() {
        let ramps = [
            DensityRamp::standard(),
            DensityRamp::complex(),
            DensityRamp::new("#.").unwrap(),
            DensityRamp::new("@%#*+=-:. ").unwrap(),
        ];
        for ramp in &ramps {
            for v in 0..=255u32 {
                assert_eq!(ramp.glyph_for(v as f32), reference(v, ramp), "v={v}");
            }
        }
    }

    #[test]
    fn out_of_range_brightness_is_clamped() {
        let ramp = DensityRamp::standard();
        assert_eq!(ramp.glyph_for(-10.0), ramp.sparsest());
        assert_eq!(ramp.glyph_for(300.0), ramp.densest());
        assert_eq!(ramp.glyph_for(f32::NAN), ramp.sparsest());
    }

    #[test]
    fn single_glyph_ramp_always_returns_it() {
        let ramp = DensityRamp::new("x").unwrap();
        assert_eq!(ramp.glyph_for(0.0), 'x');
        assert_eq!(ramp.glyph_for(128.0), 'x');
        assert_eq!(ramp.glyph_for(255.0), 'x');
    }

    #[test]
    fn empty_ramp_is_rejected() {
        assert!(matches!(DensityRamp::new(""), Err(Error::EmptyRamp)));
    }

    #[test]
    fn builtin_ramps() {
        let std = DensityRamp::standard();
        assert_eq!(std.densest(), 'Ñ');
        assert_eq!(std.sparsest(), ' ');
        assert_eq!(std.kind(), RampKind::Default);

        let complex = DensityRamp::complex();
        assert_eq!(complex.densest(), '$');
        assert_eq!(complex.sparsest(), ' ');
        assert!(!complex.chars().contains(&'\\'));
        assert_eq!(complex.kind(), RampKind::Complex);
    }

    #[test]
    fn brightness_is_plain_average() {
        assert_eq!(brightness(0, 0, 0), 0.0);
        assert_eq!(brightness(255, 255, 255), 255.0);
        assert_eq!(brightness(255, 0, 0), 85.0);
        assert_eq!(pixel_brightness(0x00_30_60_90), 96.0);
    }
}
