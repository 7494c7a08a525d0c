// Core types shared by the pipeline stages.

use crate::error::Error;

/// A packed pixel surface. Used for camera frames, decoded stills, the window and snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the surface is (pixels)
    pub height: usize,     // how tall the surface is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A surface filled with one color.
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self { width, height, pixels: vec![color.0; width * height] }
    }

    /// Pack tightly laid out RGB8 bytes (3 per pixel) into 0x00RRGGBB pixels.
    /// Returns `None` when the byte count doesn't match the dimensions.
    pub fn from_rgb8(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width * height * 3 {
            return None;
        }
        let pixels = rgb
            .chunks_exact(3)
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
            .collect();
        Some(Self { width, height, pixels })
    }

    /// Unpack to RGB8 bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &px in &self.pixels {
            let (r, g, b) = Color(px).channels();
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Set every pixel to one color, reusing the allocation.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.0);
    }

    /// Resize in place (contents become `color`). No-op when the size already matches.
    pub fn ensure_size(&mut self, width: usize, height: usize, color: Color) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![color.0; width * height];
        }
    }

    /// Mirror horizontally (flip left-right), the way the live camera preview is shown.
    pub fn mirror_horizontal(&mut self) {
        if self.width == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }
}

/// Pixel size of the display surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An output color packed as 0x00RRGGBB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x00_00_00_00);
    pub const WHITE: Color = Color(0x00_FF_FF_FF);
    pub const MATRIX_GREEN: Color = Color(0x00_00_FF_41);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn channels(self) -> (u8, u8, u8) {
        (((self.0 >> 16) & 0xFF) as u8, ((self.0 >> 8) & 0xFF) as u8, (self.0 & 0xFF) as u8)
    }

    /// Parse a CSS-style color: `#rgb`, `#rrggbb`, or one of a few named colors.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let raw = s.trim();
        if let Some(hex) = raw.strip_prefix('#') {
            let bad = || Error::InvalidColor(s.to_string());
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(bad());
            }
            return match hex.len() {
                3 => {
                    let v = u32::from_str_radix(hex, 16).map_err(|_| bad())?;
                    // #abc -> #aabbcc
                    let (r, g, b) = ((v >> 8) & 0xF, (v >> 4) & 0xF, v & 0xF);
                    Ok(Color((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
                }
                6 => Ok(Color(u32::from_str_radix(hex, 16).map_err(|_| bad())?)),
                _ => Err(bad()),
            };
        }

        let named = match raw.to_ascii_lowercase().as_str() {
            "black" => 0x000000,
            "white" => 0xFFFFFF,
            "red" => 0xFF0000,
            "green" => 0x008000,
            "lime" => 0x00FF00,
            "blue" => 0x0000FF,
            "cyan" | "aqua" => 0x00FFFF,
            "magenta" | "fuchsia" => 0xFF00FF,
            "yellow" => 0xFFFF00,
            "orange" => 0xFFA500,
            "amber" => 0xFFBF00,
            _ => return Err(Error::InvalidColor(s.to_string())),
        };
        Ok(Color(named))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::MATRIX_GREEN
    }
}

/// One processed frame as text, plus the exact cell geometry it was laid out with.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterFrame {
    /// `rows` lines of `columns` characters, each followed by '\n'.
    pub text: String,
    pub columns: usize,
    pub rows: usize,
    /// Exact per-column width in pixels (viewport width / columns).
    pub cell_width: f32,
    /// Exact per-row height in pixels (viewport height / rows).
    pub cell_height: f32,
}

impl CharacterFrame {
    /// Iterate the rows of the grid, without line breaks.
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }

    /// Top-left pixel position of the glyph at (`col`, `row`).
    #[inline]
    pub fn glyph_origin(&self, col: usize, row: usize) -> (f32, f32) {
        (col as f32 * self.cell_width, row as f32 * self.cell_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb8_packs_and_unpacks() {
        let fb = FrameBuffer::from_rgb8(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(fb.pixels, vec![0x010203, 0x040506]);
        assert_eq!(fb.to_rgb8(), vec![1, 2, 3, 4, 5, 6]);
        assert!(FrameBuffer::from_rgb8(2, 2, &[0; 6]).is_none());
    }

    #[test]
    fn mirror_horizontal_3x2() {
        // Row 0: [A, B, C]  Row 1: [D, E, F]
        let mut fb = FrameBuffer { width: 3, height: 2, pixels: vec![1, 2, 3, 4, 5, 6] };
        fb.mirror_horizontal();
        assert_eq!(fb.pixels, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn mirror_single_pixel_unchanged() {
        let mut fb = FrameBuffer { width: 1, height: 1, pixels: vec![7] };
        fb.mirror_horizontal();
        assert_eq!(fb.pixels, vec![7]);
    }

    #[test]
    fn parse_hex_colors() {
        assert_eq!(Color::parse("#00ff41").unwrap(), Color::MATRIX_GREEN);
        assert_eq!(Color::parse("#0f4").unwrap(), Color(0x00FF44));
        assert_eq!(Color::parse("  #FFFFFF ").unwrap(), Color::WHITE);
    }

    #[test]
    fn parse_named_colors() {
        assert_eq!(Color::parse("Lime").unwrap(), Color(0x00FF00));
        assert_eq!(Color::parse("amber").unwrap(), Color(0xFFBF00));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("chartreuse-ish").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn glyph_origin_uses_exact_cell_size() {
        let frame = CharacterFrame {
            text: String::new(),
            columns: 10,
            rows: 5,
            cell_width: 12.3,
            cell_height: 20.0,
        };
        let (x, y) = frame.glyph_origin(3, 2);
        assert!((x - 36.9).abs() < 1e-4);
        assert!((y - 40.0).abs() < 1e-4);
    }
}
