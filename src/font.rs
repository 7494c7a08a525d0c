// Built-in monospace bitmap font.
// Each glyph is a 5x7 pattern inside a 6x8 cell (one column / one row of spacing),
// scaled to the requested font size when drawn. The font size is the cell height.

use crate::grid_fit::{GlyphMetrics, GlyphSize};
use crate::types::{Color, FrameBuffer};

/// Cell size in font units.
const CELL_W: f32 = 6.0;
const CELL_H: f32 = 8.0;

/// The built-in font. Every glyph shares one advance width.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapFont;

impl GlyphMetrics for BitmapFont {
    /// Reference glyph size: `0.75 * font_size` wide, `font_size` tall.
    /// A font size that isn't positive measures as zero.
    fn measure(&self, font_size: f32) -> GlyphSize {
        if !(font_size > 0.0) {
            return GlyphSize::default();
        }
        let scale = font_size / CELL_H;
        GlyphSize { width: CELL_W * scale, height: CELL_H * scale }
    }
}

/// Return a 5x7 glyph bitmap.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
pub fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),

        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Uppercase
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b10001,0b01010,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),
        'Ñ' => g!(0b01101,0b10010,0b00000,0b11001,0b10101,0b10011,0b10001),

        // Lowercase
        'a' => g!(0b00000,0b00000,0b01110,0b00001,0b01111,0b10001,0b01111),
        'b' => g!(0b10000,0b10000,0b10110,0b11001,0b10001,0b10001,0b11110),
        'c' => g!(0b00000,0b00000,0b01110,0b10000,0b10000,0b10001,0b01110),
        'd' => g!(0b00001,0b00001,0b01101,0b10011,0b10001,0b10001,0b01111),
        'e' => g!(0b00000,0b00000,0b01110,0b10001,0b11111,0b10000,0b01110),
        'f' => g!(0b00110,0b01001,0b01000,0b11100,0b01000,0b01000,0b01000),
        'g' => g!(0b00000,0b01111,0b10001,0b10001,0b01111,0b00001,0b01110),
        'h' => g!(0b10000,0b10000,0b10110,0b11001,0b10001,0b10001,0b10001),
        'i' => g!(0b00100,0b00000,0b01100,0b00100,0b00100,0b00100,0b01110),
        'j' => g!(0b00010,0b00000,0b00110,0b00010,0b00010,0b10010,0b01100),
        'k' => g!(0b10000,0b10000,0b10010,0b10100,0b11000,0b10100,0b10010),
        'l' => g!(0b01100,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'm' => g!(0b00000,0b00000,0b11010,0b10101,0b10101,0b10001,0b10001),
        'n' => g!(0b00000,0b00000,0b10110,0b11001,0b10001,0b10001,0b10001),
        'o' => g!(0b00000,0b00000,0b01110,0b10001,0b10001,0b10001,0b01110),
        'p' => g!(0b00000,0b00000,0b11110,0b10001,0b11110,0b10000,0b10000),
        'q' => g!(0b00000,0b00000,0b01101,0b10011,0b01111,0b00001,0b00001),
        'r' => g!(0b00000,0b00000,0b10110,0b11001,0b10000,0b10000,0b10000),
        's' => g!(0b00000,0b00000,0b01110,0b10000,0b01110,0b00001,0b11110),
        't' => g!(0b01000,0b01000,0b11100,0b01000,0b01000,0b01001,0b00110),
        'u' => g!(0b00000,0b00000,0b10001,0b10001,0b10001,0b10011,0b01101),
        'v' => g!(0b00000,0b00000,0b10001,0b10001,0b10001,0b01010,0b00100),
        'w' => g!(0b00000,0b00000,0b10001,0b10001,0b10101,0b10101,0b01010),
        'x' => g!(0b00000,0b00000,0b10001,0b01010,0b00100,0b01010,0b10001),
        'y' => g!(0b00000,0b00000,0b10001,0b10001,0b01111,0b00001,0b01110),
        'z' => g!(0b00000,0b00000,0b11111,0b00010,0b00100,0b01000,0b11111),

        // Punctuation and symbols
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '"' => g!(0b01010,0b01010,0b01010,0b00000,0b00000,0b00000,0b00000),
        '#' => g!(0b01010,0b01010,0b11111,0b01010,0b11111,0b01010,0b01010),
        '$' => g!(0b00100,0b01111,0b10100,0b01110,0b00101,0b11110,0b00100),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),
        '&' => g!(0b01100,0b10010,0b10100,0b01000,0b10101,0b10010,0b01101),
        '\'' => g!(0b01100,0b00100,0b01000,0b00000,0b00000,0b00000,0b00000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '*' => g!(0b00000,0b00100,0b10101,0b01110,0b10101,0b00100,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b01100,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b01100,0b01100),
        '/' => g!(0b00000,0b00001,0b00010,0b00100,0b01000,0b10000,0b00000),
        ':' => g!(0b00000,0b01100,0b01100,0b00000,0b01100,0b01100,0b00000),
        ';' => g!(0b00000,0b01100,0b01100,0b00000,0b01100,0b00100,0b01000),
        '<' => g!(0b00010,0b00100,0b01000,0b10000,0b01000,0b00100,0b00010),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '>' => g!(0b01000,0b00100,0b00010,0b00001,0b00010,0b00100,0b01000),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),
        '@' => g!(0b01110,0b10001,0b00001,0b01101,0b10101,0b10101,0b01110),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        '\\' => g!(0b00000,0b10000,0b01000,0b00100,0b00010,0b00001,0b00000),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),
        '^' => g!(0b00100,0b01010,0b10001,0b00000,0b00000,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '`' => g!(0b01000,0b00100,0b00010,0b00000,0b00000,0b00000,0b00000),
        '{' => g!(0b00010,0b00100,0b00100,0b01000,0b00100,0b00100,0b00010),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        '}' => g!(0b01000,0b00100,0b00100,0b00010,0b00100,0b00100,0b01000),
        '~' => g!(0b00000,0b00000,0b01000,0b10101,0b00010,0b00000,0b00000),

        // Shade blocks, common in hand-made ramps
        '█' => g!(0b11111,0b11111,0b11111,0b11111,0b11111,0b11111,0b11111),
        '▓' => g!(0b11011,0b10111,0b11101,0b01111,0b11011,0b10111,0b11101),
        '▒' => g!(0b10101,0b01010,0b10101,0b01010,0b10101,0b01010,0b10101),
        '░' => g!(0b10001,0b00100,0b10001,0b00100,0b10001,0b00100,0b10001),

        _ => None,
    }
}

/// Fill the pixel rectangle [x0, x1) x [y0, y1), clipped to the surface.
fn fill_rect(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let x0 = x0.max(0) as usize;
    let y0 = y0.max(0) as usize;
    let x1 = (x1.max(0) as usize).min(fb.width);
    let y1 = (y1.max(0) as usize).min(fb.height);
    for y in y0..y1 {
        let row = y * fb.width;
        fb.pixels[row + x0.min(x1)..row + x1].fill(color);
    }
}

/// Draw one glyph with its cell's top-left at (x, y), scaled to `font_size`.
/// `bold` widens every stroke to the right. Characters the font doesn't know draw nothing.
pub fn draw_glyph(fb: &mut FrameBuffer, x: f32, y: f32, ch: char, font_size: f32, color: Color, bold: bool) {
    let Some(rows) = glyph5x7(ch) else { return };
    if !(font_size > 0.0) {
        return;
    }
    let scale = font_size / CELL_H;
    let embolden = if bold { (scale * 0.5).round().max(1.0) as i32 } else { 0 };

    for (ry, rowbits) in rows.iter().enumerate() {
        let y0 = (y + ry as f32 * scale).round() as i32;
        let y1 = ((y + (ry + 1) as f32 * scale).round() as i32).max(y0 + 1);
        for rx in 0..5 {
            if (rowbits & (1 << (4 - rx))) != 0 {
                let x0 = (x + rx as f32 * scale).round() as i32;
                let x1 = ((x + (rx + 1) as f32 * scale).round() as i32).max(x0 + 1);
                fill_rect(fb, x0, y0, x1 + embolden, y1, color.0);
            }
        }
    }
}

/// Draw a string left to right with a 1-pixel black shadow, for overlay text.
/// Visual: readable on top of busy glyph grids.
pub fn draw_text(fb: &mut FrameBuffer, x: f32, y: f32, text: &str, font_size: f32, color: Color) {
    let advance = BitmapFont.measure(font_size).width;
    for (i, ch) in text.chars().enumerate() {
        let gx = x + i as f32 * advance;
        draw_glyph(fb, gx + 1.0, y + 1.0, ch, font_size, Color::BLACK, false);
        draw_glyph(fb, gx, y, ch, font_size, color, false);
    }
}

/// Pixel width of `text` drawn with `draw_text`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * BitmapFont.measure(font_size).width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ramp::{DENSITY_COMPLEX, DENSITY_DEFAULT};

    #[test]
    fn measures_three_quarters_width() {
        let g = BitmapFont.measure(12.0);
        assert_eq!(g, GlyphSize { width: 9.0, height: 12.0 });
    }

    #[test]
    fn non_positive_font_size_measures_zero() {
        assert_eq!(BitmapFont.measure(0.0), GlyphSize::default());
        assert_eq!(BitmapFont.measure(-4.0), GlyphSize::default());
        assert_eq!(BitmapFont.measure(f32::NAN), GlyphSize::default());
    }

    #[test]
    fn builtin_ramps_are_fully_covered() {
        for ch in DENSITY_DEFAULT.chars().chain(DENSITY_COMPLEX.chars()) {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn printable_ascii_is_covered() {
        for b in 0x20u8..=0x7E {
            assert!(glyph5x7(b as char).is_some(), "missing glyph for {:?}", b as char);
        }
    }

    #[test]
    fn glyph_at_unit_scale_matches_bitmap() {
        // Font size 8 => scale 1, one pixel per bit.
        let mut fb = FrameBuffer::filled(6, 8, Color::BLACK);
        draw_glyph(&mut fb, 0.0, 0.0, 'L', 8.0, Color::WHITE, false);
        for y in 0..7 {
            assert_eq!(fb.get(0, y), Color::WHITE.0, "left stem row {y}");
        }
        for x in 0..5 {
            assert_eq!(fb.get(x, 6), Color::WHITE.0, "base col {x}");
        }
        assert_eq!(fb.get(1, 0), Color::BLACK.0);
        assert_eq!(fb.get(5, 6), Color::BLACK.0);
    }

    #[test]
    fn bold_widens_strokes() {
        let mut regular = FrameBuffer::filled(6, 8, Color::BLACK);
        let mut bold = FrameBuffer::filled(6, 8, Color::BLACK);
        draw_glyph(&mut regular, 0.0, 0.0, '|', 8.0, Color::WHITE, false);
        draw_glyph(&mut bold, 0.0, 0.0, '|', 8.0, Color::WHITE, true);
        let lit = |fb: &FrameBuffer| fb.pixels.iter().filter(|&&p| p != 0).count();
        assert_eq!(lit(&regular), 7);
        assert_eq!(lit(&bold), 14);
    }

    #[test]
    fn drawing_off_surface_is_clipped() {
        let mut fb = FrameBuffer::filled(4, 4, Color::BLACK);
        draw_glyph(&mut fb, -3.0, -3.0, '#', 8.0, Color::WHITE, true);
        draw_glyph(&mut fb, 3.0, 3.0, '#', 8.0, Color::WHITE, true);
        draw_glyph(&mut fb, 100.0, 100.0, '#', 8.0, Color::WHITE, true);
        assert_eq!(fb.pixels.len(), 16);
    }

    #[test]
    fn blank_draws_nothing() {
        let mut fb = FrameBuffer::filled(12, 16, Color::BLACK);
        draw_glyph(&mut fb, 0.0, 0.0, ' ', 16.0, Color::WHITE, true);
        draw_glyph(&mut fb, 0.0, 0.0, '\u{2603}', 16.0, Color::WHITE, true);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }
}
