// Window + software drawing.
// Visual effects provided here:
// 1) A resizable window that shows the live character grid.
// 2) Painting a character frame into a pixel buffer at its exact cell geometry.
// 3) A small overlay (status line / hint / camera error) on top of the grid.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::Error;
use crate::font::{self, draw_glyph};
use crate::render_loop::{Command, Frontend};
use crate::types::{CharacterFrame, Color, FrameBuffer, Viewport};

/// Overlay text height in pixels.
const OVERLAY_FONT_SIZE: f32 = 12.0;

/// Refresh pacing for the window; stands in for the display's vsync callback.
const TARGET_FPS: usize = 60;

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);
        Ok(Self { window })
    }
}

impl Frontend for Drawer {
    /// Returns false when the user closes the window (so we can stop the loop).
    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = self.window.get_size();
        Viewport::new(width, height)
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();

        // Font size keys repeat while held.
        if self.window.is_key_pressed(Key::Equal, KeyRepeat::Yes)
            || self.window.is_key_pressed(Key::NumPadPlus, KeyRepeat::Yes)
        {
            commands.push(Command::FontLarger);
        }
        if self.window.is_key_pressed(Key::Minus, KeyRepeat::Yes)
            || self.window.is_key_pressed(Key::NumPadMinus, KeyRepeat::Yes)
        {
            commands.push(Command::FontSmaller);
        }

        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            let command = match key {
                Key::M => Command::NextRamp,
                Key::C => Command::NextColor,
                Key::S | Key::Space => Command::Capture,
                Key::V => Command::UseCamera,
                Key::I => Command::UseImage,
                Key::H => Command::ToggleOverlay,
                Key::Escape => Command::Quit,
                _ => continue,
            };
            commands.push(command);
        }
        commands
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new grid.
    fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }
}

/* ---------- Painting a character frame ---------- */

/// Draw every glyph of `frame` at `(col * cell_width, row * cell_height)`.
/// The surface is not cleared first.
pub fn paint_frame(fb: &mut FrameBuffer, frame: &CharacterFrame, color: Color, font_size: f32, bold: bool) {
    for (row, line) in frame.lines().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let (x, y) = frame.glyph_origin(col, row);
            draw_glyph(fb, x, y, ch, font_size, color, bold);
        }
    }
}

/// Lines drawn in the top-left corner, one below the other.
pub fn paint_overlay(fb: &mut FrameBuffer, lines: &[String], color: Color) {
    for (i, line) in lines.iter().enumerate() {
        let y = 8.0 + i as f32 * (OVERLAY_FONT_SIZE + 4.0);
        font::draw_text(fb, 8.0, y, line, OVERLAY_FONT_SIZE, color);
    }
}

/// A message centered on the surface.
/// Visual: the camera error sits in the middle of an otherwise black window.
pub fn paint_centered(fb: &mut FrameBuffer, message: &str, color: Color) {
    let w = font::text_width(message, OVERLAY_FONT_SIZE);
    let x = ((fb.width as f32 - w) / 2.0).max(0.0);
    let y = ((fb.height as f32 - OVERLAY_FONT_SIZE) / 2.0).max(0.0);
    font::draw_text(fb, x, y, message, OVERLAY_FONT_SIZE, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_columns(fb: &FrameBuffer) -> Vec<usize> {
        (0..fb.width).filter(|&x| (0..fb.height).any(|y| fb.get(x, y) != 0)).collect()
    }

    #[test]
    fn glyphs_land_in_their_cells() {
        // Two columns of 20px cells, font size 8 (6x8 glyph cell).
        let frame = CharacterFrame {
            text: " |\n".into(),
            columns: 2,
            rows: 1,
            cell_width: 20.0,
            cell_height: 10.0,
        };
        let mut fb = FrameBuffer::filled(40, 10, Color::BLACK);
        paint_frame(&mut fb, &frame, Color::WHITE, 8.0, false);
        // '|' is bit column 2 of the second cell.
        assert_eq!(lit_columns(&fb), vec![22]);
    }

    #[test]
    fn centered_message_is_drawn() {
        let mut fb = FrameBuffer::filled(400, 100, Color::BLACK);
        paint_centered(&mut fb, "NO CAMERA", Color::WHITE);
        let cols = lit_columns(&fb);
        assert!(!cols.is_empty());
        let mid = (cols[0] + cols[cols.len() - 1]) / 2;
        assert!((190..=210).contains(&mid), "mid = {mid}");
    }
}
