//! Drawing targets for the rain.

use bitfall_core::Rgb;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};

use crate::style::BlurLevel;

/// Width of one terminal cell in surface units.
pub const CELL_WIDTH: f32 = 8.0;

/// Height of one terminal cell in surface units.
pub const CELL_HEIGHT: f32 = 16.0;

/// How to draw a single glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPaint {
    pub color: Rgb,
    /// Opacity from 0 (invisible) to 255.
    pub alpha: u8,
    pub text_size: f32,
    pub blur: BlurLevel,
}

/// Something the field can paint on.
///
/// Coordinates are surface units; `y` is the glyph baseline.
pub trait Surface {
    /// Fill the whole surface with `color`.
    fn clear(&mut self, color: Rgb);

    fn draw_glyph(&mut self, glyph: char, x: f32, y: f32, paint: &GlyphPaint);
}

/// A [`Surface`] backed by a ratatui [`Buffer`].
///
/// Each cell covers [`CELL_WIDTH`] × [`CELL_HEIGHT`] units. Alpha is blended
/// against the last clear color and blur becomes a text modifier.
#[derive(Debug)]
pub struct BufferSurface<'a> {
    buffer: &'a mut Buffer,
    area: Rect,
    background: Rgb,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buffer: &'a mut Buffer, area: Rect) -> Self {
        Self {
            buffer,
            area,
            background: Rgb::BLACK,
        }
    }

    /// Size of `area` in surface units.
    pub fn dimensions(area: Rect) -> (f32, f32) {
        (
            area.width as f32 * CELL_WIDTH,
            area.height as f32 * CELL_HEIGHT,
        )
    }

    fn cell_position(&self, x: f32, y: f32) -> Option<Position> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / CELL_WIDTH) as u32;
        let row = (y / CELL_HEIGHT) as u32;
        if col >= self.area.width as u32 || row >= self.area.height as u32 {
            return None;
        }
        Some(Position::new(
            self.area.x + col as u16,
            self.area.y + row as u16,
        ))
    }
}

fn blur_modifier(blur: BlurLevel) -> Modifier {
    match blur {
        BlurLevel::None => Modifier::BOLD,
        BlurLevel::Slight => Modifier::empty(),
        BlurLevel::Strong => Modifier::DIM,
    }
}

impl Surface for BufferSurface<'_> {
    fn clear(&mut self, color: Rgb) {
        self.background = color;
        let style = Style::new().bg(color.into());
        for y in self.area.top()..self.area.bottom() {
            for x in self.area.left()..self.area.right() {
                if let Some(cell) = self.buffer.cell_mut(Position::new(x, y)) {
                    cell.reset();
                    cell.set_char(' ').set_style(style);
                }
            }
        }
    }

    fn draw_glyph(&mut self, glyph: char, x: f32, y: f32, paint: &GlyphPaint) {
        let Some(position) = self.cell_position(x, y) else {
            return;
        };
        let style = Style::new()
            .fg(paint.color.over(self.background, paint.alpha).into())
            .bg(self.background.into())
            .add_modifier(blur_modifier(paint.blur));

        if let Some(cell) = self.buffer.cell_mut(position) {
            cell.reset();
            cell.set_char(glyph).set_style(style);
        }
    }
}
