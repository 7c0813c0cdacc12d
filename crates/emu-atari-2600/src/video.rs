//! Scanline consumers.
//!
//! The TIA hands over one visible scanline at a time: the palette index of
//! each dot and the object that produced it. [`FrameBuffer`] turns that into
//! ARGB pixels; [`TextFrame`] into one character per dot.

use atari_tia::{Pixel, SCANLINE_WIDTH, VISIBLE_LINES};

use crate::palette;

/// Receives completed visible scanlines (0-227).
pub trait VideoSink {
    fn draw_scanline(
        &mut self,
        line: u16,
        colors: &[u8; SCANLINE_WIDTH],
        pixels: &[Pixel; SCANLINE_WIDTH],
    );
}

/// 160x228 ARGB32 image of the visible frame.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: vec![palette::argb(0); SCANLINE_WIDTH * VISIBLE_LINES],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        SCANLINE_WIDTH as u32
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        VISIBLE_LINES as u32
    }

    /// Row-major ARGB32 pixels.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSink for FrameBuffer {
    fn draw_scanline(
        &mut self,
        line: u16,
        colors: &[u8; SCANLINE_WIDTH],
        _pixels: &[Pixel; SCANLINE_WIDTH],
    ) {
        let line = usize::from(line);
        if line >= VISIBLE_LINES {
            return;
        }
        let row = &mut self.pixels[line * SCANLINE_WIDTH..(line + 1) * SCANLINE_WIDTH];
        for (out, &index) in row.iter_mut().zip(colors) {
            *out = palette::argb(index);
        }
    }
}

/// Character rendering of the visible frame.
#[derive(Debug, Clone)]
pub struct TextFrame {
    rows: Vec<[char; SCANLINE_WIDTH]>,
    /// Rows drawn entirely under VBLANK.
    blanked: Vec<bool>,
}

impl TextFrame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![[' '; SCANLINE_WIDTH]; VISIBLE_LINES],
            blanked: vec![true; VISIBLE_LINES],
        }
    }

    /// Character used for a dot.
    #[must_use]
    pub fn glyph(pixel: Pixel) -> char {
        match pixel {
            Pixel::Playfield => '#',
            Pixel::P0 => '1',
            Pixel::P1 => '2',
            Pixel::M0 | Pixel::M1 => '%',
            Pixel::Bl => '*',
            Pixel::Background | Pixel::VBlank | Pixel::HMove => ' ',
        }
    }

    #[must_use]
    pub fn row(&self, line: usize) -> Option<String> {
        self.rows.get(line).map(|row| row.iter().collect())
    }

    /// The frame as newline-separated rows. With `strip_vblank`, rows
    /// that were fully blanked are left out.
    #[must_use]
    pub fn render(&self, strip_vblank: bool) -> String {
        let mut out = String::with_capacity((SCANLINE_WIDTH + 1) * VISIBLE_LINES);
        for (row, &blanked) in self.rows.iter().zip(&self.blanked) {
            if strip_vblank && blanked {
                continue;
            }
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

impl Default for TextFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSink for TextFrame {
    fn draw_scanline(
        &mut self,
        line: u16,
        _colors: &[u8; SCANLINE_WIDTH],
        pixels: &[Pixel; SCANLINE_WIDTH],
    ) {
        let line = usize::from(line);
        let Some(row) = self.rows.get_mut(line) else {
            return;
        };
        for (out, &pixel) in row.iter_mut().zip(pixels) {
            *out = Self::glyph(pixel);
        }
        self.blanked[line] = pixels.iter().all(|&p| p == Pixel::VBlank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_maps_palette() {
        let mut frame = FrameBuffer::new();
        let mut colors = [0u8; SCANLINE_WIDTH];
        colors[5] = 0x1E;
        frame.draw_scanline(3, &colors, &[Pixel::Background; SCANLINE_WIDTH]);
        assert_eq!(frame.pixels()[3 * 160 + 5], palette::argb(0x1E));
        assert_eq!(frame.pixels()[3 * 160 + 4], palette::argb(0));
        assert_eq!(frame.width(), 160);
        assert_eq!(frame.height(), 228);
    }

    #[test]
    fn out_of_range_lines_are_ignored() {
        let mut frame = FrameBuffer::new();
        frame.draw_scanline(228, &[0x0E; SCANLINE_WIDTH], &[Pixel::Background; SCANLINE_WIDTH]);
        assert!(frame.pixels().iter().all(|&p| p == palette::argb(0)));
    }

    #[test]
    fn text_glyphs() {
        let mut text = TextFrame::new();
        let mut pixels = [Pixel::Background; SCANLINE_WIDTH];
        pixels[0] = Pixel::Playfield;
        pixels[1] = Pixel::P0;
        pixels[2] = Pixel::P1;
        pixels[3] = Pixel::M0;
        pixels[4] = Pixel::M1;
        pixels[5] = Pixel::Bl;
        pixels[6] = Pixel::HMove;
        text.draw_scanline(10, &[0; SCANLINE_WIDTH], &pixels);
        let row = text.row(10).expect("row");
        assert!(row.starts_with("#12%%* "));
        assert_eq!(row.chars().count(), 160);
    }

    #[test]
    fn strip_drops_blanked_rows() {
        let mut text = TextFrame::new();
        let colors = [0; SCANLINE_WIDTH];
        for line in 0..VISIBLE_LINES as u16 {
            text.draw_scanline(line, &colors, &[Pixel::VBlank; SCANLINE_WIDTH]);
        }
        let mut pixels = [Pixel::Background; SCANLINE_WIDTH];
        pixels[80] = Pixel::Bl;
        text.draw_scanline(100, &colors, &pixels);

        assert_eq!(text.render(false).lines().count(), VISIBLE_LINES);
        let stripped = text.render(true);
        assert_eq!(stripped.lines().count(), 1);
        assert_eq!(stripped.find('*'), Some(80));
    }
}
