//! The monochrome framebuffer owned by the chipset.
use std::fmt;

use crate::definitions::display;

/// The graphics are black and white, `64 x 32` in standard mode and `128 x 64` in
/// extended mode. Every cell is stored row-major as `bool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    extended: bool,
    pixels: Vec<bool>,
    /// set whenever the pixels change, cleared by the host after consuming a frame
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// A cleared standard mode framebuffer.
    pub fn new() -> Self {
        Self {
            width: display::WIDTH,
            height: display::HEIGHT,
            extended: false,
            pixels: vec![false; display::WIDTH * display::HEIGHT],
            dirty: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// All cells row-major, `width * height` entries.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.pixels.chunks(self.width)
    }

    /// Will return the cell, coordinates outside of the screen are unset.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the host once the current frame was consumed.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Will clear the display
    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = false);
        self.dirty = true;
    }

    /// Switches the resolution, the screen is cleared in both cases.
    pub fn set_extended(&mut self, extended: bool) {
        let (width, height) = if extended {
            (display::EXTENDED_WIDTH, display::EXTENDED_HEIGHT)
        } else {
            (display::WIDTH, display::HEIGHT)
        };
        self.width = width;
        self.height = height;
        self.extended = extended;
        self.pixels = vec![false; width * height];
        self.dirty = true;
    }

    /// XORs the sprite onto the screen starting at `(x, y)`, each sprite row is
    /// `bytes_per_row` bytes wide, most significant bit first. Both axes wrap
    /// around the screen.
    ///
    /// Returns `true` if any set pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8], bytes_per_row: usize) -> bool {
        const BYTE: usize = 8;
        let mut collision = false;

        for (row_index, row) in sprite.chunks(bytes_per_row).enumerate() {
            let py = (y + row_index) % self.height;
            for (byte_index, byte) in row.iter().enumerate() {
                for bit in 0..BYTE {
                    let mask = 0x80 >> bit;
                    if byte & mask == 0 {
                        continue;
                    }
                    let px = (x + byte_index * BYTE + bit) % self.width;
                    let cell = &mut self.pixels[py * self.width + px];
                    collision |= *cell;
                    *cell = !*cell;
                }
            }
        }

        self.dirty = true;
        collision
    }

    /// Moves the content `n` rows down, the top rows are cleared.
    pub fn scroll_down(&mut self, n: usize) {
        let n = n.min(self.height);
        let shift = n * self.width;
        let len = self.pixels.len();
        self.pixels.copy_within(0..len - shift, shift);
        self.pixels[..shift].iter_mut().for_each(|pixel| *pixel = false);
        self.dirty = true;
    }

    /// Moves the content `n` columns to the right, the left columns are cleared.
    pub fn scroll_right(&mut self, n: usize) {
        let n = n.min(self.width);
        let width = self.width;
        for row in self.pixels.chunks_mut(width) {
            row.copy_within(0..width - n, n);
            row[..n].iter_mut().for_each(|pixel| *pixel = false);
        }
        self.dirty = true;
    }

    /// Moves the content `n` columns to the left, the right columns are cleared.
    pub fn scroll_left(&mut self, n: usize) {
        let n = n.min(self.width);
        let width = self.width;
        for row in self.pixels.chunks_mut(width) {
            row.copy_within(n.., 0);
            row[width - n..].iter_mut().for_each(|pixel| *pixel = false);
        }
        self.dirty = true;
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().map(|&set| if set { '#' } else { '.' }).collect();
            f.write_str(&line)?;
        }
        Ok(())
    }
}
