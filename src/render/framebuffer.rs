//! 1-bit-per-pixel frame in the SSD1306 page layout.
//!
//! The panel is split into 8 horizontal pages of 8 rows each. Every byte is
//! one column of one page, so byte `page * 128 + x` holds rows
//! `page * 8 ..= page * 8 + 7` of column `x`, least significant bit on top.
//! This is exactly what the controller expects in horizontal addressing mode,
//! which lets the transport send the buffer verbatim.

use std::fmt;

pub const PANEL_WIDTH: usize = 128;
pub const PANEL_HEIGHT: usize = 64;
pub const PAGES: usize = PANEL_HEIGHT / 8;
pub const FRAME_BYTES: usize = PANEL_WIDTH * PANEL_HEIGHT / 8;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Framebuffer {
    bytes: [u8; FRAME_BYTES],
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self { bytes: [0; FRAME_BYTES] }
    }

    /// Locate the byte and bit for a pixel, or `None` when it is off-panel.
    fn locate(x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as usize >= PANEL_WIDTH || y as usize >= PANEL_HEIGHT {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some(((y / 8) * PANEL_WIDTH + x, 1 << (y % 8)))
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Turn a pixel on. Off-panel coordinates are clipped and return `false`.
    pub fn set_pixel(&mut self, x: i32, y: i32) -> bool {
        match Self::locate(x, y) {
            Some((index, mask)) => {
                self.bytes[index] |= mask;
                true
            }
            None => false,
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        Self::locate(x, y).is_some_and(|(index, mask)| self.bytes[index] & mask != 0)
    }

    pub fn invert(&mut self) {
        for byte in self.bytes.iter_mut() {
            *byte = !*byte;
        }
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_BYTES] {
        &self.bytes
    }

    /// Number of lit pixels.
    pub fn count_set(&self) -> u32 {
        self.bytes.iter().map(|byte| byte.count_ones()).sum()
    }

    /// One text line per row, `#` for lit pixels and `.` otherwise.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((PANEL_WIDTH + 1) * PANEL_HEIGHT);
        for y in 0..PANEL_HEIGHT as i32 {
            for x in 0..PANEL_WIDTH as i32 {
                out.push(if self.get_pixel(x, y) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("lit", &self.count_set())
            .finish()
    }
}
