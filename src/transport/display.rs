//! Display controller setup.
//!
//! The controller must be left in horizontal addressing mode spanning the
//! whole panel, so that a 1024-byte frame written from column 0, page 0
//! lands exactly where [`Framebuffer`](crate::render::Framebuffer) put it.

use std::convert::Infallible;

/// One-time controller setup, run before the first frame is handed over.
pub trait DisplayController {
    type Error;

    fn init(&mut self) -> Result<(), Self::Error>;
}

/// SSD1306 start-up sequence, one command (with its arguments) per entry.
pub const SSD1306_INIT_COMMANDS: [&[u8]; 18] = [
    &[0xAE],             // display off
    &[0x81, 120],        // contrast
    &[0xA4],             // follow RAM
    &[0xA6],             // 1 = lit
    &[0x20, 0x00],       // horizontal addressing
    &[0x21, 0x00, 127],  // columns 0..=127
    &[0x22, 0x00, 0x07], // pages 0..=7
    &[0x40],             // start line 0
    &[0xA1],             // segment remap, column 0 on the left
    &[0xA8, 63],         // multiplex 64
    &[0xC0],             // COM scan direction
    &[0xD3, 0],          // no vertical offset
    &[0xDA, 0b0001_0010],
    &[0xD5, 0xC0],       // oscillator
    &[0xD9, 0x22],       // pre-charge
    &[0xDB, 0x20],       // VCOMH deselect
    &[0x8D, 0x14],       // charge pump on
    &[0xAF],             // display on
];

/// Command-mode control byte prefixed to every setup write.
pub const COMMAND_CONTROL_BYTE: u8 = 0x00;

/// Host stand-in for the controller: records the bus writes `init` would make.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    writes: Vec<Vec<u8>>,
    initialized: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl DisplayController for RecordingDisplay {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.writes.clear();
        for command in SSD1306_INIT_COMMANDS {
            let mut write = Vec::with_capacity(command.len() + 1);
            write.push(COMMAND_CONTROL_BYTE);
            write.extend_from_slice(command);
            self.writes.push(write);
        }
        self.initialized = true;
        Ok(())
    }
}
