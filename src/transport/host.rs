//! Wall-clock transport for running the pipeline on a desktop.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::render::{FRAME_BYTES, PAGES};
use super::Transport;

/// Per-page addressing preamble the firmware sends ahead of each page.
const PAGE_HEADER_BYTES: usize = 7;

/// I²C clocks per byte: 8 data bits plus ACK.
const BITS_PER_BYTE: u64 = 9;

/// Completes each transfer once a fixed wall-clock time has passed since it
/// started, modelling a bus of known bandwidth.
#[derive(Debug)]
pub struct TimedTransport {
    transfer_time: Duration,
    transfers: u64,
    last_frame: Vec<u8>,
}

impl TimedTransport {
    pub fn new(transfer_time: Duration) -> Self {
        Self {
            transfer_time,
            transfers: 0,
            last_frame: Vec::with_capacity(FRAME_BYTES),
        }
    }

    /// Transfer time of one full frame, page headers included, on an I²C
    /// bus clocked at `bus_hz`.
    pub fn i2c(bus_hz: u32) -> Self {
        let bytes = (FRAME_BYTES + PAGES * PAGE_HEADER_BYTES) as u64;
        let micros = bytes * BITS_PER_BYTE * 1_000_000 / u64::from(bus_hz.max(1));
        Self::new(Duration::from_micros(micros))
    }

    pub fn transfer_time(&self) -> Duration {
        self.transfer_time
    }

    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    /// Copy of the most recently started frame.
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }
}

impl Transport for TimedTransport {
    type Handle = Instant;

    fn begin_transfer(&mut self, frame: &[u8]) -> Instant {
        let now = Instant::now();
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame);
        self.transfers += 1;
        debug!("[TRANSPORT] transfer {} started ({} bytes)", self.transfers, frame.len());
        now
    }

    fn is_complete(&mut self, handle: &Instant) -> bool {
        handle.elapsed() >= self.transfer_time
    }
}
