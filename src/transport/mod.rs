//! Transport layer - moving finished frames to the panel.
//!
//! The frame scheduler only ever talks to a [`Transport`]: it hands over a
//! completed buffer and later polls for completion. On hardware the
//! completion comes from a DMA interrupt that sets a [`TransferSignal`]; the
//! host implementations here fake that edge so the scheduler can be driven
//! and tested without a bus.
//!
//! This module is organized into:
//! - **display**: SSD1306 controller setup commands
//! - **mock**: Poll-counted and never-completing transports for tests
//! - **host**: Wall-clock transport modelling an I²C bus

use std::sync::atomic::{AtomicBool, Ordering};

pub mod display;
pub mod host;
pub mod mock;

#[cfg(test)]
mod tests;

pub use display::{DisplayController, RecordingDisplay, SSD1306_INIT_COMMANDS};
pub use host::TimedTransport;
pub use mock::{LoopbackTransport, StalledTransport, TransferId};

// ============================================================================
// Traits
// ============================================================================

/// Asynchronous, non-blocking frame transfer.
///
/// `begin_transfer` must return without waiting for the bus. Once
/// `is_complete` has returned `true` for a handle the transport must not
/// read that frame again; the caller is then free to draw into it.
pub trait Transport {
    type Handle;

    fn begin_transfer(&mut self, frame: &[u8]) -> Self::Handle;

    fn is_complete(&mut self, handle: &Self::Handle) -> bool;
}

// ============================================================================
// Completion Signal
// ============================================================================

/// Edge-triggered completion flag shared between an interrupt and the
/// cooperative loop.
///
/// The interrupt side calls [`notify`](Self::notify); the polling side calls
/// [`take`](Self::take), which reports the edge once and re-arms the flag.
/// `const`-constructible so it can live in a `static`.
#[derive(Debug, Default)]
pub struct TransferSignal {
    raised: AtomicBool,
}

impl TransferSignal {
    pub const fn new() -> Self {
        Self { raised: AtomicBool::new(false) }
    }

    pub fn notify(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Consume a pending edge. Returns `true` at most once per `notify`.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}
