//! In-memory transports for driving the scheduler deterministically.

use std::sync::Arc;

use super::{TransferSignal, Transport};

/// Monotonic transfer number handed back by the mock transports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferId(pub u32);

/// Records every frame it is given and completes them in order.
///
/// With a latency the "bus" finishes a transfer after that many
/// `is_complete` polls and raises the shared [`TransferSignal`] itself.
/// Without one, completion only happens when something else calls
/// `notify` on the signal, which lets tests play the interrupt. An edge
/// raised while no transfer is in flight is dropped when the next transfer
/// starts.
///
/// Every frame is kept in memory, so the transport grows by one frame per
/// transfer. It is meant for tests and short runs.
#[derive(Debug)]
pub struct LoopbackTransport {
    signal: Arc<TransferSignal>,
    latency_polls: Option<u32>,
    remaining_polls: u32,
    next_id: u32,
    completed_through: Option<u32>,
    in_flight: Option<u32>,
    frames: Vec<Vec<u8>>,
}

impl LoopbackTransport {
    /// Completes each transfer on the `latency_polls`-th poll after it
    /// started. A latency of 0 completes on the first poll.
    pub fn new(latency_polls: u32) -> Self {
        Self::build(Some(latency_polls))
    }

    /// Completes only when the signal returned by [`signal`](Self::signal)
    /// is notified.
    pub fn manual() -> Self {
        Self::build(None)
    }

    fn build(latency_polls: Option<u32>) -> Self {
        Self {
            signal: Arc::new(TransferSignal::new()),
            latency_polls,
            remaining_polls: 0,
            next_id: 0,
            completed_through: None,
            in_flight: None,
            frames: Vec::new(),
        }
    }

    pub fn signal(&self) -> Arc<TransferSignal> {
        Arc::clone(&self.signal)
    }

    /// Every frame handed over so far, oldest first. Never trimmed.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Advance the simulated bus by one poll, raising the signal when the
    /// in-flight transfer finishes.
    fn clock_bus(&mut self) {
        if self.in_flight.is_none() || self.latency_polls.is_none() {
            return;
        }
        if self.remaining_polls == 0 {
            self.signal.notify();
        } else {
            self.remaining_polls -= 1;
            if self.remaining_polls == 0 {
                self.signal.notify();
            }
        }
    }
}

impl Transport for LoopbackTransport {
    type Handle = TransferId;

    fn begin_transfer(&mut self, frame: &[u8]) -> TransferId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        // A stale edge must not complete the new transfer
        self.signal.take();
        self.frames.push(frame.to_vec());
        self.in_flight = Some(id);
        self.remaining_polls = self.latency_polls.unwrap_or(0);

        TransferId(id)
    }

    fn is_complete(&mut self, handle: &TransferId) -> bool {
        self.clock_bus();

        if self.signal.take() {
            if let Some(id) = self.in_flight.take() {
                self.completed_through = Some(id);
            }
        }

        self.completed_through.is_some_and(|done| handle.0 <= done)
    }
}

/// A bus that accepts transfers and never finishes any of them.
#[derive(Debug, Default)]
pub struct StalledTransport {
    started: u32,
    polls: u64,
}

impl StalledTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers_started(&self) -> u32 {
        self.started
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl Transport for StalledTransport {
    type Handle = TransferId;

    fn begin_transfer(&mut self, _frame: &[u8]) -> TransferId {
        self.started += 1;
        TransferId(self.started - 1)
    }

    fn is_complete(&mut self, _handle: &TransferId) -> bool {
        self.polls += 1;
        false
    }
}
