//! Frame scheduler - cooperative solve / rasterize / present loop.
//!
//! The scheduler owns the fluid, both framebuffers and the transport. Each
//! call to [`FrameScheduler::poll`] does at most one unit of work and
//! returns, so it can sit in a superloop next to other tasks:
//!
//! ```text
//!   Solving ──step──▶ Rasterizing ──draw back──▶ AwaitingTransport
//!      ▲                                              │
//!      └───── previous transfer complete: hand off ◀──┘
//! ```
//!
//! Buffer ownership alternates. The back buffer belongs to the rasterizer;
//! the other one belongs to the transport from hand-off until it reports
//! completion. A finished back buffer is only handed over once the previous
//! transfer has completed, so the rasterizer can never draw into a frame
//! that is still on the bus.

use tracing::{debug, info, warn};

use crate::profile_log;
use crate::render::{Framebuffer, Rasterizer};
use crate::simulation::FluidSim;
use crate::transport::Transport;

#[cfg(test)]
mod tests;

/// Where the scheduler is in the frame cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Next poll runs one solver step.
    #[default]
    Solving,
    /// Next poll draws the particles into the back buffer.
    Rasterizing,
    /// Back buffer is complete; waiting for the transport to release the
    /// previous frame before handing this one over.
    AwaitingTransport,
}

/// Counters observed by the host. Nothing here affects scheduling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames_presented: u64,
    /// Frames whose hand-off came, or is still pending, more than one frame
    /// period after the previous hand-off. Each late frame counts once.
    pub missed_deadlines: u64,
    /// Polls spent waiting on a transfer that had not completed.
    pub stalled_polls: u64,
    /// Interval between the last two hand-offs, in microseconds.
    pub last_frame_us: u64,
}

struct InFlight<H> {
    buffer: usize,
    handle: H,
}

pub struct FrameScheduler<T: Transport, const N: usize> {
    sim: FluidSim<N>,
    rasterizer: Rasterizer,
    transport: T,
    buffers: [Framebuffer; 2],
    back: usize,
    in_flight: Option<InFlight<T::Handle>>,
    state: FrameState,
    stats: FrameStats,
    last_handoff_us: Option<u64>,
    /// The pending frame has already been counted as missed while stalled.
    overdue_reported: bool,
    frame_period_us: u64,
}

impl<T: Transport, const N: usize> FrameScheduler<T, N> {
    pub fn new(sim: FluidSim<N>, rasterizer: Rasterizer, transport: T) -> Self {
        let frame_period_us = sim.config().frame_period_us;
        info!(
            "[FRAME] Scheduler ready: {} particles, frame period {} us",
            N, frame_period_us
        );
        Self {
            sim,
            rasterizer,
            transport,
            buffers: [Framebuffer::new(), Framebuffer::new()],
            back: 0,
            in_flight: None,
            state: FrameState::Solving,
            stats: FrameStats::default(),
            last_handoff_us: None,
            overdue_reported: false,
            frame_period_us,
        }
    }

    /// Do the next unit of work and return the state the scheduler is now in.
    ///
    /// `now_us` is a monotonic timestamp used only for deadline accounting.
    pub fn poll(&mut self, now_us: u64) -> FrameState {
        self.state = match self.state {
            FrameState::Solving => {
                self.sim.step();
                FrameState::Rasterizing
            }
            FrameState::Rasterizing => {
                debug_assert!(
                    self.in_flight.as_ref().map_or(true, |flight| flight.buffer != self.back),
                    "back buffer is still owned by the transport"
                );
                self.rasterizer.draw(self.sim.particles(), &mut self.buffers[self.back]);
                FrameState::AwaitingTransport
            }
            FrameState::AwaitingTransport => {
                if self.previous_transfer_done() {
                    self.hand_off(now_us);
                    FrameState::Solving
                } else {
                    self.stats.stalled_polls += 1;
                    self.report_overdue(now_us);
                    FrameState::AwaitingTransport
                }
            }
        };
        self.state
    }

    fn previous_transfer_done(&mut self) -> bool {
        match &self.in_flight {
            Some(flight) => self.transport.is_complete(&flight.handle),
            None => true,
        }
    }

    /// Count a stalled frame as missed as soon as its period has run out,
    /// without waiting for the transport to recover.
    fn report_overdue(&mut self, now_us: u64) {
        if self.overdue_reported {
            return;
        }
        let Some(previous) = self.last_handoff_us else {
            return;
        };
        let waited = now_us.saturating_sub(previous);
        if waited > self.frame_period_us {
            self.overdue_reported = true;
            self.stats.missed_deadlines += 1;
            warn!(
                "[DEADLINE] Frame {} stalled on the transport for {} us (budget {} us)",
                self.stats.frames_presented + 1,
                waited,
                self.frame_period_us
            );
        }
    }

    fn hand_off(&mut self, now_us: u64) {
        let handle = self.transport.begin_transfer(self.buffers[self.back].as_bytes());
        self.in_flight = Some(InFlight { buffer: self.back, handle });
        self.back ^= 1;
        self.stats.frames_presented += 1;

        if let Some(previous) = self.last_handoff_us {
            let interval = now_us.saturating_sub(previous);
            self.stats.last_frame_us = interval;
            if interval > self.frame_period_us && !self.overdue_reported {
                self.stats.missed_deadlines += 1;
                warn!(
                    "[DEADLINE] Frame {} took {} us (budget {} us)",
                    self.stats.frames_presented, interval, self.frame_period_us
                );
            }
        }
        self.last_handoff_us = Some(now_us);
        self.overdue_reported = false;

        debug!("[FRAME] Presented frame {} at {} us", self.stats.frames_presented, now_us);
        profile_log!(
            self.sim.tick(),
            "[FRAME] tick {} | presented {} | missed {} | stalled polls {}",
            self.sim.tick().0,
            self.stats.frames_presented,
            self.stats.missed_deadlines,
            self.stats.stalled_polls
        );
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn sim(&self) -> &FluidSim<N> {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut FluidSim<N> {
        &mut self.sim
    }

    /// The frame currently owned by the transport, if any.
    pub fn in_flight_frame(&self) -> Option<&Framebuffer> {
        self.in_flight.as_ref().map(|flight| &self.buffers[flight.buffer])
    }

    /// The frame the rasterizer draws into next.
    pub fn back_frame(&self) -> &Framebuffer {
        &self.buffers[self.back]
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn frame_period_us(&self) -> u64 {
        self.frame_period_us
    }
}
