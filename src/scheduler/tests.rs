use super::*;
use crate::render::ParticleShape;
use crate::simulation::{Layout, SimConfig, SimTick};
use crate::transport::{LoopbackTransport, StalledTransport};

const PERIOD_US: u64 = 33_333;

fn scheduler<T: Transport>(transport: T) -> FrameScheduler<T, 20> {
    let sim = FluidSim::new(SimConfig::default(), Layout::Grid { spacing: 6 });
    FrameScheduler::new(sim, Rasterizer::new(ParticleShape::Pixel), transport)
}

#[test]
fn test_poll_advances_one_state_at_a_time() {
    let mut sched = scheduler(LoopbackTransport::new(1));
    assert_eq!(sched.state(), FrameState::Solving);

    assert_eq!(sched.poll(0), FrameState::Rasterizing);
    assert_eq!(sched.sim().tick(), SimTick(1));
    assert_eq!(sched.stats().frames_presented, 0);

    assert_eq!(sched.poll(0), FrameState::AwaitingTransport);
    assert!(sched.back_frame().count_set() > 0, "Back buffer holds the drawn frame");

    assert_eq!(sched.poll(0), FrameState::Solving, "Nothing in flight yet, hand off immediately");
    assert_eq!(sched.stats().frames_presented, 1);
    assert_eq!(sched.transport().frames().len(), 1);
}

#[test]
fn test_handoff_waits_for_completion() {
    let mut sched = scheduler(LoopbackTransport::manual());
    let interrupt = sched.transport().signal();

    for _ in 0..3 {
        sched.poll(0);
    }
    sched.poll(0);
    sched.poll(0);
    assert_eq!(sched.state(), FrameState::AwaitingTransport);

    for _ in 0..10 {
        assert_eq!(sched.poll(1_000), FrameState::AwaitingTransport);
    }
    assert_eq!(sched.stats().stalled_polls, 10);
    assert_eq!(sched.stats().frames_presented, 1);

    interrupt.notify();
    assert_eq!(sched.poll(2_000), FrameState::Solving);
    assert_eq!(sched.stats().frames_presented, 2);
}

#[test]
fn test_stalled_transport_never_corrupts_in_flight_frame() {
    let mut sched = scheduler(StalledTransport::new());

    for _ in 0..3 {
        sched.poll(0);
    }
    let sent = sched.in_flight_frame().cloned().unwrap();

    for step in 0..500u64 {
        sched.poll(step * 1_000);
    }

    assert_eq!(sched.in_flight_frame(), Some(&sent), "In-flight frame must stay untouched");
    assert_eq!(sched.state(), FrameState::AwaitingTransport);
    assert_eq!(sched.sim().tick(), SimTick(2), "Solver holds once the back buffer is waiting");
    assert_eq!(sched.transport().transfers_started(), 1);
    assert_eq!(sched.stats().stalled_polls, 498);
}

#[test]
fn test_buffers_alternate_between_handoffs() {
    let mut sched = scheduler(LoopbackTransport::new(0));

    for _ in 0..3 {
        sched.poll(0);
    }
    let first = sched.in_flight_frame().map(|frame| frame as *const Framebuffer);
    for _ in 0..3 {
        sched.poll(0);
    }
    let second = sched.in_flight_frame().map(|frame| frame as *const Framebuffer);

    assert!(first.is_some());
    assert_ne!(first, second);
    assert_ne!(second, Some(sched.back_frame() as *const Framebuffer));
}

#[test]
fn test_presented_frames_match_rasterized_particles() {
    let mut sched = scheduler(LoopbackTransport::new(2));

    let mut now = 0;
    while sched.stats().frames_presented < 5 {
        sched.poll(now);
        now += 1_000;
    }

    let mut expected = Framebuffer::new();
    // The fifth hand-off carried the state after the fifth solver step
    let mut replay = FluidSim::<20>::new(SimConfig::default(), Layout::Grid { spacing: 6 });
    for _ in 0..5 {
        replay.step();
    }
    Rasterizer::default().draw(replay.particles(), &mut expected);

    assert_eq!(sched.transport().frames().len(), 5);
    assert_eq!(sched.transport().last_frame(), Some(&expected.as_bytes()[..]));
}

#[test]
fn test_missed_deadline_is_counted_not_fatal() {
    let mut sched = scheduler(LoopbackTransport::new(0));

    for _ in 0..3 {
        sched.poll(0);
    }
    for _ in 0..3 {
        sched.poll(PERIOD_US / 2);
    }
    assert_eq!(sched.stats().missed_deadlines, 0);
    assert_eq!(sched.stats().last_frame_us, PERIOD_US / 2);

    for _ in 0..3 {
        sched.poll(PERIOD_US / 2 + 3 * PERIOD_US);
    }
    assert_eq!(sched.stats().missed_deadlines, 1);
    assert_eq!(sched.stats().frames_presented, 3);
    assert_eq!(sched.state(), FrameState::Solving, "Scheduler keeps running after a miss");
}

#[test]
fn test_sim_mut_changes_following_frames() {
    let mut sched = scheduler(LoopbackTransport::new(0));
    sched.sim_mut().set_gravity(crate::fixed_math::FixedVec2::ZERO);

    assert_eq!(sched.sim().config().gravity, crate::fixed_math::FixedVec2::ZERO);
    assert_eq!(sched.frame_period_us(), PERIOD_US);
}

#[test]
fn test_stalled_transport_reports_missed_deadline_while_waiting() {
    let mut sched = scheduler(StalledTransport::new());

    let mut now = 0;
    for _ in 0..2_000 {
        sched.poll(now);
        now += 1_000;
    }

    assert_eq!(sched.stats().frames_presented, 1);
    assert_eq!(sched.stats().missed_deadlines, 1, "The stuck frame is reported once");
    assert!(sched.stats().stalled_polls > 1_900);
}

#[test]
fn test_late_frame_is_not_counted_twice_after_stall() {
    let mut sched = scheduler(LoopbackTransport::manual());
    let interrupt = sched.transport().signal();

    for _ in 0..3 {
        sched.poll(0);
    }
    sched.poll(0);
    sched.poll(0);

    assert_eq!(sched.poll(PERIOD_US / 2), FrameState::AwaitingTransport);
    assert_eq!(sched.stats().missed_deadlines, 0, "Still within budget");

    assert_eq!(sched.poll(2 * PERIOD_US), FrameState::AwaitingTransport);
    assert_eq!(sched.stats().missed_deadlines, 1);
    sched.poll(3 * PERIOD_US);
    assert_eq!(sched.stats().missed_deadlines, 1);

    interrupt.notify();
    assert_eq!(sched.poll(4 * PERIOD_US), FrameState::Solving);
    assert_eq!(sched.stats().frames_presented, 2);
    assert_eq!(sched.stats().missed_deadlines, 1, "Hand-off of the stalled frame is not counted again");
    assert_eq!(sched.stats().last_frame_us, 4 * PERIOD_US);

    // Next frame is on time again
    for _ in 0..2 {
        sched.poll(4 * PERIOD_US + 1_000);
    }
    interrupt.notify();
    assert_eq!(sched.poll(4 * PERIOD_US + 2_000), FrameState::Solving);
    assert_eq!(sched.stats().missed_deadlines, 1);
}

#[test]
fn test_early_interrupt_does_not_release_next_frame() {
    let mut sched = scheduler(LoopbackTransport::manual());
    let interrupt = sched.transport().signal();

    interrupt.notify();
    for _ in 0..3 {
        sched.poll(0);
    }
    assert_eq!(sched.stats().frames_presented, 1);

    for _ in 0..5 {
        sched.poll(1_000);
    }
    assert_eq!(sched.state(), FrameState::AwaitingTransport);
    assert_eq!(sched.stats().frames_presented, 1, "First frame is still on the bus");
}
