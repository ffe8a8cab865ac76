use std::time::Duration;

use super::*;

#[test]
fn test_signal_is_edge_triggered() {
    let signal = TransferSignal::new();
    assert!(!signal.take());

    signal.notify();
    signal.notify();
    assert!(signal.is_raised());
    assert!(signal.take(), "First poll sees the edge");
    assert!(!signal.take(), "Edge is consumed by the first poll");
    assert!(!signal.is_raised());
}

#[test]
fn test_signal_can_live_in_a_static() {
    static DMA_DONE: TransferSignal = TransferSignal::new();

    DMA_DONE.notify();
    assert!(DMA_DONE.take());
}

#[test]
fn test_loopback_completes_after_latency() {
    let mut transport = LoopbackTransport::new(3);
    let handle = transport.begin_transfer(&[1, 2, 3]);

    assert!(!transport.is_complete(&handle));
    assert!(!transport.is_complete(&handle));
    assert!(transport.is_complete(&handle));
    assert!(transport.is_complete(&handle), "Completion is sticky for a handle");
    assert!(!transport.is_busy());
    assert_eq!(transport.frames(), &[vec![1, 2, 3]]);
}

#[test]
fn test_loopback_zero_latency_completes_on_first_poll() {
    let mut transport = LoopbackTransport::new(0);
    let handle = transport.begin_transfer(&[0xFF]);

    assert!(transport.is_complete(&handle));
}

#[test]
fn test_loopback_new_transfer_is_not_complete_from_old_edge() {
    let mut transport = LoopbackTransport::new(1);
    let first = transport.begin_transfer(&[1]);
    assert!(transport.is_complete(&first));

    let second = transport.begin_transfer(&[2]);
    assert_ne!(first, second);
    assert!(transport.is_busy());
    assert!(transport.is_complete(&second));
    assert_eq!(transport.last_frame(), Some(&[2u8][..]));
}

#[test]
fn test_manual_loopback_waits_for_interrupt() {
    let mut transport = LoopbackTransport::manual();
    let interrupt = transport.signal();
    let handle = transport.begin_transfer(&[7; 16]);

    for _ in 0..100 {
        assert!(!transport.is_complete(&handle));
    }

    interrupt.notify();
    assert!(transport.is_complete(&handle));
}

#[test]
fn test_manual_loopback_ignores_edge_raised_before_transfer() {
    let mut transport = LoopbackTransport::manual();
    let interrupt = transport.signal();

    interrupt.notify();
    let handle = transport.begin_transfer(&[1]);
    assert!(!transport.is_complete(&handle), "Edge from before the transfer started");
    assert!(transport.is_busy());

    interrupt.notify();
    assert!(transport.is_complete(&handle));
}

#[test]
fn test_manual_loopback_edge_while_idle_does_not_leak_into_next_transfer() {
    let mut transport = LoopbackTransport::manual();
    let interrupt = transport.signal();

    let first = transport.begin_transfer(&[1]);
    interrupt.notify();
    assert!(transport.is_complete(&first));

    // Spurious second edge with nothing in flight
    interrupt.notify();
    let second = transport.begin_transfer(&[2]);
    assert!(!transport.is_complete(&second));
}

#[test]
fn test_stalled_transport_never_completes() {
    let mut transport = StalledTransport::new();
    let handle = transport.begin_transfer(&[0; 4]);

    for _ in 0..1000 {
        assert!(!transport.is_complete(&handle));
    }
    assert_eq!(transport.transfers_started(), 1);
    assert_eq!(transport.polls(), 1000);
}

#[test]
fn test_timed_transport_completes_after_transfer_time() {
    let mut transport = TimedTransport::new(Duration::from_millis(20));
    let handle = transport.begin_transfer(&[0xAA; 8]);

    assert!(!transport.is_complete(&handle));
    std::thread::sleep(Duration::from_millis(25));
    assert!(transport.is_complete(&handle));
    assert_eq!(transport.last_frame(), &[0xAA; 8]);
    assert_eq!(transport.transfers(), 1);
}

#[test]
fn test_i2c_timing_at_400khz() {
    let transport = TimedTransport::i2c(400_000);
    // 1080 bytes × 9 clocks at 400 kHz
    assert_eq!(transport.transfer_time(), Duration::from_micros(24_300));
}

#[test]
fn test_display_init_selects_horizontal_addressing() {
    let mut panel = RecordingDisplay::new();
    assert!(!panel.is_initialized());

    assert!(panel.init().is_ok());

    assert!(panel.is_initialized());
    assert_eq!(panel.writes().len(), SSD1306_INIT_COMMANDS.len());
    assert!(panel.writes().iter().all(|write| write[0] == display::COMMAND_CONTROL_BYTE));
    assert!(panel.writes().contains(&vec![0x00, 0x20, 0x00]));
    assert_eq!(panel.writes().last(), Some(&vec![0x00, 0xAF]));
}
