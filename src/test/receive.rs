use std::time::Duration;

use super::chip::{Chip, Packet};
use super::{crc_settings, radio, TokioDelay};
use crate::registers::{HeaderMode, OperationMode, Register};
use crate::{CompletionSignal, Error, Outcome, PacketStatus, RxMode, Sx1278, WatcherState};

#[test]
fn round_trip_between_two_radios() {
    let (signal_a, signal_b) = (CompletionSignal::new(), CompletionSignal::new());
    let (mut a, chip_a) = radio(&signal_a, crc_settings());
    let (mut b, chip_b) = radio(&signal_b, crc_settings());

    b.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();
    a.fill(b"round trip");
    a.start_tx().unwrap();
    assert!(chip_a.deliver(&chip_b));

    assert_eq!(a.poll(), Ok(Some(Outcome::Transmitted)));
    assert_eq!(b.poll(), Ok(Some(Outcome::Received)));
    assert_eq!(b.fifo(), b"round trip");
    assert_eq!(signal_a.take(), 1);
    assert_eq!(signal_b.take(), 1);
}

#[test]
fn mismatched_sync_word_is_not_heard() {
    let signal = CompletionSignal::new();
    let (mut a, chip_a) = radio(&signal, crc_settings());
    let mut private = crc_settings();
    private.sync_word.value = 0x12;
    let (mut b, chip_b) = radio(&signal, private);

    b.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();
    a.fill(b"lost");
    a.start_tx().unwrap();
    assert!(!chip_a.deliver(&chip_b));
    assert_eq!(b.poll(), Ok(None));
}

#[test]
fn start_rx_programs_fifo_and_mode() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    chip.state_mut().writes.clear();

    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();
    assert_eq!(
        chip.state().writes,
        [
            (Register::OpMode as u8, 0x81),
            (Register::IrqFlags as u8, 0xFF),
            (Register::FifoRxBaseAddr as u8, 0),
            (Register::FifoAddrPtr as u8, 0),
            (Register::OpMode as u8, 0x85),
        ]
    );
    assert_eq!(chip.mode(), OperationMode::RxContinuous);
}

#[test]
fn single_receive_terminates_after_one_packet() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();

    assert_eq!(radio.poll(), Ok(None));
    chip.receive(Packet::new(b"one"));
    assert_eq!(radio.poll(), Ok(Some(Outcome::Received)));
    assert!(radio.watcher().is_none());
    assert_eq!(radio.fifo(), b"one");

    // the modem is back in standby; a late flag is not reported
    chip.state_mut().regs[Register::IrqFlags as usize] = 0x40;
    assert_eq!(radio.poll(), Err(Error::Idle));
    assert_eq!(signal.take(), 1);
}

#[test]
fn single_receive_timeout_empties_the_buffer() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.fill(b"stale");
    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();

    chip.timeout();
    assert_eq!(radio.poll(), Ok(Some(Outcome::Timeout)));
    assert!(radio.fifo().is_empty());
    assert!(radio.watcher().is_none());
    assert_eq!(chip.state().reg(Register::IrqFlags), 0);
    assert_eq!(signal.take(), 1);
    assert_eq!(radio.poll(), Err(Error::Idle));
}

#[test]
fn continuous_receive_survives_several_packets() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();

    let payloads: [&[u8]; 3] = [b"first", b"second", b"third packet"];
    for payload in payloads {
        chip.receive(Packet::new(payload));
        assert_eq!(radio.poll(), Ok(Some(Outcome::Received)));
        assert_eq!(radio.fifo(), payload);
        assert_eq!(
            radio.watcher().map(|w| w.state()),
            Some(WatcherState::Polling)
        );
        // pointer returned to the origin for the next packet
        assert_eq!(chip.state().reg(Register::FifoAddrPtr), 0);
        assert_eq!(chip.state().reg(Register::IrqFlags), 0);
    }
    assert_eq!(signal.take(), 3);
    assert_eq!(chip.mode(), OperationMode::RxContinuous);
}

#[test]
fn packet_status_from_raw_readings() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();

    chip.receive(Packet {
        rssi: 0,
        snr: 0xF8,
        ..Packet::new(b"weak")
    });
    radio.poll().unwrap();
    assert_eq!(radio.packet_status(), PacketStatus { rssi: -164, snr: -2 });

    chip.receive(Packet {
        rssi: 0x50,
        snr: 0x28,
        ..Packet::new(b"strong")
    });
    radio.poll().unwrap();
    assert_eq!(radio.packet_status(), PacketStatus { rssi: -79, snr: 10 });
}

#[test]
fn crc_failure_is_reported_and_keeps_the_buffer() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.fill(b"previous");
    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();

    chip.receive(Packet {
        crc_error: true,
        rssi: 0x10,
        ..Packet::new(b"corrupted")
    });
    assert_eq!(radio.poll(), Ok(Some(Outcome::CrcError)));
    assert_eq!(radio.fifo(), b"previous");
    assert_eq!(radio.packet_status(), PacketStatus::default());
    assert_eq!(chip.state().reg(Register::IrqFlags), 0);
    assert!(radio.watcher().is_none());
}

#[test]
fn crc_error_flag_ignored_when_header_announces_no_crc() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();

    chip.receive(Packet {
        crc_on: false,
        crc_error: true,
        ..Packet::new(b"no crc")
    });
    assert_eq!(radio.poll(), Ok(Some(Outcome::Received)));
    assert_eq!(radio.fifo(), b"no crc");
}

#[test]
fn invalid_header_is_rejected() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();

    chip.receive(Packet {
        valid_header: false,
        ..Packet::new(b"garbage")
    });
    assert_eq!(radio.poll(), Ok(Some(Outcome::InvalidHeader)));
    assert!(radio.fifo().is_empty());
    // a continuous receive keeps listening after a rejected packet
    assert!(radio.watcher().is_some());
    assert_eq!(chip.state().reg(Register::IrqFlags), 0);
}

#[test]
fn implicit_header_receive_uses_the_prepared_length() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.prepare(4);
    radio.start_rx(RxMode::Single, HeaderMode::Implicit).unwrap();

    assert_eq!(radio.settings().modem_config1.header_mode, HeaderMode::Implicit);
    assert_eq!(chip.state().reg(Register::ModemConfig1), 0x73);
    assert_eq!(chip.state().reg(Register::PayloadLength), 4);

    // no header in implicit mode, RxNbBytes is not consulted
    chip.receive(Packet {
        valid_header: false,
        ..Packet::new(b"abcdef")
    });
    chip.state_mut().regs[Register::RxNbBytes as usize] = 0;
    assert_eq!(radio.poll(), Ok(Some(Outcome::Received)));
    assert_eq!(radio.fifo(), b"abcd");
}

#[test]
fn implicit_header_crc_follows_modem_config2() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.prepare(3);
    radio.start_rx(RxMode::Continuous, HeaderMode::Implicit).unwrap();

    chip.receive(Packet {
        crc_on: false,
        crc_error: true,
        ..Packet::new(b"bad")
    });
    assert_eq!(radio.poll(), Ok(Some(Outcome::CrcError)));

    // back to explicit header rewrites ModemConfig1
    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();
    assert_eq!(chip.state().reg(Register::ModemConfig1), 0x72);
    assert_eq!(radio.settings().modem_config1.header_mode, HeaderMode::Explicit);
}

#[test]
fn leaving_continuous_receive_cancels_the_watcher() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Continuous, HeaderMode::Explicit).unwrap();

    radio.switch_mode(OperationMode::Standby).unwrap();
    assert!(radio.watcher().is_none());
    assert_eq!(radio.last_outcome(), Some(Outcome::Cancelled));
    assert_eq!(signal.take(), 1);
    assert_eq!(chip.mode(), OperationMode::Standby);
    assert_eq!(radio.poll(), Err(Error::Idle));
}

#[test]
fn starting_a_new_operation_replaces_the_pending_one() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();

    radio.fill(b"reply");
    radio.start_tx().unwrap();
    assert_eq!(radio.watcher().map(|w| w.watch()), Some(crate::Watch::Tx));
    assert_eq!(signal.pending(), 0);

    chip.complete_tx();
    assert_eq!(radio.poll(), Ok(Some(Outcome::Transmitted)));
}

#[test]
fn packet_left_by_a_replaced_receive_is_not_reported() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());
    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();
    chip.receive(Packet::new(b"unread"));

    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();
    assert_eq!(chip.state().reg(Register::IrqFlags), 0);
    assert_eq!(radio.poll(), Ok(None));
    assert!(radio.fifo().is_empty());

    chip.receive(Packet::new(b"fresh"));
    assert_eq!(radio.poll(), Ok(Some(Outcome::Received)));
    assert_eq!(radio.fifo(), b"fresh");
    assert_eq!(signal.take(), 1);
}

#[test]
fn switch_mode_is_idempotent() {
    let signal = CompletionSignal::new();
    let (mut radio, chip) = radio(&signal, crc_settings());

    radio.switch_mode(OperationMode::Standby).unwrap();
    let once = chip.state().regs;
    radio.switch_mode(OperationMode::Standby).unwrap();
    assert_eq!(chip.state().regs, once);
    assert_eq!(radio.mode(), Ok(OperationMode::Standby));
    assert_eq!(chip.state().writes_to(Register::OpMode).last(), Some(&0x81));
}

#[tokio::test(start_paused = true)]
async fn continuous_receive_is_reported_within_one_poll_interval() {
    let signal = CompletionSignal::new();
    let (mut receiver, rx_chip) = radio(&signal, crc_settings());
    let (mut sender, tx_chip) = radio(&signal, crc_settings());
    assert_eq!(receiver.settings().sync_word.value, 0x24);

    receiver
        .start_rx(RxMode::Continuous, HeaderMode::Explicit)
        .unwrap();
    sender.fill(b"sx1278");
    sender.start_tx().unwrap();

    let start = tokio::time::Instant::now();
    let (outcome, delivered_at) = tokio::join!(
        async {
            let outcome = receiver.wait_for_completion(&mut TokioDelay).await;
            (outcome, start.elapsed())
        },
        async {
            tokio::time::sleep(Duration::from_millis(1_234)).await;
            assert!(tx_chip.deliver(&rx_chip));
            start.elapsed()
        }
    );

    let (outcome, received_at) = outcome;
    assert_eq!(outcome, Ok(Outcome::Received));
    assert_eq!(receiver.fifo(), b"sx1278");
    assert!(received_at >= delivered_at);
    assert!(received_at - delivered_at <= Duration::from_millis(receiver.poll_interval_ms() as u64));
    // still listening
    assert!(receiver.watcher().is_some());
}

#[test]
fn notifier_is_optional() {
    let chip = Chip::new();
    let mut radio = Sx1278::new(chip.clone(), ());
    radio.apply(crc_settings()).unwrap();
    radio.start_rx(RxMode::Single, HeaderMode::Explicit).unwrap();
    chip.receive(Packet::new(b"quiet"));
    assert_eq!(radio.poll(), Ok(Some(Outcome::Received)));
}
