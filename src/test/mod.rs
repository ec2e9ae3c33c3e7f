//! Scenario tests against a simulated chip

mod receive;

use core::time::Duration;
use std::cell::Cell;

use crate::{CompletionSignal, Settings, Sx1278};
use chip::Chip;

/// Async delay backed by the tokio clock
pub struct TokioDelay;

impl embedded_hal_async::delay::DelayNs for TokioDelay {
    async fn delay_ns(&mut self, ns: u32) {
        tokio::time::sleep(Duration::from_nanos(ns as u64)).await;
    }
}

/// Blocking delay running `hook` instead of sleeping
pub struct HookDelay<F: FnMut()>(pub F);

impl<F: FnMut()> embedded_hal::delay::DelayNs for HookDelay<F> {
    fn delay_ns(&mut self, _ns: u32) {
        (self.0)()
    }
}

/// Reset line recording every level driven
#[derive(Default)]
pub struct Pin {
    pub levels: Vec<bool>,
}

impl embedded_hal::digital::ErrorType for Pin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// Radio configured with `settings` on a fresh simulated chip
pub fn radio<'a>(
    signal: &'a CompletionSignal,
    settings: Settings,
) -> (Sx1278<Chip, &'a CompletionSignal>, Chip) {
    let chip = Chip::new();
    let mut radio = Sx1278::new(chip.clone(), signal);
    radio.apply(settings).unwrap();
    (radio, chip)
}

/// Settings shared by every scenario: sync word 0x24, payload CRC on
pub fn crc_settings() -> Settings {
    let mut settings = Settings::default();
    settings.modem_config2.rx_payload_crc_on = true;
    settings
}

#[test]
fn create_pulses_reset_before_touching_the_bus() {
    let chip = Chip::new();
    let mut pin = Pin::default();
    let delays = Cell::new(0);
    let radio = Sx1278::create(
        chip.clone(),
        (),
        &mut pin,
        &mut HookDelay(|| delays.set(delays.get() + 1)),
    )
    .unwrap();

    assert_eq!(pin.levels, [true, false, true]);
    assert_eq!(delays.get(), 3);
    assert_eq!(chip.state().transactions, 0);
    assert_eq!(radio.poll_interval_ms(), 100);
}

#[test]
fn release_returns_the_bus() {
    let chip = Chip::new();
    let radio = Sx1278::new(chip.clone(), ()).with_poll_interval_ms(10);
    assert_eq!(radio.poll_interval_ms(), 10);

    let mut spi = radio.release();
    let mut version = [0u8];
    embedded_hal::spi::SpiDevice::transaction(
        &mut spi,
        &mut [
            embedded_hal::spi::Operation::Write(&[0x42]),
            embedded_hal::spi::Operation::Read(&mut version),
        ],
    )
    .unwrap();
    assert_eq!(version, [0x12]);
}
