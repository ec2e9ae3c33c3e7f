//! Hardware reset sequencing
//!
//! The NRESET pin of the SX1278 is active low. A manual reset drives the pin
//! low for at least 100 us and then waits 5 ms before the chip accepts SPI
//! accesses again.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::Error;

/// Time the reset line is held at each level before the pulse, in ms
pub const RESET_PULSE_MS: u32 = 1;

/// Time the chip needs after reset before it can be configured, in ms
pub const RESET_SETTLE_MS: u32 = 5;

/// Pulse the reset line: high, low for 1 ms, then high and wait 5 ms
pub fn reset<P, D>(nreset: &mut P, delay: &mut D) -> Result<(), Error>
where
    P: OutputPin,
    D: DelayNs,
{
    nreset.set_high().map_err(|_| Error::Pin)?;
    delay.delay_ms(RESET_PULSE_MS);
    nreset.set_low().map_err(|_| Error::Pin)?;
    delay.delay_ms(RESET_PULSE_MS);
    nreset.set_high().map_err(|_| Error::Pin)?;
    delay.delay_ms(RESET_SETTLE_MS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        High,
        Low,
        DelayMs(u32),
    }

    #[derive(Default)]
    struct Recorder(Vec<Event>);

    impl embedded_hal::digital::ErrorType for Recorder {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for Recorder {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.push(Event::Low);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.push(Event::High);
            Ok(())
        }
    }

    struct RecordingDelay<'a>(&'a RefCell<Vec<Event>>);

    impl DelayNs for RecordingDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().push(Event::DelayMs(ns / 1_000_000));
        }
    }

    #[test]
    fn pulse_goes_high_low_high_with_hold_times() {
        let mut pin = Recorder::default();
        let delays = RefCell::new(Vec::new());
        reset(&mut pin, &mut RecordingDelay(&delays)).unwrap();

        assert_eq!(pin.0, [Event::High, Event::Low, Event::High]);
        assert_eq!(
            delays.into_inner(),
            [Event::DelayMs(1), Event::DelayMs(1), Event::DelayMs(5)]
        );
    }
}
