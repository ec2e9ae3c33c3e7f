//! SX1278 device handle
//!
//! [`Sx1278`] owns the register transport together with everything the
//! driver remembers about the radio: the FIFO staging buffer, the status of
//! the last received packet, the last applied [`Settings`] and the pending
//! [`Watcher`], if any.
//!
//! The operations are spread over the modules of this crate:
//! - [`mode`](crate::mode): operating mode transitions
//! - [`fifo`](crate::fifo): staging buffer, transmit and receive start
//! - [`watcher`](crate::watcher): completion detection
//! - [`config`](crate::config): configuration and packet status derivation
//!
//! # Poll loop
//! A started operation completes when [`Sx1278::poll`] observes the
//! corresponding interrupt flag. [`Sx1278::wait_for_completion`] calls it on
//! a fixed interval until the pending watcher reports an [`Outcome`]; every
//! outcome is also signalled through the [`Notify`] implementation given at
//! creation.

use embedded_hal::digital::OutputPin;

use crate::config::Settings;
use crate::device::Device;
use crate::fifo::Fifo;
use crate::reset::reset;
use crate::signal::Notify;
use crate::watcher::{Outcome, Watcher};
use crate::Error;

/// Default period of the completion poll loop, in ms
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 100;

/// Signal quality of the last packet received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketStatus {
    /// Packet RSSI in dBm
    pub rssi: i16,
    /// Packet SNR in dB
    pub snr: i8,
}

/// Handle to a single SX1278 transceiver
///
/// `N` receives a notification for every completed operation; use `()` to
/// rely on [`Sx1278::wait_for_completion`] alone, or a shared
/// [`CompletionSignal`](crate::CompletionSignal) to wake another task.
pub struct Sx1278<SPI, N = ()> {
    pub(crate) device: Device<SPI>,
    pub(crate) notifier: N,
    pub(crate) fifo: Fifo,
    pub(crate) packet_status: PacketStatus,
    pub(crate) settings: Settings,
    pub(crate) watcher: Option<Watcher>,
    pub(crate) last_outcome: Option<Outcome>,
    pub(crate) poll_interval_ms: u32,
}

impl<SPI, N> Sx1278<SPI, N> {
    /// Wrap an SPI device without touching the radio
    ///
    /// The stored settings are the power-on defaults of this driver; call
    /// [`Sx1278::apply`] before the first operation to bring the hardware in
    /// line with them.
    pub fn new(spi: SPI, notifier: N) -> Self {
        Self {
            device: Device::new(spi),
            notifier,
            fifo: Fifo::new(),
            packet_status: PacketStatus::default(),
            settings: Settings::default(),
            watcher: None,
            last_outcome: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Pulse the reset line, then wrap the SPI device
    ///
    /// # Errors
    /// * `Error::Pin` - the reset line could not be driven
    pub fn create<P, D>(spi: SPI, notifier: N, nreset: &mut P, delay: &mut D) -> Result<Self, Error>
    where
        P: OutputPin,
        D: embedded_hal::delay::DelayNs,
    {
        reset(nreset, delay)?;
        Ok(Self::new(spi, notifier))
    }

    /// Set the period of the completion poll loop
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Release the SPI device, dropping any pending operation
    pub fn release(self) -> SPI {
        self.device.release()
    }

    /// Register transport
    pub fn device(&mut self) -> &mut Device<SPI> {
        &mut self.device
    }

    /// Last applied configuration
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Signal quality of the last packet accepted
    pub fn packet_status(&self) -> PacketStatus {
        self.packet_status
    }

    /// Outcome of the last completion notified
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Pending operation, if any
    pub fn watcher(&self) -> Option<&Watcher> {
        self.watcher.as_ref()
    }

    /// Delay between two polls of a pending operation, in ms
    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms
    }
}

impl<SPI, N> Sx1278<SPI, N>
where
    N: Notify,
{
    /// Report a completion to the owner of the notifier
    pub(crate) fn complete(&mut self, outcome: Outcome) {
        self.last_outcome = Some(outcome);
        self.notifier.notify();
    }

    /// Drop the pending watcher
    ///
    /// With `notify` set, a caller waiting on the notifier is woken with
    /// [`Outcome::Cancelled`]. Nothing is notified when no watcher is
    /// pending.
    pub(crate) fn cancel_pending(&mut self, notify: bool) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.cancel();
            debug!("cancelled pending {}", watcher.watch());
            if notify {
                self.complete(Outcome::Cancelled);
            }
        }
    }
}

impl<SPI, N> Sx1278<SPI, N>
where
    SPI: embedded_hal::spi::SpiDevice,
    N: Notify,
{
    /// Step the pending watcher once
    ///
    /// Returns the outcome when the step completed an operation. A watcher
    /// that terminated is dropped; a continuous receive watcher stays
    /// installed. The watcher survives a bus error and can be polled again.
    ///
    /// # Errors
    /// * `Error::Idle` - no operation is pending
    /// * `Error::Bus` - SPI communication failed
    pub fn poll(&mut self) -> Result<Option<Outcome>, Error> {
        let Some(mut watcher) = self.watcher.take() else {
            return Err(Error::Idle);
        };

        let watch = watcher.watch();
        let outcome = match watcher.step(self) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.watcher = Some(watcher);
                return Err(error);
            }
        };

        if !watcher.is_terminated() {
            self.watcher = Some(watcher);
        }

        if let Some(outcome) = outcome {
            debug!("{} completed: {}", watch, outcome);
            self.complete(outcome);
        }

        Ok(outcome)
    }

    /// Poll the pending watcher every poll interval until it reports an outcome
    ///
    /// A continuous receive stays pending after a packet; call again for the
    /// next one.
    ///
    /// # Errors
    /// * `Error::Idle` - no operation is pending
    /// * `Error::Bus` - SPI communication failed
    pub async fn wait_for_completion<D>(&mut self, delay: &mut D) -> Result<Outcome, Error>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        loop {
            if let Some(outcome) = self.poll()? {
                return Ok(outcome);
            }
            delay.delay_ms(self.poll_interval_ms).await;
        }
    }

    /// Blocking variant of [`Sx1278::wait_for_completion`]
    pub fn wait_for_completion_blocking<D>(&mut self, delay: &mut D) -> Result<Outcome, Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        loop {
            if let Some(outcome) = self.poll()? {
                return Ok(outcome);
            }
            delay.delay_ms(self.poll_interval_ms);
        }
    }
}
