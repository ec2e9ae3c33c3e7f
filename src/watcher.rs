//! Completion detection
//!
//! The SX1278 latches transmit and receive events in RegIrqFlags. A
//! [`Watcher`] is installed by every transmit or receive start and inspects
//! those flags each time it is stepped, reporting at most one [`Outcome`]
//! per step. The flags it consumed are cleared before the outcome is
//! reported.
//!
//! # States
//! ```text
//!            TxDone / RxDone (single, accepted)
//! Polling ------------------------------------> Done
//!    |  \    RxDone (single, rejected)
//!    |   `------------------------------------> Failed
//!    |       RxTimeout
//!    `----------------------------------------> TimedOut
//! ```
//! A continuous receive reports every packet and stays in `Polling`. A
//! watcher dropped before it terminated ends in `Idle`.

use crate::config::{rssi_dbm, snr_db};
use crate::fifo::RxMode;
use crate::registers::{HeaderMode, HopChannel, Irq, IrqFlags, ModemConfig2, Register};
use crate::signal::Notify;
use crate::{Error, Sx1278};

/// Operation a watcher waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Watch {
    Tx,
    Rx { mode: RxMode, header: HeaderMode },
}

/// Watcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatcherState {
    /// Stopped before the operation completed
    Idle,
    /// Waiting for the hardware
    Polling,
    /// Operation completed successfully
    Done,
    /// Single receive timed out
    TimedOut,
    /// Single receive completed with a rejected packet
    Failed,
}

/// Result of a completed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Packet sent
    Transmitted,
    /// Packet received and copied to the staging buffer
    Received,
    /// Packet received with a failed payload CRC; staging buffer untouched
    CrcError,
    /// Packet received without a valid header; staging buffer untouched
    InvalidHeader,
    /// No packet before the single receive timeout; staging buffer emptied
    Timeout,
    /// Continuous receive stopped by a mode change
    Cancelled,
}

impl Outcome {
    /// State of a watcher terminated by this outcome
    pub fn terminal_state(self) -> WatcherState {
        match self {
            Outcome::Transmitted | Outcome::Received => WatcherState::Done,
            Outcome::CrcError | Outcome::InvalidHeader => WatcherState::Failed,
            Outcome::Timeout => WatcherState::TimedOut,
            Outcome::Cancelled => WatcherState::Idle,
        }
    }

    /// Whether the staging buffer holds a new packet
    pub fn is_received(self) -> bool {
        self == Outcome::Received
    }
}

/// Pending transmit or receive operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watcher {
    watch: Watch,
    state: WatcherState,
}

impl Watcher {
    pub(crate) fn tx() -> Self {
        Self {
            watch: Watch::Tx,
            state: WatcherState::Polling,
        }
    }

    pub(crate) fn rx(mode: RxMode, header: HeaderMode) -> Self {
        Self {
            watch: Watch::Rx { mode, header },
            state: WatcherState::Polling,
        }
    }

    pub fn watch(&self) -> Watch {
        self.watch
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Whether the watcher left the polling state
    pub fn is_terminated(&self) -> bool {
        self.state != WatcherState::Polling
    }

    pub(crate) fn cancel(&mut self) {
        if self.state == WatcherState::Polling {
            self.state = WatcherState::Idle;
        }
    }

    /// Inspect the interrupt flags once
    ///
    /// Returns the outcome of the operation if it completed during this step.
    /// A terminated watcher reports nothing.
    pub(crate) fn step<SPI, N>(&mut self, radio: &mut Sx1278<SPI, N>) -> Result<Option<Outcome>, Error>
    where
        SPI: embedded_hal::spi::SpiDevice,
        N: Notify,
    {
        if self.is_terminated() {
            return Ok(None);
        }

        let flags = radio.device.read_register::<IrqFlags>()?.irq;
        let outcome = match self.watch {
            Watch::Tx => step_tx(radio, flags)?,
            Watch::Rx { mode, header } => step_rx(radio, flags, mode, header)?,
        };

        if let Some(outcome) = outcome {
            let continuous = matches!(
                self.watch,
                Watch::Rx {
                    mode: RxMode::Continuous,
                    ..
                }
            );
            if !continuous || outcome == Outcome::Timeout {
                self.state = outcome.terminal_state();
            }
        }
        Ok(outcome)
    }
}

fn step_tx<SPI, N>(radio: &mut Sx1278<SPI, N>, flags: Irq) -> Result<Option<Outcome>, Error>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    if !flags.contains(Irq::TX_DONE) {
        return Ok(None);
    }
    radio.device.write_register(IrqFlags::clear(Irq::TX_DONE))?;
    Ok(Some(Outcome::Transmitted))
}

fn step_rx<SPI, N>(
    radio: &mut Sx1278<SPI, N>,
    flags: Irq,
    mode: RxMode,
    header: HeaderMode,
) -> Result<Option<Outcome>, Error>
where
    SPI: embedded_hal::spi::SpiDevice,
    N: Notify,
{
    if flags.contains(Irq::RX_DONE) {
        // explicit: the header announces the CRC; implicit: the receiver setting decides
        let crc_required = match header {
            HeaderMode::Explicit => radio.device.read_register::<HopChannel>()?.crc_on_payload,
            HeaderMode::Implicit => radio.device.read_register::<ModemConfig2>()?.rx_payload_crc_on,
        };
        let header_valid = header == HeaderMode::Implicit || flags.contains(Irq::VALID_HEADER);
        let crc_failed = crc_required && flags.contains(Irq::PAYLOAD_CRC_ERROR);

        let outcome = if !header_valid {
            Outcome::InvalidHeader
        } else if crc_failed {
            Outcome::CrcError
        } else {
            radio.drain(mode, header)?;
            let rssi = radio.device.read(Register::PktRssiValue)?;
            let snr = radio.device.read(Register::PktSnrValue)?;
            radio.packet_status.rssi = rssi_dbm(rssi, radio.settings.frequency);
            radio.packet_status.snr = snr_db(snr);
            Outcome::Received
        };

        radio.device.write_register(IrqFlags::clear(Irq::RX_COMPLETE))?;
        if outcome != Outcome::Received {
            warn!("packet rejected: {}", outcome);
        }
        return Ok(Some(outcome));
    }

    if flags.contains(Irq::RX_TIMEOUT) {
        radio.fifo.clear();
        radio.device.write_register(IrqFlags::clear(Irq::RX_TIMEOUT))?;
        return Ok(Some(Outcome::Timeout));
    }

    Ok(None)
}
