//! Operating mode transitions
//!
//! Every mode write keeps `LongRangeMode` set, so the modem cannot be
//! switched to FSK/OOK through this interface.

use crate::registers::{OpMode, OperationMode};
use crate::signal::Notify;
use crate::{Error, Sx1278};

impl<SPI, N> Sx1278<SPI, N>
where
    SPI: embedded_hal::spi::SpiDevice,
    N: Notify,
{
    /// Switch the transceiver to `target`
    ///
    /// Leaving continuous receive stops its watcher and wakes the waiting
    /// caller with [`Outcome::Cancelled`](crate::Outcome::Cancelled).
    /// Switching to the current mode rewrites the same value.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn switch_mode(&mut self, target: OperationMode) -> Result<(), Error> {
        let current = self.device.read_register::<OpMode>()?;
        if current.mode == OperationMode::RxContinuous {
            self.cancel_pending(true);
        }

        self.device.write_register(OpMode::lora(target))?;
        trace!("mode {} -> {}", current.mode, target);
        Ok(())
    }

    /// Current operating mode reported by the hardware
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn mode(&mut self) -> Result<OperationMode, Error> {
        Ok(self.device.read_register::<OpMode>()?.mode)
    }
}
