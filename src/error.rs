use regiface::errors::Error as RegifaceError;

/// Error using the SX1278
///
/// Caller bugs (FIFO overflow, transmitting an empty FIFO) are not reported
/// here: they panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI transaction failed
    Bus,
    /// A register held a reserved field value
    Deserialization,
    /// Unable to drive the reset pin
    Pin,
    /// No transmit or receive operation is pending
    Idle,
}

impl From<RegifaceError> for Error {
    fn from(error: RegifaceError) -> Self {
        match error {
            RegifaceError::BusError => Error::Bus,
            _ => Error::Deserialization,
        }
    }
}
