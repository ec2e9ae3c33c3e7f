//! SX1278 Register Transport
//!
//! This module provides the low-level interface for accessing the SX1278
//! register file through SPI communication.
//!
//! Every access is a single SPI transaction: an address byte, whose MSB
//! selects a write (1) or a read (0), followed by one or more data bytes.
//! Consecutive data bytes address consecutive registers, except for RegFifo
//! (0x00) where they stream through the FIFO at RegFifoAddrPtr.
//!
//! The interface is built around the `Device<SPI>` struct which provides:
//! - Single byte and burst access by register address
//! - Typed access to registers defined with `regiface`
//!
//! # Example
//! ```ignore
//! use sx1278::{Device, ModemConfig1, Register};
//!
//! // Create device with SPI interface
//! let spi = // ... SPI implementation
//! let mut device = Device::new(spi);
//!
//! // Read a register
//! let config: ModemConfig1 = device.read_register()?;
//!
//! // Write a raw register
//! device.write(Register::SyncWord, 0x24)?;
//! ```

use core::convert::Infallible;

use regiface::{
    errors::Error as RegifaceError, ByteArray, FromByteArray, ReadableRegister, ToByteArray,
    WritableRegister,
};

use crate::registers::{read_addr, write_addr, Register};

/// Register transport for the SX1278.
///
/// This struct wraps an SPI interface implementing the blocking
/// embedded-hal `SpiDevice` trait; chip select is handled by the SPI device.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI interface.
    ///
    /// # Arguments
    /// * `spi` - An SPI interface implementing the required embedded-hal traits
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    ///
    /// This method consumes the Device instance and returns the wrapped SPI interface.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Reads a single register.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn read(&mut self, register: Register) -> Result<u8, RegifaceError> {
        let mut value = [0u8];
        self.read_burst(register, &mut value)?;
        Ok(value[0])
    }

    /// Writes a single register.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write(&mut self, register: Register, value: u8) -> Result<(), RegifaceError> {
        self.write_burst(register, &[value])
    }

    /// Reads `bytes.len()` consecutive registers starting at `register`.
    ///
    /// When `register` is [`Register::Fifo`] the bytes are read from the FIFO
    /// data buffer, starting at RegFifoAddrPtr.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn read_burst(&mut self, register: Register, bytes: &mut [u8]) -> Result<(), RegifaceError> {
        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(&[register.read_addr()]),
                embedded_hal::spi::Operation::Read(bytes),
            ])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Writes `bytes` to consecutive registers starting at `register`.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_burst(&mut self, register: Register, bytes: &[u8]) -> Result<(), RegifaceError> {
        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(&[register.write_addr()]),
                embedded_hal::spi::Operation::Write(bytes),
            ])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Reads a register value from the device.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    /// * `RegifaceError::DeserializationError` - Register holds a reserved value
    pub fn read_register<R>(&mut self) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(&[read_addr(R::id())]),
                embedded_hal::spi::Operation::Read(raw_value.as_mut()),
            ])
            .map_err(|_| RegifaceError::BusError)?;

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Writes a value to a device register.
    ///
    /// Multi-byte registers are written as a single burst, most significant
    /// register first.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing WritableRegister with u8 ID
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), RegifaceError>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw_value) => raw_value,
            Err(never) => match never {},
        };

        self.spi
            .transaction(&mut [
                embedded_hal::spi::Operation::Write(&[write_addr(R::id())]),
                embedded_hal::spi::Operation::Write(raw_value.as_ref()),
            ])
            .map_err(|_| RegifaceError::BusError)
    }
}
