//! FIFO staging and packet transfer
//!
//! The driver keeps an in-core copy of the packet being sent or most
//! recently received. A transmit copies it into the 256 byte on-chip FIFO
//! from address 0; a receive copies the packet the modem stored back out of
//! it once the completion watcher has accepted it.
//!
//! # Transmit sequence
//! 1. Standby
//! 2. Latched interrupt flags cleared
//! 3. RegFifoTxBaseAddr = 0, RegFifoAddrPtr = 0
//! 4. Staged bytes written one at a time into RegFifo
//! 5. RegPayloadLength = staged size
//! 6. Tx, completion watcher installed
//!
//! The staged bytes survive a transmission; [`Sx1278::clear_fifo`] must be
//! called before staging the next packet. At most [`MAX_PAYLOAD`] bytes can
//! be staged, the largest length RegPayloadLength can hold.

use crate::registers::{
    HeaderMode, Irq, IrqFlags, ModemConfig1, OperationMode, Register, FIFO_CAPACITY,
};
use crate::signal::Notify;
use crate::watcher::Watcher;
use crate::{Error, Sx1278};

/// Receive operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxMode {
    /// Keep receiving packets until the mode is changed
    Continuous,
    /// Receive one packet or time out, then return to standby
    Single,
}

impl From<RxMode> for OperationMode {
    fn from(mode: RxMode) -> Self {
        match mode {
            RxMode::Continuous => OperationMode::RxContinuous,
            RxMode::Single => OperationMode::RxSingle,
        }
    }
}

/// Largest payload a single packet can carry
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Packet staging buffer
#[derive(Debug, Clone)]
pub struct Fifo {
    buffer: [u8; FIFO_CAPACITY],
    size: usize,
    expected_size: u8,
}

impl Fifo {
    /// Empty buffer with no expected implicit header length
    pub const fn new() -> Self {
        Self {
            buffer: [0; FIFO_CAPACITY],
            size: 0,
            expected_size: 0,
        }
    }

    /// Staged bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.size]
    }

    /// Number of staged bytes
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Payload length expected by an implicit header receive
    pub fn expected_size(&self) -> u8 {
        self.expected_size
    }

    /// Append `data` to the staged bytes
    ///
    /// # Panics
    /// If the staged size would exceed [`MAX_PAYLOAD`]. The buffer is left
    /// untouched.
    pub fn push(&mut self, data: &[u8]) {
        let size = self.size + data.len();
        assert!(
            size <= MAX_PAYLOAD,
            "FIFO overflow: {} staged + {} bytes exceeds {}",
            self.size,
            data.len(),
            MAX_PAYLOAD
        );
        self.buffer[self.size..size].copy_from_slice(data);
        self.size = size;
    }

    /// Drop the staged bytes
    pub fn clear(&mut self) {
        self.size = 0;
    }

    /// Replace the staged bytes with `len` bytes filled in by `read`
    ///
    /// The staged bytes are kept if `read` fails.
    fn load<E>(&mut self, len: usize, mut read: impl FnMut() -> Result<u8, E>) -> Result<(), E> {
        let mut packet = [0u8; FIFO_CAPACITY];
        for byte in &mut packet[..len] {
            *byte = read()?;
        }
        self.buffer[..len].copy_from_slice(&packet[..len]);
        self.size = len;
        Ok(())
    }
}

impl Default for Fifo {
    fn default() -> Self {
        Self::new()
    }
}

impl<SPI, N> Sx1278<SPI, N> {
    /// Append `data` to the staging buffer
    ///
    /// # Panics
    /// If the staged size would exceed 255 bytes; the buffer is left
    /// unmodified.
    pub fn fill(&mut self, data: &[u8]) {
        self.fifo.push(data);
    }

    /// Record the payload length of the next implicit header receive
    pub fn prepare(&mut self, expected_len: u8) {
        self.fifo.expected_size = expected_len;
    }

    /// Staged bytes: the packet to send, or the last packet received
    pub fn fifo(&self) -> &[u8] {
        self.fifo.as_slice()
    }

    /// Copy the staged bytes into `out`, returning how many were copied
    pub fn read_fifo(&self, out: &mut [u8]) -> usize {
        let staged = self.fifo.as_slice();
        let len = staged.len().min(out.len());
        out[..len].copy_from_slice(&staged[..len]);
        len
    }

    /// Reset the staging buffer to empty
    pub fn clear_fifo(&mut self) {
        self.fifo.clear();
    }
}

impl<SPI, N> Sx1278<SPI, N>
where
    SPI: embedded_hal::spi::SpiDevice,
    N: Notify,
{
    /// Transmit the staged bytes
    ///
    /// Completion is reported through [`Sx1278::poll`] as
    /// [`Outcome::Transmitted`](crate::Outcome::Transmitted). A transmission
    /// never times out.
    ///
    /// # Panics
    /// If the staging buffer is empty.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn start_tx(&mut self) -> Result<(), Error> {
        let size = self.fifo.len();
        assert!(size > 0, "start_tx with an empty FIFO");

        self.switch_mode(OperationMode::Standby)?;
        self.cancel_pending(false);
        self.device.write_register(IrqFlags::clear(Irq::all()))?;
        self.device.write(Register::FifoTxBaseAddr, 0)?;
        self.device.write(Register::FifoAddrPtr, 0)?;
        for &byte in self.fifo.as_slice() {
            self.device.write(Register::Fifo, byte)?;
        }
        self.device.write(Register::PayloadLength, size as u8)?;
        self.switch_mode(OperationMode::Tx)?;

        self.watcher = Some(Watcher::tx());
        debug!("tx started, {} bytes", size);
        Ok(())
    }

    /// Start receiving in `mode` with the given header mode
    ///
    /// ModemConfig1 is rewritten when `header` differs from the current
    /// settings. In implicit header mode the payload length recorded with
    /// [`Sx1278::prepare`] is written to RegPayloadLength.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn start_rx(&mut self, mode: RxMode, header: HeaderMode) -> Result<(), Error> {
        self.switch_mode(OperationMode::Standby)?;
        self.cancel_pending(false);
        self.device.write_register(IrqFlags::clear(Irq::all()))?;
        self.device.write(Register::FifoRxBaseAddr, 0)?;
        self.device.write(Register::FifoAddrPtr, 0)?;

        if self.settings.modem_config1.header_mode != header {
            let modem_config1 = ModemConfig1 {
                header_mode: header,
                ..self.settings.modem_config1
            };
            self.device.write_register(modem_config1)?;
            self.settings.modem_config1 = modem_config1;
        }

        if header == HeaderMode::Implicit {
            if self.fifo.expected_size == 0 {
                warn!("implicit header receive without an expected payload length");
            }
            self.device
                .write(Register::PayloadLength, self.fifo.expected_size)?;
        }

        self.switch_mode(mode.into())?;
        self.watcher = Some(Watcher::rx(mode, header));
        debug!("rx started, {} {}", mode, header);
        Ok(())
    }

    /// Copy the packet just received out of the on-chip FIFO
    ///
    /// The length is RegRxNbBytes in explicit header mode and the prepared
    /// length in implicit header mode.
    pub(crate) fn drain(&mut self, mode: RxMode, header: HeaderMode) -> Result<(), Error> {
        let start = self.device.read(Register::FifoRxCurrentAddr)?;
        let len = match header {
            HeaderMode::Explicit => self.device.read(Register::RxNbBytes)?,
            HeaderMode::Implicit => self.fifo.expected_size,
        };

        self.device.write(Register::FifoAddrPtr, start)?;
        let device = &mut self.device;
        self.fifo
            .load(len as usize, || device.read(Register::Fifo))?;

        if mode == RxMode::Continuous {
            self.device.write(Register::FifoAddrPtr, 0)?;
        }
        trace!("drained {} bytes from {}", len, start);
        Ok(())
    }
}
