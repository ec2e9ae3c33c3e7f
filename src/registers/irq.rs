//! Interrupt registers
//!
//! The SX1278 latches every LoRa event in RegIrqFlags. A flag stays set until
//! it is cleared by writing a 1 to its bit position; writing 0 leaves it
//! untouched. The completion watcher polls this register rather than waiting
//! on a DIO line.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// LoRa interrupt sources
    ///
    /// Bit positions are shared by RegIrqFlags (0x12) and RegIrqFlagsMask (0x11).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Irq: u8 {
        /// No packet received before the RxSingle symbol timeout
        const RX_TIMEOUT = 1 << 7;
        /// Packet reception complete
        const RX_DONE = 1 << 6;
        /// Payload CRC check failed
        const PAYLOAD_CRC_ERROR = 1 << 5;
        /// Valid header received in explicit header mode
        const VALID_HEADER = 1 << 4;
        /// Packet transmission complete
        const TX_DONE = 1 << 3;
        /// Channel activity detection finished
        const CAD_DONE = 1 << 2;
        /// Frequency hopping channel change requested
        const FHSS_CHANGE_CHANNEL = 1 << 1;
        /// Activity detected during CAD
        const CAD_DETECTED = 1;
    }
}

impl Irq {
    /// Flags consumed by a completed reception, cleared whatever the outcome
    pub const RX_COMPLETE: Self = Self::RX_DONE
        .union(Self::VALID_HEADER)
        .union(Self::PAYLOAD_CRC_ERROR);
}

/// Interrupt flags register (address: 0x12)
///
/// Reading returns the latched flags. Writing clears every flag whose bit
/// is set in the written value.
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct IrqFlags {
    /// Latched flags on read, flags to clear on write
    pub irq: Irq,
}

impl IrqFlags {
    /// Register value clearing exactly `irq`
    pub fn clear(irq: Irq) -> Self {
        Self { irq }
    }
}

impl FromByteArray for IrqFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            irq: Irq::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for IrqFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.irq.bits()])
    }
}
