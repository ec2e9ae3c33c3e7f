//! Register definitions for the SX1278 radio in LoRa mode
//! Generated from the SX1276/77/78/79 datasheet (rev. 7)
//!
//! Byte-wide registers without internal structure (FIFO pointers, packet
//! counters, raw RSSI/SNR readings) are addressed through [`Register`].
//! Registers made of bit fields have a typed definition implementing the
//! `regiface` register traits so they can be read and written as a whole.

mod irq;
mod packet;
mod rf;
mod system;

pub use irq::*;
pub use packet::*;
pub use rf::*;
pub use system::*;

/// Bit set in the address byte of an SPI access to select a write
pub const WRITE_FLAG: u8 = 0x80;

/// Mask keeping the 7-bit register address
pub const ADDRESS_MASK: u8 = 0x7F;

/// Capacity of the on-chip data FIFO in bytes
pub const FIFO_CAPACITY: usize = 256;

/// LoRa register address table
///
/// Only the registers available while `LongRangeMode` is set are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Fifo = 0x00,
    OpMode = 0x01,
    FrMsb = 0x06,
    FrMid = 0x07,
    FrLsb = 0x08,
    PaConfig = 0x09,
    PaRamp = 0x0A,
    Ocp = 0x0B,
    Lna = 0x0C,
    FifoAddrPtr = 0x0D,
    FifoTxBaseAddr = 0x0E,
    FifoRxBaseAddr = 0x0F,
    FifoRxCurrentAddr = 0x10,
    IrqFlagsMask = 0x11,
    IrqFlags = 0x12,
    RxNbBytes = 0x13,
    RxHeaderCntValueMsb = 0x14,
    RxHeaderCntValueLsb = 0x15,
    RxPacketCntValueMsb = 0x16,
    RxPacketCntValueLsb = 0x17,
    ModemStat = 0x18,
    PktSnrValue = 0x19,
    PktRssiValue = 0x1A,
    RssiValue = 0x1B,
    HopChannel = 0x1C,
    ModemConfig1 = 0x1D,
    ModemConfig2 = 0x1E,
    SymbTimeoutLsb = 0x1F,
    PreambleMsb = 0x20,
    PreambleLsb = 0x21,
    PayloadLength = 0x22,
    MaxPayloadLength = 0x23,
    HopPeriod = 0x24,
    FifoRxByteAddr = 0x25,
    ModemConfig3 = 0x26,
    PpmCorrection = 0x27,
    FeiMsb = 0x28,
    FeiMid = 0x29,
    FeiLsb = 0x2A,
    RssiWideband = 0x2C,
    DetectOptimize = 0x31,
    InvertIq = 0x33,
    DetectionThreshold = 0x37,
    SyncWord = 0x39,
    Version = 0x42,
}

impl Register {
    /// 7-bit register address
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Address byte starting a read access
    pub fn read_addr(self) -> u8 {
        read_addr(self as u8)
    }

    /// Address byte starting a write access
    pub fn write_addr(self) -> u8 {
        write_addr(self as u8)
    }
}

/// Address byte starting a read access of the register at `addr`
pub fn read_addr(addr: u8) -> u8 {
    addr & ADDRESS_MASK
}

/// Address byte starting a write access of the register at `addr`
pub fn write_addr(addr: u8) -> u8 {
    WRITE_FLAG | (addr & ADDRESS_MASK)
}
