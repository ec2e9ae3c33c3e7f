//! System-related registers
//!
//! This module contains the registers selecting the modem family and the
//! operating mode of the transceiver, and the silicon revision register.
//!
//! The SX1278 can only change `LongRangeMode` while it is asleep, so any
//! transition into LoRa operation starts with a sleep write.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Operating mode of the transceiver (RegOpMode bits 2:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperationMode {
    /// Lowest power mode, only SPI and configuration registers accessible
    Sleep = 0,
    /// Crystal oscillator running, configuration allowed
    Standby = 1,
    /// Frequency synthesis for transmission
    FsTx = 2,
    /// Transmit the payload loaded in the FIFO, then return to standby
    Tx = 3,
    /// Frequency synthesis for reception
    FsRx = 4,
    /// Receive packets until the mode is changed
    RxContinuous = 5,
    /// Receive a single packet or time out, then return to standby
    RxSingle = 6,
    /// Channel activity detection
    Cad = 7,
}

impl OperationMode {
    /// Mask of the mode bits inside RegOpMode
    pub const MASK: u8 = 0b0000_0111;

    /// Decode the mode bits of a RegOpMode value
    pub fn from_bits(bits: u8) -> Self {
        match bits & Self::MASK {
            0 => Self::Sleep,
            1 => Self::Standby,
            2 => Self::FsTx,
            3 => Self::Tx,
            4 => Self::FsRx,
            5 => Self::RxContinuous,
            6 => Self::RxSingle,
            _ => Self::Cad,
        }
    }

    /// Whether the mode is one of the two receive modes
    pub fn is_rx(self) -> bool {
        matches!(self, Self::RxContinuous | Self::RxSingle)
    }
}

/// Operating mode register (address: 0x01)
///
/// # Bit layout
/// - bit 7: LongRangeMode (0 = FSK/OOK, 1 = LoRa)
/// - bit 6: AccessSharedReg
/// - bit 3: LowFrequencyModeOn
/// - bits 2:0: Mode
///
/// # Important Notes
/// - `long_range` can only be modified in sleep mode
/// - This driver always writes `long_range = true`
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OpMode {
    /// LoRa modem selected
    pub long_range: bool,
    /// FSK registers mapped in the 0x0D:0x3F range while in LoRa mode
    pub access_shared_reg: bool,
    /// Low frequency (band 2/3) register bank selected
    pub low_frequency: bool,
    /// Current transceiver mode
    pub mode: OperationMode,
}

impl OpMode {
    /// Value written for a LoRa mode transition
    pub fn lora(mode: OperationMode) -> Self {
        Self {
            long_range: true,
            access_shared_reg: false,
            low_frequency: false,
            mode,
        }
    }

    /// Raw register byte
    pub fn bits(self) -> u8 {
        (self.long_range as u8) << 7
            | (self.access_shared_reg as u8) << 6
            | (self.low_frequency as u8) << 3
            | self.mode as u8
    }

    /// Decode a raw register byte
    pub fn from_bits(bits: u8) -> Self {
        Self {
            long_range: bits & 0x80 != 0,
            access_shared_reg: bits & 0x40 != 0,
            low_frequency: bits & 0x08 != 0,
            mode: OperationMode::from_bits(bits),
        }
    }
}

/// Silicon revision register (address: 0x42)
///
/// Reads 0x12 on SX1276/77/78/79 parts: full revision 1, metal mask 2.
#[register(0x42u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    /// Full revision number (bits 7:4)
    pub full_revision: u8,
    /// Metal mask revision number (bits 3:0)
    pub metal_mask: u8,
}

impl Version {
    /// Revision reported by production SX1278 silicon
    pub const SX1278: Self = Self {
        full_revision: 1,
        metal_mask: 2,
    };
}

impl FromByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits(bytes[0]))
    }
}

impl ToByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            full_revision: bytes[0] >> 4,
            metal_mask: bytes[0] & 0x0F,
        })
    }
}
