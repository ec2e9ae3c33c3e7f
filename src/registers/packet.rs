//! Packet handling related registers
//!
//! This module contains registers for configuring the LoRa modem and packet
//! format including:
//! - Bandwidth, coding rate and header mode (ModemConfig1)
//! - Spreading factor and payload CRC (ModemConfig2)
//! - Low data rate optimisation and AGC (ModemConfig3)
//! - Sync word
//! - IQ polarity
//! - CRC presence reported by a received explicit header
//!
//! These registers must match between transmitter and receiver for a packet
//! to be demodulated.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Error type for modem configuration bytes holding a reserved field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidModemConfig(pub u8);

/// LoRa signal bandwidth (ModemConfig1 bits 7:4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Bandwidth {
    Bw7_8kHz = 0,
    Bw10_4kHz = 1,
    Bw15_6kHz = 2,
    Bw20_8kHz = 3,
    Bw31_25kHz = 4,
    Bw41_7kHz = 5,
    Bw62_5kHz = 6,
    Bw125kHz = 7,
    Bw250kHz = 8,
    Bw500kHz = 9,
}

impl Bandwidth {
    /// Bandwidth in Hz
    pub fn hz(self) -> u32 {
        match self {
            Self::Bw7_8kHz => 7_800,
            Self::Bw10_4kHz => 10_400,
            Self::Bw15_6kHz => 15_600,
            Self::Bw20_8kHz => 20_800,
            Self::Bw31_25kHz => 31_250,
            Self::Bw41_7kHz => 41_700,
            Self::Bw62_5kHz => 62_500,
            Self::Bw125kHz => 125_000,
            Self::Bw250kHz => 250_000,
            Self::Bw500kHz => 500_000,
        }
    }
}

impl TryFrom<u8> for Bandwidth {
    type Error = InvalidModemConfig;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Bw7_8kHz,
            1 => Self::Bw10_4kHz,
            2 => Self::Bw15_6kHz,
            3 => Self::Bw20_8kHz,
            4 => Self::Bw31_25kHz,
            5 => Self::Bw41_7kHz,
            6 => Self::Bw62_5kHz,
            7 => Self::Bw125kHz,
            8 => Self::Bw250kHz,
            9 => Self::Bw500kHz,
            invalid => return Err(InvalidModemConfig(invalid)),
        })
    }
}

/// Error coding rate (ModemConfig1 bits 3:1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CodingRate {
    Cr4_5 = 1,
    Cr4_6 = 2,
    Cr4_7 = 3,
    Cr4_8 = 4,
}

impl CodingRate {
    /// Denominator of the 4/x coding rate
    pub fn denominator(self) -> u32 {
        self as u32 + 4
    }
}

impl TryFrom<u8> for CodingRate {
    type Error = InvalidModemConfig;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Cr4_5,
            2 => Self::Cr4_6,
            3 => Self::Cr4_7,
            4 => Self::Cr4_8,
            invalid => return Err(InvalidModemConfig(invalid)),
        })
    }
}

/// Spreading factor in chips per symbol as a power of two (ModemConfig2 bits 7:4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SpreadingFactor {
    /// 64 chips/symbol, implicit header only
    Sf6 = 6,
    Sf7 = 7,
    Sf8 = 8,
    Sf9 = 9,
    Sf10 = 10,
    Sf11 = 11,
    Sf12 = 12,
}

impl SpreadingFactor {
    /// Exponent of the chips per symbol
    pub fn value(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u8> for SpreadingFactor {
    type Error = InvalidModemConfig;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            6 => Self::Sf6,
            7 => Self::Sf7,
            8 => Self::Sf8,
            9 => Self::Sf9,
            10 => Self::Sf10,
            11 => Self::Sf11,
            12 => Self::Sf12,
            invalid => return Err(InvalidModemConfig(invalid)),
        })
    }
}

/// LoRa header mode (ModemConfig1 bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderMode {
    /// Length, coding rate and CRC presence are sent in a header
    Explicit,
    /// No header; both sides agree on length and CRC out of band
    Implicit,
}

/// Modem configuration register 1 (address: 0x1D)
///
/// # Bit layout
/// - bits 7:4: Bw
/// - bits 3:1: CodingRate
/// - bit 0: ImplicitHeaderModeOn
///
/// # Important Notes
/// - Bandwidths of 250 kHz and 500 kHz are not supported in the
///   lower band (169 MHz)
#[register(0x1Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemConfig1 {
    /// Signal bandwidth
    pub bandwidth: Bandwidth,
    /// Error coding rate
    pub coding_rate: CodingRate,
    /// Header mode
    pub header_mode: HeaderMode,
}

impl ModemConfig1 {
    /// Raw register byte
    pub fn bits(self) -> u8 {
        (self.bandwidth as u8) << 4
            | (self.coding_rate as u8) << 1
            | matches!(self.header_mode, HeaderMode::Implicit) as u8
    }

    /// Decode a raw register byte
    pub fn from_bits(bits: u8) -> Result<Self, InvalidModemConfig> {
        Ok(Self {
            bandwidth: Bandwidth::try_from(bits >> 4).map_err(|_| InvalidModemConfig(bits))?,
            coding_rate: CodingRate::try_from((bits >> 1) & 0x07)
                .map_err(|_| InvalidModemConfig(bits))?,
            header_mode: if bits & 0x01 != 0 {
                HeaderMode::Implicit
            } else {
                HeaderMode::Explicit
            },
        })
    }
}

impl Default for ModemConfig1 {
    fn default() -> Self {
        // 0x72: 125 kHz, 4/5, explicit header
        Self {
            bandwidth: Bandwidth::Bw125kHz,
            coding_rate: CodingRate::Cr4_5,
            header_mode: HeaderMode::Explicit,
        }
    }
}

/// Modem configuration register 2 (address: 0x1E)
///
/// # Bit layout
/// - bits 7:4: SpreadingFactor
/// - bit 3: TxContinuousMode
/// - bit 2: RxPayloadCrcOn
/// - bits 1:0: SymbTimeout(9:8)
///
/// # Important Notes
/// - In implicit header mode CRC must be enabled on both sides
/// - In explicit header mode only the transmitter setting matters; the
///   receiver learns CRC presence from the header (see [`HopChannel`])
#[register(0x1Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemConfig2 {
    /// Spreading factor
    pub spreading_factor: SpreadingFactor,
    /// Send the FIFO content repeatedly (test mode)
    pub tx_continuous: bool,
    /// Generate (tx) or expect (rx, implicit header) a payload CRC
    pub rx_payload_crc_on: bool,
    /// Two most significant bits of the RxSingle symbol timeout
    pub symb_timeout_msb: u8,
}

impl ModemConfig2 {
    /// Raw register byte
    pub fn bits(self) -> u8 {
        (self.spreading_factor as u8) << 4
            | (self.tx_continuous as u8) << 3
            | (self.rx_payload_crc_on as u8) << 2
            | (self.symb_timeout_msb & 0x03)
    }

    /// Decode a raw register byte
    pub fn from_bits(bits: u8) -> Result<Self, InvalidModemConfig> {
        Ok(Self {
            spreading_factor: SpreadingFactor::try_from(bits >> 4)
                .map_err(|_| InvalidModemConfig(bits))?,
            tx_continuous: bits & 0x08 != 0,
            rx_payload_crc_on: bits & 0x04 != 0,
            symb_timeout_msb: bits & 0x03,
        })
    }
}

impl Default for ModemConfig2 {
    fn default() -> Self {
        // 0x70: SF7, CRC off
        Self {
            spreading_factor: SpreadingFactor::Sf7,
            tx_continuous: false,
            rx_payload_crc_on: false,
            symb_timeout_msb: 0,
        }
    }
}

/// Modem configuration register 3 (address: 0x26)
///
/// # Bit layout
/// - bits 7:4: unused
/// - bit 3: LowDataRateOptimize
/// - bit 2: AgcAutoOn
///
/// # Important Notes
/// - LowDataRateOptimize is mandated when the symbol duration exceeds 16 ms
#[register(0x26u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemConfig3 {
    /// Low data rate optimisation
    pub low_data_rate_optimize: bool,
    /// LNA gain set by the internal AGC loop
    pub agc_auto_on: bool,
}

impl ModemConfig3 {
    /// Raw register byte
    pub fn bits(self) -> u8 {
        (self.low_data_rate_optimize as u8) << 3 | (self.agc_auto_on as u8) << 2
    }
}

/// LoRa sync word register (address: 0x39)
///
/// # Standard Values
/// - LoRaWAN public network: 0x34
/// - Private network: 0x12
///
/// # Note
/// Sync word must match between all devices in the same network.
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncWord {
    /// Sync word value
    pub value: u8,
}

impl Default for SyncWord {
    fn default() -> Self {
        Self { value: 0x24 }
    }
}

/// IQ polarity register (address: 0x33)
///
/// # Bit layout
/// - bit 6: InvertIQ on the receive path
/// - bits 5:1: reserved, 0x13
/// - bit 0: InvertIQ on the transmit path (1 = normal)
///
/// Normal polarity reads 0x27, inverted polarity 0x66.
#[register(0x33u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvertIq {
    /// I and Q signals inverted
    pub inverted: bool,
}

impl InvertIq {
    const NORMAL: u8 = 0x27;
    const INVERTED: u8 = 0x66;

    /// Raw register byte
    pub fn bits(self) -> u8 {
        if self.inverted {
            Self::INVERTED
        } else {
            Self::NORMAL
        }
    }
}

/// FHSS channel register (address: 0x1C)
///
/// Besides the current hop channel, reports whether the last explicit
/// header announced a payload CRC.
#[register(0x1Cu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HopChannel {
    /// PLL failed to lock while attempting a TX/RX/CAD operation
    pub pll_timeout: bool,
    /// CRC information extracted from the received packet header
    pub crc_on_payload: bool,
    /// Current frequency hopping channel
    pub fhss_channel: u8,
}

impl FromByteArray for ModemConfig1 {
    type Error = InvalidModemConfig;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Self::from_bits(bytes[0])
    }
}

impl ToByteArray for ModemConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

impl FromByteArray for ModemConfig2 {
    type Error = InvalidModemConfig;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Self::from_bits(bytes[0])
    }
}

impl ToByteArray for ModemConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

impl FromByteArray for ModemConfig3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            low_data_rate_optimize: bytes[0] & 0x08 != 0,
            agc_auto_on: bytes[0] & 0x04 != 0,
        })
    }
}

impl ToByteArray for ModemConfig3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

impl FromByteArray for SyncWord {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for SyncWord {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for InvertIq {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            inverted: bytes[0] & 0x40 != 0,
        })
    }
}

impl ToByteArray for InvertIq {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

impl FromByteArray for HopChannel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pll_timeout: bytes[0] & 0x80 != 0,
            crc_on_payload: bytes[0] & 0x40 != 0,
            fhss_channel: bytes[0] & 0x3F,
        })
    }
}
