//! RF-related registers
//!
//! This module contains registers related to RF configuration including:
//! - Carrier frequency
//! - Power amplifier selection and output power

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Crystal oscillator frequency in Hz
pub const FXOSC: u64 = 32_000_000;

/// Carrier frequencies above this limit use the high-frequency (band 1) RSSI offset
pub const RF_MID_BAND_THRESHOLD: u32 = 525_000_000;

/// RF carrier frequency in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frequency(u32);

impl Frequency {
    /// 434.175 MHz channel, Frf 0x6C8B35
    pub const MHZ_434_175: Self = Self::from_frf(0x6C_8B_35);
    /// 434.375 MHz channel, Frf 0x6C9800
    pub const MHZ_434_375: Self = Self::from_frf(0x6C_98_00);
    /// 434.575 MHz channel, Frf 0x6CA4CD
    pub const MHZ_434_575: Self = Self::from_frf(0x6C_A4_CD);

    /// Frequency from a value in Hz
    pub const fn from_hz(hz: u32) -> Self {
        Self(hz)
    }

    /// Frequency in Hz
    pub const fn hz(self) -> u32 {
        self.0
    }

    /// 24-bit synthesizer word: `Frf = f * 2^19 / FXOSC`, rounded to the nearest step
    pub const fn to_frf(self) -> u32 {
        ((((self.0 as u64) << 19) + FXOSC / 2) / FXOSC) as u32 & 0x00FF_FFFF
    }

    /// Frequency from a 24-bit synthesizer word, rounded to the nearest Hz
    pub const fn from_frf(frf: u32) -> Self {
        Self((((frf & 0x00FF_FFFF) as u64 * FXOSC + (1 << 18)) >> 19) as u32)
    }

    /// Whether the frequency sits in the high-frequency band (above 525 MHz)
    pub fn is_high_band(self) -> bool {
        self.0 > RF_MID_BAND_THRESHOLD
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::MHZ_434_375
    }
}

/// Carrier frequency register (address: 0x06, 3 bytes)
///
/// RegFrfMsb, RegFrfMid and RegFrfLsb written as a single burst, most
/// significant byte first.
///
/// # Important Notes
/// - A frequency change is only taken into account once the LSB is written
/// - Resolution is 61.035 Hz
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Frf {
    /// 24-bit synthesizer word
    pub value: u32,
}

impl From<Frequency> for Frf {
    fn from(frequency: Frequency) -> Self {
        Self {
            value: frequency.to_frf(),
        }
    }
}

impl From<Frf> for Frequency {
    fn from(frf: Frf) -> Self {
        Frequency::from_frf(frf.value)
    }
}

/// Power amplifier configuration register (address: 0x09)
///
/// # Bit layout
/// - bit 7: PaSelect (0 = RFO pin, 1 = PA_BOOST pin)
/// - bits 6:4: MaxPower, Pmax = 10.8 + 0.6 * MaxPower dBm
/// - bits 3:0: OutputPower
///
/// # Output power
/// - RFO: Pout = Pmax - (15 - OutputPower)
/// - PA_BOOST: Pout = 17 - (15 - OutputPower)
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaConfig {
    /// Route output through the PA_BOOST pin
    pub pa_boost: bool,
    /// Maximum power selection for the RFO pin (0-7)
    pub max_power: u8,
    /// Output power setting (0-15)
    pub output_power: u8,
}

impl PaConfig {
    /// Raw register byte
    pub fn bits(self) -> u8 {
        (self.pa_boost as u8) << 7 | (self.max_power & 0x07) << 4 | (self.output_power & 0x0F)
    }

    /// Decode a raw register byte
    pub fn from_bits(bits: u8) -> Self {
        Self {
            pa_boost: bits & 0x80 != 0,
            max_power: (bits >> 4) & 0x07,
            output_power: bits & 0x0F,
        }
    }
}

impl Default for PaConfig {
    fn default() -> Self {
        Self::from_bits(0x8F)
    }
}

impl FromByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        })
    }
}

impl ToByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [_, msb, mid, lsb] = self.value.to_be_bytes();
        Ok([msb, mid, lsb])
    }
}

impl FromByteArray for PaConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits(bytes[0]))
    }
}

impl ToByteArray for PaConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frf_matches_datasheet_steps() {
        // 434 MHz / 61.03515625 Hz
        assert_eq!(Frequency::from_hz(434_000_000).to_frf(), 0x6C_80_00);
        assert_eq!(Frequency::from_hz(868_000_000).to_frf(), 0xD9_00_00);
        assert_eq!(Frequency::from_frf(0x6C_80_00).hz(), 434_000_000);
    }

    #[test]
    fn channel_constants_keep_their_synthesizer_words() {
        assert_eq!(Frequency::MHZ_434_175.hz(), 434_175_110);
        assert_eq!(Frequency::MHZ_434_375.hz(), 434_375_000);
        assert_eq!(Frequency::MHZ_434_575.hz(), 434_575_012);
        assert_eq!(Frequency::MHZ_434_175.to_frf(), 0x6C_8B_35);
        assert_eq!(Frequency::MHZ_434_375.to_frf(), 0x6C_98_00);
        assert_eq!(Frequency::MHZ_434_575.to_frf(), 0x6C_A4_CD);
        assert_eq!(
            Frf::from(Frequency::default()).to_bytes().unwrap(),
            [0x6C, 0x98, 0x00]
        );
    }

    #[test]
    fn frf_register_is_big_endian() {
        let frf = Frf::from(Frequency::from_hz(434_000_000));
        assert_eq!(frf.to_bytes().unwrap(), [0x6C, 0x80, 0x00]);
        assert_eq!(Frf::from_bytes([0x6C, 0x80, 0x00]).unwrap(), frf);
    }

    #[test]
    fn band_threshold() {
        assert!(!Frequency::MHZ_434_175.is_high_band());
        assert!(!Frequency::from_hz(RF_MID_BAND_THRESHOLD).is_high_band());
        assert!(Frequency::from_hz(868_000_000).is_high_band());
    }

    #[test]
    fn pa_config_fields() {
        let pa = PaConfig::default();
        assert!(pa.pa_boost);
        assert_eq!(pa.max_power, 0);
        assert_eq!(pa.output_power, 15);
        assert_eq!(PaConfig::from_bits(0x4A).bits(), 0x4A);
    }
}
