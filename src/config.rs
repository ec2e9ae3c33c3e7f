//! Radio configuration
//!
//! [`Settings`] gathers every parameter this driver programs into the
//! modem. The copy kept by [`Sx1278`] mirrors the hardware: each operation
//! changing one of these registers updates it.
//!
//! # Configuration sequence
//! [`Sx1278::apply`] writes the whole set from sleep mode:
//! 1. Sleep, LoRa modem selected
//! 2. Carrier frequency (RegFrMsb, RegFrMid, RegFrLsb in one burst)
//! 3. PaConfig
//! 4. ModemConfig1, ModemConfig2, ModemConfig3 (low data rate optimisation
//!    derived from the symbol duration, AGC on)
//! 5. SyncWord, InvertIq
//! 6. Preamble length
//!
//! The single-parameter setters go through standby and restore the mode the
//! radio was in, so they can be used while receiving.

use regiface::errors::Error as RegifaceError;

use crate::device::Device;
use crate::registers::{
    Frequency, Frf, HeaderMode, InvertIq, ModemConfig1, ModemConfig2, ModemConfig3, OpMode,
    OperationMode, PaConfig, Register, SyncWord, Version,
};
use crate::signal::Notify;
use crate::{Error, Sx1278};

/// RSSI offset below [`RF_MID_BAND_THRESHOLD`](crate::RF_MID_BAND_THRESHOLD), dBm
pub const RSSI_OFFSET_LF: i16 = -164;

/// RSSI offset above [`RF_MID_BAND_THRESHOLD`](crate::RF_MID_BAND_THRESHOLD), dBm
pub const RSSI_OFFSET_HF: i16 = -157;

/// Symbol duration above which low data rate optimisation is mandated, in us
const LOW_DATA_RATE_SYMBOL_US: u64 = 16_000;

/// Complete modem configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Carrier frequency
    pub frequency: Frequency,
    /// Power amplifier selection and output power
    pub pa_config: PaConfig,
    /// Bandwidth, coding rate and header mode
    pub modem_config1: ModemConfig1,
    /// Spreading factor and payload CRC
    pub modem_config2: ModemConfig2,
    /// Network sync word
    pub sync_word: SyncWord,
    /// IQ polarity
    pub invert_iq: InvertIq,
    /// Preamble length in symbols, 4.25 symbols are added by the modem
    pub preamble_length: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frequency: Frequency::default(),
            pa_config: PaConfig::default(),
            modem_config1: ModemConfig1::default(),
            modem_config2: ModemConfig2::default(),
            sync_word: SyncWord::default(),
            invert_iq: InvertIq::default(),
            preamble_length: 8,
        }
    }
}

impl Settings {
    /// Duration of a symbol in us
    pub fn symbol_time_us(&self) -> u64 {
        (1_000_000u64 << self.modem_config2.spreading_factor.value())
            / self.modem_config1.bandwidth.hz() as u64
    }

    /// Whether the symbol duration requires low data rate optimisation
    pub fn low_data_rate_optimize(&self) -> bool {
        self.symbol_time_us() > LOW_DATA_RATE_SYMBOL_US
    }

    /// ModemConfig3 value matching the spreading factor and bandwidth
    pub fn modem_config3(&self) -> ModemConfig3 {
        ModemConfig3 {
            low_data_rate_optimize: self.low_data_rate_optimize(),
            agc_auto_on: true,
        }
    }

    /// Time on air of a packet carrying `payload_len` bytes, in us
    ///
    /// DE is the low data rate optimisation [`Sx1278::apply`] programs.
    ///
    /// ```text
    /// T_preamble = (n_preamble + 4.25) * T_sym
    /// n_payload  = 8 + max(ceil((8PL - 4SF + 28 + 16CRC - 20IH) / (4(SF - 2DE))) * (CR + 4), 0)
    /// ```
    pub fn time_on_air_us(&self, payload_len: u8) -> u64 {
        let sf = self.modem_config2.spreading_factor.value() as i32;
        let crc = self.modem_config2.rx_payload_crc_on as i32;
        let implicit = (self.modem_config1.header_mode == HeaderMode::Implicit) as i32;
        let de = self.low_data_rate_optimize() as i32;

        let numerator = 8 * payload_len as i32 - 4 * sf + 28 + 16 * crc - 20 * implicit;
        let denominator = 4 * (sf - 2 * de);
        let blocks = if numerator > 0 {
            (numerator + denominator - 1) / denominator
        } else {
            0
        };
        let payload_symbols =
            8 + blocks as u64 * self.modem_config1.coding_rate.denominator() as u64;

        // count in quarter symbols to keep the 4.25 preamble tail exact
        let quarter_symbols = 4 * self.preamble_length as u64 + 17 + 4 * payload_symbols;
        quarter_symbols * (1_000_000u64 << sf) / (4 * self.modem_config1.bandwidth.hz() as u64)
    }
}

/// Packet RSSI in dBm from a raw RegPktRssiValue reading
pub fn rssi_dbm(raw: u8, frequency: Frequency) -> i16 {
    let offset = if frequency.is_high_band() {
        RSSI_OFFSET_HF
    } else {
        RSSI_OFFSET_LF
    };
    offset + raw as i16 + (raw >> 4) as i16
}

/// Packet SNR in dB from a raw RegPktSnrValue reading (two's complement, 0.25 dB steps)
pub fn snr_db(raw: u8) -> i8 {
    raw as i8 / 4
}

impl<SPI, N> Sx1278<SPI, N>
where
    SPI: embedded_hal::spi::SpiDevice,
    N: Notify,
{
    /// Program the full configuration
    ///
    /// Stops any pending operation and leaves the radio asleep.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn apply(&mut self, settings: Settings) -> Result<(), Error> {
        self.cancel_pending(false);

        // LongRangeMode only latches in sleep
        self.device.write_register(OpMode::lora(OperationMode::Sleep))?;
        self.device.write_register(OpMode::lora(OperationMode::Sleep))?;

        self.device.write_register(Frf::from(settings.frequency))?;
        self.device.write_register(settings.pa_config)?;
        self.device.write_register(settings.modem_config1)?;
        self.device.write_register(settings.modem_config2)?;
        self.device.write_register(settings.modem_config3())?;
        self.device.write_register(settings.sync_word)?;
        self.device.write_register(settings.invert_iq)?;
        self.device
            .write_burst(Register::PreambleMsb, &settings.preamble_length.to_be_bytes())?;

        self.settings = settings;
        debug!("settings applied: {}", settings);
        Ok(())
    }

    /// Retune the carrier
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn set_frequency(&mut self, frequency: Frequency) -> Result<(), Error> {
        self.in_standby(|device| device.write_register(Frf::from(frequency)))?;
        self.settings.frequency = frequency;
        Ok(())
    }

    /// Set the OutputPower field of RegPaConfig, keeping the PA selection
    ///
    /// # Panics
    /// If `output_power` does not fit the 4-bit field.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn set_tx_power(&mut self, output_power: u8) -> Result<(), Error> {
        assert!(output_power <= 0x0F, "output power {} out of range", output_power);
        let pa_config = PaConfig {
            output_power,
            ..self.settings.pa_config
        };
        self.in_standby(|device| device.write_register(pa_config))?;
        self.settings.pa_config = pa_config;
        Ok(())
    }

    /// Select normal or inverted IQ polarity
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn set_iq(&mut self, inverted: bool) -> Result<(), Error> {
        let invert_iq = InvertIq { inverted };
        self.in_standby(|device| device.write_register(invert_iq))?;
        self.settings.invert_iq = invert_iq;
        Ok(())
    }

    /// Silicon revision
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn version(&mut self) -> Result<Version, Error> {
        Ok(self.device.read_register::<Version>()?)
    }

    /// Read back the configuration registers and log them at debug level
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn log_registers(&mut self) -> Result<(), Error> {
        let mode = self.device.read(Register::OpMode)?;
        let config1 = self.device.read(Register::ModemConfig1)?;
        let config2 = self.device.read(Register::ModemConfig2)?;
        let mut frf = [0u8; 3];
        self.device.read_burst(Register::FrMsb, &mut frf)?;
        let invert_iq = self.device.read(Register::InvertIq)?;
        let pa = self.device.read(Register::PaConfig)?;
        let sync = self.device.read(Register::SyncWord)?;

        debug!(
            "mode: {=u8:02x} config1: {=u8:02x} config2: {=u8:02x} freq: {=u8:02x}{=u8:02x}{=u8:02x} inv iq: {=u8:02x} pa: {=u8:02x} sync: {=u8:02x}",
            mode,
            config1,
            config2,
            frf[0],
            frf[1],
            frf[2],
            invert_iq,
            pa,
            sync
        );
        Ok(())
    }

    /// Run `write` in standby, then restore the previous RegOpMode value
    fn in_standby(
        &mut self,
        write: impl FnOnce(&mut Device<SPI>) -> Result<(), RegifaceError>,
    ) -> Result<(), Error> {
        let prior = self.device.read(Register::OpMode)?;
        self.device.write_register(OpMode::lora(OperationMode::Standby))?;
        write(&mut self.device)?;
        self.device.write(Register::OpMode, prior)?;
        Ok(())
    }
}
