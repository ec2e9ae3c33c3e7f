#![cfg_attr(not(test), no_std)]
//! SX1278 LoRa Radio Driver
//!
//! This crate provides a type-safe interface for the Semtech SX1278 LoRa
//! transceiver (and the register compatible SX1276/77/79). The SX1278 is a
//! half-duplex long range modem for the 137-525 MHz bands, driven entirely
//! through a register file behind an SPI interface.
//!
//! # Features
//! - LoRa modulation: SF6-12, BW 7.8-500 kHz, coding rate 4/5-4/8
//! - 256 byte packet FIFO shared by transmit and receive
//! - Explicit and implicit header modes, optional payload CRC
//! - Completion detection by interrupt flag polling, no DIO wiring needed
//! - Packet RSSI and SNR
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Register transport over an embedded-hal `SpiDevice`
//! - [`registers`]: Register address table and typed register definitions
//! - [`radio`]: The [`Sx1278`] handle and its completion poll loop
//! - [`mode`]: Operating mode transitions
//! - [`fifo`]: Packet staging, transmit and receive start
//! - [`watcher`]: Completion detection state machine
//! - [`config`]: Modem configuration, RSSI/SNR and time on air
//! - [`signal`]: Completion notification
//! - [`reset`]: Hardware reset pulse
//!
//! # Usage
//! Configuration follows a specific sequence:
//!
//! 1. Create the [`Sx1278`] handle with [`Sx1278::create`], pulsing the reset line
//! 2. Program the modem with [`Sx1278::apply`]
//! 3. Stage a packet with [`Sx1278::fill`] and send it with [`Sx1278::start_tx`],
//!    or start a receive with [`Sx1278::start_rx`]
//! 4. Drive the completion poll loop with [`Sx1278::wait_for_completion`]
//!
//! # Important Notes
//! - Only one operation is pending at a time; starting a new one stops the
//!   previous one
//! - The staging buffer is not cleared by a transmission
//! - Implicit header receive needs the payload length set with [`Sx1278::prepare`]
//!
//! # Example
//! ```no_run
//! use embedded_hal::spi::SpiDevice;
//! use embedded_hal_async::delay::DelayNs;
//! use sx1278::{Error, Outcome, Settings, Sx1278};
//!
//! async fn send<SPI: SpiDevice, D: DelayNs>(spi: SPI, delay: &mut D) -> Result<Outcome, Error> {
//!     let mut radio = Sx1278::new(spi, ());
//!     radio.apply(Settings::default())?;
//!
//!     radio.fill(b"sx1278");
//!     radio.start_tx()?;
//!     radio.wait_for_completion(delay).await
//! }
//! ```

#[macro_use]
mod fmt;

pub mod config;
pub mod device;
pub mod error;
pub mod fifo;
pub mod mode;
pub mod radio;
pub mod registers;
pub mod reset;
pub mod signal;
pub mod watcher;

#[cfg(test)]
mod test;

pub use config::Settings;
pub use device::Device;
pub use error::Error;
pub use fifo::{RxMode, MAX_PAYLOAD};
pub use radio::{PacketStatus, Sx1278};
pub use registers::*;
pub use signal::{CompletionSignal, Notify};
pub use watcher::{Outcome, Watch, Watcher, WatcherState};
