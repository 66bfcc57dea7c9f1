//! This crate provides an interrupt-driven Rust driver for the nRF24L01(+) single chip 2.4 GHz
//! transceiver by Nordic Semiconductor, built on the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal
//!
//! On top of the raw radio it provides:
//! - a framing layer: every 32 byte payload carries a length byte, up to
//!   [`MAX_DATA_COUNT`] data bytes and a checksum; longer messages are split
//!   over several frames,
//! - one receive queue per pipe, filled from the interrupt handler and
//!   drained by the application through a [`Mailbox`],
//! - half-duplex arbitration: the radio sits in receive mode and only leaves
//!   it while a frame is in flight, bounded by a timeout.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! nrf24-mailbox = "0.1"
//! ```
//!
//! A `critical-section` implementation has to be linked in, most HAL and
//! executor crates provide one.
//!
//! # Examples
//!
//! ```ignore
//! use nrf24_mailbox::{Event, Mailbox, Nrf24l01};
//! use nrf24_mailbox::config::{DataPipe, NrfConfig};
//!
//! static MAILBOX: Mailbox = Mailbox::new();
//!
//! let config = NrfConfig::default().channel(8).rx_pipes(DataPipe::DP1 | DataPipe::DP2);
//! let mut radio = Nrf24l01::new(spi, ce, ncs, || timer.millis(), &MAILBOX, &mut delay, config)?;
//! radio.set_rx_pipe_address(1, b"Node1")?;
//! radio.set_rx_pipe_address(2, b"2")?;
//! radio.set_tx_address(b"Base0")?;
//!
//! // in the IRQ handler
//! radio.on_interrupt()?;
//!
//! // in the application
//! let mut buf = [0u8; 10];
//! if MAILBOX.available(2) >= buf.len() {
//!     MAILBOX.drain(2, &mut buf)?;
//! }
//! ```
//!
//! # Feature-flags
//!
//! - **defmt:** provides a `defmt::Format` implementation for all public structs and enums,
//!   and logs recoverable faults (checksum failures, dropped bytes, transmit timeouts).
//! - **async:** adds `Nrf24l01::wait_for_interrupt`, driving the interrupt handler from an
//!   `embedded-hal-async` IRQ pin.
#![warn(
    missing_docs,
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![cfg_attr(not(test), no_std)]
extern crate embedded_hal as hal;
use hal::spi;

mod clock;
pub mod config;
mod dump;
mod error;
pub mod frame;
pub mod mailbox;
pub mod mode;
mod nrf24;
mod register;
pub mod ring_buffer;
#[cfg(test)]
mod sim;
pub mod status;

pub use crate::clock::Clock;
pub use crate::dump::RegisterDump;
pub use crate::error::{BufferError, FrameError, TransferError};
pub use crate::frame::{checksum, Frame};
pub use crate::mailbox::{Mailbox, PipeBuffer};
pub use crate::mode::{Mode, TxOutcome};
pub use crate::nrf24::{Event, Nrf24l01};

/// SPI mode. Use this when initializing the SPI instance.
pub const SPI_MODE: spi::Mode = spi::MODE_0;
/// Size in bytes of every payload sent or received over the air.
pub const PAYLOAD_SIZE: usize = 32;
/// Data bytes carried by a single frame.
pub const MAX_DATA_COUNT: usize = PAYLOAD_SIZE - 2;
/// Number of receive pipes.
pub const PIPE_COUNT: usize = 6;
/// Default capacity in bytes of each pipe's receive queue.
pub const PIPE_BUFFER_SIZE: usize = 64;
/// Default bound on how long a frame may stay in flight.
pub const TX_MODE_TIMEOUT_MS: u32 = 500;
