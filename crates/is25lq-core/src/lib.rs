//! is25lq-core - Command/protocol driver for ISSI IS25LQ serial NOR flash
//!
//! This crate maps logical flash operations (read, program, erase,
//! identify, power state, register access) onto fully parameterized
//! quad-SPI command descriptors, and sequences them with the write-enable
//! and busy-polling discipline the chip requires. It is designed to be
//! `no_std` compatible for use on microcontrollers.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation
//! - `is_sync` - Compile the transport trait and driver as blocking code
//!   instead of `async`
//!
//! # Example
//!
//! ```ignore
//! use is25lq_core::bus::QspiBus;
//! use is25lq_core::flash::{Config, Is25lq};
//!
//! fn erase_first_sector<B: QspiBus>(bus: &mut B) -> is25lq_core::Result<()> {
//!     let mut flash = Is25lq::new(bus, Config::default())
//!         .with_completion_sink(|done| log::info!("{:?} finished", done));
//!     let geometry = flash.init()?;
//!     println!("{} sectors", geometry.sectors);
//!     flash.erase_sector(0)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod chip;
pub mod error;
pub mod flash;
pub mod protocol;
pub mod register;
pub mod spi;

pub use error::{Error, Result};
