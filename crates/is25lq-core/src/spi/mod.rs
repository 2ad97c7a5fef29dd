//! QSPI types and command structures
//!
//! This module provides the command descriptor handed to the bus
//! transport, the line/address configuration types it is built from, and
//! the IS25LQ opcode table.

mod address;
mod command;
mod io_mode;
pub mod opcodes;

pub use address::{Address, AddressWidth};
pub use command::{Command, Direction};
pub use io_mode::{check_io_mode_supported, IoMode};
