//! QSPI command descriptor

use super::{AddressWidth, IoMode};

/// Direction of the data phase that follows a command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// No data phase
    #[default]
    None,
    /// Data is clocked in from the chip
    In,
    /// Data is clocked out to the chip
    Out,
}

/// A single QSPI command descriptor
///
/// The descriptor only describes the transaction. The data phase, if any,
/// is carried by a separate `receive`/`transmit` call on the transport
/// with a buffer of exactly `data_len` bytes. Descriptors are built fresh
/// per call and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Command {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any)
    pub address: Option<u32>,

    /// Address width
    pub address_width: AddressWidth,

    /// I/O mode
    pub io_mode: IoMode,

    /// Number of dummy cycles after address
    pub dummy_cycles: u8,

    /// Direction of the data phase
    pub direction: Direction,

    /// Number of bytes in the data phase
    pub data_len: usize,
}

impl Command {
    /// Create a simple command with no address or data (e.g., WREN, WRDI)
    pub const fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            io_mode: IoMode::Single,
            dummy_cycles: 0,
            direction: Direction::None,
            data_len: 0,
        }
    }

    /// Create a read register command with no address (e.g., RDSR)
    pub const fn read_reg(opcode: u8, len: usize) -> Self {
        Self {
            direction: Direction::In,
            data_len: len,
            ..Self::simple(opcode)
        }
    }

    /// Create a write register command with no address (e.g., WRSR)
    pub const fn write_reg(opcode: u8, len: usize) -> Self {
        Self {
            direction: Direction::Out,
            data_len: len,
            ..Self::simple(opcode)
        }
    }

    /// Create a read command with 3-byte address (e.g., READ)
    pub const fn read_3b(opcode: u8, addr: u32, len: usize) -> Self {
        Self {
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            ..Self::read_reg(opcode, len)
        }
    }

    /// Create a write command with 3-byte address (e.g., PP)
    pub const fn write_3b(opcode: u8, addr: u32, len: usize) -> Self {
        Self {
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            ..Self::write_reg(opcode, len)
        }
    }

    /// Create an erase command with 3-byte address
    pub const fn erase_3b(opcode: u8, addr: u32) -> Self {
        Self {
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            ..Self::simple(opcode)
        }
    }

    /// Set the I/O mode for this command
    pub const fn with_io_mode(mut self, mode: IoMode) -> Self {
        self.io_mode = mode;
        self
    }

    /// Set the number of dummy cycles
    pub const fn with_dummy_cycles(mut self, cycles: u8) -> Self {
        self.dummy_cycles = cycles;
        self
    }

    /// Returns true if this command has a read phase
    pub const fn has_read(&self) -> bool {
        matches!(self.direction, Direction::In)
    }

    /// Returns true if this command has a write phase
    pub const fn has_write(&self) -> bool {
        matches!(self.direction, Direction::Out)
    }

    /// Returns true if this command has an address phase
    pub const fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// Number of lines used by the data phase, 0 when there is none
    pub const fn data_lines(&self) -> u8 {
        match self.direction {
            Direction::None => 0,
            Direction::In | Direction::Out => self.io_mode.data_lines(),
        }
    }
}
