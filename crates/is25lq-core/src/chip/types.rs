//! Flash chip type definitions

use crate::spi::opcodes::ISSI_MANUFACTURER_ID;

/// Chip identification as returned by the JEDEC ID command
///
/// Read once by `init` and cached for the lifetime of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identification {
    /// JEDEC manufacturer id (0x9D for ISSI)
    pub manufacturer_id: u8,
    /// Memory type byte
    pub device_type: u8,
    /// Capacity code, see [`super::resolve`]
    pub capacity: u8,
}

impl Identification {
    /// Build from the three bytes returned by the JEDEC ID command
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self {
            manufacturer_id: bytes[0],
            device_type: bytes[1],
            capacity: bytes[2],
        }
    }

    /// Combined 16-bit device id (type + capacity)
    pub const fn device_id(&self) -> u16 {
        ((self.device_type as u16) << 8) | self.capacity as u16
    }

    /// Returns true if the manufacturer byte is ISSI's
    pub const fn is_issi(&self) -> bool {
        self.manufacturer_id == ISSI_MANUFACTURER_ID
    }
}

/// Length of the factory-programmed unique id
pub const UNIQUE_ID_LEN: usize = 16;

/// Factory-programmed 128-bit unique id
pub type UniqueId = [u8; UNIQUE_ID_LEN];

/// Number of one-time-programmable information rows
pub const INFO_ROW_COUNT: u8 = 4;
/// Size of each information row in bytes
pub const INFO_ROW_SIZE: u32 = 256;
/// Address stride between information rows
pub const INFO_ROW_STRIDE: u32 = 0x1000;

/// Base address of an information row, or None if out of range
pub const fn info_row_address(row: u8) -> Option<u32> {
    if row < INFO_ROW_COUNT {
        Some(row as u32 * INFO_ROW_STRIDE)
    } else {
        None
    }
}
