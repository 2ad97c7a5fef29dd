//! Address width and address value types

use crate::error::{Error, Result};

/// Address width for QSPI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// No address phase
    #[default]
    None,
    /// 3-byte (24-bit) address - supports up to 16 MiB
    ThreeByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::ThreeByte => 3,
        }
    }

    /// Returns the number of address bits
    pub const fn bits(&self) -> u8 {
        self.bytes() * 8
    }

    /// Encode an address into the big-endian bytes sent on the wire
    ///
    /// Returns the number of bytes written, zero without an address phase.
    pub fn encode(&self, address: u32, buf: &mut [u8; 3]) -> usize {
        match self {
            Self::None => 0,
            Self::ThreeByte => {
                let [_, hi, mid, lo] = address.to_be_bytes();
                *buf = [hi, mid, lo];
                3
            }
        }
    }
}

/// A 24-bit memory offset
///
/// The wire value is always the flat 24-bit integer. The split into a
/// sector index (bits 23..12) and a byte offset inside the 4 KiB sector
/// (bits 11..0) is for caller convenience only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u32);

impl Address {
    /// Largest value a 24-bit address can hold
    pub const MAX: u32 = 0x00FF_FFFF;

    const OFFSET_BITS: u32 = 12;
    const OFFSET_MASK: u32 = (1 << Self::OFFSET_BITS) - 1;

    /// Create an address from a flat value
    pub const fn new(value: u32) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(Self(value))
    }

    /// Create an address from a sector index and a byte offset in that sector
    pub const fn from_parts(sector: u16, offset: u16) -> Result<Self> {
        if sector as u32 > (Self::MAX >> Self::OFFSET_BITS) || offset as u32 > Self::OFFSET_MASK {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(Self(((sector as u32) << Self::OFFSET_BITS) | offset as u32))
    }

    /// Flat 24-bit value as sent on the wire
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Sector index (bits 23..12)
    pub const fn sector(&self) -> u16 {
        (self.0 >> Self::OFFSET_BITS) as u16
    }

    /// Byte offset inside the sector (bits 11..0)
    pub const fn offset(&self) -> u16 {
        (self.0 & Self::OFFSET_MASK) as u16
    }
}

impl From<Address> for u32 {
    fn from(address: Address) -> u32 {
        address.0
    }
}

impl TryFrom<u32> for Address {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_split() {
        let addr = Address::new(0x07_3A5C).unwrap();
        assert_eq!(addr.sector(), 0x73);
        assert_eq!(addr.offset(), 0xA5C);
        assert_eq!(Address::from_parts(0x73, 0xA5C).unwrap(), addr);
        assert_eq!(u32::from(addr), 0x07_3A5C);
    }

    #[test]
    fn test_address_rejects_wide_values() {
        assert_eq!(Address::new(0x0100_0000), Err(Error::AddressOutOfBounds));
        assert_eq!(Address::from_parts(0, 0x1000), Err(Error::AddressOutOfBounds));
        assert_eq!(Address::from_parts(0x1000, 0), Err(Error::AddressOutOfBounds));
        assert!(Address::new(Address::MAX).is_ok());
    }

    #[test]
    fn test_encode_big_endian() {
        let mut buf = [0u8; 3];
        assert_eq!(AddressWidth::ThreeByte.encode(0x12_3456, &mut buf), 3);
        assert_eq!(buf, [0x12, 0x34, 0x56]);
        assert_eq!(AddressWidth::None.encode(0xFF_FFFF, &mut buf), 0);
        assert_eq!(AddressWidth::ThreeByte.bits(), 24);
        assert_eq!(AddressWidth::None.bytes(), 0);
    }
}
