//! Capacity code to geometry decode

use crate::error::{Error, Result};
use crate::spi::opcodes::SECTOR_SIZE;

/// Block and sector layout of a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Number of 64 KiB blocks
    pub blocks64: u8,
    /// Number of 32 KiB blocks
    pub blocks32: u8,
    /// Number of 4 KiB sectors
    pub sectors: u8,
}

impl Geometry {
    /// Create a new geometry record
    pub const fn new(blocks64: u8, blocks32: u8, sectors: u8) -> Self {
        Self {
            blocks64,
            blocks32,
            sectors,
        }
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> u32 {
        self.sectors as u32 * SECTOR_SIZE
    }

    /// Check if an address range is inside the array
    pub fn contains(&self, addr: u32, len: usize) -> bool {
        let end = addr as u64 + len as u64;
        end <= self.capacity() as u64
    }
}

/// A recognized member of the IS25LQ family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Density {
    /// Capacity code reported in the last JEDEC ID byte
    pub code: u8,
    /// Part name
    pub name: &'static str,
    /// Block/sector layout
    pub geometry: Geometry,
}

/// Every capacity code the driver accepts
pub const DENSITIES: [Density; 5] = [
    Density {
        code: 0x09,
        name: "IS25LQ025B",
        geometry: Geometry::new(0, 1, 8),
    },
    Density {
        code: 0x10,
        name: "IS25LQ512B",
        geometry: Geometry::new(0, 2, 16),
    },
    Density {
        code: 0x11,
        name: "IS25LQ010B",
        geometry: Geometry::new(2, 4, 32),
    },
    Density {
        code: 0x12,
        name: "IS25LQ020B",
        geometry: Geometry::new(4, 8, 64),
    },
    Density {
        code: 0x13,
        name: "IS25LQ040B",
        geometry: Geometry::new(8, 16, 128),
    },
];

/// Look up the density record for a capacity code
pub fn density(code: u8) -> Option<&'static Density> {
    DENSITIES.iter().find(|d| d.code == code)
}

/// Resolve a capacity code to its geometry
///
/// Unknown codes always fail. Guessing a layout would silently mis-size
/// every bounds check done against it.
pub fn resolve(code: u8) -> Result<Geometry> {
    density(code)
        .map(|d| d.geometry)
        .ok_or(Error::UnsupportedCapacity(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_codes() {
        assert_eq!(resolve(0x13), Ok(Geometry::new(8, 16, 128)));
        assert_eq!(resolve(0x12), Ok(Geometry::new(4, 8, 64)));
        assert_eq!(resolve(0x11), Ok(Geometry::new(2, 4, 32)));
        assert_eq!(resolve(0x10), Ok(Geometry::new(0, 2, 16)));
        assert_eq!(resolve(0x09), Ok(Geometry::new(0, 1, 8)));
    }

    #[test]
    fn test_resolve_rejects_everything_else() {
        for code in 0..=u8::MAX {
            if density(code).is_none() {
                assert_eq!(resolve(code), Err(Error::UnsupportedCapacity(code)));
            }
        }
        assert_eq!(resolve(0xFF), Err(Error::UnsupportedCapacity(0xFF)));
    }

    #[test]
    fn test_capacity_and_bounds() {
        let g = resolve(0x13).unwrap();
        assert_eq!(g.capacity(), 512 * 1024);
        assert!(g.contains(0, 512 * 1024));
        assert!(g.contains(0x7_FFFF, 1));
        assert!(!g.contains(0x7_FFFF, 2));
        assert_eq!(density(0x13).unwrap().name, "IS25LQ040B");
    }
}
