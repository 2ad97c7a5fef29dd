//! Status and function register value types
//!
//! Both registers are one-byte snapshots. The chip mutates them as a side
//! effect of commands; the values here are never cached by the driver.

use bitflags::bitflags;

bitflags! {
    /// Status register
    ///
    /// ```text
    /// BIT  7    6   5   4   3   2   1   0
    ///    |SRWD|QE |BP3|BP2|BP1|BP0|WEL|WIP|
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusRegister: u8 {
        /// Write In Progress: an erase, program or register write is running
        const WIP  = 0x01;
        /// Write Enable Latch
        const WEL  = 0x02;
        /// Block Protection bit 0
        const BP0  = 0x04;
        /// Block Protection bit 1
        const BP1  = 0x08;
        /// Block Protection bit 2
        const BP2  = 0x10;
        /// Block Protection bit 3
        const BP3  = 0x20;
        /// Quad Enable
        const QE   = 0x40;
        /// Status Register Write Disable
        const SRWD = 0x80;

        /// All block protection bits
        const BP = Self::BP0.bits() | Self::BP1.bits() | Self::BP2.bits() | Self::BP3.bits();
    }
}

impl StatusRegister {
    const BP_SHIFT: u8 = 2;

    /// Returns true while a write cycle is in progress
    pub const fn is_busy(&self) -> bool {
        self.contains(Self::WIP)
    }

    /// Returns true if the write enable latch is set
    pub const fn write_enabled(&self) -> bool {
        self.contains(Self::WEL)
    }

    /// Returns true if quad output/IO reads are enabled
    pub const fn quad_enabled(&self) -> bool {
        self.contains(Self::QE)
    }

    /// Returns true if the status register is write protected
    pub const fn write_disabled(&self) -> bool {
        self.contains(Self::SRWD)
    }

    /// Block protection field BP3..BP0 as a 4-bit value
    pub const fn block_protection(&self) -> u8 {
        (self.bits() & Self::BP.bits()) >> Self::BP_SHIFT
    }

    /// Replace the block protection field, keeping the other bits
    pub const fn with_block_protection(self, level: u8) -> Self {
        let bp = (level << Self::BP_SHIFT) & Self::BP.bits();
        Self::from_bits_retain((self.bits() & !Self::BP.bits()) | bp)
    }
}

impl From<u8> for StatusRegister {
    fn from(value: u8) -> Self {
        Self::from_bits_retain(value)
    }
}

bitflags! {
    /// Function register
    ///
    /// ```text
    /// BIT  7    6    5    4    3    2    1  0
    ///    |IRL3|IRL2|IRL1|IRL0|ESUS|PSUS| R | R |
    /// ```
    ///
    /// The information row lock bits are one-time programmable. Once set
    /// they can never be cleared again.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionRegister: u8 {
        /// Program suspended
        const PSUS = 0x04;
        /// Erase suspended
        const ESUS = 0x08;
        /// Information row 0 locked
        const IRL0 = 0x10;
        /// Information row 1 locked
        const IRL1 = 0x20;
        /// Information row 2 locked
        const IRL2 = 0x40;
        /// Information row 3 locked
        const IRL3 = 0x80;

        /// All information row lock bits
        const IRL = Self::IRL0.bits() | Self::IRL1.bits() | Self::IRL2.bits() | Self::IRL3.bits();
    }
}

impl FunctionRegister {
    /// Lock bit for an information row, or None if the row does not exist
    pub const fn row_lock(row: u8) -> Option<Self> {
        match row {
            0 => Some(Self::IRL0),
            1 => Some(Self::IRL1),
            2 => Some(Self::IRL2),
            3 => Some(Self::IRL3),
            _ => None,
        }
    }

    /// Returns true if a program operation is suspended
    pub const fn program_suspended(&self) -> bool {
        self.contains(Self::PSUS)
    }

    /// Returns true if an erase operation is suspended
    pub const fn erase_suspended(&self) -> bool {
        self.contains(Self::ESUS)
    }

    /// Returns true if the given information row is locked
    pub const fn is_row_locked(&self, row: u8) -> bool {
        match Self::row_lock(row) {
            Some(bit) => self.contains(bit),
            None => false,
        }
    }

    /// Only the lock bits of this value
    pub const fn locks(&self) -> Self {
        self.intersection(Self::IRL)
    }
}

impl From<u8> for FunctionRegister {
    fn from(value: u8) -> Self {
        Self::from_bits_retain(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessors() {
        let sr = StatusRegister::from(0b1100_0011);
        assert!(sr.is_busy());
        assert!(sr.write_enabled());
        assert!(sr.quad_enabled());
        assert!(sr.write_disabled());
        assert_eq!(sr.block_protection(), 0);
    }

    #[test]
    fn test_block_protection_field() {
        let sr = StatusRegister::QE.with_block_protection(0b1011);
        assert_eq!(sr.bits(), 0b0110_1100);
        assert_eq!(sr.block_protection(), 0b1011);
        // Out-of-range bits are dropped rather than spilling into QE/SRWD
        let sr = StatusRegister::empty().with_block_protection(0xFF);
        assert_eq!(sr, StatusRegister::BP);
    }

    #[test]
    fn test_function_register_locks() {
        let fr = FunctionRegister::from(0b1010_0100);
        assert!(fr.program_suspended());
        assert!(!fr.erase_suspended());
        assert!(fr.is_row_locked(1));
        assert!(fr.is_row_locked(3));
        assert!(!fr.is_row_locked(0));
        assert!(!fr.is_row_locked(4));
        assert_eq!(fr.locks(), FunctionRegister::IRL1 | FunctionRegister::IRL3);
        assert_eq!(FunctionRegister::row_lock(7), None);
    }
}
