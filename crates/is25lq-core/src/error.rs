//! Error types for is25lq-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transport errors
    /// Bus command or data transfer failed
    Transport,
    /// Busy-poll or transport timeout exceeded
    Timeout,
    /// The transport cannot drive the requested line configuration
    IoModeNotSupported,
    /// The transport has no hardware status-match watch
    WatchNotSupported,

    // Chip errors
    /// Capacity code reported by the chip has no known geometry
    UnsupportedCapacity(u8),
    /// Operation attempted before a successful `init`
    NotInitialized,
    /// Chip is in deep power-down; only release is accepted
    PoweredDown,
    /// An erase or program cycle armed on the transport watch is still running
    Busy,
    /// Information row is locked by its OTP bit
    InformationRowLocked,

    // Address/size errors
    /// Address is beyond the chip capacity
    AddressOutOfBounds,
    /// Length is zero, too long, or crosses a page boundary
    InvalidLength,
    /// Erase address is not aligned to the erase unit
    InvalidAlignment,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "bus transport error"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::IoModeNotSupported => write!(f, "I/O mode not supported by transport"),
            Self::WatchNotSupported => write!(f, "transport has no status-match watch"),
            Self::UnsupportedCapacity(code) => {
                write!(f, "unsupported capacity code 0x{:02X}", code)
            }
            Self::NotInitialized => write!(f, "driver not initialized"),
            Self::PoweredDown => write!(f, "flash is in deep power-down"),
            Self::Busy => write!(f, "flash is busy"),
            Self::InformationRowLocked => write!(f, "information row is locked"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidLength => write!(f, "invalid length"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
