//! QSPI I/O modes

/// I/O mode for QSPI transactions
///
/// Represents how each phase of a command is clocked on the bus, from
/// single-wire to quad-wire. The instruction phase is always single line
/// on the IS25LQ outside of QPI mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IoMode {
    /// Standard SPI: 1-1-1 (cmd, addr, data all on single line)
    #[default]
    Single,
    /// Dual I/O: 1-2-2 (addr and data on 2 lines)
    DualIo,
    /// Quad Output: 1-1-4 (data phase on 4 lines)
    QuadOut,
}

impl IoMode {
    /// Returns the number of lines used for the instruction phase
    pub const fn cmd_lines(&self) -> u8 {
        1
    }

    /// Returns the number of lines used for the address phase
    pub const fn addr_lines(&self) -> u8 {
        match self {
            Self::Single | Self::QuadOut => 1,
            Self::DualIo => 2,
        }
    }

    /// Returns the number of lines used for the data phase
    pub const fn data_lines(&self) -> u8 {
        match self {
            Self::Single => 1,
            Self::DualIo => 2,
            Self::QuadOut => 4,
        }
    }
}

use crate::bus::BusFeatures;
use crate::error::{Error, Result};

/// Check if a transport supports the requested I/O mode
///
/// Returns `Ok(())` if the mode is supported, or `Err(IoModeNotSupported)` if not.
pub fn check_io_mode_supported(mode: IoMode, features: BusFeatures) -> Result<()> {
    let required = match mode {
        IoMode::Single => return Ok(()),
        IoMode::DualIo => BusFeatures::DUAL_IO,
        IoMode::QuadOut => BusFeatures::QUAD_OUT,
    };
    if features.contains(required) {
        Ok(())
    } else {
        Err(Error::IoModeNotSupported)
    }
}
