//! Completion notifications

/// A finished erase or program cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// Page program at `address`
    PageProgram {
        /// Start address
        address: u32,
        /// Number of bytes programmed
        len: usize,
    },
    /// 4 KiB sector erase at the given address
    SectorErase(u32),
    /// 32 KiB block erase at the given address
    BlockErase32(u32),
    /// 64 KiB block erase at the given address
    BlockErase64(u32),
    /// Whole chip erase
    ChipErase,
    /// Information row program
    InfoRowProgram {
        /// Row index
        row: u8,
        /// Number of bytes programmed
        len: usize,
    },
}

/// Receiver for completion events
///
/// The driver holds at most one sink. It is called exactly once per
/// erase or program, after the chip reports the cycle finished. Any
/// `FnMut(Completion)` closure is a sink.
pub trait CompletionSink {
    /// Called when a cycle completes
    fn notify(&mut self, completion: Completion);
}

impl<F: FnMut(Completion)> CompletionSink for F {
    fn notify(&mut self, completion: Completion) {
        self(completion)
    }
}
