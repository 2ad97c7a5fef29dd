//! Transport trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy and other executors)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::{Error, Result};
use crate::spi::Command;
use bitflags::bitflags;
use maybe_async::maybe_async;

bitflags! {
    /// Transport feature flags
    ///
    /// These flags indicate which line configurations and helpers a
    /// transport supports beyond plain single-line SPI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BusFeatures: u32 {
        /// Can transfer address and data two bits at once (1-2-2 mode)
        const DUAL_IO   = 1 << 0;
        /// Can read four bits at once (1-1-4 mode)
        const QUAD_OUT  = 1 << 1;
        /// Can poll a status byte in hardware and signal on match
        const AUTO_POLL = 1 << 2;
    }
}

impl Default for BusFeatures {
    fn default() -> Self {
        BusFeatures::empty()
    }
}

/// Hardware status-match configuration
///
/// The transport repeatedly issues the status command and compares
/// `status & mask` against `match_value`, signalling completion once they
/// are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWatch {
    /// Bits of the status byte that take part in the comparison
    pub mask: u8,
    /// Expected value of the masked bits
    pub match_value: u8,
    /// Polling interval in bus clock cycles
    pub interval: u16,
}

/// QSPI bus transport trait (sync or async depending on `is_sync` feature)
///
/// This trait represents the controller that talks to the flash chip. A
/// transaction is issued in two phases, mirroring how QSPI peripherals are
/// driven: `command` sends instruction, address and dummy cycles, then
/// `receive` or `transmit` moves the data phase announced by the
/// descriptor's `direction` and `data_len`.
///
/// Implementations report failures as [`Error::Transport`] or
/// [`Error::Timeout`]. The driver never retries.
///
/// The driver assumes exclusive, non-reentrant use of the transport.
/// Callers sharing a transport between execution contexts must serialize
/// access themselves.
#[maybe_async(AFIT)]
pub trait QspiBus {
    /// Get the features supported by this transport
    fn features(&self) -> BusFeatures;

    /// Get the maximum number of bytes that can be moved in one data phase
    fn max_transfer_len(&self) -> usize;

    /// Issue the command phase of a transaction
    async fn command(&mut self, cmd: &Command, timeout_ms: u32) -> Result<()>;

    /// Clock the data phase in from the chip
    async fn receive(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<()>;

    /// Clock the data phase out to the chip
    async fn transmit(&mut self, data: &[u8], timeout_ms: u32) -> Result<()>;

    /// Arm a hardware status-match watch
    ///
    /// Returns once the watch is armed. Completion is signalled by the
    /// transport from its own context, typically an interrupt handler,
    /// which must then call the driver's `handle_ready_match`.
    async fn watch_until_clear(&mut self, cmd: &Command, watch: &StatusWatch) -> Result<()> {
        let _ = (cmd, watch);
        Err(Error::WatchNotSupported)
    }

    /// Disarm a watch armed by `watch_until_clear`
    ///
    /// Called before the driver stops waiting for the match. Transports
    /// without a watch have nothing to disarm.
    async fn cancel_watch(&mut self) -> Result<()> {
        Ok(())
    }

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}

// Lets the driver borrow a transport it does not own
#[maybe_async(AFIT)]
impl<B: QspiBus + ?Sized> QspiBus for &mut B {
    fn features(&self) -> BusFeatures {
        (**self).features()
    }

    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    async fn command(&mut self, cmd: &Command, timeout_ms: u32) -> Result<()> {
        (**self).command(cmd, timeout_ms).await
    }

    async fn receive(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<()> {
        (**self).receive(buf, timeout_ms).await
    }

    async fn transmit(&mut self, data: &[u8], timeout_ms: u32) -> Result<()> {
        (**self).transmit(data, timeout_ms).await
    }

    async fn watch_until_clear(&mut self, cmd: &Command, watch: &StatusWatch) -> Result<()> {
        (**self).watch_until_clear(cmd, watch).await
    }

    async fn cancel_watch(&mut self) -> Result<()> {
        (**self).cancel_watch().await
    }

    async fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us).await
    }
}
