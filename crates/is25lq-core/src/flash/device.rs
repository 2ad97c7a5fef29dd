//! The IS25LQ driver
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async

use super::{Completion, CompletionMode, CompletionSink, Config, PollPolicy};
use crate::bus::{BusFeatures, QspiBus};
use crate::chip::{
    info_row_address, resolve, Geometry, Identification, UniqueId, INFO_ROW_SIZE,
    UNIQUE_ID_LEN,
};
use crate::error::{Error, Result};
use crate::protocol::{self, Operation};
use crate::register::{FunctionRegister, StatusRegister};
use crate::spi::opcodes::{BLOCK32_SIZE, BLOCK64_SIZE, PAGE_SIZE, SECTOR_SIZE};
use crate::spi::Address;
use maybe_async::maybe_async;

/// Driver lifecycle state
///
/// Deep power-down is tracked separately, see [`Is25lq::is_powered_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// `init` has not succeeded yet
    Uninitialized,
    /// Idle and accepting commands
    Ready,
    /// Write Enable was sent and the latch is assumed set
    WriteEnabled,
    /// An erase or program is running under a hardware watch
    ///
    /// Left through `handle_ready_match`, `wait_watch` or `reset`.
    Busy(Completion),
}

/// Driver for one IS25LQ chip on a quad-SPI transport
///
/// All operations except [`init`](Self::init) fail with
/// `Error::NotInitialized` until `init` succeeds.
pub struct Is25lq<B, S = fn(Completion)> {
    bus: B,
    config: Config,
    state: State,
    powered_down: bool,
    identification: Option<Identification>,
    geometry: Option<Geometry>,
    sink: Option<S>,
}

impl<B: QspiBus> Is25lq<B> {
    /// Create an uninitialized driver with no completion sink
    pub fn new(bus: B, config: Config) -> Self {
        Self {
            bus,
            config,
            state: State::Uninitialized,
            powered_down: false,
            identification: None,
            geometry: None,
            sink: None,
        }
    }
}

impl<B, S> Is25lq<B, S> {
    /// Replace the completion sink, changing its type
    pub fn with_completion_sink<S2: CompletionSink>(self, sink: S2) -> Is25lq<B, S2> {
        Is25lq {
            bus: self.bus,
            config: self.config,
            state: self.state,
            powered_down: self.powered_down,
            identification: self.identification,
            geometry: self.geometry,
            sink: Some(sink),
        }
    }

    /// Install a completion sink, replacing any previous one
    pub fn set_completion_sink(&mut self, sink: S) {
        self.sink = Some(sink);
    }

    /// Remove the completion sink
    pub fn clear_completion_sink(&mut self) {
        self.sink = None;
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns true after `deep_power_down` until `release_power_down`
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    /// Identification read by the last successful `init`
    pub fn identification(&self) -> Option<Identification> {
        self.identification
    }

    /// Geometry resolved by the last successful `init`
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Driver configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the transport
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the transport
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the driver and return the transport
    pub fn release(self) -> B {
        self.bus
    }

    fn poll_policy(&self, completion: &Completion) -> PollPolicy {
        let timings = &self.config.timings;
        match completion {
            Completion::PageProgram { .. } | Completion::InfoRowProgram { .. } => {
                timings.page_program
            }
            Completion::SectorErase(_) => timings.sector_erase,
            Completion::BlockErase32(_) => timings.block_erase32,
            Completion::BlockErase64(_) => timings.block_erase64,
            Completion::ChipErase => timings.chip_erase,
        }
    }

    fn ensure_ready(&self) -> Result<Geometry> {
        if self.powered_down {
            return Err(Error::PoweredDown);
        }
        match self.state {
            State::Busy(_) => Err(Error::Busy),
            State::Uninitialized => Err(Error::NotInitialized),
            State::Ready | State::WriteEnabled => self.geometry.ok_or(Error::NotInitialized),
        }
    }
}

impl<B, S: CompletionSink> Is25lq<B, S> {
    /// Report that the transport's status watch matched
    ///
    /// Called from the transport's match interrupt or event loop after an
    /// erase or program was started in watch mode. Returns the finished
    /// operation, or None if nothing was pending.
    pub fn handle_ready_match(&mut self) -> Option<Completion> {
        match self.state {
            State::Busy(completion) => {
                log::debug!("Watch matched, {:?} complete", completion);
                self.state = State::Ready;
                self.notify(completion);
                Some(completion)
            }
            _ => {
                log::warn!("Status watch matched with no cycle pending");
                None
            }
        }
    }

    fn notify(&mut self, completion: Completion) {
        if let Some(sink) = self.sink.as_mut() {
            sink.notify(completion);
        }
    }
}

#[maybe_async]
impl<B: QspiBus, S: CompletionSink> Is25lq<B, S> {
    /// Identify the chip and resolve its geometry
    ///
    /// Sends Release Power-Down first when `release_on_init` is set, so a
    /// chip left in deep power-down by a previous owner still answers.
    /// An unknown capacity code leaves the driver uninitialized.
    pub async fn init(&mut self) -> Result<Geometry> {
        if let State::Busy(_) = self.state {
            return Err(Error::Busy);
        }
        let t = self.config.timeouts;

        if self.config.release_on_init {
            protocol::simple(&mut self.bus, Operation::ReleasePowerDown, &t).await?;
            self.bus.delay_us(self.config.timings.release_us).await;
            self.powered_down = false;
        } else if self.powered_down {
            return Err(Error::PoweredDown);
        }

        let id = protocol::read_jedec_id(&mut self.bus, &t).await?;
        log::debug!(
            "JEDEC ID: {:02X} {:02X} {:02X}",
            id.manufacturer_id,
            id.device_type,
            id.capacity
        );
        if !id.is_issi() {
            log::warn!(
                "Unexpected manufacturer id 0x{:02X}, continuing with capacity code",
                id.manufacturer_id
            );
        }

        let geometry = match resolve(id.capacity) {
            Ok(geometry) => geometry,
            Err(e) => {
                log::error!("Unsupported capacity code 0x{:02X}", id.capacity);
                self.state = State::Uninitialized;
                self.identification = None;
                self.geometry = None;
                return Err(e);
            }
        };

        log::info!(
            "Found IS25LQ flash: {} KiB, {} sectors",
            geometry.capacity() / 1024,
            geometry.sectors
        );
        self.identification = Some(id);
        self.geometry = Some(geometry);
        self.state = State::Ready;
        Ok(geometry)
    }

    /// Read using the Read Data command (0x03)
    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.read_with(Operation::Read, addr, buf).await
    }

    /// Read using the Fast Read command (0x0B)
    pub async fn fast_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.read_with(Operation::FastRead, addr, buf).await
    }

    /// Read using Fast Read Dual I/O (0xBB)
    pub async fn dual_fast_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.read_with(Operation::DualFastRead, addr, buf).await
    }

    /// Read using Fast Read Quad Output (0x6B)
    ///
    /// The chip only drives four lines with the QE bit set, see
    /// [`enable_quad`](Self::enable_quad).
    pub async fn quad_fast_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.read_with(Operation::QuadFastRead, addr, buf).await
    }

    async fn read_with(&mut self, op: Operation, addr: u32, buf: &mut [u8]) -> Result<()> {
        let geometry = self.ensure_ready()?;
        if !geometry.contains(addr, buf.len()) {
            return Err(Error::AddressOutOfBounds);
        }
        log::trace!("{:?} 0x{:06X} len {}", op, addr, buf.len());
        let t = self.config.timeouts;
        protocol::read_chunked(&mut self.bus, op, addr, buf, &t).await
    }

    /// Program up to one page
    ///
    /// `data` must be 1 to 256 bytes and must not cross a page boundary.
    /// Programming can only clear bits; erase first to set them.
    pub async fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.program_page(addr, data, true).await
    }

    /// Program an arbitrary range, one page at a time
    ///
    /// Always waits for each page by polling, even in watch mode. The
    /// sink is notified once per page.
    pub async fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let geometry = self.ensure_ready()?;
        if !geometry.contains(addr, data.len()) {
            return Err(Error::AddressOutOfBounds);
        }

        let mut offset = 0;
        while offset < data.len() {
            let page_addr = addr + offset as u32;
            let room = (PAGE_SIZE - page_addr % PAGE_SIZE) as usize;
            let len = core::cmp::min(room, data.len() - offset);
            self.program_page(page_addr, &data[offset..offset + len], false)
                .await?;
            offset += len;
        }

        Ok(())
    }

    async fn program_page(&mut self, addr: u32, data: &[u8], allow_watch: bool) -> Result<()> {
        let geometry = self.ensure_ready()?;
        if data.is_empty()
            || data.len() > PAGE_SIZE as usize
            || (addr % PAGE_SIZE) as usize + data.len() > PAGE_SIZE as usize
        {
            return Err(Error::InvalidLength);
        }
        if !geometry.contains(addr, data.len()) {
            return Err(Error::AddressOutOfBounds);
        }

        log::trace!("Programming 0x{:06X} len {}", addr, data.len());
        self.write_enabled_command(Operation::PageProgram, addr, data)
            .await?;
        let timings = self.config.timings;
        self.complete(
            Completion::PageProgram {
                address: addr,
                len: data.len(),
            },
            timings.program_backoff_us,
            allow_watch,
        )
        .await
    }

    /// Erase the 4 KiB sector at `addr`
    pub async fn erase_sector(&mut self, addr: u32) -> Result<()> {
        self.erase_unit(Operation::SectorErase, addr, true).await
    }

    /// Erase the 32 KiB block at `addr`
    pub async fn erase_block32(&mut self, addr: u32) -> Result<()> {
        self.erase_unit(Operation::BlockErase32, addr, true).await
    }

    /// Erase the 64 KiB block at `addr`
    pub async fn erase_block64(&mut self, addr: u32) -> Result<()> {
        self.erase_unit(Operation::BlockErase64, addr, true).await
    }

    /// Erase a sector-aligned range using the largest units that fit
    ///
    /// Always waits for each unit by polling, even in watch mode.
    pub async fn erase_range(&mut self, addr: u32, len: u32) -> Result<()> {
        let geometry = self.ensure_ready()?;
        if addr % SECTOR_SIZE != 0 || len % SECTOR_SIZE != 0 {
            return Err(Error::InvalidAlignment);
        }
        if !geometry.contains(addr, len as usize) {
            return Err(Error::AddressOutOfBounds);
        }

        let end = addr + len;
        let mut pos = addr;
        while pos < end {
            let remaining = end - pos;
            let (op, size) = if pos % BLOCK64_SIZE == 0 && remaining >= BLOCK64_SIZE {
                (Operation::BlockErase64, BLOCK64_SIZE)
            } else if pos % BLOCK32_SIZE == 0 && remaining >= BLOCK32_SIZE {
                (Operation::BlockErase32, BLOCK32_SIZE)
            } else {
                (Operation::SectorErase, SECTOR_SIZE)
            };
            self.erase_unit(op, pos, false).await?;
            pos += size;
        }

        Ok(())
    }

    async fn erase_unit(&mut self, op: Operation, addr: u32, allow_watch: bool) -> Result<()> {
        let geometry = self.ensure_ready()?;
        let (size, completion) = match op {
            Operation::SectorErase => (SECTOR_SIZE, Completion::SectorErase(addr)),
            Operation::BlockErase32 => (BLOCK32_SIZE, Completion::BlockErase32(addr)),
            _ => (BLOCK64_SIZE, Completion::BlockErase64(addr)),
        };
        if addr % size != 0 {
            return Err(Error::InvalidAlignment);
        }
        if !geometry.contains(addr, size as usize) {
            return Err(Error::AddressOutOfBounds);
        }

        log::debug!("{:?} at 0x{:06X}", op, addr);
        self.write_enabled_command(op, addr, &[]).await?;
        self.complete(completion, 0, allow_watch).await
    }

    /// Erase the whole array
    pub async fn erase_chip(&mut self) -> Result<()> {
        self.ensure_ready()?;
        log::info!("Erasing entire chip");
        self.write_enabled_command(Operation::ChipErase, 0, &[])
            .await?;
        self.complete(Completion::ChipErase, 0, true).await
    }

    /// Read the status register
    pub async fn read_status(&mut self) -> Result<StatusRegister> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        protocol::read_status(&mut self.bus, &t).await
    }

    /// Write the status register and wait for the write cycle
    ///
    /// WIP and WEL are read-only and dropped from `value`.
    pub async fn write_status(&mut self, value: StatusRegister) -> Result<()> {
        self.ensure_ready()?;
        let value = value.difference(StatusRegister::WIP | StatusRegister::WEL);
        log::debug!("Writing status register 0x{:02X}", value.bits());
        self.write_enabled_command(Operation::WriteStatus, 0, &[value.bits()])
            .await?;
        self.wait_register_write().await
    }

    /// Set the QE bit if it is not already set
    pub async fn enable_quad(&mut self) -> Result<()> {
        let status = self.read_status().await?;
        if status.quad_enabled() {
            return Ok(());
        }
        self.write_status(status | StatusRegister::QE).await
    }

    /// Read the function register
    pub async fn read_function_register(&mut self) -> Result<FunctionRegister> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        protocol::read_function(&mut self.bus, &t).await
    }

    /// Write the information row lock bits of the function register
    ///
    /// Lock bits are one-time programmable: bits already set on the chip
    /// are kept, and asking to clear one only logs a warning. The suspend
    /// status bits are read-only and ignored.
    pub async fn write_function_register(&mut self, value: FunctionRegister) -> Result<()> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        let current = protocol::read_function(&mut self.bus, &t).await?;

        let cleared = current.locks().difference(value.locks());
        if !cleared.is_empty() {
            log::warn!(
                "Information row lock bits 0x{:02X} cannot be cleared",
                cleared.bits()
            );
        }
        let value = value.locks() | current.locks();

        log::debug!("Writing function register 0x{:02X}", value.bits());
        self.write_enabled_command(Operation::WriteFunction, 0, &[value.bits()])
            .await?;
        self.wait_register_write().await
    }

    /// Permanently lock an information row
    pub async fn lock_information_row(&mut self, row: u8) -> Result<()> {
        self.ensure_ready()?;
        let bit = FunctionRegister::row_lock(row).ok_or(Error::AddressOutOfBounds)?;
        let current = self.read_function_register().await?;
        if current.contains(bit) {
            return Ok(());
        }
        log::info!("Locking information row {}", row);
        self.write_function_register(current | bit).await
    }

    /// Read the JEDEC manufacturer, type and capacity bytes
    ///
    /// Always talks to the chip; the cached value from `init` is available
    /// through [`identification`](Self::identification).
    pub async fn read_jedec_id(&mut self) -> Result<Identification> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        protocol::read_jedec_id(&mut self.bus, &t).await
    }

    /// Read the legacy 8-bit product id (0xAB)
    pub async fn read_product_id(&mut self) -> Result<u8> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        let mut buf = [0u8; 1];
        protocol::read_into(&mut self.bus, Operation::ReadProductId, 0, &mut buf, &t).await?;
        Ok(buf[0])
    }

    /// Read the manufacturer and device id pair (0x90)
    pub async fn read_manufacturer_device_id(&mut self) -> Result<(u8, u8)> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        let mut buf = [0u8; 2];
        protocol::read_into(
            &mut self.bus,
            Operation::ReadManufacturerDeviceId,
            0,
            &mut buf,
            &t,
        )
        .await?;
        Ok((buf[0], buf[1]))
    }

    /// Read the factory-programmed 128-bit unique id
    pub async fn read_unique_id(&mut self) -> Result<UniqueId> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        let mut id = [0u8; UNIQUE_ID_LEN];
        protocol::read_into(&mut self.bus, Operation::ReadUniqueId, 0, &mut id, &t).await?;
        Ok(id)
    }

    /// Read from the SFDP parameter table
    pub async fn read_sfdp(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.ensure_ready()?;
        let end = addr as u64 + buf.len() as u64;
        if end > Address::MAX as u64 + 1 {
            return Err(Error::AddressOutOfBounds);
        }
        let t = self.config.timeouts;
        protocol::read_into(&mut self.bus, Operation::ReadSfdp, addr, buf, &t).await
    }

    /// Read from an information row
    pub async fn read_information_row(
        &mut self,
        row: u8,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<()> {
        self.ensure_ready()?;
        let addr = info_row_range(row, offset, buf.len())?;
        let t = self.config.timeouts;
        protocol::read_into(&mut self.bus, Operation::ReadInfoRow, addr, buf, &t).await
    }

    /// Program an information row
    ///
    /// Fails with `Error::InformationRowLocked` if the row's lock bit is
    /// set; nothing is sent to the chip after the lock check in that case.
    pub async fn program_information_row(
        &mut self,
        row: u8,
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        self.ensure_ready()?;
        if data.is_empty() {
            return Err(Error::InvalidLength);
        }
        let addr = info_row_range(row, offset, data.len())?;

        let t = self.config.timeouts;
        let function = protocol::read_function(&mut self.bus, &t).await?;
        if function.is_row_locked(row) {
            return Err(Error::InformationRowLocked);
        }

        log::debug!("Programming information row {} offset {}", row, offset);
        self.write_enabled_command(Operation::ProgramInfoRow, addr, data)
            .await?;
        let timings = self.config.timings;
        self.complete(
            Completion::InfoRowProgram {
                row,
                len: data.len(),
            },
            timings.program_backoff_us,
            true,
        )
        .await
    }

    /// Set the write enable latch
    pub async fn write_enable(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        protocol::write_enable(&mut self.bus, &t).await?;
        self.state = State::WriteEnabled;
        Ok(())
    }

    /// Clear the write enable latch
    pub async fn write_disable(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        protocol::write_disable(&mut self.bus, &t).await?;
        self.state = State::Ready;
        Ok(())
    }

    /// Enter deep power-down
    ///
    /// Every operation except [`release_power_down`](Self::release_power_down)
    /// then fails with `Error::PoweredDown`.
    pub async fn deep_power_down(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let t = self.config.timeouts;
        protocol::simple(&mut self.bus, Operation::DeepPowerDown, &t).await?;
        self.bus.delay_us(self.config.timings.power_down_us).await;
        self.powered_down = true;
        log::debug!("Entered deep power-down");
        Ok(())
    }

    /// Leave deep power-down
    pub async fn release_power_down(&mut self) -> Result<()> {
        match self.state {
            State::Uninitialized => return Err(Error::NotInitialized),
            State::Busy(_) => return Err(Error::Busy),
            State::Ready | State::WriteEnabled => {}
        }
        let t = self.config.timeouts;
        protocol::simple(&mut self.bus, Operation::ReleasePowerDown, &t).await?;
        self.bus.delay_us(self.config.timings.release_us).await;
        self.powered_down = false;
        log::debug!("Released from deep power-down");
        Ok(())
    }

    /// Software reset: Reset Enable followed by Reset
    ///
    /// The cached identification and geometry stay valid. Also accepted
    /// while `Busy`: the armed watch is disarmed and the running cycle is
    /// abandoned without notifying the sink.
    pub async fn reset(&mut self) -> Result<()> {
        if self.powered_down {
            return Err(Error::PoweredDown);
        }
        match self.state {
            State::Uninitialized => return Err(Error::NotInitialized),
            State::Busy(completion) => {
                log::warn!("Reset while {:?} is pending, abandoning it", completion);
                self.bus.cancel_watch().await?;
            }
            State::Ready | State::WriteEnabled => {}
        }
        let t = self.config.timeouts;
        let recovery = self.config.timings.reset_recovery_us;
        protocol::software_reset(&mut self.bus, recovery, &t).await?;
        self.state = State::Ready;
        log::info!("Flash reset");
        Ok(())
    }

    /// Wait for a cycle started in watch mode without relying on the match
    ///
    /// Disarms the watch and polls the status register under the cycle's
    /// poll policy. On success the sink is notified once. If the chip is
    /// still busy when the policy runs out this returns `Timeout` and the
    /// driver goes back to `Ready` without notifying. Returns immediately
    /// when nothing is pending.
    pub async fn wait_watch(&mut self) -> Result<()> {
        let State::Busy(completion) = self.state else {
            return Ok(());
        };
        if let Err(e) = self.bus.cancel_watch().await {
            self.state = State::Ready;
            return Err(e);
        }
        self.finish(completion).await
    }

    async fn write_enabled_command(&mut self, op: Operation, addr: u32, data: &[u8]) -> Result<()> {
        let t = self.config.timeouts;
        protocol::write_enable(&mut self.bus, &t).await?;
        self.state = State::WriteEnabled;
        protocol::write_from(&mut self.bus, op, addr, data, &t).await
    }

    async fn wait_register_write(&mut self) -> Result<()> {
        let t = self.config.timeouts;
        let poll = self.config.timings.register_write;
        let result = protocol::wait_ready(&mut self.bus, poll, &t).await;
        self.state = State::Ready;
        result
    }

    async fn complete(
        &mut self,
        completion: Completion,
        backoff_us: u32,
        allow_watch: bool,
    ) -> Result<()> {
        self.state = State::Busy(completion);
        if backoff_us > 0 {
            self.bus.delay_us(backoff_us).await;
        }

        if allow_watch && self.config.completion == CompletionMode::Watch {
            if self.bus.features().contains(BusFeatures::AUTO_POLL) {
                let interval = self.config.timings.watch_interval;
                return match protocol::arm_ready_watch(&mut self.bus, interval).await {
                    Ok(()) => {
                        log::trace!("Watch armed for {:?}", completion);
                        Ok(())
                    }
                    Err(e) => {
                        self.state = State::Ready;
                        Err(e)
                    }
                };
            }
            log::debug!("Transport has no status watch, polling instead");
        }

        self.finish(completion).await
    }

    async fn finish(&mut self, completion: Completion) -> Result<()> {
        let t = self.config.timeouts;
        let poll = self.poll_policy(&completion);
        let result = protocol::wait_ready(&mut self.bus, poll, &t).await;
        self.state = State::Ready;
        match result {
            Ok(()) => {
                self.notify(completion);
                Ok(())
            }
            Err(e) => {
                log::warn!("{:?} did not complete: {}", completion, e);
                Err(e)
            }
        }
    }
}

fn info_row_range(row: u8, offset: u32, len: usize) -> Result<u32> {
    let base = info_row_address(row).ok_or(Error::AddressOutOfBounds)?;
    if offset as u64 + len as u64 > INFO_ROW_SIZE as u64 {
        return Err(Error::AddressOutOfBounds);
    }
    Ok(base + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_row_range() {
        assert_eq!(info_row_range(0, 0, 256), Ok(0));
        assert_eq!(info_row_range(2, 0x10, 16), Ok(0x2010));
        assert_eq!(info_row_range(3, 255, 1), Ok(0x30FF));
        assert_eq!(info_row_range(3, 255, 2), Err(Error::AddressOutOfBounds));
        assert_eq!(info_row_range(4, 0, 1), Err(Error::AddressOutOfBounds));
    }
}
