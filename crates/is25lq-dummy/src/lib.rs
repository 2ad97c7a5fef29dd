//! is25lq-dummy - In-memory IS25LQ flash emulator
//!
//! This crate provides a [`QspiBus`] transport backed by an emulated
//! IS25LQ chip. Every transaction is appended to a shared [`Trace`], so
//! tests can check the exact command sequence the driver produced.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use is25lq_core::bus::{BusFeatures, QspiBus, StatusWatch};
use is25lq_core::chip::{resolve, UniqueId, INFO_ROW_COUNT, INFO_ROW_SIZE, INFO_ROW_STRIDE};
use is25lq_core::error::{Error, Result};
use is25lq_core::flash::Completion;
use is25lq_core::register::{FunctionRegister, StatusRegister};
use is25lq_core::spi::{opcodes, Command};

/// Array size used when the configured capacity code is not a known part
const FALLBACK_SIZE: usize = 512 * 1024;

/// SFDP header signature, "SFDP" little-endian
const SFDP_SIGNATURE: [u8; 4] = *b"SFDP";

const ROW_SIZE: usize = INFO_ROW_SIZE as usize;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC memory type
    pub device_type: u8,
    /// JEDEC capacity code, also selects the array size
    pub capacity_code: u8,
    /// Legacy product id returned by 0xAB and 0x90
    pub product_id: u8,
    /// Factory unique id
    pub unique_id: UniqueId,
    /// Number of status reads that report WIP after each write cycle
    pub busy_polls: u32,
    /// Features advertised to the driver
    pub features: BusFeatures,
    /// Largest single data phase
    pub max_transfer_len: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0x9D, // ISSI
            device_type: 0x40,
            capacity_code: 0x13, // IS25LQ040B
            product_id: 0x12,
            unique_id: [
                0x49, 0x53, 0x32, 0x35, 0x4C, 0x51, 0x30, 0x34, 0x30, 0x42, 0x00, 0x01, 0x02, 0x03,
                0x04, 0x05,
            ],
            busy_polls: 2,
            features: BusFeatures::DUAL_IO | BusFeatures::QUAD_OUT,
            max_transfer_len: 4096,
        }
    }
}

impl DummyConfig {
    /// Array size in bytes implied by the capacity code
    pub fn size(&self) -> usize {
        resolve(self.capacity_code)
            .map(|g| g.capacity() as usize)
            .unwrap_or(FALLBACK_SIZE)
    }
}

/// One recorded bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A command phase, recorded even if it then fails
    Command(Command),
    /// A receive data phase of the given length
    Receive(usize),
    /// A transmit data phase of the given length
    Transmit(usize),
    /// A hardware status watch was armed
    WatchArmed(StatusWatch),
    /// An armed watch was disarmed before it matched
    WatchCancelled,
    /// A delay request in microseconds
    Delay(u32),
    /// A completion delivered to a sink that records into the trace
    Notified(Completion),
}

/// Shared, append-only transaction log
pub type Trace = Rc<RefCell<Vec<TraceEvent>>>;

/// Opcodes of every command phase in the trace, in order
pub fn command_opcodes(events: &[TraceEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            TraceEvent::Command(cmd) => Some(cmd.opcode),
            _ => None,
        })
        .collect()
}

/// Dummy flash transport
///
/// Emulates an IS25LQ chip in memory. Like the real part it silently
/// ignores program, erase and register writes without the write enable
/// latch, ignores everything but Release Power-Down while powered down,
/// and only honours Reset directly after Reset Enable. A reset during a
/// write cycle abandons the cycle.
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    info_rows: [[u8; ROW_SIZE]; INFO_ROW_COUNT as usize],
    status: StatusRegister,
    function: FunctionRegister,
    write_enabled: bool,
    busy_polls_left: u32,
    powered_down: bool,
    reset_enabled: bool,
    pending: Option<Command>,
    watch: Option<StatusWatch>,
    fail_commands: bool,
    trace: Trace,
}

impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size()];
        Self {
            config,
            data,
            info_rows: [[0xFF; ROW_SIZE]; INFO_ROW_COUNT as usize],
            status: StatusRegister::empty(),
            function: FunctionRegister::empty(),
            write_enabled: false,
            busy_polls_left: 0,
            powered_down: false,
            reset_enabled: false,
            pending: None,
            watch: None,
            fail_commands: false,
            trace: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Create a new dummy flash with default configuration (IS25LQ040B)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Handle to the transaction log
    pub fn trace(&self) -> Trace {
        Rc::clone(&self.trace)
    }

    /// Make every following command phase fail with `Error::Transport`
    pub fn set_fail_commands(&mut self, fail: bool) {
        self.fail_commands = fail;
    }

    /// Contents of an information row
    pub fn info_row(&self, row: u8) -> &[u8] {
        &self.info_rows[row as usize]
    }

    /// Mutable contents of an information row, for restoring saved state
    pub fn info_row_mut(&mut self, row: u8) -> &mut [u8] {
        &mut self.info_rows[row as usize]
    }

    /// Current function register, including lock bits
    pub fn function_register(&self) -> FunctionRegister {
        self.function
    }

    /// Preset the information row lock bits
    pub fn set_row_locks(&mut self, locks: FunctionRegister) {
        self.function = locks.locks();
    }

    /// Returns true while the emulated chip is in deep power-down
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    /// The armed hardware watch, if any
    pub fn watch(&self) -> Option<StatusWatch> {
        self.watch
    }

    /// Evaluate the armed watch once, like the controller's auto-poll would
    ///
    /// Returns true and disarms the watch when the masked status matches.
    /// This is the point where a real controller raises its match
    /// interrupt.
    pub fn poll_watch(&mut self) -> bool {
        let Some(watch) = self.watch else {
            return false;
        };
        if self.status_byte() & watch.mask == watch.match_value {
            self.watch = None;
            true
        } else {
            false
        }
    }

    fn record(&self, event: TraceEvent) {
        self.trace.borrow_mut().push(event);
    }

    fn start_cycle(&mut self) {
        if self.config.busy_polls == 0 {
            self.write_enabled = false;
        } else {
            self.busy_polls_left = self.config.busy_polls;
        }
    }

    fn status_byte(&mut self) -> u8 {
        let mut status = self.status;
        if self.write_enabled {
            status |= StatusRegister::WEL;
        }
        if self.busy_polls_left > 0 {
            status |= StatusRegister::WIP;
            self.busy_polls_left -= 1;
            if self.busy_polls_left == 0 {
                self.write_enabled = false;
            }
        }
        status.bits()
    }

    fn erase(&mut self, cmd: &Command, size: usize) {
        if !self.write_enabled {
            log::debug!("dummy: erase 0x{:02X} without WEL ignored", cmd.opcode);
            return;
        }
        let addr = cmd.address.unwrap_or(0) as usize;
        let aligned = addr & !(size - 1);
        if aligned + size <= self.data.len() {
            self.data[aligned..aligned + size].fill(0xFF);
        }
        self.start_cycle();
    }

    fn chip_erase(&mut self) {
        if !self.write_enabled {
            log::debug!("dummy: chip erase without WEL ignored");
            return;
        }
        self.data.fill(0xFF);
        self.start_cycle();
    }

    fn soft_reset(&mut self) {
        self.write_enabled = false;
        self.busy_polls_left = 0;
        self.watch = None;
        self.function = self.function.locks();
    }

    fn read_array(&self, cmd: &Command, buf: &mut [u8]) {
        if cmd.opcode == opcodes::FRQO && !self.status.quad_enabled() {
            // Without QE the IO2/IO3 pins are not driven
            buf.fill(0xFF);
            return;
        }
        let addr = cmd.address.unwrap_or(0) as usize;
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.data[(addr + i) % self.data.len()];
        }
    }

    fn info_row_slot(addr: u32) -> Option<(usize, usize)> {
        let row = (addr / INFO_ROW_STRIDE) as usize;
        let offset = (addr % INFO_ROW_STRIDE) as usize;
        if row < INFO_ROW_COUNT as usize && offset < ROW_SIZE {
            Some((row, offset))
        } else {
            None
        }
    }

    fn page_program(&mut self, cmd: &Command, data: &[u8]) {
        let addr = cmd.address.unwrap_or(0) as usize;
        let page = addr & !(opcodes::PAGE_SIZE as usize - 1);
        let size = self.data.len();
        // Bytes past the end of the page wrap to its start
        for (i, &byte) in data.iter().enumerate() {
            let idx = page + ((addr + i) & (opcodes::PAGE_SIZE as usize - 1));
            self.data[idx % size] &= byte;
        }
        self.start_cycle();
    }

    fn program_info_row(&mut self, cmd: &Command, data: &[u8]) {
        let addr = cmd.address.unwrap_or(0);
        let Some((row, offset)) = Self::info_row_slot(addr) else {
            self.write_enabled = false;
            return;
        };
        if self.function.is_row_locked(row as u8) {
            log::debug!("dummy: information row {} is locked", row);
            self.write_enabled = false;
            return;
        }
        for (i, &byte) in data.iter().enumerate() {
            if let Some(slot) = self.info_rows[row].get_mut(offset + i) {
                *slot &= byte;
            }
        }
        self.start_cycle();
    }
}

impl QspiBus for DummyFlash {
    fn features(&self) -> BusFeatures {
        self.config.features
    }

    fn max_transfer_len(&self) -> usize {
        self.config.max_transfer_len
    }

    fn command(&mut self, cmd: &Command, _timeout_ms: u32) -> Result<()> {
        self.record(TraceEvent::Command(*cmd));
        if self.fail_commands {
            return Err(Error::Transport);
        }

        self.pending = None;
        if cmd.opcode == opcodes::RDPD {
            self.powered_down = false;
        }
        if self.powered_down {
            log::trace!("dummy: 0x{:02X} ignored in deep power-down", cmd.opcode);
            return Ok(());
        }
        // Status reads and the reset sequence still work mid-cycle
        let busy_ok = matches!(cmd.opcode, opcodes::RDSR | opcodes::RSTEN | opcodes::RST);
        if self.busy_polls_left > 0 && !busy_ok {
            log::warn!("dummy: 0x{:02X} ignored while busy", cmd.opcode);
            return Ok(());
        }

        let reset_enabled = core::mem::take(&mut self.reset_enabled);

        if cmd.has_read() || cmd.has_write() {
            self.pending = Some(*cmd);
            return Ok(());
        }

        match cmd.opcode {
            opcodes::WREN => self.write_enabled = true,
            opcodes::WRDI => self.write_enabled = false,
            opcodes::SER => self.erase(cmd, opcodes::SECTOR_SIZE as usize),
            opcodes::BER32 => self.erase(cmd, opcodes::BLOCK32_SIZE as usize),
            opcodes::BER64 => self.erase(cmd, opcodes::BLOCK64_SIZE as usize),
            opcodes::CER | opcodes::CER_60 => self.chip_erase(),
            opcodes::DP => self.powered_down = true,
            opcodes::RDPD => {}
            opcodes::RSTEN => self.reset_enabled = true,
            opcodes::RST => {
                if reset_enabled {
                    self.soft_reset();
                } else {
                    log::debug!("dummy: reset without reset enable ignored");
                }
            }
            other => log::debug!("dummy: unhandled opcode 0x{:02X}", other),
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<()> {
        self.record(TraceEvent::Receive(buf.len()));
        let Some(cmd) = self.pending.take() else {
            // Nobody drives the bus
            buf.fill(0xFF);
            return Ok(());
        };
        if !cmd.has_read() {
            return Err(Error::Transport);
        }

        match cmd.opcode {
            opcodes::RD | opcodes::FR | opcodes::FRDIO | opcodes::FRQO => {
                self.read_array(&cmd, buf)
            }
            opcodes::RDSR => {
                for byte in buf.iter_mut() {
                    *byte = self.status_byte();
                }
            }
            opcodes::RDFR => buf.fill(self.function.bits()),
            opcodes::RDJDID => {
                let id = [
                    self.config.manufacturer_id,
                    self.config.device_type,
                    self.config.capacity_code,
                ];
                for (byte, value) in buf.iter_mut().zip(id.iter().cycle()) {
                    *byte = *value;
                }
            }
            opcodes::RDID => buf.fill(self.config.product_id),
            opcodes::RDMDID => {
                let id = [self.config.manufacturer_id, self.config.product_id];
                for (byte, value) in buf.iter_mut().zip(id.iter().cycle()) {
                    *byte = *value;
                }
            }
            opcodes::RDUID => {
                for (byte, value) in buf.iter_mut().zip(self.config.unique_id.iter().cycle()) {
                    *byte = *value;
                }
            }
            opcodes::RDSFDP => {
                let addr = cmd.address.unwrap_or(0) as usize;
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = SFDP_SIGNATURE.get(addr + i).copied().unwrap_or(0xFF);
                }
            }
            opcodes::IRRD => {
                let addr = cmd.address.unwrap_or(0);
                match Self::info_row_slot(addr) {
                    Some((row, offset)) => {
                        for (i, byte) in buf.iter_mut().enumerate() {
                            *byte = self.info_rows[row].get(offset + i).copied().unwrap_or(0xFF);
                        }
                    }
                    None => buf.fill(0xFF),
                }
            }
            _ => buf.fill(0xFF),
        }
        Ok(())
    }

    fn transmit(&mut self, data: &[u8], _timeout_ms: u32) -> Result<()> {
        self.record(TraceEvent::Transmit(data.len()));
        let Some(cmd) = self.pending.take() else {
            return Ok(());
        };
        if !cmd.has_write() {
            return Err(Error::Transport);
        }
        if !self.write_enabled {
            log::debug!("dummy: 0x{:02X} without WEL ignored", cmd.opcode);
            return Ok(());
        }

        match cmd.opcode {
            opcodes::PP => self.page_program(&cmd, data),
            opcodes::IRP => self.program_info_row(&cmd, data),
            opcodes::WRSR => {
                if let Some(&value) = data.first() {
                    self.status = StatusRegister::from(value)
                        .difference(StatusRegister::WIP | StatusRegister::WEL);
                }
                self.start_cycle();
            }
            opcodes::WRFR => {
                // Lock bits are OTP, suspend bits are read-only
                if let Some(&value) = data.first() {
                    self.function |= FunctionRegister::from(value).locks();
                }
                self.start_cycle();
            }
            other => log::debug!("dummy: unhandled write opcode 0x{:02X}", other),
        }
        Ok(())
    }

    fn watch_until_clear(&mut self, _cmd: &Command, watch: &StatusWatch) -> Result<()> {
        self.record(TraceEvent::WatchArmed(*watch));
        if !self.config.features.contains(BusFeatures::AUTO_POLL) {
            return Err(Error::WatchNotSupported);
        }
        self.watch = Some(*watch);
        Ok(())
    }

    fn cancel_watch(&mut self) -> Result<()> {
        if self.watch.take().is_some() {
            self.record(TraceEvent::WatchCancelled);
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        // No real delay needed for in-memory operations
        self.record(TraceEvent::Delay(us));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use core::cell::Cell;
    use is25lq_core::chip::{Geometry, Identification};
    use is25lq_core::flash::{CompletionSink, Config, Is25lq, PollPolicy, State};
    use is25lq_core::spi::Direction;

    fn driver(
        dummy: DummyConfig,
        config: Config,
    ) -> (Is25lq<DummyFlash, impl CompletionSink>, Trace) {
        let bus = DummyFlash::new(dummy);
        let trace = bus.trace();
        let sink_trace = bus.trace();
        let flash = Is25lq::new(bus, config).with_completion_sink(move |done| {
            sink_trace.borrow_mut().push(TraceEvent::Notified(done));
        });
        (flash, trace)
    }

    /// Initialized driver with an empty trace
    fn ready(
        dummy: DummyConfig,
        config: Config,
    ) -> (Is25lq<DummyFlash, impl CompletionSink>, Trace) {
        let (mut flash, trace) = driver(dummy, config);
        flash.init().unwrap();
        trace.borrow_mut().clear();
        (flash, trace)
    }

    fn notified(trace: &Trace) -> Vec<Completion> {
        trace
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Notified(done) => Some(*done),
                _ => None,
            })
            .collect()
    }

    fn has_data_phase(trace: &Trace) -> bool {
        trace
            .borrow()
            .iter()
            .any(|e| matches!(e, TraceEvent::Receive(_) | TraceEvent::Transmit(_)))
    }

    fn commands(trace: &Trace, opcode: u8) -> Vec<Command> {
        trace
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Command(cmd) if cmd.opcode == opcode => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_emulator_ignores_program_without_wel() {
        let mut flash = DummyFlash::new_default();
        flash
            .command(&Command::write_3b(opcodes::PP, 0, 4), 100)
            .unwrap();
        flash.transmit(&[0x00; 4], 100).unwrap();
        assert!(flash.data()[..4].iter().all(|&b| b == 0xFF));

        flash.command(&Command::simple(opcodes::WREN), 100).unwrap();
        flash
            .command(&Command::write_3b(opcodes::PP, 0, 4), 100)
            .unwrap();
        flash.transmit(&[0x12, 0x34, 0x56, 0x78], 100).unwrap();
        assert_eq!(&flash.data()[..4], &[0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_emulator_reset_needs_enable() {
        let mut flash = DummyFlash::new_default();
        let mut status = [0u8; 1];

        flash.command(&Command::simple(opcodes::WREN), 100).unwrap();
        flash.command(&Command::simple(opcodes::RST), 100).unwrap();
        flash
            .command(&Command::read_reg(opcodes::RDSR, 1), 100)
            .unwrap();
        flash.receive(&mut status, 100).unwrap();
        assert!(StatusRegister::from(status[0]).write_enabled());

        flash.command(&Command::simple(opcodes::RSTEN), 100).unwrap();
        flash.command(&Command::simple(opcodes::RST), 100).unwrap();
        flash
            .command(&Command::read_reg(opcodes::RDSR, 1), 100)
            .unwrap();
        flash.receive(&mut status, 100).unwrap();
        assert!(!StatusRegister::from(status[0]).write_enabled());
    }

    #[test]
    fn test_emulator_watch_matches_once_idle() {
        let config = DummyConfig {
            features: BusFeatures::AUTO_POLL,
            ..Default::default()
        };
        let mut flash = DummyFlash::new(config);
        let watch = StatusWatch {
            mask: StatusRegister::WIP.bits(),
            match_value: 0,
            interval: 0x10,
        };
        assert!(!flash.poll_watch());

        flash.command(&Command::simple(opcodes::WREN), 100).unwrap();
        flash
            .command(&Command::erase_3b(opcodes::SER, 0), 100)
            .unwrap();
        flash
            .watch_until_clear(&Command::read_reg(opcodes::RDSR, 1), &watch)
            .unwrap();

        // Two busy reads, then the match
        assert!(!flash.poll_watch());
        assert!(!flash.poll_watch());
        assert!(flash.poll_watch());
        assert_eq!(flash.watch(), None);
    }

    #[test]
    fn test_emulator_watch_needs_auto_poll() {
        let mut flash = DummyFlash::new_default();
        let watch = StatusWatch {
            mask: 0x01,
            match_value: 0,
            interval: 0x10,
        };
        assert_eq!(
            flash.watch_until_clear(&Command::read_reg(opcodes::RDSR, 1), &watch),
            Err(Error::WatchNotSupported)
        );
    }

    #[test]
    fn test_init_resolves_geometry() {
        for (code, geometry) in [
            (0x13, Geometry::new(8, 16, 128)),
            (0x10, Geometry::new(0, 2, 16)),
            (0x09, Geometry::new(0, 1, 8)),
        ] {
            let dummy = DummyConfig {
                capacity_code: code,
                ..Default::default()
            };
            let (mut flash, trace) = driver(dummy, Config::default());

            assert_eq!(flash.init(), Ok(geometry));
            assert_eq!(flash.geometry(), Some(geometry));
            assert_eq!(flash.state(), State::Ready);
            assert_eq!(
                command_opcodes(&trace.borrow()),
                vec![opcodes::RDPD, opcodes::RDJDID]
            );

            let id = flash.identification().unwrap();
            assert_eq!(id.capacity, code);
            assert!(id.is_issi());
        }
    }

    #[test]
    fn test_init_without_release() {
        let config = Config {
            release_on_init: false,
            ..Default::default()
        };
        let (mut flash, trace) = driver(DummyConfig::default(), config);
        flash.init().unwrap();
        assert_eq!(command_opcodes(&trace.borrow()), vec![opcodes::RDJDID]);
    }

    #[test]
    fn test_init_rejects_unknown_capacity() {
        let dummy = DummyConfig {
            capacity_code: 0xFF,
            ..Default::default()
        };
        let (mut flash, _trace) = driver(dummy, Config::default());

        assert_eq!(flash.init(), Err(Error::UnsupportedCapacity(0xFF)));
        assert_eq!(flash.state(), State::Uninitialized);
        assert_eq!(flash.geometry(), None);
        assert_eq!(flash.identification(), None);

        let mut buf = [0u8; 4];
        assert_eq!(flash.read(0, &mut buf), Err(Error::NotInitialized));
    }

    #[test]
    fn test_everything_but_init_requires_init() {
        let (mut flash, trace) = driver(DummyConfig::default(), Config::default());
        let mut buf = [0u8; 4];
        let not_init = Err(Error::NotInitialized);

        assert_eq!(flash.read(0, &mut buf), not_init);
        assert_eq!(flash.fast_read(0, &mut buf), not_init);
        assert_eq!(flash.quad_fast_read(0, &mut buf), not_init);
        assert_eq!(flash.page_program(0, &[0]), not_init);
        assert_eq!(flash.write(0, &[0]), not_init);
        assert_eq!(flash.erase_sector(0), not_init);
        assert_eq!(flash.erase_block64(0), not_init);
        assert_eq!(flash.erase_range(0, 0x1000), not_init);
        assert_eq!(flash.erase_chip(), not_init);
        assert_eq!(flash.read_status(), Err(Error::NotInitialized));
        assert_eq!(flash.write_status(StatusRegister::empty()), not_init);
        assert_eq!(flash.read_function_register(), Err(Error::NotInitialized));
        assert_eq!(flash.lock_information_row(0), not_init);
        assert_eq!(flash.read_jedec_id(), Err(Error::NotInitialized));
        assert_eq!(flash.read_product_id(), Err(Error::NotInitialized));
        assert_eq!(flash.read_unique_id(), Err(Error::NotInitialized));
        assert_eq!(flash.read_sfdp(0, &mut buf), not_init);
        assert_eq!(flash.read_information_row(0, 0, &mut buf), not_init);
        assert_eq!(flash.program_information_row(0, 0, &[0]), not_init);
        assert_eq!(flash.write_enable(), not_init);
        assert_eq!(flash.write_disable(), not_init);
        assert_eq!(flash.deep_power_down(), not_init);
        assert_eq!(flash.release_power_down(), not_init);
        assert_eq!(flash.reset(), not_init);

        assert!(trace.borrow().is_empty());
    }

    #[test]
    fn test_write_enable_precedes_every_mutation() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());

        flash.page_program(0x100, &[0x5A; 16]).unwrap();
        flash.erase_sector(0x1000).unwrap();
        flash.erase_block32(0x8000).unwrap();
        flash.erase_block64(0x1_0000).unwrap();
        flash.erase_chip().unwrap();
        flash.write_status(StatusRegister::QE).unwrap();
        flash
            .write_function_register(FunctionRegister::empty())
            .unwrap();
        flash.program_information_row(0, 0, &[0x11; 8]).unwrap();

        let ops = command_opcodes(&trace.borrow());
        let mutating = [
            opcodes::PP,
            opcodes::SER,
            opcodes::BER32,
            opcodes::BER64,
            opcodes::CER,
            opcodes::WRSR,
            opcodes::WRFR,
            opcodes::IRP,
        ];
        let mut seen = 0;
        for (i, op) in ops.iter().enumerate() {
            if mutating.contains(op) {
                assert!(i > 0);
                assert_eq!(ops[i - 1], opcodes::WREN, "opcode 0x{:02X}", op);
                seen += 1;
            }
        }
        assert_eq!(seen, mutating.len());
    }

    #[test]
    fn test_reads_never_enable_writes() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        let mut buf = [0u8; 32];

        flash.read(0, &mut buf).unwrap();
        flash.fast_read(0, &mut buf).unwrap();
        flash.dual_fast_read(0, &mut buf).unwrap();
        flash.quad_fast_read(0, &mut buf).unwrap();
        flash.read_status().unwrap();
        flash.read_function_register().unwrap();
        flash.read_jedec_id().unwrap();
        flash.read_product_id().unwrap();
        flash.read_manufacturer_device_id().unwrap();
        flash.read_unique_id().unwrap();
        flash.read_sfdp(0, &mut buf).unwrap();
        flash.read_information_row(0, 0, &mut buf).unwrap();

        assert!(!command_opcodes(&trace.borrow()).contains(&opcodes::WREN));
        assert_eq!(flash.state(), State::Ready);
    }

    #[test]
    fn test_completion_after_busy_clears() {
        let dummy = DummyConfig {
            busy_polls: 3,
            ..Default::default()
        };
        let (mut flash, trace) = ready(dummy, Config::default());

        flash.erase_sector(0).unwrap();

        let events = trace.borrow().clone();
        let done: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, TraceEvent::Notified(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(done.len(), 1);
        assert_eq!(events[done[0]], TraceEvent::Notified(Completion::SectorErase(0)));

        let last_poll = events
            .iter()
            .rposition(|e| matches!(e, TraceEvent::Command(c) if c.opcode == opcodes::RDSR))
            .unwrap();
        assert!(done[0] > last_poll);
        assert_eq!(commands(&trace, opcodes::RDSR).len(), 4);
        assert_eq!(flash.state(), State::Ready);
    }

    #[test]
    fn test_program_backoff_before_polling() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        flash.page_program(0, &[0x00; 4]).unwrap();

        let events = trace.borrow().clone();
        let pp = events
            .iter()
            .position(|e| matches!(e, TraceEvent::Command(c) if c.opcode == opcodes::PP))
            .unwrap();
        assert_eq!(events[pp + 1], TraceEvent::Transmit(4));
        assert_eq!(events[pp + 2], TraceEvent::Delay(800));
        assert!(matches!(events[pp + 3], TraceEvent::Command(c) if c.opcode == opcodes::RDSR));
    }

    #[test]
    fn test_command_failure_skips_data_phase() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        flash.bus_mut().set_fail_commands(true);
        let mut buf = [0u8; 16];
        let transport = Err(Error::Transport);

        // Reads
        assert_eq!(flash.read(0, &mut buf), transport);
        assert_eq!(flash.fast_read(0, &mut buf), transport);
        assert_eq!(flash.dual_fast_read(0, &mut buf), transport);
        assert_eq!(flash.quad_fast_read(0, &mut buf), transport);
        assert_eq!(flash.read_sfdp(0, &mut buf), transport);
        assert_eq!(flash.read_information_row(0, 0, &mut buf), transport);

        // Identification and registers
        assert_eq!(flash.read_jedec_id(), Err(Error::Transport));
        assert_eq!(flash.read_product_id(), Err(Error::Transport));
        assert_eq!(flash.read_manufacturer_device_id(), Err(Error::Transport));
        assert_eq!(flash.read_unique_id(), Err(Error::Transport));
        assert_eq!(flash.read_status(), Err(Error::Transport));
        assert_eq!(flash.read_function_register(), Err(Error::Transport));
        assert_eq!(flash.write_status(StatusRegister::QE), transport);
        assert_eq!(flash.enable_quad(), transport);
        assert_eq!(
            flash.write_function_register(FunctionRegister::IRL0),
            transport
        );
        assert_eq!(flash.lock_information_row(0), transport);

        // Program and erase
        assert_eq!(flash.page_program(0, &[0x00; 4]), transport);
        assert_eq!(flash.write(0, &[0x00; 300]), transport);
        assert_eq!(flash.erase_sector(0), transport);
        assert_eq!(flash.erase_block32(0), transport);
        assert_eq!(flash.erase_block64(0), transport);
        assert_eq!(flash.erase_range(0, 0x1_0000), transport);
        assert_eq!(flash.erase_chip(), transport);
        assert_eq!(flash.program_information_row(0, 0, &[0]), transport);

        // Control
        assert_eq!(flash.write_enable(), transport);
        assert_eq!(flash.write_disable(), transport);
        assert_eq!(flash.reset(), transport);
        assert_eq!(flash.deep_power_down(), transport);
        assert_eq!(flash.release_power_down(), transport);

        assert!(!has_data_phase(&trace));
        assert!(notified(&trace).is_empty());
        assert!(!flash.is_powered_down());
    }

    #[test]
    fn test_init_transport_failure() {
        let mut bus = DummyFlash::new_default();
        bus.set_fail_commands(true);
        let trace = bus.trace();
        let mut flash = Is25lq::new(bus, Config::default());

        assert_eq!(flash.init(), Err(Error::Transport));
        assert_eq!(flash.state(), State::Uninitialized);
        assert!(!has_data_phase(&trace));
    }

    #[test]
    fn test_reset_sequence() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        flash.write_enable().unwrap();
        assert_eq!(flash.state(), State::WriteEnabled);
        trace.borrow_mut().clear();

        flash.reset().unwrap();

        {
            let events = trace.borrow();
            assert_eq!(command_opcodes(&events), vec![opcodes::RSTEN, opcodes::RST]);
            // Nothing between the two commands
            assert!(matches!(events[0], TraceEvent::Command(c) if c.opcode == opcodes::RSTEN));
            assert!(matches!(events[1], TraceEvent::Command(c) if c.opcode == opcodes::RST));
            for event in events.iter() {
                if let TraceEvent::Command(cmd) = event {
                    assert!(!cmd.has_address());
                    assert_eq!(cmd.direction, Direction::None);
                    assert_eq!(cmd.data_len, 0);
                }
            }
        }
        assert!(!has_data_phase(&trace));
        assert_eq!(flash.state(), State::Ready);
        assert!(!flash.read_status().unwrap().write_enabled());
    }

    #[test]
    fn test_deep_power_down_rejects_commands() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        flash.page_program(0, &[0xA5]).unwrap();

        flash.deep_power_down().unwrap();
        assert!(flash.is_powered_down());
        assert!(flash.bus().is_powered_down());
        trace.borrow_mut().clear();

        let mut buf = [0u8; 1];
        let powered_down = Err(Error::PoweredDown);
        assert_eq!(flash.read(0, &mut buf), powered_down);
        assert_eq!(flash.page_program(0, &[0]), powered_down);
        assert_eq!(flash.erase_sector(0), powered_down);
        assert_eq!(flash.read_status(), Err(Error::PoweredDown));
        assert_eq!(flash.read_jedec_id(), Err(Error::PoweredDown));
        assert_eq!(flash.write_enable(), powered_down);
        assert_eq!(flash.reset(), powered_down);
        assert_eq!(flash.deep_power_down(), powered_down);
        assert!(trace.borrow().is_empty());

        flash.release_power_down().unwrap();
        assert_eq!(command_opcodes(&trace.borrow()), vec![opcodes::RDPD]);
        assert!(!flash.is_powered_down());
        assert!(!flash.bus().is_powered_down());

        flash.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xA5]);
    }

    #[test]
    fn test_watch_mode_completion() {
        let dummy = DummyConfig {
            features: BusFeatures::DUAL_IO | BusFeatures::QUAD_OUT | BusFeatures::AUTO_POLL,
            busy_polls: 0,
            ..Default::default()
        };
        let (mut flash, trace) = ready(dummy, Config::default().with_watch());

        flash.erase_sector(0x2000).unwrap();
        assert_eq!(flash.state(), State::Busy(Completion::SectorErase(0x2000)));
        assert_eq!(
            flash.bus().watch(),
            Some(StatusWatch {
                mask: 0x01,
                match_value: 0,
                interval: 0x10,
            })
        );
        assert!(notified(&trace).is_empty());
        assert!(commands(&trace, opcodes::RDSR).is_empty());

        let mut buf = [0u8; 4];
        assert_eq!(flash.read(0, &mut buf), Err(Error::Busy));
        assert_eq!(flash.erase_chip(), Err(Error::Busy));
        assert_eq!(flash.init(), Err(Error::Busy));

        assert_eq!(
            flash.handle_ready_match(),
            Some(Completion::SectorErase(0x2000))
        );
        assert_eq!(flash.state(), State::Ready);
        assert_eq!(notified(&trace), vec![Completion::SectorErase(0x2000)]);

        // A spurious match does not notify again
        assert_eq!(flash.handle_ready_match(), None);
        assert_eq!(notified(&trace).len(), 1);
        flash.read(0, &mut buf).unwrap();
    }

    #[test]
    fn test_watch_mode_without_auto_poll_polls() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default().with_watch());

        flash.erase_sector(0).unwrap();
        assert_eq!(flash.state(), State::Ready);
        assert_eq!(notified(&trace), vec![Completion::SectorErase(0)]);
        assert!(!trace
            .borrow()
            .iter()
            .any(|e| matches!(e, TraceEvent::WatchArmed(_))));
    }

    #[test]
    fn test_multi_page_write_always_polls() {
        let dummy = DummyConfig {
            features: BusFeatures::AUTO_POLL,
            ..Default::default()
        };
        let (mut flash, trace) = ready(dummy, Config::default().with_watch());
        let data: Vec<u8> = (0..600u32).map(|i| i as u8).collect();

        flash.write(0x1F0, &data).unwrap();

        let pages: Vec<(Option<u32>, usize)> = commands(&trace, opcodes::PP)
            .iter()
            .map(|c| (c.address, c.data_len))
            .collect();
        assert_eq!(
            pages,
            vec![
                (Some(0x1F0), 16),
                (Some(0x200), 256),
                (Some(0x300), 256),
                (Some(0x400), 72)
            ]
        );
        assert_eq!(notified(&trace).len(), 4);
        assert_eq!(flash.state(), State::Ready);
        assert!(flash.bus().watch().is_none());

        let mut buf = vec![0u8; data.len()];
        flash.read(0x1F0, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn test_program_only_clears_bits() {
        let (mut flash, _trace) = ready(DummyConfig::default(), Config::default());
        flash.page_program(0x40, &[0xF0]).unwrap();
        flash.page_program(0x40, &[0x3C]).unwrap();

        let mut buf = [0u8; 1];
        flash.read(0x40, &mut buf).unwrap();
        assert_eq!(buf, [0x30]);

        flash.erase_sector(0).unwrap();
        flash.read(0x40, &mut buf).unwrap();
        assert_eq!(buf, [0xFF]);
    }

    #[test]
    fn test_page_program_validation() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());

        assert_eq!(flash.page_program(0, &[]), Err(Error::InvalidLength));
        assert_eq!(flash.page_program(0, &[0; 257]), Err(Error::InvalidLength));
        assert_eq!(flash.page_program(0xF0, &[0; 32]), Err(Error::InvalidLength));
        assert_eq!(
            flash.page_program(0x8_0000, &[0]),
            Err(Error::AddressOutOfBounds)
        );
        assert_eq!(
            flash.write(0x7_FFFF, &[0, 0]),
            Err(Error::AddressOutOfBounds)
        );
        let mut buf = [0u8; 2];
        assert_eq!(flash.read(0x7_FFFF, &mut buf), Err(Error::AddressOutOfBounds));

        assert!(trace.borrow().is_empty());
    }

    #[test]
    fn test_erase_validation() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());

        assert_eq!(flash.erase_sector(0x100), Err(Error::InvalidAlignment));
        assert_eq!(flash.erase_block32(0x1000), Err(Error::InvalidAlignment));
        assert_eq!(flash.erase_block64(0x8000), Err(Error::InvalidAlignment));
        assert_eq!(flash.erase_sector(0x8_0000), Err(Error::AddressOutOfBounds));
        assert_eq!(flash.erase_range(0x1000, 0x800), Err(Error::InvalidAlignment));
        assert!(trace.borrow().is_empty());

        // The smallest part has no 64 KiB block at all
        let dummy = DummyConfig {
            capacity_code: 0x09,
            ..Default::default()
        };
        let (mut small, _trace) = ready(dummy, Config::default());
        assert_eq!(small.erase_block64(0), Err(Error::AddressOutOfBounds));
        small.erase_block32(0).unwrap();
    }

    #[test]
    fn test_erase_range_uses_largest_units() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        flash.write(0x1000, &[0x00; 64]).unwrap();
        flash.write(0x2_F000, &[0x00; 64]).unwrap();
        trace.borrow_mut().clear();

        flash.erase_range(0x1000, 0x2_F000).unwrap();

        let erases: Vec<u8> = command_opcodes(&trace.borrow())
            .into_iter()
            .filter(|op| matches!(*op, opcodes::SER | opcodes::BER32 | opcodes::BER64))
            .collect();
        let mut expected = vec![opcodes::SER; 7];
        expected.extend([opcodes::BER32, opcodes::BER64, opcodes::BER64]);
        assert_eq!(erases, expected);

        assert!(flash.bus().data()[0x1000..0x3_0000].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_chunked_reads() {
        let dummy = DummyConfig {
            max_transfer_len: 64,
            ..Default::default()
        };
        let (mut flash, trace) = ready(dummy, Config::default());
        let mut buf = [0u8; 200];
        flash.read(0x100, &mut buf).unwrap();

        let reads: Vec<(Option<u32>, usize)> = commands(&trace, opcodes::RD)
            .iter()
            .map(|c| (c.address, c.data_len))
            .collect();
        assert_eq!(
            reads,
            vec![
                (Some(0x100), 64),
                (Some(0x140), 64),
                (Some(0x180), 64),
                (Some(0x1C0), 8)
            ]
        );
    }

    #[test]
    fn test_quad_read_needs_qe() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());
        flash.page_program(0, &[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 4];

        flash.quad_fast_read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 4]);

        flash.enable_quad().unwrap();
        assert!(flash.read_status().unwrap().quad_enabled());
        flash.quad_fast_read(0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        flash.dual_fast_read(0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);

        trace.borrow_mut().clear();
        flash.enable_quad().unwrap();
        assert_eq!(command_opcodes(&trace.borrow()), vec![opcodes::RDSR]);
    }

    #[test]
    fn test_io_mode_not_supported() {
        let dummy = DummyConfig {
            features: BusFeatures::empty(),
            ..Default::default()
        };
        let (mut flash, trace) = ready(dummy, Config::default());
        let mut buf = [0u8; 4];

        assert_eq!(
            flash.dual_fast_read(0, &mut buf),
            Err(Error::IoModeNotSupported)
        );
        assert_eq!(
            flash.quad_fast_read(0, &mut buf),
            Err(Error::IoModeNotSupported)
        );
        assert!(trace.borrow().is_empty());
        flash.read(0, &mut buf).unwrap();
    }

    #[test]
    fn test_timeout_when_busy_never_clears() {
        let dummy = DummyConfig {
            busy_polls: u32::MAX,
            ..Default::default()
        };
        let mut config = Config::default();
        config.timings.sector_erase = PollPolicy::new(10, 100);
        let (mut flash, trace) = ready(dummy, config);

        assert_eq!(flash.erase_sector(0), Err(Error::Timeout));
        assert_eq!(commands(&trace, opcodes::RDSR).len(), 10);
        assert!(notified(&trace).is_empty());
        assert_eq!(flash.state(), State::Ready);
    }

    #[test]
    fn test_identification_reads() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());

        assert_eq!(flash.read_product_id(), Ok(0x12));
        assert_eq!(flash.read_manufacturer_device_id(), Ok((0x9D, 0x12)));
        assert_eq!(
            flash.read_jedec_id(),
            Ok(Identification::from_bytes([0x9D, 0x40, 0x13]))
        );
        assert_eq!(flash.read_unique_id(), Ok(DummyConfig::default().unique_id));

        let mut sfdp = [0u8; 4];
        flash.read_sfdp(0, &mut sfdp).unwrap();
        assert_eq!(&sfdp, b"SFDP");

        let uid = commands(&trace, opcodes::RDUID);
        assert_eq!(uid[0].dummy_cycles, 8);
        assert_eq!(uid[0].address, Some(0));
    }

    #[test]
    fn test_information_row_lock() {
        let (mut flash, trace) = ready(DummyConfig::default(), Config::default());

        flash.program_information_row(1, 0x10, &[0xA5; 8]).unwrap();
        let mut buf = [0u8; 8];
        flash.read_information_row(1, 0x10, &mut buf).unwrap();
        assert_eq!(buf, [0xA5; 8]);
        assert_eq!(flash.bus().info_row(1)[0x10], 0xA5);

        flash.lock_information_row(1).unwrap();
        assert!(flash.read_function_register().unwrap().is_row_locked(1));

        trace.borrow_mut().clear();
        assert_eq!(
            flash.program_information_row(1, 0, &[0x00]),
            Err(Error::InformationRowLocked)
        );
        assert_eq!(command_opcodes(&trace.borrow()), vec![opcodes::RDFR]);

        // Lock bits are one-time programmable
        flash
            .write_function_register(FunctionRegister::empty())
            .unwrap();
        assert!(flash.bus().function_register().is_row_locked(1));

        flash.program_information_row(2, 0, &[0x00]).unwrap();
        assert_eq!(
            notified(&trace),
            vec![Completion::InfoRowProgram { row: 2, len: 1 }]
        );

        assert_eq!(
            flash.read_information_row(4, 0, &mut buf),
            Err(Error::AddressOutOfBounds)
        );
        assert_eq!(
            flash.read_information_row(0, 250, &mut buf),
            Err(Error::AddressOutOfBounds)
        );
        assert_eq!(flash.lock_information_row(4), Err(Error::AddressOutOfBounds));
    }

    #[test]
    fn test_sink_can_be_replaced() {
        let (flash, trace) = ready(DummyConfig::default(), Config::default());
        let first = Rc::new(Cell::new(0u32));
        let counter = first.clone();
        let mut flash = flash.with_completion_sink::<Box<dyn FnMut(Completion)>>(Box::new(
            move |_: Completion| counter.set(counter.get() + 1),
        ));

        flash.erase_sector(0).unwrap();
        assert!(notified(&trace).is_empty());
        assert_eq!(first.get(), 1);

        let second = Rc::new(Cell::new(0u32));
        let counter = second.clone();
        flash.set_completion_sink(Box::new(move |_: Completion| counter.set(counter.get() + 1)));
        flash.erase_sector(0x1000).unwrap();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);

        flash.clear_completion_sink();
        flash.erase_sector(0x2000).unwrap();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
        assert!(notified(&trace).is_empty());
    }

    fn stuck_watch() -> (Is25lq<DummyFlash, impl CompletionSink>, Trace) {
        let dummy = DummyConfig {
            features: BusFeatures::DUAL_IO | BusFeatures::QUAD_OUT | BusFeatures::AUTO_POLL,
            busy_polls: u32::MAX,
            ..Default::default()
        };
        let mut config = Config::default().with_watch();
        config.timings.sector_erase = PollPolicy::new(10, 100);
        ready(dummy, config)
    }

    #[test]
    fn test_wait_watch_times_out_when_cycle_never_ends() {
        let (mut flash, trace) = stuck_watch();

        flash.erase_sector(0).unwrap();
        assert_eq!(flash.state(), State::Busy(Completion::SectorErase(0)));
        // The chip never matches, only a bounded wait gets out of Busy
        for _ in 0..100 {
            assert!(!flash.bus_mut().poll_watch());
        }
        assert_eq!(flash.read_status(), Err(Error::Busy));

        assert_eq!(flash.wait_watch(), Err(Error::Timeout));
        assert_eq!(flash.state(), State::Ready);
        assert_eq!(flash.bus().watch(), None);
        assert!(trace
            .borrow()
            .iter()
            .any(|e| matches!(e, TraceEvent::WatchCancelled)));
        assert_eq!(commands(&trace, opcodes::RDSR).len(), 10);
        assert!(notified(&trace).is_empty());

        // A late match is spurious once the wait gave up
        assert_eq!(flash.handle_ready_match(), None);
        assert!(flash.read_status().unwrap().is_busy());
    }

    #[test]
    fn test_reset_abandons_watched_cycle() {
        let (mut flash, trace) = stuck_watch();

        flash.erase_sector(0).unwrap();
        trace.borrow_mut().clear();

        flash.reset().unwrap();
        assert_eq!(
            command_opcodes(&trace.borrow()),
            vec![opcodes::RSTEN, opcodes::RST]
        );
        assert_eq!(trace.borrow()[0], TraceEvent::WatchCancelled);
        assert_eq!(flash.state(), State::Ready);
        assert_eq!(flash.bus().watch(), None);
        assert!(notified(&trace).is_empty());
        assert!(!flash.read_status().unwrap().is_busy());
    }

    #[test]
    fn test_wait_watch_notifies_once() {
        let dummy = DummyConfig {
            features: BusFeatures::DUAL_IO | BusFeatures::QUAD_OUT | BusFeatures::AUTO_POLL,
            ..Default::default()
        };
        let (mut flash, trace) = ready(dummy, Config::default().with_watch());

        flash.erase_block64(0).unwrap();
        assert_eq!(flash.state(), State::Busy(Completion::BlockErase64(0)));

        flash.wait_watch().unwrap();
        assert_eq!(flash.state(), State::Ready);
        assert_eq!(notified(&trace), vec![Completion::BlockErase64(0)]);
        assert_eq!(commands(&trace, opcodes::RDSR).len(), 3);

        // Nothing pending any more
        trace.borrow_mut().clear();
        flash.wait_watch().unwrap();
        assert!(trace.borrow().is_empty());
        assert_eq!(flash.handle_ready_match(), None);
    }
}
