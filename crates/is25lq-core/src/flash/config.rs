//! Driver configuration
//!
//! Defaults are taken from the IS25LQ datasheet worst-case timings with
//! some margin.

/// Per-phase transport timeouts, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTimeouts {
    /// Timeout for a command phase
    pub command_ms: u32,
    /// Timeout for a data phase
    pub transfer_ms: u32,
}

impl Default for BusTimeouts {
    fn default() -> Self {
        Self {
            command_ms: 100,
            transfer_ms: 100,
        }
    }
}

/// Status register polling policy for one class of operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two status reads, in microseconds
    pub interval_us: u32,
    /// Give up after this long, in microseconds
    pub timeout_us: u32,
}

impl PollPolicy {
    /// Create a new polling policy
    pub const fn new(interval_us: u32, timeout_us: u32) -> Self {
        Self {
            interval_us,
            timeout_us,
        }
    }

    /// Number of status reads before giving up
    ///
    /// Always at least one, so a zero interval or timeout still checks the
    /// chip once.
    pub const fn max_polls(&self) -> u32 {
        if self.interval_us == 0 {
            return 1;
        }
        let polls = self.timeout_us / self.interval_us;
        if polls == 0 {
            1
        } else {
            polls
        }
    }
}

/// Chip timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Page or information row program
    pub page_program: PollPolicy,
    /// Minimum wait after a program before the first status read
    pub program_backoff_us: u32,
    /// 4 KiB sector erase
    pub sector_erase: PollPolicy,
    /// 32 KiB block erase
    pub block_erase32: PollPolicy,
    /// 64 KiB block erase
    pub block_erase64: PollPolicy,
    /// Whole chip erase
    pub chip_erase: PollPolicy,
    /// Status or function register write
    pub register_write: PollPolicy,
    /// Settle time after entering deep power-down
    pub power_down_us: u32,
    /// Settle time after leaving deep power-down
    pub release_us: u32,
    /// Recovery time after a software reset
    pub reset_recovery_us: u32,
    /// Interval programmed into a hardware status watch, in bus clocks
    pub watch_interval: u16,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            page_program: PollPolicy::new(50, 10_000),
            program_backoff_us: 800,
            sector_erase: PollPolicy::new(1_000, 1_000_000),
            block_erase32: PollPolicy::new(5_000, 2_000_000),
            block_erase64: PollPolicy::new(5_000, 3_000_000),
            chip_erase: PollPolicy::new(50_000, 30_000_000),
            register_write: PollPolicy::new(1_000, 100_000),
            power_down_us: 5_000,
            release_us: 5_000,
            reset_recovery_us: 100,
            watch_interval: 0x10,
        }
    }
}

/// How the driver waits for erase and program cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// Poll the status register until the cycle finishes
    #[default]
    Poll,
    /// Arm the transport's hardware watch and return immediately
    ///
    /// Falls back to polling on transports without a watch.
    Watch,
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Transport timeouts
    pub timeouts: BusTimeouts,
    /// Chip timings
    pub timings: Timings,
    /// Completion strategy for erase and program cycles
    pub completion: CompletionMode,
    /// Send Release Power-Down before identifying the chip in `init`
    pub release_on_init: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeouts: BusTimeouts::default(),
            timings: Timings::default(),
            completion: CompletionMode::Poll,
            release_on_init: true,
        }
    }
}

impl Config {
    /// Use hardware-watch completion
    pub fn with_watch(mut self) -> Self {
        self.completion = CompletionMode::Watch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_polls() {
        assert_eq!(PollPolicy::new(50, 10_000).max_polls(), 200);
        assert_eq!(PollPolicy::new(0, 10_000).max_polls(), 1);
        assert_eq!(PollPolicy::new(100, 10).max_polls(), 1);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeouts.command_ms, 100);
        assert_eq!(config.timeouts.transfer_ms, 100);
        assert_eq!(config.completion, CompletionMode::Poll);
        assert!(config.release_on_init);
        assert_eq!(config.with_watch().completion, CompletionMode::Watch);
    }
}
