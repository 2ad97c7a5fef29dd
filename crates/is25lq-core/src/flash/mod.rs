//! Flash driver
//!
//! [`Is25lq`] owns a transport and tracks the chip's lifecycle: it must be
//! initialized before use, enables writes before every mutating command,
//! and reports erase/program completion to an optional sink.

mod config;
mod device;
mod notify;

pub use config::{BusTimeouts, CompletionMode, Config, PollPolicy, Timings};
pub use device::{Is25lq, State};
pub use notify::{Completion, CompletionSink};
