//! CLI command implementations
//!
//! Every command runs against an initialized driver whose transport is
//! the emulated chip. Erase and program cycles started in watch mode are
//! finished by [`settle`], which plays the part of the controller's
//! match interrupt and gives up after a bounded number of evaluations.

pub mod erase;
pub mod info_row;
pub mod probe;
pub mod read;
pub mod status;
pub mod write;

use is25lq_core::error::Result;
use is25lq_core::flash::{Completion, Is25lq, State};
use is25lq_dummy::DummyFlash;

/// The driver as used by the host tool
pub type Flash = Is25lq<DummyFlash>;

/// Completion sink used by the host tool
pub fn log_completion(done: Completion) {
    log::debug!("Completed: {:?}", done);
}

/// Watch evaluations before falling back to a bounded status poll
const WATCH_EVALUATIONS: u32 = 1024;

/// Wait until a cycle armed on the status watch has finished
///
/// Returns `Timeout` if the chip is still busy once the cycle's poll
/// policy runs out.
pub fn settle(flash: &mut Flash) -> Result<()> {
    for _ in 0..WATCH_EVALUATIONS {
        if !matches!(flash.state(), State::Busy(_)) {
            return Ok(());
        }
        if flash.bus_mut().poll_watch() {
            flash.handle_ready_match();
        }
    }
    flash.wait_watch()
}
