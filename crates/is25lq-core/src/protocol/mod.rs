//! Protocol implementations
//!
//! This module contains the operation to descriptor encoder and the
//! IS25LQ command sequences built on top of it.

mod encoder;
mod is25lq;

pub use encoder::{encode, Operation};
pub use is25lq::*;
