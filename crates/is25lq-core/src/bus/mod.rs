//! Bus transport traits and abstractions
//!
//! This module defines the transport trait the driver issues its command
//! descriptors through.

mod traits;

pub use traits::*;
