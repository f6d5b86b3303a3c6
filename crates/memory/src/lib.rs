//! Outcome memory shared by strategy sessions.
//!
//! Outcomes are appended to a log and folded into per-key statistics lazily,
//! the first time a reader asks after new records arrived.

mod error;
mod file;
mod outcome;
mod stats;
mod store;

pub use error::*;
pub use file::*;
pub use outcome::*;
pub use stats::*;
pub use store::*;
