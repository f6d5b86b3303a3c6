//! Loading of strategy configuration, synergy tables and extra catalog
//! entries from JSON files.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
