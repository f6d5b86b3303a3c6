//! Core scoring model: cards, hand classification, the joker catalog and
//! the pure evaluate/resolve pipeline. No IO lives here.

pub mod cards;
pub mod catalog;
pub mod config;
pub mod decision;
pub mod effects;
pub mod error;
pub mod evaluate;
pub mod hand;
pub mod resolve;
pub mod score;
pub mod selection;
pub mod state;
pub mod synergy;
pub mod tables;

pub use cards::*;
pub use catalog::*;
pub use config::*;
pub use decision::*;
pub use effects::*;
pub use error::*;
pub use evaluate::*;
pub use hand::*;
pub use resolve::*;
pub use score::*;
pub use selection::*;
pub use state::*;
pub use synergy::*;
pub use tables::*;
