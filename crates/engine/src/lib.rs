//! Decision engine: play/discard policy, shop strategy and the phase state
//! machine that turns observed game states into decisions.

mod engine;
mod error;
mod phase;
mod policy;
mod rng;
mod scorer;
mod shop;
mod trace;

pub use engine::*;
pub use error::*;
pub use phase::*;
pub use policy::*;
pub use rng::*;
pub use scorer::*;
pub use shop::*;
pub use trace::*;
