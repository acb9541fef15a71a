//! Immutable value types for one match's game state (spec.md §3, component C1).
//!
//! Nothing in this crate performs I/O, consults a clock, or mutates in place;
//! every transition lives in `fbf-rules`, which depends on these types.

mod action;
mod board;
mod buff;
mod death;
mod obstacle;
mod state;
mod tile;
mod unit;

pub use action::Action;
pub use action::ActionKind;
pub use action::DeathChoiceKind;
pub use board::Board;
pub use buff::BuffFlags;
pub use buff::BuffInstance;
pub use buff::BuffModifiers;
pub use buff::BuffType;
pub use death::DeathChoice;
pub use obstacle::Obstacle;
pub use state::GameState;
pub use tile::BuffTile;
pub use unit::HeroClass;
pub use unit::MinionType;
pub use unit::Unit;
pub use unit::UnitCategory;
