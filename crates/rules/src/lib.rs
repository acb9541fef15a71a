//! Pure, deterministic rule engine for one match (spec.md §4.1, component C2).
//!
//! `validate` and `apply` consult no clock and perform no I/O; every
//! transition is a value-to-value function over `fbf_state::GameState`.
//! Everything above this crate (timers, registry, dispatch) calls into it
//! through exactly these two entry points plus the skill-catalogue queries.

mod apply;
mod damage;
mod error;
mod metrics;
mod roundend;
mod skills;
mod validate;

pub use apply::apply;
pub use apply::apply_timeout_penalty;
pub use damage::DeathCause;
pub use error::ValidationError;
pub use error::ValidationResult;
pub use skills::FIREBALL;
pub use skills::GUARD_UP;
pub use skills::SMOKE_SCREEN;
pub use skills::skill_cooldown;
pub use skills::skill_exists;
pub use validate::validate;
