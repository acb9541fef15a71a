//! Timer-orchestrated action application for one match (spec.md §4.4,
//! component C5).
//!
//! `MatchService` is the only caller of `fbf-rules::validate`/`apply` above
//! the registry: it wraps every rule-engine call with the timer-gating
//! preconditions and post-apply timer transitions spec.md §4.4 specifies,
//! and drives the three timeout handlers that fire when a player doesn't
//! act in time.

mod error;
mod result;
mod service;
mod sink;

pub use error::MatchServiceError;
pub use result::ActionResult;
pub use result::NextTimer;
pub use result::Penalty;
pub use result::TimeoutOutcome;
pub use service::MatchService;
pub use sink::TimeoutSink;
