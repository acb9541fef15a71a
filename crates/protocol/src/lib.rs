//! Wire message codec for the Tactics5x5 match server (spec.md §6,
//! component C6).
//!
//! Owns the `{"type", "payload"}` envelope and the DTOs for every message
//! kind spec.md §6 defines, plus the resolution from a flat wire action into
//! `fbf_state::ActionKind`. Nothing here touches a connection, a match, or a
//! clock — C7 (the dispatcher) is the only caller.

mod codec;
mod error;
mod messages;
mod resolve;

pub use codec::decode;
pub use codec::encode;
pub use error::ProtocolError;
pub use messages::ActionPayload;
pub use messages::InboundMessage;
pub use messages::JoinMatchPayload;
pub use messages::OutboundMessage;
pub use messages::PenaltyMeta;
pub use messages::TimerMeta;
pub use messages::WireAction;
pub use messages::WireActionType;
pub use resolve::resolve;
