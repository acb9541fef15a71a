use std::fmt;

/// Every way a raw inbound text frame can fail to become a domain action
/// (spec.md §6 "Inbound message kinds", §7 "Parse"/"Unknown type"/"Missing
/// parameter"). The dispatcher turns every variant into a `validation_error`
/// sent to the submitting connection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    MalformedJson(String),
    UnknownType(String),
    MissingField(&'static str),
    InvalidPlayerId(String),
    UnknownActionType(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson(detail) => write!(f, "malformed message: {}", detail),
            Self::UnknownType(kind) => write!(f, "unknown message type \"{}\"", kind),
            Self::MissingField(name) => write!(f, "missing required field \"{}\"", name),
            Self::InvalidPlayerId(raw) => write!(f, "invalid playerId \"{}\"", raw),
            Self::UnknownActionType(kind) => write!(f, "unknown action type \"{}\"", kind),
        }
    }
}

impl std::error::Error for ProtocolError {}
