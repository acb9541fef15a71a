use fbf_rules::ValidationError;
use std::fmt;

/// Every way `MatchService::apply_action_with_timer` can reject an action
/// before or after consulting `fbf-rules`, each with the stable message
/// spec.md §7 "Timer gating" and "unknown match" name (rule violations
/// themselves surface through [`ValidationError`]'s own messages).
#[derive(Debug, Clone, PartialEq)]
pub enum MatchServiceError {
    UnknownMatch,
    DeathChoicePending,
    ActionTimeoutAlreadyProcessed,
    TimerNotActive,
    NoDeathChoicePending,
    NotYourDeathChoice,
    DeathChoiceTimeoutAlreadyProcessed,
    Validation(ValidationError),
}

impl fmt::Display for MatchServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMatch => write!(f, "unknown match"),
            Self::DeathChoicePending => write!(f, "death choice pending"),
            Self::ActionTimeoutAlreadyProcessed => write!(f, "action timeout already processed"),
            Self::TimerNotActive => write!(f, "timer not active"),
            Self::NoDeathChoicePending => write!(f, "no death choice pending"),
            Self::NotYourDeathChoice => write!(f, "not your death choice"),
            Self::DeathChoiceTimeoutAlreadyProcessed => {
                write!(f, "death choice timeout already processed")
            }
            Self::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MatchServiceError {}

impl From<ValidationError> for MatchServiceError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}
