use std::fmt;

/// Every distinct rejection reason the engine can return (spec.md §4.1, §7).
/// Each variant's `Display` is the stable, human-readable message that
/// eventually reaches the client inside `validation_error.message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    GameEnded,
    DeathChoicePending,
    NotYourTurn,
    NoSuchActor,
    ActorNotOwned,
    ActorNotAlive,
    OutOfBounds,
    DestinationOccupied,
    OutOfMoveRange,
    NoSuchTarget,
    TargetNotEnemy,
    TargetNotAlive,
    OutOfAttackRange,
    LineOfSightBlocked,
    NotAHero,
    NoSkillSelected,
    SkillOnCooldown,
    UnknownSkill,
    NoDeathChoicePending,
    NotYourDeathChoice,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::GameEnded => "game ended",
            Self::DeathChoicePending => "death choice pending",
            Self::NotYourTurn => "not your turn",
            Self::NoSuchActor => "no such unit",
            Self::ActorNotOwned => "not your unit",
            Self::ActorNotAlive => "unit is not alive",
            Self::OutOfBounds => "target out of bounds",
            Self::DestinationOccupied => "destination blocked",
            Self::OutOfMoveRange => "destination out of move range",
            Self::NoSuchTarget => "no such target",
            Self::TargetNotEnemy => "target is not an enemy",
            Self::TargetNotAlive => "target is not alive",
            Self::OutOfAttackRange => "target out of attack range",
            Self::LineOfSightBlocked => "line of sight blocked",
            Self::NotAHero => "actor is not a hero",
            Self::NoSkillSelected => "no skill selected",
            Self::SkillOnCooldown => "skill on cooldown",
            Self::UnknownSkill => "unknown skill",
            Self::NoDeathChoicePending => "no death choice pending",
            Self::NotYourDeathChoice => "not your death choice",
        };
        write!(f, "{}", message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;
