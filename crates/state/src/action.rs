use fbf_core::Position;
use fbf_core::UnitId;
use fbf_core::PlayerSlot;
use serde::Deserialize;
use serde::Serialize;

/// The two spawns a DEATH_CHOICE may pick between (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeathChoiceKind {
    SpawnObstacle,
    SpawnBuffTile,
}

/// The body of a player-originated action, independent of who submitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Move {
        actor: UnitId,
        target: Position,
    },
    Attack {
        actor: UnitId,
        target_position: Position,
        target_unit_id: UnitId,
    },
    MoveAndAttack {
        actor: UnitId,
        through_position: Position,
        target_unit_id: UnitId,
    },
    UseSkill {
        actor: UnitId,
        target: Option<Position>,
        target_unit_id: Option<UnitId>,
    },
    DeathChoice {
        choice: DeathChoiceKind,
    },
    EndTurn {
        actor: Option<UnitId>,
    },
}

/// A fully-addressed action: who submitted it, and what it asks the engine to do.
///
/// The dispatcher is the only place that constructs one of these — it reads
/// `playerId` off the wire message and pairs it with the parsed `ActionKind`
/// (spec.md §4.1 universal validation predicate 3, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub acting_player: PlayerSlot,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(acting_player: PlayerSlot, kind: ActionKind) -> Self {
        Self {
            acting_player,
            kind,
        }
    }

    /// The acting unit's id, for actions that target a specific unit. `None`
    /// for DEATH_CHOICE and a bare END_TURN.
    pub fn actor(&self) -> Option<&UnitId> {
        match &self.kind {
            ActionKind::Move { actor, .. } => Some(actor),
            ActionKind::Attack { actor, .. } => Some(actor),
            ActionKind::MoveAndAttack { actor, .. } => Some(actor),
            ActionKind::UseSkill { actor, .. } => Some(actor),
            ActionKind::DeathChoice { .. } => None,
            ActionKind::EndTurn { actor } => actor.as_ref(),
        }
    }
}
