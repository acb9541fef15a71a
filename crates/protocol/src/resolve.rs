//! Resolves a flat wire [`WireAction`] into a concrete `fbf_state::ActionKind`
//! (spec.md §6 "Inbound message kinds", §7 "Missing parameter").
//!
//! This is the last stop before an action reaches `fbf-rules`: everything
//! above this function deals in optional wire fields, everything below it
//! deals in the engine's own well-typed action variants.

use crate::ProtocolError;
use crate::WireAction;
use crate::WireActionType;
use fbf_state::ActionKind;

pub fn resolve(action: &WireAction) -> Result<ActionKind, ProtocolError> {
    match action.action_type {
        WireActionType::Move => {
            let actor = require_unit_id(action)?;
            let target = require_target(action)?;
            Ok(ActionKind::Move { actor, target })
        }
        WireActionType::Attack => {
            let actor = require_unit_id(action)?;
            let target_position = require_target(action)?;
            let target_unit_id = action
                .target_unit_id
                .clone()
                .ok_or(ProtocolError::MissingField("targetUnitId"))?;
            Ok(ActionKind::Attack {
                actor,
                target_position,
                target_unit_id,
            })
        }
        WireActionType::MoveAndAttack => {
            let actor = require_unit_id(action)?;
            let through_position = require_target(action)?;
            let target_unit_id = action
                .target_unit_id
                .clone()
                .ok_or(ProtocolError::MissingField("targetUnitId"))?;
            Ok(ActionKind::MoveAndAttack {
                actor,
                through_position,
                target_unit_id,
            })
        }
        WireActionType::UseSkill => {
            let actor = require_unit_id(action)?;
            Ok(ActionKind::UseSkill {
                actor,
                target: action.target_position(),
                target_unit_id: action.target_unit_id.clone(),
            })
        }
        WireActionType::DeathChoice => {
            let choice = action
                .choice
                .ok_or(ProtocolError::MissingField("choice"))?;
            Ok(ActionKind::DeathChoice { choice })
        }
        WireActionType::EndTurn => Ok(ActionKind::EndTurn {
            actor: action.unit_id.clone(),
        }),
    }
}

fn require_unit_id(action: &WireAction) -> Result<fbf_core::UnitId, ProtocolError> {
    action
        .unit_id
        .clone()
        .ok_or(ProtocolError::MissingField("unitId"))
}

fn require_target(action: &WireAction) -> Result<fbf_core::Position, ProtocolError> {
    action
        .target_position()
        .ok_or(ProtocolError::MissingField("targetX/targetY"))
}
