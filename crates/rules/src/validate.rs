use crate::ValidationError;
use crate::ValidationResult;
use crate::metrics::attack_distance;
use crate::metrics::cells_between;
use crate::skills;
use fbf_state::Action;
use fbf_state::ActionKind;
use fbf_state::GameState;
use fbf_state::Unit;

/// Validates an action against a state without mutating anything
/// (spec.md §4.1). Ordering follows the universal predicates exactly, then
/// delegates to a per-action-type check.
pub fn validate(state: &GameState, action: &Action) -> ValidationResult {
    if state.game_over {
        return Err(ValidationError::GameEnded);
    }
    if state.pending_death_choice.is_some() && !matches!(action.kind, ActionKind::DeathChoice { .. }) {
        return Err(ValidationError::DeathChoicePending);
    }
    if action.acting_player != state.current_player {
        return Err(ValidationError::NotYourTurn);
    }
    match &action.kind {
        ActionKind::Move { actor, target } => {
            let unit = acting_unit(state, action, actor)?;
            validate_move(state, unit, *target)
        }
        ActionKind::Attack {
            actor,
            target_position,
            target_unit_id,
        } => {
            let unit = acting_unit(state, action, actor)?;
            validate_attack(state, unit, *target_position, target_unit_id)
        }
        ActionKind::MoveAndAttack {
            actor,
            through_position,
            target_unit_id,
        } => {
            let unit = acting_unit(state, action, actor)?;
            validate_move_and_attack(state, unit, *through_position, target_unit_id)
        }
        ActionKind::UseSkill {
            actor,
            target: _,
            target_unit_id: _,
        } => {
            let unit = acting_unit(state, action, actor)?;
            validate_use_skill(unit)
        }
        ActionKind::DeathChoice { .. } => validate_death_choice(state, action),
        ActionKind::EndTurn { .. } => Ok(()),
    }
}

pub(crate) fn acting_unit<'s>(
    state: &'s GameState,
    action: &Action,
    actor: &fbf_core::UnitId,
) -> Result<&'s Unit, ValidationError> {
    let unit = state.unit_by_id(actor).ok_or(ValidationError::NoSuchActor)?;
    if unit.owner != action.acting_player {
        return Err(ValidationError::ActorNotOwned);
    }
    if !unit.alive() {
        return Err(ValidationError::ActorNotAlive);
    }
    Ok(unit)
}

pub(crate) fn validate_move(state: &GameState, unit: &Unit, target: fbf_core::Position) -> ValidationResult {
    if !target.on_board() {
        return Err(ValidationError::OutOfBounds);
    }
    let range = state.effective_move_range(unit);
    if unit.position.manhattan(target) as i32 > range {
        return Err(ValidationError::OutOfMoveRange);
    }
    if state.is_occupied(target) {
        return Err(ValidationError::DestinationOccupied);
    }
    Ok(())
}

pub(crate) fn validate_attack(
    state: &GameState,
    unit: &Unit,
    target_position: fbf_core::Position,
    target_unit_id: &fbf_core::UnitId,
) -> ValidationResult {
    if !target_position.on_board() {
        return Err(ValidationError::OutOfBounds);
    }
    let target = state
        .unit_by_id(target_unit_id)
        .ok_or(ValidationError::NoSuchTarget)?;
    if !target.alive() {
        return Err(ValidationError::TargetNotAlive);
    }
    if target.position != target_position {
        return Err(ValidationError::NoSuchTarget);
    }
    if target.owner == unit.owner {
        return Err(ValidationError::TargetNotEnemy);
    }
    let range = state.effective_attack_range(unit);
    let distance = attack_distance(range, unit.position, target_position);
    if distance as i32 > range {
        return Err(ValidationError::OutOfAttackRange);
    }
    if range > 1 {
        let blocked = cells_between(unit.position, target_position)
            .into_iter()
            .any(|cell| state.obstacle_at(cell).is_some());
        if blocked {
            return Err(ValidationError::LineOfSightBlocked);
        }
    }
    Ok(())
}

/// Shared by the main dispatch and by round-end re-validation of a SLOW
/// unit's deferred `MoveAndAttack` declaration (spec.md §4.1 MOVE_AND_ATTACK
/// "validation must succeed for both sub-steps against the *intermediate*
/// state").
pub(crate) fn validate_move_and_attack(
    state: &GameState,
    unit: &Unit,
    through_position: fbf_core::Position,
    target_unit_id: &fbf_core::UnitId,
) -> ValidationResult {
    validate_move(state, unit, through_position)?;
    let target = state
        .unit_by_id(target_unit_id)
        .ok_or(ValidationError::NoSuchTarget)?;
    if !target.alive() {
        return Err(ValidationError::TargetNotAlive);
    }
    if target.owner == unit.owner {
        return Err(ValidationError::TargetNotEnemy);
    }
    if !through_position.is_orthogonally_adjacent(target.position) {
        return Err(ValidationError::OutOfAttackRange);
    }
    Ok(())
}

fn validate_use_skill(unit: &Unit) -> ValidationResult {
    if !unit.is_hero() {
        return Err(ValidationError::NotAHero);
    }
    let Some(skill_id) = unit.selected_skill_id.as_deref() else {
        return Err(ValidationError::NoSkillSelected);
    };
    if !skills::skill_exists(skill_id) {
        return Err(ValidationError::UnknownSkill);
    }
    if unit.skill_cooldown > 0 {
        return Err(ValidationError::SkillOnCooldown);
    }
    Ok(())
}

fn validate_death_choice(state: &GameState, action: &Action) -> ValidationResult {
    let Some(pending) = &state.pending_death_choice else {
        return Err(ValidationError::NoDeathChoicePending);
    };
    if pending.owner != action.acting_player {
        return Err(ValidationError::NotYourDeathChoice);
    }
    Ok(())
}
