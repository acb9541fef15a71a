//! Round-end processing pipeline (spec.md §4.1 "Round-end processing").
//!
//! Invoked by the turn-driver once neither player has a unit able to act.
//! Every step below runs atomically, in the order the spec lists them,
//! before the next round's first turn is assigned.

use crate::apply::move_unit;
use crate::apply::perform_attack;
use crate::damage::DeathCause;
use crate::damage::apply_damage_batch;
use crate::validate::validate_attack;
use crate::validate::validate_move;
use crate::validate::validate_move_and_attack;
use fbf_core::DECAY_START_ROUND;
use fbf_core::PRESSURE_START_ROUND;
use fbf_core::PlayerSlot;
use fbf_core::UnitId;
use fbf_state::Action;
use fbf_state::ActionKind;
use fbf_state::GameState;

/// Runs every round-end step against `state` in place. Called with
/// `state.current_player` still holding the identity of the player whose
/// turn was in progress when round-end was entered — that is this round's
/// "active player" for the simultaneous-death rule (spec.md §4.1 step 5).
pub fn process_round_end(state: &mut GameState) {
    let active_player = state.current_player;

    resolve_slow_preparations(state);
    if state.game_over {
        return;
    }
    apply_bleed(state, active_player);
    if state.game_over {
        return;
    }
    apply_decay(state, active_player);
    if state.game_over {
        return;
    }
    apply_pressure(state, active_player);
    if state.game_over {
        return;
    }
    age_buffs_and_reset(state);
    advance_round(state);
}

/// Step 1: resolve every SLOW unit's deferred declaration against the state
/// as it now stands, skipping declarations that are no longer valid (target
/// moved away, destination now blocked, …). Deaths here are system deaths.
fn resolve_slow_preparations(state: &mut GameState) {
    let preparing: Vec<UnitId> = state
        .units
        .iter()
        .filter(|u| u.alive() && u.preparing)
        .map(|u| u.id.clone())
        .collect();
    for id in preparing {
        let Some(unit) = state.unit_by_id(&id).cloned() else {
            continue;
        };
        let Some(action) = unit.pending_action.clone() else {
            continue;
        };
        if preparation_still_valid(state, &unit, &action) {
            resolve_preparation(state, &id, &action);
        }
        if state.game_over {
            return;
        }
    }
}

fn preparation_still_valid(state: &GameState, unit: &fbf_state::Unit, action: &Action) -> bool {
    match &action.kind {
        ActionKind::Move { target, .. } => validate_move(state, unit, *target).is_ok(),
        ActionKind::Attack {
            target_position,
            target_unit_id,
            ..
        } => validate_attack(state, unit, *target_position, target_unit_id).is_ok(),
        ActionKind::MoveAndAttack {
            through_position,
            target_unit_id,
            ..
        } => validate_move_and_attack(state, unit, *through_position, target_unit_id).is_ok(),
        _ => false,
    }
}

fn resolve_preparation(state: &mut GameState, actor: &UnitId, action: &Action) {
    let pre = state.clone();
    match &action.kind {
        ActionKind::Move { target, .. } => {
            move_unit(state, actor, *target);
        }
        ActionKind::Attack { target_unit_id, .. } => {
            perform_attack(&pre, state, actor, target_unit_id, DeathCause::System);
        }
        ActionKind::MoveAndAttack {
            through_position,
            target_unit_id,
            ..
        } => {
            move_unit(state, actor, *through_position);
            perform_attack(&pre, state, actor, target_unit_id, DeathCause::System);
        }
        _ => {}
    }
}

/// Step 2: every BLEED-buffed unit takes 1 HP, as a system death batch so
/// the simultaneous-death rule applies if it kills both heroes at once.
fn apply_bleed(state: &mut GameState, active_player: PlayerSlot) {
    let targets: Vec<(UnitId, i32)> = state
        .units
        .iter()
        .filter(|u| u.alive() && state.has_buff(&u.id, fbf_state::BuffType::Bleed))
        .map(|u| (u.id.clone(), 1))
        .collect();
    if targets.is_empty() {
        return;
    }
    *state = apply_damage_batch(state, &targets, DeathCause::System, active_player);
}

/// Step 3: from round 3 onward, every live minion takes 1 HP of Decay.
fn apply_decay(state: &mut GameState, active_player: PlayerSlot) {
    if state.current_round < DECAY_START_ROUND {
        return;
    }
    let targets: Vec<(UnitId, i32)> = state
        .live_units()
        .filter(|u| u.is_minion())
        .map(|u| (u.id.clone(), 1))
        .collect();
    if targets.is_empty() {
        return;
    }
    *state = apply_damage_batch(state, &targets, DeathCause::System, active_player);
}

/// Step 4: from round 8 onward, every live unit takes 1 HP of late-game
/// pressure. Hero deaths here still trigger normal victory (handled inside
/// `apply_single_damage` regardless of `DeathCause`); minion deaths are
/// system deaths.
fn apply_pressure(state: &mut GameState, active_player: PlayerSlot) {
    if state.current_round < PRESSURE_START_ROUND {
        return;
    }
    let targets: Vec<(UnitId, i32)> = state.live_units().map(|u| (u.id.clone(), 1)).collect();
    if targets.is_empty() {
        return;
    }
    *state = apply_damage_batch(state, &targets, DeathCause::System, active_player);
}

/// Step 6: age every buff and buff tile by one round, removing expired
/// ones; decrement hero skill cooldowns; reset every live unit's per-round
/// bookkeeping (`actionsUsed`, `preparing`, the SPEED commitment cache).
fn age_buffs_and_reset(state: &mut GameState) {
    for buffs in state.unit_buffs.values_mut() {
        for buff in buffs.iter_mut() {
            buff.duration_rounds = buff.duration_rounds.saturating_sub(1);
        }
        buffs.retain(|b| b.duration_rounds > 0);
    }
    state.unit_buffs.retain(|_, buffs| !buffs.is_empty());

    for tile in state.buff_tiles.iter_mut() {
        tile.duration_rounds = tile.duration_rounds.saturating_sub(1);
    }
    state.buff_tiles.retain(|t| t.duration_rounds > 0);

    for unit in state.units.iter_mut() {
        if !unit.alive() {
            continue;
        }
        unit.actions_used = 0;
        unit.preparing = false;
        unit.pending_action = None;
        unit.committed_actions = None;
        if unit.is_hero() {
            unit.skill_cooldown = unit.skill_cooldown.saturating_sub(1);
        }
    }
}

/// Step 7: increment the round counter and hand the first turn of the new
/// round to its starting player. The spec names a "stable rotation" without
/// pinning its shape beyond "by default P1" for the very first round; this
/// reading alternates the starting player by round parity so each side
/// opens every other round (SPEC_FULL.md / DESIGN.md: Open Question
/// resolution for the unnamed "first player this round" bookkeeping).
fn advance_round(state: &mut GameState) {
    state.current_round += 1;
    state.current_player = if state.current_round % 2 == 1 {
        PlayerSlot::P1
    } else {
        PlayerSlot::P2
    };
}
