use crate::damage::DeathCause;
use crate::damage::apply_single_damage;
use crate::damage::derive_feature_id;
use crate::damage::overwrite_place_buff_tile;
use crate::damage::overwrite_place_obstacle;
use crate::damage::resolve_guardian;
use crate::damage::trigger_buff_tile;
use crate::roundend;
use crate::skills;
use fbf_core::Position;
use fbf_core::UnitId;
use fbf_core::PlayerSlot;
use fbf_state::Action;
use fbf_state::ActionKind;
use fbf_state::BuffType;
use fbf_state::DeathChoiceKind;
use fbf_state::GameState;

/// Applies a validated action, returning a brand-new state. Callers must
/// have already called [`crate::validate`] on the same `(state, action)`
/// pair — `apply` is total on validated inputs and performs no I/O or
/// clock reads (spec.md §4.1).
pub fn apply(state: &GameState, action: &Action) -> GameState {
    match &action.kind {
        ActionKind::Move { actor, target } => {
            let mut next = state.clone();
            if is_slow(state, actor) {
                declare_preparation(&mut next, actor, action);
            } else {
                move_unit(&mut next, actor, *target);
            }
            commit_and_advance(state, &mut next, actor);
            next
        }
        ActionKind::Attack {
            actor,
            target_unit_id,
            ..
        } => {
            let mut next = state.clone();
            if is_slow(state, actor) {
                declare_preparation(&mut next, actor, action);
            } else {
                perform_attack(state, &mut next, actor, target_unit_id, DeathCause::Action);
            }
            commit_and_advance(state, &mut next, actor);
            next
        }
        ActionKind::MoveAndAttack {
            actor,
            through_position,
            target_unit_id,
        } => {
            let mut next = state.clone();
            if is_slow(state, actor) {
                declare_preparation(&mut next, actor, action);
            } else {
                move_unit(&mut next, actor, *through_position);
                perform_attack(state, &mut next, actor, target_unit_id, DeathCause::Action);
            }
            commit_and_advance(state, &mut next, actor);
            next
        }
        ActionKind::UseSkill {
            actor,
            target,
            target_unit_id: _,
        } => {
            let mut next = state.clone();
            if let Some(unit) = next.units.iter().find(|u| &u.id == actor).cloned() {
                if let Some(slot) = next.units.iter_mut().find(|u| &u.id == actor) {
                    slot.skill_cooldown = skills::skill_cooldown(
                        unit.selected_skill_id.as_deref().unwrap_or(""),
                    );
                }
                next = skills::apply_skill(&next, &unit, *target);
            }
            commit_and_advance(state, &mut next, actor);
            next
        }
        ActionKind::DeathChoice { choice } => {
            let mut next = state.clone();
            apply_death_choice(&mut next, *choice);
            next
        }
        ActionKind::EndTurn { .. } => {
            let mut next = state.clone();
            end_turn(&mut next);
            next
        }
    }
}

/// Applies the ACTION timeout's Hero HP Penalty Rule: `amount` HP to the
/// given hero, resolved exactly like any other action-caused damage — a
/// hero kill still ends the game normally (spec.md §4.4 "ACTION timeout").
pub fn apply_timeout_penalty(state: &GameState, hero_id: &UnitId, amount: i32) -> GameState {
    crate::damage::apply_single_damage(state.clone(), hero_id, amount, DeathCause::Action)
}

/// Moves `actor` to `target`, triggering any buff tile at the destination.
pub(crate) fn move_unit(next: &mut GameState, actor: &UnitId, target: Position) {
    let Some(index) = next.units.iter().position(|u| &u.id == actor) else {
        return;
    };
    next.units[index].position = target;
    trigger_buff_tile(next, actor, target);
}

/// Resolves an ATTACK's damage, including Guardian redirection and the
/// WEAKNESS damage-reduction reading (spec.md §4.1 ATTACK). `cause`
/// distinguishes a directly-submitted attack from a SLOW unit's declaration
/// resolved at round end, which produces a system death instead of a
/// player-facing death choice (spec.md §4.1 round-end step 1).
pub(crate) fn perform_attack(
    pre: &GameState,
    next: &mut GameState,
    actor: &UnitId,
    declared_target_id: &UnitId,
    cause: DeathCause,
) {
    let Some(actor_unit) = pre.unit_by_id(actor) else {
        return;
    };
    let Some(declared_target) = next.unit_by_id(declared_target_id).cloned() else {
        return;
    };
    let final_target_id = resolve_guardian(next, &declared_target);
    let attack = next.effective_attack(actor_unit);
    let reduction = next.weakness_reduction(&final_target_id);
    let damage = (attack - reduction).max(0);
    *next = apply_single_damage(next.clone(), &final_target_id, damage, cause);
}

/// True if `actor` currently carries an active SLOW buff, in which case a
/// MOVE/ATTACK/MOVE_AND_ATTACK declaration is captured as a preparation
/// instead of resolved immediately (spec.md §3 `preparing`/`pendingAction`,
/// §4.1 round-end step 1).
fn is_slow(state: &GameState, actor: &UnitId) -> bool {
    state.has_buff(actor, BuffType::Slow)
}

/// Records the declared action on the unit without executing it: its effect
/// is resolved by `roundend::resolve_slow_preparations` against the state as
/// it stands at round end, not the state at declaration time.
fn declare_preparation(next: &mut GameState, actor: &UnitId, action: &Action) {
    if let Some(unit) = next.units.iter_mut().find(|u| &u.id == actor) {
        unit.preparing = true;
        unit.pending_action = Some(action.clone());
    }
}

fn apply_death_choice(next: &mut GameState, choice: DeathChoiceKind) {
    let Some(pending) = next.pending_death_choice.clone() else {
        return;
    };
    let position = pending.death_position;
    match choice {
        DeathChoiceKind::SpawnObstacle => {
            let id = derive_feature_id("death-obstacle", next, position);
            overwrite_place_obstacle(next, position, id);
        }
        DeathChoiceKind::SpawnBuffTile => {
            let id = derive_feature_id("death-tile", next, position);
            overwrite_place_buff_tile(next, position, BuffType::Power, 2, id);
        }
    }
    next.pending_death_choice = None;
    let attacker_side = pending.owner.other();
    resolve_after_death_choice(next, attacker_side);
}

/// Snapshots the unit's per-round action commitment on its first action,
/// increments `actionsUsed`, and runs the turn-driver (spec.md §4.1
/// "Turn-driver"). Shared by every unit-targeted action.
fn commit_and_advance(pre: &GameState, next: &mut GameState, actor: &UnitId) {
    let owner = match pre.unit_by_id(actor) {
        Some(u) => u.owner,
        None => return,
    };
    if let Some(unit) = next.units.iter_mut().find(|u| &u.id == actor) {
        if unit.committed_actions.is_none() {
            let has_speed = next
                .unit_buffs
                .get(actor)
                .map(|buffs| buffs.iter().any(|b| b.buff_type == BuffType::Speed))
                .unwrap_or(false);
            unit.committed_actions = Some(if has_speed {
                fbf_core::SPEED_ACTIONS_PER_ROUND
            } else {
                fbf_core::DEFAULT_ACTIONS_PER_ROUND
            });
        }
        unit.actions_used = unit.actions_used.saturating_add(1);
    }
    if next.game_over || next.pending_death_choice.is_some() {
        return;
    }
    let still_acting = next
        .unit_by_id(actor)
        .map(|u| next.can_act(u))
        .unwrap_or(false);
    if still_acting {
        next.current_player = owner;
        return;
    }
    resolve_pass(next, owner);
}

/// Marks every one of the current player's units as having acted this round,
/// then runs the same pass/exhaustion logic (spec.md §4.1 END_TURN).
fn end_turn(next: &mut GameState) {
    let owner = next.current_player;
    let ids: Vec<UnitId> = next
        .live_units_for(owner)
        .map(|u| u.id.clone())
        .collect();
    for id in ids {
        let remaining = next.unit_by_id(&id).map(|u| next.remaining_actions_for(u)).unwrap_or(0);
        if let Some(unit) = next.units.iter_mut().find(|u| u.id == id) {
            unit.actions_used = unit.actions_used.saturating_add(remaining);
        }
    }
    resolve_pass(next, owner);
}

/// Step 3/5 of the turn-driver: try to pass to the other player; if they
/// have no actionable unit, the exhaustion rule keeps the turn with the
/// current player; if neither can act, the round ends.
fn resolve_pass(next: &mut GameState, current_owner: PlayerSlot) {
    let other = current_owner.other();
    if next.any_unit_can_act(other) {
        next.current_player = other;
    } else if next.any_unit_can_act(current_owner) {
        next.current_player = current_owner;
    } else {
        roundend::process_round_end(next);
    }
}

/// Resumes the turn-driver after a DEATH_CHOICE interrupt: the attacking
/// side continues if it still has an actionable unit, else control passes
/// to the death choice's own owner, else the round ends
/// (SPEC_FULL.md §D.2).
fn resolve_after_death_choice(next: &mut GameState, attacker_side: PlayerSlot) {
    if next.any_unit_can_act(attacker_side) {
        next.current_player = attacker_side;
    } else if next.any_unit_can_act(attacker_side.other()) {
        next.current_player = attacker_side.other();
    } else {
        roundend::process_round_end(next);
    }
}
