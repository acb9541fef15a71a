//! The skill catalogue: a fixed, extensible registry of pure
//! `(state, actor, target) -> state'` functions keyed by skill id
//! (spec.md §4.1 USE_SKILL; SPEC_FULL.md §C.4 names the three concrete
//! skills below as the registry's exercising set).

use crate::damage::DeathCause;
use crate::damage::apply_damage_batch;
use fbf_core::DEFAULT_SKILL_COOLDOWN;
use fbf_core::Position;
use fbf_core::UnitId;
use fbf_state::BuffInstance;
use fbf_state::BuffType;
use fbf_state::GameState;
use fbf_state::Unit;

pub const FIREBALL: &str = "fireball";
pub const GUARD_UP: &str = "guard_up";
pub const SMOKE_SCREEN: &str = "smoke_screen";

/// Whether `skill_id` names a skill this registry knows how to execute.
pub fn skill_exists(skill_id: &str) -> bool {
    matches!(skill_id, FIREBALL | GUARD_UP | SMOKE_SCREEN)
}

/// Rounds the skill locks out after use. Every skill in this catalogue uses
/// the spec's "commonly 2" default; a future skill with a bespoke cooldown
/// would override it here.
pub fn skill_cooldown(skill_id: &str) -> u32 {
    match skill_id {
        FIREBALL | GUARD_UP | SMOKE_SCREEN => DEFAULT_SKILL_COOLDOWN,
        _ => DEFAULT_SKILL_COOLDOWN,
    }
}

/// Executes a skill's effect. `validate` has already confirmed the actor is
/// a hero with this skill selected and off cooldown; an unrecognized id or
/// missing required target is a no-op (validation is expected to have
/// caught it first).
pub fn apply_skill(state: &GameState, actor: &Unit, target: Option<Position>) -> GameState {
    match actor.selected_skill_id.as_deref() {
        Some(FIREBALL) => fireball(state, actor, target),
        Some(GUARD_UP) => guard_up(state, actor),
        Some(SMOKE_SCREEN) => smoke_screen(state, actor),
        _ => state.clone(),
    }
}

/// AOE damage in a 1-tile (Chebyshev) radius around `target`, dealt to every
/// enemy unit caught in the blast, at the caster's effective attack.
fn fireball(state: &GameState, actor: &Unit, target: Option<Position>) -> GameState {
    let Some(center) = target else {
        return state.clone();
    };
    let damage = state.effective_attack(actor);
    let targets: Vec<(UnitId, i32)> = state
        .live_units_for(actor.owner.other())
        .filter(|u| u.position.chebyshev(center) <= 1)
        .map(|u| (u.id.clone(), damage))
        .collect();
    apply_damage_batch(state, &targets, DeathCause::Action, actor.owner)
}

/// Self-buff: POWER + LIFE, two rounds.
fn guard_up(state: &GameState, actor: &Unit) -> GameState {
    let mut next = state.clone();
    let entry = next.unit_buffs.entry(actor.id.clone()).or_default();
    entry.push(BuffInstance::of(
        crate::damage::derive_feature_id("guard-power", state, actor.position),
        BuffType::Power,
        2,
    ));
    entry.push(BuffInstance::of(
        crate::damage::derive_feature_id("guard-life", state, actor.position),
        BuffType::Life,
        2,
    ));
    next
}

/// WEAKNESS on every orthogonally-adjacent enemy, two rounds.
fn smoke_screen(state: &GameState, actor: &Unit) -> GameState {
    let mut next = state.clone();
    let targets: Vec<UnitId> = state
        .live_units_for(actor.owner.other())
        .filter(|u| u.position.is_orthogonally_adjacent(actor.position))
        .map(|u| u.id.clone())
        .collect();
    for id in targets {
        let entry = next.unit_buffs.entry(id.clone()).or_default();
        entry.push(BuffInstance::of(
            crate::damage::derive_feature_id(&format!("smoke-{id}"), state, actor.position),
            BuffType::Weakness,
            2,
        ));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbf_core::PlayerSlot;
    use fbf_state::Board;
    use fbf_state::HeroClass;
    use fbf_state::MinionType;
    use fbf_state::UnitCategory;
    use std::collections::HashMap;

    fn hero(owner: PlayerSlot, position: Position, skill: &str) -> Unit {
        Unit {
            id: UnitId::new(format!("hero-{owner}")),
            owner,
            position,
            hp: 5,
            max_hp: 5,
            attack: 2,
            move_range: 1,
            attack_range: 1,
            category: UnitCategory::Hero,
            hero_class: Some(HeroClass::Mage),
            minion_type: None,
            selected_skill_id: Some(skill.to_string()),
            skill_cooldown: 0,
            actions_used: 0,
            preparing: false,
            pending_action: None,
            committed_actions: None,
        }
    }

    fn minion(owner: PlayerSlot, position: Position) -> Unit {
        Unit {
            id: UnitId::new(format!("minion-{owner}-{}-{}", position.x, position.y)),
            owner,
            position,
            hp: 3,
            max_hp: 3,
            attack: 1,
            move_range: 1,
            attack_range: 1,
            category: UnitCategory::Minion,
            hero_class: None,
            minion_type: Some(MinionType::Archer),
            selected_skill_id: None,
            skill_cooldown: 0,
            actions_used: 0,
            preparing: false,
            pending_action: None,
            committed_actions: None,
        }
    }

    fn state(units: Vec<Unit>) -> GameState {
        GameState {
            board: Board::default(),
            units,
            current_player: PlayerSlot::P1,
            game_over: false,
            winner: None,
            unit_buffs: HashMap::new(),
            buff_tiles: Vec::new(),
            obstacles: Vec::new(),
            current_round: 1,
            pending_death_choice: None,
        }
    }

    #[test]
    fn fireball_damages_enemies_in_radius() {
        let caster = hero(PlayerSlot::P1, Position::new(2, 2), FIREBALL);
        let enemy = minion(PlayerSlot::P2, Position::new(3, 3));
        let s = state(vec![caster.clone(), enemy.clone()]);
        let next = fireball(&s, &caster, Some(Position::new(3, 3)));
        let survivor = next.unit_by_id(&enemy.id).expect("enemy survives");
        assert_eq!(survivor.hp, 1);
    }

    #[test]
    fn guard_up_grants_power_and_life() {
        let caster = hero(PlayerSlot::P1, Position::new(2, 2), GUARD_UP);
        let s = state(vec![caster.clone()]);
        let next = guard_up(&s, &caster);
        let buffs = next.buffs_of(&caster.id);
        assert_eq!(buffs.len(), 2);
        assert!(buffs.iter().any(|b| b.buff_type == BuffType::Power));
        assert!(buffs.iter().any(|b| b.buff_type == BuffType::Life));
    }

    #[test]
    fn smoke_screen_weakens_adjacent_enemies_only() {
        let caster = hero(PlayerSlot::P1, Position::new(2, 2), SMOKE_SCREEN);
        let adjacent = minion(PlayerSlot::P2, Position::new(2, 3));
        let far = minion(PlayerSlot::P2, Position::new(4, 4));
        let s = state(vec![caster.clone(), adjacent.clone(), far.clone()]);
        let next = smoke_screen(&s, &caster);
        assert!(next.has_buff(&adjacent.id, BuffType::Weakness));
        assert!(!next.has_buff(&far.id, BuffType::Weakness));
    }
}
