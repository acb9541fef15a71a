//! Placeholder stand-in for the draft/setup sub-phase (spec.md §1 "modelled
//! here only as an external factory that produces an initial GameState").
//!
//! Hero+minion+skill selection is explicitly out of the core's scope; a real
//! deployment replaces this module with whatever draft UI and matchmaking
//! flow it runs upstream. `starting_state` exists so the dispatcher has
//! something to hand a freshly-created match — a fixed, symmetric
//! loadout, not a gameplay decision the core is making on its own.

use fbf_core::PlayerSlot;
use fbf_core::Position;
use fbf_core::UnitId;
use fbf_state::Board;
use fbf_state::GameState;
use fbf_state::HeroClass;
use fbf_state::MinionType;
use fbf_state::Unit;
use fbf_state::UnitCategory;
use std::collections::HashMap;

fn hero(id: &str, owner: PlayerSlot, position: Position, skill: &str) -> Unit {
    let (hp, attack, move_range, attack_range) = Unit::default_stats(UnitCategory::Hero, None);
    Unit {
        id: UnitId::new(id),
        owner,
        position,
        hp,
        max_hp: hp,
        attack,
        move_range,
        attack_range,
        category: UnitCategory::Hero,
        hero_class: Some(HeroClass::Warrior),
        minion_type: None,
        selected_skill_id: Some(skill.to_string()),
        skill_cooldown: 0,
        actions_used: 0,
        preparing: false,
        pending_action: None,
        committed_actions: None,
    }
}

fn minion(id: &str, owner: PlayerSlot, position: Position, minion_type: MinionType) -> Unit {
    let (hp, attack, move_range, attack_range) =
        Unit::default_stats(UnitCategory::Minion, Some(minion_type));
    Unit {
        id: UnitId::new(id),
        owner,
        position,
        hp,
        max_hp: hp,
        attack,
        move_range,
        attack_range,
        category: UnitCategory::Minion,
        hero_class: None,
        minion_type: Some(minion_type),
        selected_skill_id: None,
        skill_cooldown: 0,
        actions_used: 0,
        preparing: false,
        pending_action: None,
        committed_actions: None,
    }
}

/// A fixed, symmetric starting roster: one hero plus a Tank and an Archer
/// per side, facing off across the board. `match_id` seeds per-unit ids so
/// two concurrent matches never collide.
pub fn starting_state(match_id: &str) -> GameState {
    let units = vec![
        hero(
            &format!("{match_id}-p1-hero"),
            PlayerSlot::P1,
            Position::new(0, 2),
            fbf_rules::FIREBALL,
        ),
        minion(
            &format!("{match_id}-p1-tank"),
            PlayerSlot::P1,
            Position::new(0, 1),
            MinionType::Tank,
        ),
        minion(
            &format!("{match_id}-p1-archer"),
            PlayerSlot::P1,
            Position::new(0, 3),
            MinionType::Archer,
        ),
        hero(
            &format!("{match_id}-p2-hero"),
            PlayerSlot::P2,
            Position::new(4, 2),
            fbf_rules::GUARD_UP,
        ),
        minion(
            &format!("{match_id}-p2-tank"),
            PlayerSlot::P2,
            Position::new(4, 1),
            MinionType::Tank,
        ),
        minion(
            &format!("{match_id}-p2-archer"),
            PlayerSlot::P2,
            Position::new(4, 3),
            MinionType::Archer,
        ),
    ];
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
