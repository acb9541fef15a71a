use fbf_core::FeatureId;
use fbf_core::Position;
use fbf_core::UnitId;
use fbf_core::PlayerSlot;
use fbf_state::BuffType;
use fbf_state::DeathChoice;
use fbf_state::GameState;
use fbf_state::MinionType;
use fbf_state::Obstacle;
use fbf_state::Unit;

/// Distinguishes a death caused directly by a validated player action from
/// one caused by round-end processing (BLEED/Decay/Pressure), which changes
/// how the resulting minion death is resolved (spec.md §4.1 "Death handling").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Action,
    System,
}

/// If `declared_target` has an orthogonally-adjacent allied TANK that is not
/// itself, the Guardian rule redirects damage to that Tank (spec.md §4.1
/// ATTACK). Returns the id of whichever unit actually takes the hit.
pub fn resolve_guardian(state: &GameState, declared_target: &Unit) -> UnitId {
    state
        .live_units_for(declared_target.owner)
        .find(|u| {
            u.id != declared_target.id
                && matches!(u.minion_type, Some(MinionType::Tank))
                && u.position.is_orthogonally_adjacent(declared_target.position)
        })
        .map(|tank| tank.id.clone())
        .unwrap_or_else(|| declared_target.id.clone())
}

/// Applies a single target's damage and resolves any resulting death,
/// returning the new state. A dead/missing target is a no-op. Does not
/// itself decide the simultaneous-death override — see
/// `apply_damage_batch` for that.
pub fn apply_single_damage(
    state: GameState,
    target_id: &UnitId,
    amount: i32,
    cause: DeathCause,
) -> GameState {
    let mut next = state;
    let Some(index) = next.units.iter().position(|u| &u.id == target_id && u.alive()) else {
        return next;
    };
    let amount = amount.max(0);
    next.units[index].hp = (next.units[index].hp - amount).max(0);
    if next.units[index].alive() {
        return next;
    }
    let died = next.units[index].clone();
    if died.is_hero() {
        next.game_over = true;
        next.winner = Some(died.owner.other());
        return next;
    }
    next.units.retain(|u| u.id != died.id);
    next.unit_buffs.remove(&died.id);
    match cause {
        DeathCause::Action => {
            next.pending_death_choice = Some(DeathChoice {
                dead_unit_id: died.id,
                owner: died.owner,
                death_position: died.position,
            });
        }
        DeathCause::System => {
            spawn_system_death_feature(&mut next, died.position);
        }
    }
    next
}

/// Applies a batch of simultaneous target damages (one round-end step) and
/// resolves the simultaneous-death rule: if both heroes die within this one
/// batch, the active player — the one whose turn was in progress when
/// round-end was entered — wins outright, overriding the per-death "other
/// player wins" resolution (spec.md §4.1 round-end step 5).
pub fn apply_damage_batch(
    state: &GameState,
    targets: &[(UnitId, i32)],
    cause: DeathCause,
    active_player: PlayerSlot,
) -> GameState {
    let hero_p1_alive_before = state.hero_of(PlayerSlot::P1).is_some();
    let hero_p2_alive_before = state.hero_of(PlayerSlot::P2).is_some();

    let mut next = state.clone();
    for (id, amount) in targets {
        next = apply_single_damage(next, id, *amount, cause);
    }

    let hero_p1_died = hero_p1_alive_before && next.hero_of(PlayerSlot::P1).is_none();
    let hero_p2_died = hero_p2_alive_before && next.hero_of(PlayerSlot::P2).is_none();
    if hero_p1_died && hero_p2_died {
        next.game_over = true;
        next.winner = Some(active_player);
    }
    next
}

/// Places a new obstacle or buff tile at a death position per round parity
/// (odd round -> obstacle, even round -> buff tile), applying the overwrite
/// rule first (spec.md §4.1 "system death", "Overwrite rule").
fn spawn_system_death_feature(state: &mut GameState, position: Position) {
    if state.current_round % 2 == 1 {
        overwrite_place_obstacle(state, position, derive_feature_id("obstacle", state, position));
    } else {
        overwrite_place_buff_tile(
            state,
            position,
            BuffType::Power,
            2,
            derive_feature_id("tile", state, position),
        );
    }
}

/// Grants `actor` the buff of any active `BuffTile` sitting at `position`
/// and removes the tile, consuming it. Shared by a direct MOVE and by a
/// SLOW unit's deferred MOVE resolved at round end (spec.md §4.1 MOVE,
/// "Overwrite rule" neighbor: buff tiles are one-shot, not overwritten).
pub(crate) fn trigger_buff_tile(state: &mut GameState, actor: &UnitId, position: Position) {
    let Some(tile_index) = state
        .buff_tiles
        .iter()
        .position(|t| t.active() && t.position == position)
    else {
        return;
    };
    let tile = state.buff_tiles.remove(tile_index);
    let buff = fbf_state::BuffInstance::of(
        derive_feature_id("tile-grant", state, position),
        tile.buff_type,
        tile.duration_rounds,
    );
    state.unit_buffs.entry(actor.clone()).or_default().push(buff);
}

/// Deterministic id for a feature spawned by the engine itself (round-end
/// system death, DEATH_CHOICE). The engine must stay clock-free, so this is
/// derived entirely from state already in hand rather than a fresh UUID.
pub fn derive_feature_id(prefix: &str, state: &GameState, position: Position) -> FeatureId {
    FeatureId::new(format!(
        "{prefix}:r{}:{}:{}",
        state.current_round, position.x, position.y
    ))
}

/// Removes any existing obstacle or active buff tile at `position`, then
/// inserts the new obstacle (spec.md §4.1 "Overwrite rule").
pub fn overwrite_place_obstacle(state: &mut GameState, position: Position, id: FeatureId) {
    state.obstacles.retain(|o| o.position != position);
    state.buff_tiles.retain(|t| t.position != position);
    state.obstacles.push(Obstacle { id, position });
}

/// Removes any existing obstacle or active buff tile at `position`, then
/// inserts the new buff tile (spec.md §4.1 "Overwrite rule").
pub fn overwrite_place_buff_tile(
    state: &mut GameState,
    position: Position,
    buff_type: BuffType,
    duration_rounds: u32,
    id: FeatureId,
) {
    state.obstacles.retain(|o| o.position != position);
    state.buff_tiles.retain(|t| t.position != position);
    state.buff_tiles.push(fbf_state::BuffTile {
        id,
        position,
        buff_type,
        duration_rounds,
        triggered: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbf_core::Position;
    use fbf_core::UnitId;
    use fbf_state::Board;
    use fbf_state::HeroClass;
    use fbf_state::UnitCategory;
    use std::collections::HashMap;

    fn minion(id: &str, owner: PlayerSlot, position: Position, hp: i32, minion_type: MinionType) -> Unit {
        Unit {
            id: UnitId::new(id),
            owner,
            position,
            hp,
            max_hp: hp,
            attack: 1,
            move_range: 1,
            attack_range: 1,
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

    fn hero(id: &str, owner: PlayerSlot, position: Position, hp: i32) -> Unit {
        Unit {
            id: UnitId::new(id),
            owner,
            position,
            hp,
            max_hp: hp,
            attack: 1,
            move_range: 1,
            attack_range: 1,
            category: UnitCategory::Hero,
            hero_class: Some(HeroClass::Warrior),
            minion_type: None,
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
    fn guardian_redirects_to_adjacent_tank() {
        let target = minion("archer", PlayerSlot::P1, Position::new(2, 2), 3, MinionType::Archer);
        let tank = minion("tank", PlayerSlot::P1, Position::new(2, 3), 5, MinionType::Tank);
        let s = state(vec![target.clone(), tank.clone()]);
        assert_eq!(resolve_guardian(&s, &target), tank.id);
    }

    #[test]
    fn guardian_does_not_redirect_without_adjacent_tank() {
        let target = minion("archer", PlayerSlot::P1, Position::new(2, 2), 3, MinionType::Archer);
        let s = state(vec![target.clone()]);
        assert_eq!(resolve_guardian(&s, &target), target.id);
    }

    #[test]
    fn minion_death_by_action_creates_pending_choice() {
        let victim = minion("m1", PlayerSlot::P2, Position::new(1, 1), 1, MinionType::Archer);
        let s = state(vec![victim.clone()]);
        let next = apply_single_damage(s, &victim.id, 5, DeathCause::Action);
        assert!(next.unit_by_id(&victim.id).is_none());
        let choice = next.pending_death_choice.expect("pending choice");
        assert_eq!(choice.owner, PlayerSlot::P2);
        assert_eq!(choice.death_position, Position::new(1, 1));
    }

    #[test]
    fn minion_death_by_system_spawns_feature_no_choice() {
        let victim = minion("m1", PlayerSlot::P2, Position::new(1, 1), 1, MinionType::Archer);
        let mut s = state(vec![victim.clone()]);
        s.current_round = 1;
        let next = apply_single_damage(s, &victim.id, 5, DeathCause::System);
        assert!(next.pending_death_choice.is_none());
        assert!(next.obstacle_at(Position::new(1, 1)).is_some());
    }

    #[test]
    fn hero_death_sets_game_over_and_winner() {
        let hero1 = hero("h1", PlayerSlot::P1, Position::new(0, 0), 1);
        let s = state(vec![hero1.clone()]);
        let next = apply_single_damage(s, &hero1.id, 3, DeathCause::Action);
        assert!(next.game_over);
        assert_eq!(next.winner, Some(PlayerSlot::P2));
    }

    #[test]
    fn simultaneous_hero_deaths_favor_active_player() {
        let h1 = hero("h1", PlayerSlot::P1, Position::new(0, 0), 1);
        let h2 = hero("h2", PlayerSlot::P2, Position::new(4, 4), 1);
        let s = state(vec![h1.clone(), h2.clone()]);
        let next = apply_damage_batch(
            &s,
            &[(h1.id.clone(), 5), (h2.id.clone(), 5)],
            DeathCause::System,
            PlayerSlot::P2,
        );
        assert!(next.game_over);
        assert_eq!(next.winner, Some(PlayerSlot::P2));
    }

    #[test]
    fn overwrite_rule_removes_existing_feature_at_position() {
        let mut s = state(vec![]);
        let pos = Position::new(2, 2);
        overwrite_place_buff_tile(&mut s, pos, BuffType::Power, 2, FeatureId::new("t1"));
        assert_eq!(s.buff_tiles.len(), 1);
        overwrite_place_obstacle(&mut s, pos, FeatureId::new("o1"));
        assert_eq!(s.buff_tiles.len(), 0);
        assert_eq!(s.obstacles.len(), 1);
    }
}
