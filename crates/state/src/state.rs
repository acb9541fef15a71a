use crate::Board;
use crate::BuffInstance;
use crate::BuffTile;
use crate::BuffType;
use crate::DeathChoice;
use crate::Obstacle;
use crate::Unit;
use fbf_core::Position;
use fbf_core::UnitId;
use fbf_core::PlayerSlot;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// The full, immutable snapshot of one match (spec.md §3).
///
/// Every mutation performed by `fbf-rules` returns a new `GameState`; the
/// previous value is never touched. `GameState` itself carries no behavior
/// beyond small read-only derived queries — state transitions live in
/// `fbf-rules::apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    pub units: Vec<Unit>,
    pub current_player: PlayerSlot,
    pub game_over: bool,
    pub winner: Option<PlayerSlot>,
    pub unit_buffs: HashMap<UnitId, Vec<BuffInstance>>,
    pub buff_tiles: Vec<BuffTile>,
    pub obstacles: Vec<Obstacle>,
    pub current_round: u32,
    pub pending_death_choice: Option<DeathChoice>,
}

impl GameState {
    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        self.units.iter().find(|u| u.alive() && u.position == position)
    }

    pub fn unit_by_id(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn live_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.alive())
    }

    pub fn live_units_for(&self, owner: PlayerSlot) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.alive() && u.owner == owner)
    }

    pub fn hero_of(&self, owner: PlayerSlot) -> Option<&Unit> {
        self.live_units_for(owner).find(|u| u.is_hero())
    }

    pub fn obstacle_at(&self, position: Position) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.position == position)
    }

    pub fn active_buff_tile_at(&self, position: Position) -> Option<&BuffTile> {
        self.buff_tiles
            .iter()
            .find(|t| t.active() && t.position == position)
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.unit_at(position).is_some() || self.obstacle_at(position).is_some()
    }

    pub fn buffs_of(&self, id: &UnitId) -> &[BuffInstance] {
        self.unit_buffs.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_buff(&self, id: &UnitId, buff_type: BuffType) -> bool {
        self.buffs_of(id).iter().any(|b| b.buff_type == buff_type)
    }

    /// Sum of additive ATK modifiers from every active buff on the unit.
    pub fn atk_modifier(&self, id: &UnitId) -> i32 {
        self.buffs_of(id).iter().map(|b| b.modifiers.atk).sum()
    }

    pub fn hp_modifier(&self, id: &UnitId) -> i32 {
        self.buffs_of(id).iter().map(|b| b.modifiers.hp).sum()
    }

    pub fn move_range_modifier(&self, id: &UnitId) -> i32 {
        self.buffs_of(id)
            .iter()
            .map(|b| b.modifiers.move_range)
            .sum()
    }

    pub fn attack_range_modifier(&self, id: &UnitId) -> i32 {
        self.buffs_of(id)
            .iter()
            .map(|b| b.modifiers.attack_range)
            .sum()
    }

    /// Effective attack stat after all active buff modifiers, floored at 0.
    pub fn effective_attack(&self, unit: &Unit) -> i32 {
        (unit.attack + self.atk_modifier(&unit.id)).max(0)
    }

    /// Effective max HP after all active buff modifiers, floored at 1.
    pub fn effective_max_hp(&self, unit: &Unit) -> i32 {
        (unit.max_hp + self.hp_modifier(&unit.id)).max(1)
    }

    pub fn effective_move_range(&self, unit: &Unit) -> i32 {
        (unit.move_range + self.move_range_modifier(&unit.id)).max(0)
    }

    pub fn effective_attack_range(&self, unit: &Unit) -> i32 {
        (unit.attack_range + self.attack_range_modifier(&unit.id)).max(0)
    }

    /// Total incoming-damage reduction granted by active WEAKNESS buffs on
    /// the defending unit (SPEC_FULL.md / DESIGN.md: reading of the
    /// `target.weakness_reduction` term in spec.md §4.1's damage formula).
    pub fn weakness_reduction(&self, id: &UnitId) -> i32 {
        self.buffs_of(id)
            .iter()
            .filter(|b| b.flags.weakness)
            .map(|b| b.modifiers.atk.unsigned_abs() as i32)
            .sum()
    }

    /// Number of actions the unit may take this round: 2 if it carries an
    /// active SPEED buff (and the commitment recorded at turn start still
    /// applies), 1 otherwise (spec.md §4.1 turn-driver step 1).
    pub fn remaining_actions_for(&self, unit: &Unit) -> u8 {
        let total = unit
            .committed_actions
            .unwrap_or_else(|| if self.has_buff(&unit.id, BuffType::Speed) {
                fbf_core::SPEED_ACTIONS_PER_ROUND
            } else {
                fbf_core::DEFAULT_ACTIONS_PER_ROUND
            });
        total.saturating_sub(unit.actions_used)
    }

    pub fn can_act(&self, unit: &Unit) -> bool {
        unit.alive() && self.remaining_actions_for(unit) > 0
    }

    pub fn any_unit_can_act(&self, owner: PlayerSlot) -> bool {
        self.live_units_for(owner).any(|u| self.can_act(u))
    }
}
