use crate::Action;
use fbf_core::Position;
use fbf_core::UnitId;
use fbf_core::PlayerSlot;
use serde::Deserialize;
use serde::Serialize;

/// HERO vs MINION discriminator (spec.md §3, §9 "collapse to a tagged variant").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitCategory {
    Hero,
    Minion,
}

/// Cosmetic hero archetype. Gameplay-relevant behavior hangs off
/// `selectedSkillId`, not this tag; the spec leaves the hero class catalogue
/// unspecified beyond "heroClass set iff HERO".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeroClass {
    Warrior,
    Mage,
    Ranger,
}

/// Minion archetype. Drives default stats and the Guardian rule (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinionType {
    Tank,
    Archer,
    Assassin,
}

/// A single combatant. All default stats below are spec.md §3's archetype
/// table; the draft/setup factory is free to hand the engine units with
/// different base stats (e.g. buffed drafts), the engine only ever reads
/// whatever is on the `Unit` it is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerSlot,
    pub position: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub move_range: i32,
    pub attack_range: i32,
    pub category: UnitCategory,
    pub hero_class: Option<HeroClass>,
    pub minion_type: Option<MinionType>,
    pub selected_skill_id: Option<String>,
    pub skill_cooldown: u32,
    pub actions_used: u8,
    pub preparing: bool,
    pub pending_action: Option<Action>,
    /// Actions available to this unit for the round it is currently taking,
    /// snapshotted the instant it first becomes eligible to act
    /// (SPEC_FULL.md §D.3 — the SPEED commitment).
    pub committed_actions: Option<u8>,
}

impl Unit {
    pub fn alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_hero(&self) -> bool {
        matches!(self.category, UnitCategory::Hero)
    }

    pub fn is_minion(&self) -> bool {
        matches!(self.category, UnitCategory::Minion)
    }

    /// Default stat block for a fresh unit of the given archetype
    /// (spec.md §3 "Default statistics by archetype").
    pub fn default_stats(category: UnitCategory, minion_type: Option<MinionType>) -> (i32, i32, i32, i32) {
        match (category, minion_type) {
            (UnitCategory::Hero, _) => (5, 1, 1, 1),
            (UnitCategory::Minion, Some(MinionType::Tank)) => (5, 1, 1, 1),
            (UnitCategory::Minion, Some(MinionType::Archer)) => (3, 1, 1, 3),
            (UnitCategory::Minion, Some(MinionType::Assassin)) => (2, 2, 4, 1),
            (UnitCategory::Minion, None) => (1, 1, 1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_match_archetype_table() {
        assert_eq!(
            Unit::default_stats(UnitCategory::Hero, None),
            (5, 1, 1, 1)
        );
        assert_eq!(
            Unit::default_stats(UnitCategory::Minion, Some(MinionType::Tank)),
            (5, 1, 1, 1)
        );
        assert_eq!(
            Unit::default_stats(UnitCategory::Minion, Some(MinionType::Archer)),
            (3, 1, 1, 3)
        );
        assert_eq!(
            Unit::default_stats(UnitCategory::Minion, Some(MinionType::Assassin)),
            (2, 2, 4, 1)
        );
    }
}
