use fbf_core::FeatureId;
use serde::Deserialize;
use serde::Serialize;

/// The six buff/debuff kinds named in spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuffType {
    Power,
    Life,
    Speed,
    Weakness,
    Bleed,
    Slow,
}

/// Additive stat deltas carried by a single buff instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffModifiers {
    pub atk: i32,
    pub hp: i32,
    pub move_range: i32,
    pub attack_range: i32,
}

/// Boolean projection of `BuffType`, carried alongside the modifiers so
/// call sites can branch on "does this unit have an active SLOW" without
/// re-deriving it from the type tag (spec.md §3 names both `modifiers` and
/// `flags` as sibling fields on `BuffInstance`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuffFlags {
    pub power: bool,
    pub life: bool,
    pub speed: bool,
    pub weakness: bool,
    pub bleed: bool,
    pub slow: bool,
}

impl From<BuffType> for BuffFlags {
    fn from(buff_type: BuffType) -> Self {
        let mut flags = BuffFlags::default();
        match buff_type {
            BuffType::Power => flags.power = true,
            BuffType::Life => flags.life = true,
            BuffType::Speed => flags.speed = true,
            BuffType::Weakness => flags.weakness = true,
            BuffType::Bleed => flags.bleed = true,
            BuffType::Slow => flags.slow = true,
        }
        flags
    }
}

/// One active buff/debuff on a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffInstance {
    pub id: FeatureId,
    #[serde(rename = "type")]
    pub buff_type: BuffType,
    pub duration_rounds: u32,
    pub modifiers: BuffModifiers,
    pub flags: BuffFlags,
}

impl BuffInstance {
    /// Standard-issue buff for a given type, at the canonical magnitude and
    /// duration the skill catalogue and buff tiles hand out. Callers needing
    /// a bespoke instance (rare) construct `BuffInstance` directly.
    pub fn of(id: FeatureId, buff_type: BuffType, duration_rounds: u32) -> Self {
        let modifiers = match buff_type {
            BuffType::Power => BuffModifiers {
                atk: 2,
                ..Default::default()
            },
            BuffType::Life => BuffModifiers {
                hp: 3,
                ..Default::default()
            },
            BuffType::Speed => BuffModifiers::default(),
            BuffType::Weakness => BuffModifiers {
                atk: -1,
                ..Default::default()
            },
            BuffType::Bleed => BuffModifiers::default(),
            BuffType::Slow => BuffModifiers::default(),
        };
        Self {
            id,
            buff_type,
            duration_rounds,
            modifiers,
            flags: BuffFlags::from(buff_type),
        }
    }
}
