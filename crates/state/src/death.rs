use fbf_core::Position;
use fbf_core::UnitId;
use fbf_core::PlayerSlot;
use serde::Deserialize;
use serde::Serialize;

/// Gates every non-DEATH_CHOICE action while a minion's death is awaiting a
/// player's spawn decision (spec.md §3, §4.1). At most one is live at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathChoice {
    pub dead_unit_id: UnitId,
    pub owner: PlayerSlot,
    pub death_position: Position,
}
