use crate::BuffType;
use fbf_core::FeatureId;
use fbf_core::Position;
use serde::Deserialize;
use serde::Serialize;

/// A ground feature that grants a buff to the first unit that ends a move on
/// it, then removes itself (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffTile {
    pub id: FeatureId,
    pub position: Position,
    pub buff_type: BuffType,
    pub duration_rounds: u32,
    pub triggered: bool,
}

impl BuffTile {
    pub fn active(&self) -> bool {
        !self.triggered
    }
}
