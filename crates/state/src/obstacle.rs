use fbf_core::FeatureId;
use fbf_core::Position;
use serde::Deserialize;
use serde::Serialize;

/// A tile-blocking feature: it occupies its position for movement and
/// blocks line-of-sight for ranged attacks through it (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: FeatureId,
    pub position: Position,
}
