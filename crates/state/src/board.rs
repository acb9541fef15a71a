use fbf_core::BOARD_SIZE;
use serde::Deserialize;
use serde::Serialize;

/// Fixed 5x5 playing surface. Width/height are carried on the struct (rather
/// than left as bare constants) because they round-trip over the wire as
/// part of `state.board` (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: u8,
    pub height: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: BOARD_SIZE,
            height: BOARD_SIZE,
        }
    }
}
