//! Wire DTOs for every inbound/outbound message kind spec.md §6 names.
//!
//! These are deliberately separate from `fbf_state::{Action, ActionKind}`:
//! the wire shape is a flat bag of optional fields (`targetX`, `targetY`,
//! `targetUnitId`, `unitId`, `choice`) the dispatcher must first resolve
//! into a concrete, well-typed `ActionKind` before anything below C6 ever
//! sees it (spec.md §6 "Inbound message kinds").

use fbf_core::MatchId;
use fbf_core::PlayerSlot;
use fbf_core::Position;
use fbf_core::TimerType;
use fbf_core::UnitId;
use fbf_state::DeathChoiceKind;
use fbf_state::GameState;
use serde::Deserialize;
use serde::Serialize;

/// The `action.type` tag on the wire (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireActionType {
    Move,
    Attack,
    MoveAndAttack,
    UseSkill,
    DeathChoice,
    EndTurn,
}

/// The raw `action` payload field, before it is resolved against a concrete
/// `ActionKind` (spec.md §6 `action: { type, targetX?, targetY?,
/// targetUnitId?, unitId?, choice? }` — `choice` is the DEATH_CHOICE
/// extension E5 exercises, nested alongside the rest rather than as a
/// sibling payload, since the dispatcher already unwraps one `payload`
/// envelope for the whole inbound message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAction {
    #[serde(rename = "type")]
    pub action_type: WireActionType,
    pub unit_id: Option<UnitId>,
    pub target_x: Option<u8>,
    pub target_y: Option<u8>,
    pub target_unit_id: Option<UnitId>,
    pub choice: Option<DeathChoiceKind>,
}

impl WireAction {
    pub fn target_position(&self) -> Option<Position> {
        match (self.target_x, self.target_y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        }
    }
}

/// `join_match` payload (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMatchPayload {
    pub match_id: MatchId,
}

/// `action` payload (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub match_id: MatchId,
    pub player_id: PlayerSlot,
    pub action: WireAction,
}

/// Every inbound message kind the dispatcher's switch recognizes (spec.md
/// §4.5 "Message routing"). Anything else fails to parse into this enum and
/// is surfaced as `ProtocolError::UnknownType`/`MalformedJson` by the codec.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    JoinMatch(JoinMatchPayload),
    Action(ActionPayload),
}

/// `timer` sub-object attached to `your_turn`/`state_update` (spec.md §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerMeta {
    pub action_start_time: u64,
    pub timeout_ms: u64,
    pub timer_type: TimerType,
}

/// `penalty` sub-object attached to `timeout` (spec.md §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PenaltyMeta {
    pub kind: &'static str,
    pub amount: i32,
}

/// Every outbound message kind spec.md §6 names, one variant per payload
/// shape. `MessageCodec::encode` serializes whichever variant the caller
/// hands it into the `{"type", "payload"}` envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum OutboundMessage {
    MatchJoined {
        #[serde(rename = "matchId")]
        match_id: MatchId,
        #[serde(rename = "playerId")]
        player_id: PlayerSlot,
        state: GameState,
    },
    GameReady {
        message: String,
    },
    YourTurn {
        #[serde(rename = "unitId")]
        unit_id: Option<UnitId>,
        #[serde(rename = "actionStartTime")]
        action_start_time: u64,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
        #[serde(rename = "timerType")]
        timer_type: TimerType,
    },
    StateUpdate {
        state: GameState,
        timer: Option<TimerMeta>,
        #[serde(rename = "currentPlayerId")]
        current_player_id: Option<PlayerSlot>,
    },
    GameOver {
        winner: Option<PlayerSlot>,
        state: GameState,
    },
    Timeout {
        #[serde(rename = "timerType")]
        timer_type: TimerType,
        #[serde(rename = "playerId")]
        player_id: PlayerSlot,
        penalty: Option<PenaltyMeta>,
        #[serde(rename = "defaultAction")]
        default_action: &'static str,
        state: GameState,
        #[serde(rename = "nextTimer")]
        next_timer: Option<TimerMeta>,
        #[serde(rename = "nextPlayerId")]
        next_player_id: Option<PlayerSlot>,
    },
    ValidationError {
        message: String,
        action: Option<WireAction>,
    },
    PlayerDisconnected {
        #[serde(rename = "playerId")]
        player_id: PlayerSlot,
    },
    DraftTimeout {
        message: String,
    },
}
