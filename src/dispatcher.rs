//! The protocol dispatcher (spec.md §4.5, component C7).
//!
//! Owns the mapping from connection to match/slot, parses inbound frames,
//! calls into `fbf-match`, and fans the result out to both connected slots
//! (or, for rejections, back to the sender alone). Never throws to the
//! transport: every error path here ends in a `validation_error` frame.

use fbf_core::ConnectionId;
use fbf_core::MatchId;
use fbf_core::PlayerSlot;
use fbf_match::MatchService;
use fbf_match::TimeoutSink;
use fbf_protocol::ActionPayload;
use fbf_protocol::InboundMessage;
use fbf_protocol::JoinMatchPayload;
use fbf_protocol::OutboundMessage;
use fbf_protocol::TimerMeta;
use fbf_registry::MatchRegistry;
use fbf_registry::OutboundSender;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::draft;

/// Per-connection state owned by the task bridging one transport connection
/// (spec.md §4.5 "Owns a `ConnectionRegistry{connectionId -> ClientConnection}`
/// and the mapping of slots within each Match").
pub struct Connection {
    pub id: ConnectionId,
    pub sender: OutboundSender,
    pub match_id: Option<MatchId>,
    pub slot: Option<PlayerSlot>,
}

impl Connection {
    pub fn new(sender: OutboundSender) -> Self {
        Self {
            id: ConnectionId::generate(),
            sender,
            match_id: None,
            slot: None,
        }
    }
}

/// Process-wide `connectionId -> (matchId, slot)` bookkeeping, distinct from
/// `MatchRegistry` (SPEC_FULL.md §C.2). Nothing below the dispatcher
/// consults this — it exists for the dispatcher's own disconnect handling
/// and any future cross-match admin surface (listing live connections).
#[derive(Default)]
struct ConnectionRegistry {
    entries: RwLock<HashMap<ConnectionId, (MatchId, PlayerSlot)>>,
}

impl ConnectionRegistry {
    async fn record(&self, id: ConnectionId, match_id: MatchId, slot: PlayerSlot) {
        self.entries.write().await.insert(id, (match_id, slot));
    }

    async fn forget(&self, id: &ConnectionId) {
        self.entries.write().await.remove(id);
    }
}

pub struct Dispatcher {
    registry: Arc<MatchRegistry>,
    match_service: Arc<MatchService>,
    sink: Arc<dyn TimeoutSink>,
    connections: ConnectionRegistry,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<MatchRegistry>,
        match_service: Arc<MatchService>,
        sink: Arc<dyn TimeoutSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            match_service,
            sink,
            connections: ConnectionRegistry::default(),
        })
    }

    /// Routes one inbound text frame (spec.md §4.5 "Message routing"). Any
    /// parse failure or unrecognized `type` becomes a `validation_error`
    /// sent only to `conn`.
    pub async fn handle_frame(&self, conn: &mut Connection, frame: &str) {
        match fbf_protocol::decode(frame) {
            Ok(InboundMessage::JoinMatch(payload)) => self.handle_join(conn, payload).await,
            Ok(InboundMessage::Action(payload)) => self.handle_action(conn, payload).await,
            Err(e) => self.send_validation_error(conn, e.to_string(), None),
        }
    }

    async fn handle_join(&self, conn: &mut Connection, payload: JoinMatchPayload) {
        let match_id = payload.match_id;
        let m = self
            .registry
            .get_or_create(match_id.clone(), draft::starting_state(&match_id.0))
            .await;

        let Some(slot) = m.seat_first_free(conn.sender.clone()) else {
            self.send_validation_error(conn, "match full".to_string(), None);
            return;
        };
        conn.match_id = Some(match_id.clone());
        conn.slot = Some(slot);
        self.connections.record(conn.id.clone(), match_id.clone(), slot).await;

        let state = m.state.lock().await.clone();
        let joined = OutboundMessage::MatchJoined {
            match_id: match_id.clone(),
            player_id: slot,
            state: state.clone(),
        };
        m.unicast(slot, fbf_protocol::encode(&joined));
        log::info!("[dispatcher] {} joined {} as {}", conn.id, match_id, slot);

        if m.connected_count() == 2 {
            let ready = OutboundMessage::GameReady {
                message: "both players connected".to_string(),
            };
            m.broadcast(fbf_protocol::encode(&ready));

            let start = self
                .match_service
                .start_action_timer_for(match_id.clone(), self.sink.clone());
            let current = state.current_player;
            let unit_id = state
                .live_units_for(current)
                .find(|u| state.can_act(u))
                .map(|u| u.id.clone());
            let your_turn = OutboundMessage::YourTurn {
                unit_id,
                action_start_time: start,
                timeout_ms: fbf_core::ACTION_TIMEOUT_MS,
                timer_type: fbf_core::TimerType::Action,
            };
            m.unicast(current, fbf_protocol::encode(&your_turn));

            let update = OutboundMessage::StateUpdate {
                state,
                timer: Some(TimerMeta {
                    action_start_time: start,
                    timeout_ms: fbf_core::ACTION_TIMEOUT_MS,
                    timer_type: fbf_core::TimerType::Action,
                }),
                current_player_id: Some(current),
            };
            m.broadcast(fbf_protocol::encode(&update));
        }
    }

    async fn handle_action(&self, conn: &mut Connection, payload: ActionPayload) {
        let wire_action = payload.action.clone();
        let kind = match fbf_protocol::resolve(&wire_action) {
            Ok(kind) => kind,
            Err(e) => {
                self.send_validation_error(conn, e.to_string(), Some(wire_action));
                return;
            }
        };

        if conn.match_id.as_ref() != Some(&payload.match_id) {
            self.send_validation_error(
                conn,
                "matchId does not match this connection's joined match".to_string(),
                Some(wire_action),
            );
            return;
        }
        if conn.slot != Some(payload.player_id) {
            self.send_validation_error(
                conn,
                "playerId does not match this connection's slot".to_string(),
                Some(wire_action),
            );
            return;
        }

        let match_id = payload.match_id;
        let result = self
            .match_service
            .apply_action_with_timer(&match_id, payload.player_id, kind, self.sink.clone())
            .await;

        let Some(m) = self.registry.get(&match_id).await else {
            self.send_validation_error(conn, "unknown match".to_string(), Some(wire_action));
            return;
        };

        match result {
            Ok(action_result) => {
                if action_result.game_over {
                    let message = OutboundMessage::GameOver {
                        winner: action_result.state.winner,
                        state: action_result.state,
                    };
                    m.broadcast(fbf_protocol::encode(&message));
                } else {
                    let timer = match (
                        action_result.start_time,
                        action_result.timeout_ms,
                        action_result.timer_type,
                    ) {
                        (Some(start), Some(timeout_ms), Some(timer_type)) => Some(TimerMeta {
                            action_start_time: start,
                            timeout_ms,
                            timer_type,
                        }),
                        _ => None,
                    };
                    let message = OutboundMessage::StateUpdate {
                        state: action_result.state,
                        timer,
                        current_player_id: action_result.next_player,
                    };
                    m.broadcast(fbf_protocol::encode(&message));
                }
            }
            Err(e) => {
                self.send_validation_error(conn, e.to_string(), Some(wire_action));
            }
        }
    }

    /// Vacates `conn`'s slot and broadcasts `player_disconnected` to the
    /// remaining slot, without touching any timer (spec.md §4.5 "On
    /// disconnect").
    pub async fn handle_disconnect(&self, conn: &Connection) {
        self.connections.forget(&conn.id).await;
        let (Some(match_id), Some(slot)) = (conn.match_id.clone(), conn.slot) else {
            return;
        };
        let Some(m) = self.registry.get(&match_id).await else {
            return;
        };
        m.mark_disconnected(slot);
        log::info!("[dispatcher] {} disconnected from {} ({})", conn.id, match_id, slot);
        let message = OutboundMessage::PlayerDisconnected { player_id: slot };
        m.broadcast(fbf_protocol::encode(&message));
    }

    fn send_validation_error(
        &self,
        conn: &Connection,
        message: String,
        action: Option<fbf_protocol::WireAction>,
    ) {
        let outbound = OutboundMessage::ValidationError { message, action };
        let _ = conn.sender.send(fbf_protocol::encode(&outbound));
    }
}
