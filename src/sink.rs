//! The dispatcher's [`fbf_match::TimeoutSink`] implementation: turns a
//! timeout handler's outcome into a `timeout`/`draft_timeout` broadcast
//! (spec.md §4.4 "a single injected `TimerCallback`", §6 `timeout`).

use fbf_core::MatchId;
use fbf_match::TimeoutOutcome;
use fbf_match::TimeoutSink;
use fbf_protocol::OutboundMessage;
use fbf_protocol::PenaltyMeta;
use fbf_protocol::TimerMeta;
use fbf_registry::MatchRegistry;
use std::sync::Arc;

pub struct DispatcherTimeoutSink {
    registry: Arc<MatchRegistry>,
}

impl DispatcherTimeoutSink {
    pub fn new(registry: Arc<MatchRegistry>) -> Arc<Self> {
        Arc::new(Self { registry })
    }

    async fn broadcast_outcome(&self, match_id: MatchId, outcome: TimeoutOutcome) {
        let Some(m) = self.registry.get(&match_id).await else {
            return;
        };
        if outcome.game_over {
            let message = OutboundMessage::Timeout {
                timer_type: outcome.timer_type,
                player_id: outcome.player_id,
                penalty: outcome.penalty.map(|p| PenaltyMeta {
                    kind: p.kind,
                    amount: p.amount,
                }),
                default_action: outcome.default_action,
                state: outcome.state.clone(),
                next_timer: None,
                next_player_id: None,
            };
            m.broadcast(fbf_protocol::encode(&message));
            let game_over = OutboundMessage::GameOver {
                winner: outcome.state.winner,
                state: outcome.state,
            };
            m.broadcast(fbf_protocol::encode(&game_over));
            return;
        }
        let next_timer = outcome.next_timer.map(|t| TimerMeta {
            action_start_time: t.start_time,
            timeout_ms: t.timeout_ms,
            timer_type: t.timer_type,
        });
        let message = OutboundMessage::Timeout {
            timer_type: outcome.timer_type,
            player_id: outcome.player_id,
            penalty: outcome.penalty.map(|p| PenaltyMeta {
                kind: p.kind,
                amount: p.amount,
            }),
            default_action: outcome.default_action,
            state: outcome.state,
            next_timer,
            next_player_id: outcome.next_player_id,
        };
        m.broadcast(fbf_protocol::encode(&message));
    }
}

#[async_trait::async_trait]
impl TimeoutSink for DispatcherTimeoutSink {
    async fn on_action_timeout(&self, match_id: MatchId, outcome: TimeoutOutcome) {
        log::info!("[dispatcher] action timeout in {}", match_id);
        self.broadcast_outcome(match_id, outcome).await;
    }

    async fn on_death_choice_timeout(&self, match_id: MatchId, outcome: TimeoutOutcome) {
        log::info!("[dispatcher] death choice timeout in {}", match_id);
        self.broadcast_outcome(match_id, outcome).await;
    }

    async fn on_draft_timeout(&self, match_id: MatchId) {
        log::info!("[dispatcher] draft timeout in {}", match_id);
        let Some(m) = self.registry.get(&match_id).await else {
            return;
        };
        let message = OutboundMessage::DraftTimeout {
            message: "draft phase timed out".to_string(),
        };
        m.broadcast(fbf_protocol::encode(&message));
    }
}
