use crate::TimeoutOutcome;
use fbf_core::MatchId;

/// The dispatcher-side hook every timeout handler reports through
/// (spec.md §4.4 "a single injected `TimerCallback` that the dispatcher
/// uses to broadcast timeout messages"). `MatchService` never broadcasts
/// anything itself — it hands the dispatcher everything needed to build
/// the wire message and lets it own the connections.
#[async_trait::async_trait]
pub trait TimeoutSink: Send + Sync {
    async fn on_action_timeout(&self, match_id: MatchId, outcome: TimeoutOutcome);
    async fn on_death_choice_timeout(&self, match_id: MatchId, outcome: TimeoutOutcome);
    /// DRAFT timeout: surfaced bare, since the core never models the draft
    /// phase itself (spec.md §1, §4.4 "the core does not itself finalise
    /// the draft").
    async fn on_draft_timeout(&self, match_id: MatchId);
}
