use crate::MatchServiceError;
use crate::TimeoutSink;
use crate::result::ActionResult;
use crate::result::NextTimer;
use crate::result::Penalty;
use crate::result::TimeoutOutcome;
use fbf_core::ACTION_TIMEOUT_MS;
use fbf_core::DEATH_CHOICE_TIMEOUT_MS;
use fbf_core::MatchId;
use fbf_core::PlayerSlot;
use fbf_core::TimerType;
use fbf_registry::MatchRegistry;
use fbf_state::Action;
use fbf_state::ActionKind;
use fbf_state::DeathChoiceKind;
use fbf_timer::TimerService;
use fbf_timer::TimerState;
use std::sync::Arc;

/// Orchestrates the rule engine and the timer service around one match's
/// actions (spec.md §4.4, component C5). Holds no per-match state of its
/// own — everything it touches lives in the `MatchRegistry` it was built
/// with, so cloning a handle to it is cheap and the dispatcher can share
/// one across every connection.
pub struct MatchService {
    registry: Arc<MatchRegistry>,
    timers: Arc<TimerService>,
}

impl MatchService {
    pub fn new(registry: Arc<MatchRegistry>, timers: Arc<TimerService>) -> Self {
        Self { registry, timers }
    }

    pub fn timers(&self) -> &Arc<TimerService> {
        &self.timers
    }

    /// Starts (or replaces) the ACTION timer for `match_id` and schedules
    /// its own real-time firing, wiring the timeout callback back through
    /// `sink` (spec.md §4.3 `schedule`, §4.4 "a single injected
    /// `TimerCallback`").
    pub fn start_action_timer_for(
        self: &Arc<Self>,
        match_id: MatchId,
        sink: Arc<dyn TimeoutSink>,
    ) -> u64 {
        let service = Arc::clone(self);
        let callback_match_id = match_id.clone();
        let callback = Arc::new(move || {
            let service = Arc::clone(&service);
            let match_id = callback_match_id.clone();
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                service.handle_action_timeout(&match_id, sink).await;
            });
        });
        let start = self.timers.start_action_timer(&match_id, callback);
        self.timers.schedule(match_id, TimerType::Action);
        start
    }

    pub fn start_death_choice_timer_for(
        self: &Arc<Self>,
        match_id: MatchId,
        sink: Arc<dyn TimeoutSink>,
    ) -> u64 {
        let service = Arc::clone(self);
        let callback_match_id = match_id.clone();
        let callback = Arc::new(move || {
            let service = Arc::clone(&service);
            let match_id = callback_match_id.clone();
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                service.handle_death_choice_timeout(&match_id, sink).await;
            });
        });
        let start = self.timers.start_death_choice_timer(&match_id, callback);
        self.timers.schedule(match_id, TimerType::DeathChoice);
        start
    }

    /// Starts the DRAFT timer. Nothing in this crate ever calls this on its
    /// own initiative — the draft/setup sub-phase is an external factory
    /// (spec.md §1) — but the dispatcher may start one for a match it is
    /// still assembling, and the timeout surfaces via
    /// [`TimeoutSink::on_draft_timeout`] when it fires.
    pub fn start_draft_timer_for(
        self: &Arc<Self>,
        match_id: MatchId,
        sink: Arc<dyn TimeoutSink>,
    ) -> u64 {
        let service = Arc::clone(self);
        let callback_match_id = match_id.clone();
        let callback = Arc::new(move || {
            let service = Arc::clone(&service);
            let match_id = callback_match_id.clone();
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                service.handle_draft_timeout(&match_id, sink).await;
            });
        });
        let start = self.timers.start_draft_timer(&match_id, callback);
        self.timers.schedule(match_id, TimerType::Draft);
        start
    }

    /// `applyActionWithTimer` (spec.md §4.4). Rejects without touching any
    /// timer on every precondition failure, so repeated bad input never
    /// extends a player's clock.
    pub async fn apply_action_with_timer(
        self: &Arc<Self>,
        match_id: &MatchId,
        player_id: PlayerSlot,
        kind: ActionKind,
        sink: Arc<dyn TimeoutSink>,
    ) -> Result<ActionResult, MatchServiceError> {
        if let ActionKind::DeathChoice { choice } = kind {
            return self
                .apply_death_choice(match_id, player_id, choice, sink)
                .await;
        }

        if self.timers.get_timer_state(match_id, TimerType::DeathChoice) == Some(TimerState::Running) {
            return Err(MatchServiceError::DeathChoicePending);
        }
        let action_state = self.timers.get_timer_state(match_id, TimerType::Action);
        if action_state == Some(TimerState::Timeout) {
            return Err(MatchServiceError::ActionTimeoutAlreadyProcessed);
        }
        let active = matches!(action_state, Some(TimerState::Running) | Some(TimerState::Paused));
        if action_state.is_some() && !active && !self.timers.is_within_grace_period(match_id, TimerType::Action) {
            return Err(MatchServiceError::TimerNotActive);
        }

        let m = self
            .registry
            .get(match_id)
            .await
            .ok_or(MatchServiceError::UnknownMatch)?;
        let next = {
            let mut guard = m.state.lock().await;
            let action = Action::new(player_id, kind);
            if let Err(e) = fbf_rules::validate(&guard, &action) {
                log::debug!("[match {}] rejected {:?}: {}", match_id, player_id, e);
                return Err(e.into());
            }
            let next = fbf_rules::apply(&guard, &action);
            *guard = next.clone();
            next
        };

        Ok(self.progress_after_apply(match_id, next, sink))
    }

    /// Shared tail of both the normal path and the DEATH_CHOICE path: branch
    /// on the freshly-applied state and start whatever timer comes next
    /// (spec.md §4.4 "Post-apply").
    fn progress_after_apply(
        self: &Arc<Self>,
        match_id: &MatchId,
        next: fbf_state::GameState,
        sink: Arc<dyn TimeoutSink>,
    ) -> ActionResult {
        if next.game_over {
            self.timers.cancel_timer(match_id, TimerType::Action);
            self.timers.cancel_timer(match_id, TimerType::DeathChoice);
            return ActionResult::game_over(next);
        }
        if let Some(pending) = next.pending_death_choice.clone() {
            self.timers.pause_action_timer(match_id);
            let start = self.start_death_choice_timer_for(match_id.clone(), sink);
            return ActionResult::progressed(
                next,
                pending.owner,
                start,
                DEATH_CHOICE_TIMEOUT_MS,
                TimerType::DeathChoice,
            );
        }
        self.timers.complete_timer(match_id, TimerType::Action);
        let current = next.current_player;
        let start = self.start_action_timer_for(match_id.clone(), sink);
        ActionResult::progressed(next, current, start, ACTION_TIMEOUT_MS, TimerType::Action)
    }

    async fn apply_death_choice(
        self: &Arc<Self>,
        match_id: &MatchId,
        player_id: PlayerSlot,
        choice: DeathChoiceKind,
        sink: Arc<dyn TimeoutSink>,
    ) -> Result<ActionResult, MatchServiceError> {
        if self.timers.get_timer_state(match_id, TimerType::DeathChoice) == Some(TimerState::Timeout) {
            return Err(MatchServiceError::DeathChoiceTimeoutAlreadyProcessed);
        }
        let m = self
            .registry
            .get(match_id)
            .await
            .ok_or(MatchServiceError::UnknownMatch)?;
        let next = {
            let mut guard = m.state.lock().await;
            let pending = guard
                .pending_death_choice
                .clone()
                .ok_or(MatchServiceError::NoDeathChoicePending)?;
            if pending.owner != player_id {
                return Err(MatchServiceError::NotYourDeathChoice);
            }
            let action = Action::new(player_id, ActionKind::DeathChoice { choice });
            fbf_rules::validate(&guard, &action)?;
            let next = fbf_rules::apply(&guard, &action);
            *guard = next.clone();
            next
        };
        self.timers.complete_timer(match_id, TimerType::DeathChoice);

        if next.game_over {
            self.timers.cancel_timer(match_id, TimerType::Action);
            return Ok(ActionResult::game_over(next));
        }
        // Reset, never resume: the DEATH_CHOICE interrupt does not credit
        // the next player with whatever was left of a paused window
        // (spec.md §4.4 "DEATH_CHOICE path").
        let current = next.current_player;
        let start = self.start_action_timer_for(match_id.clone(), sink);
        Ok(ActionResult::progressed(
            next,
            current,
            start,
            ACTION_TIMEOUT_MS,
            TimerType::Action,
        ))
    }

    /// ACTION timeout handler (spec.md §4.4): Hero HP Penalty Rule, then an
    /// automatic END_TURN if that penalty didn't end the game.
    async fn handle_action_timeout(self: &Arc<Self>, match_id: &MatchId, sink: Arc<dyn TimeoutSink>) {
        log::info!("[match {}] ACTION timer fired", match_id);
        let Some(m) = self.registry.get(match_id).await else {
            log::warn!("[match {}] ACTION timeout fired for a match no longer in the registry", match_id);
            return;
        };
        let (penalized_player, mut state) = {
            let guard = m.state.lock().await;
            (guard.current_player, guard.clone())
        };
        if let Some(hero) = state.hero_of(penalized_player) {
            let hero_id = hero.id.clone();
            state = fbf_rules::apply_timeout_penalty(&state, &hero_id, 1);
        }
        if !state.game_over {
            let action = Action::new(penalized_player, ActionKind::EndTurn { actor: None });
            if fbf_rules::validate(&state, &action).is_ok() {
                state = fbf_rules::apply(&state, &action);
            }
        }
        *m.state.lock().await = state.clone();

        let outcome = self.build_timeout_outcome(
            match_id,
            TimerType::Action,
            penalized_player,
            Some(Penalty {
                kind: "HERO_HP_LOSS",
                amount: 1,
            }),
            "END_TURN",
            state,
            sink.clone(),
        );
        sink.on_action_timeout(match_id.clone(), outcome).await;
    }

    /// DEATH_CHOICE timeout handler (spec.md §4.4): a default
    /// `SPAWN_OBSTACLE` choice for the owner, with no HP penalty.
    async fn handle_death_choice_timeout(
        self: &Arc<Self>,
        match_id: &MatchId,
        sink: Arc<dyn TimeoutSink>,
    ) {
        log::info!("[match {}] DEATH_CHOICE timer fired", match_id);
        let Some(m) = self.registry.get(match_id).await else {
            log::warn!("[match {}] DEATH_CHOICE timeout fired for a match no longer in the registry", match_id);
            return;
        };
        let (owner, mut state) = {
            let guard = m.state.lock().await;
            let Some(pending) = guard.pending_death_choice.clone() else {
                return;
            };
            (pending.owner, guard.clone())
        };
        let action = Action::new(
            owner,
            ActionKind::DeathChoice {
                choice: DeathChoiceKind::SpawnObstacle,
            },
        );
        if fbf_rules::validate(&state, &action).is_ok() {
            state = fbf_rules::apply(&state, &action);
        }
        *m.state.lock().await = state.clone();

        let outcome = self.build_timeout_outcome(
            match_id,
            TimerType::DeathChoice,
            owner,
            None,
            "DEATH_CHOICE{SPAWN_OBSTACLE}",
            state,
            sink.clone(),
        );
        sink.on_death_choice_timeout(match_id.clone(), outcome).await;
    }

    async fn handle_draft_timeout(self: &Arc<Self>, match_id: &MatchId, sink: Arc<dyn TimeoutSink>) {
        sink.on_draft_timeout(match_id.clone()).await;
    }

    /// Cancels/starts whatever timer comes next for `state` and packages
    /// the result for the sink, shared by both timeout handlers.
    fn build_timeout_outcome(
        self: &Arc<Self>,
        match_id: &MatchId,
        timer_type: TimerType,
        player_id: PlayerSlot,
        penalty: Option<Penalty>,
        default_action: &'static str,
        state: fbf_state::GameState,
        sink: Arc<dyn TimeoutSink>,
    ) -> TimeoutOutcome {
        if state.game_over {
            self.timers.cancel_timer(match_id, TimerType::Action);
            self.timers.cancel_timer(match_id, TimerType::DeathChoice);
            return TimeoutOutcome {
                timer_type,
                player_id,
                penalty,
                default_action,
                state,
                next_timer: None,
                next_player_id: None,
                game_over: true,
            };
        }
        let next_timer = if let Some(pending) = state.pending_death_choice.clone() {
            self.timers.pause_action_timer(match_id);
            let start = self.start_death_choice_timer_for(match_id.clone(), sink);
            NextTimer {
                start_time: start,
                timeout_ms: DEATH_CHOICE_TIMEOUT_MS,
                timer_type: TimerType::DeathChoice,
            }
        } else {
            let start = self.start_action_timer_for(match_id.clone(), sink);
            NextTimer {
                start_time: start,
                timeout_ms: ACTION_TIMEOUT_MS,
                timer_type: TimerType::Action,
            }
        };
        let next_player_id = Some(state.current_player);
        TimeoutOutcome {
            timer_type,
            player_id,
            penalty,
            default_action,
            state,
            next_timer: Some(next_timer),
            next_player_id,
            game_over: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbf_core::Position;
    use fbf_core::UnitId;
    use fbf_state::Board;
    use fbf_state::GameState;
    use fbf_state::HeroClass;
    use fbf_state::Unit;
    use fbf_state::UnitCategory;
    use fbf_timer::TestClock;
    use std::collections::HashMap;
    use std::sync::Mutex as SyncMutex;

    fn hero(id: &str, owner: PlayerSlot, position: Position, hp: i32, attack: i32) -> Unit {
        Unit {
            id: UnitId::new(id),
            owner,
            position,
            hp,
            max_hp: hp,
            attack,
            move_range: 1,
            attack_range: 1,
            category: UnitCategory::Hero,
            hero_class: Some(HeroClass::Warrior),
            minion_type: None,
            selected_skill_id: None,
            skill_cooldown: 0,
            actions_used: 0,
            preparing: false,
            pending_action: None,
            committed_actions: None,
        }
    }

    fn two_hero_state() -> GameState {
        GameState {
            board: Board::default(),
            units: vec![
                hero("p1-hero", PlayerSlot::P1, Position::new(2, 2), 10, 3),
                hero("p2-hero", PlayerSlot::P2, Position::new(2, 3), 10, 1),
            ],
            current_player: PlayerSlot::P1,
            game_over: false,
            winner: None,
            unit_buffs: HashMap::new(),
            buff_tiles: Vec::new(),
            obstacles: Vec::new(),
            current_round: 1,
            pending_death_choice: None,
        }
    }

    struct RecordingSink {
        action_timeouts: SyncMutex<Vec<TimeoutOutcome>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                action_timeouts: SyncMutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl TimeoutSink for RecordingSink {
        async fn on_action_timeout(&self, _match_id: MatchId, outcome: TimeoutOutcome) {
            self.action_timeouts.lock().unwrap().push(outcome);
        }
        async fn on_death_choice_timeout(&self, _match_id: MatchId, outcome: TimeoutOutcome) {
            self.action_timeouts.lock().unwrap().push(outcome);
        }
        async fn on_draft_timeout(&self, _match_id: MatchId) {}
    }

    async fn service() -> (Arc<MatchService>, Arc<fbf_registry::MatchRegistry>, TestClock) {
        let clock = TestClock::new(0);
        let registry = Arc::new(fbf_registry::MatchRegistry::new());
        let timers = Arc::new(TimerService::new(Arc::new(clock.clone())));
        (Arc::new(MatchService::new(registry.clone(), timers)), registry, clock)
    }

    #[tokio::test]
    async fn attack_completes_action_timer_and_starts_a_fresh_one() {
        let (svc, registry, _clock) = service().await;
        let id = MatchId::new("m1");
        registry.get_or_create(id.clone(), two_hero_state()).await;
        let sink = RecordingSink::new();
        svc.start_action_timer_for(id.clone(), sink.clone());

        let action = ActionKind::Attack {
            actor: UnitId::new("p1-hero"),
            target_position: Position::new(2, 3),
            target_unit_id: UnitId::new("p2-hero"),
        };
        let result = svc
            .apply_action_with_timer(&id, PlayerSlot::P1, action, sink)
            .await
            .expect("attack should validate");
        assert_eq!(result.timer_type, Some(TimerType::Action));
        assert!(!result.game_over);
        let p2 = result.state.unit_by_id(&UnitId::new("p2-hero")).unwrap();
        assert_eq!(p2.hp, 7);
    }

    #[tokio::test]
    async fn lethal_attack_cancels_the_action_timer() {
        let (svc, registry, _clock) = service().await;
        let id = MatchId::new("m1");
        let mut state = two_hero_state();
        state.units[1].hp = 1;
        registry.get_or_create(id.clone(), state).await;
        let sink = RecordingSink::new();
        svc.start_action_timer_for(id.clone(), sink.clone());

        let action = ActionKind::Attack {
            actor: UnitId::new("p1-hero"),
            target_position: Position::new(2, 3),
            target_unit_id: UnitId::new("p2-hero"),
        };
        let result = svc
            .apply_action_with_timer(&id, PlayerSlot::P1, action, sink)
            .await
            .unwrap();
        assert!(result.game_over);
        assert_eq!(result.state.winner, Some(PlayerSlot::P1));
        assert_eq!(svc.timers().get_timer_state(&id, TimerType::Action), None);
    }

    #[tokio::test]
    async fn death_choice_timer_running_rejects_non_death_choice_actions() {
        let (svc, registry, _clock) = service().await;
        let id = MatchId::new("m1");
        registry.get_or_create(id.clone(), two_hero_state()).await;
        let sink = RecordingSink::new();
        svc.start_death_choice_timer_for(id.clone(), sink.clone());

        let action = ActionKind::EndTurn { actor: None };
        let err = svc
            .apply_action_with_timer(&id, PlayerSlot::P1, action, sink)
            .await
            .unwrap_err();
        assert_eq!(err, MatchServiceError::DeathChoicePending);
    }

    #[tokio::test]
    async fn minion_death_pauses_action_and_starts_death_choice_owned_by_victim() {
        let (svc, registry, _clock) = service().await;
        let id = MatchId::new("m1");
        let mut state = two_hero_state();
        state.units.push(Unit {
            id: UnitId::new("p2-tank"),
            owner: PlayerSlot::P2,
            position: Position::new(2, 1),
            hp: 1,
            max_hp: 5,
            attack: 1,
            move_range: 1,
            attack_range: 1,
            category: UnitCategory::Minion,
            hero_class: None,
            minion_type: Some(fbf_state::MinionType::Tank),
            selected_skill_id: None,
            skill_cooldown: 0,
            actions_used: 0,
            preparing: false,
            pending_action: None,
            committed_actions: None,
        });
        state.units[0].position = Position::new(2, 0);
        registry.get_or_create(id.clone(), state).await;
        let sink = RecordingSink::new();
        svc.start_action_timer_for(id.clone(), sink.clone());

        let action = ActionKind::Attack {
            actor: UnitId::new("p1-hero"),
            target_position: Position::new(2, 1),
            target_unit_id: UnitId::new("p2-tank"),
        };
        let result = svc
            .apply_action_with_timer(&id, PlayerSlot::P1, action, sink)
            .await
            .unwrap();
        assert_eq!(result.timer_type, Some(TimerType::DeathChoice));
        assert_eq!(result.next_player, Some(PlayerSlot::P2));
        assert_eq!(
            svc.timers().get_timer_state(&id, TimerType::Action),
            Some(TimerState::Paused)
        );
        assert_eq!(
            svc.timers().get_timer_state(&id, TimerType::DeathChoice),
            Some(TimerState::Running)
        );

        let choice = ActionKind::DeathChoice {
            choice: DeathChoiceKind::SpawnObstacle,
        };
        let sink2 = RecordingSink::new();
        let follow_up = svc
            .apply_action_with_timer(&id, PlayerSlot::P2, choice, sink2)
            .await
            .unwrap();
        assert_eq!(follow_up.timer_type, Some(TimerType::Action));
        assert_eq!(follow_up.timeout_ms, Some(ACTION_TIMEOUT_MS));
        assert!(follow_up.state.obstacle_at(Position::new(2, 1)).is_some());
        assert!(follow_up.state.pending_death_choice.is_none());
    }

    #[tokio::test]
    async fn action_timeout_applies_hero_hp_penalty_and_ends_turn() {
        let (svc, registry, clock) = service().await;
        let id = MatchId::new("m1");
        registry.get_or_create(id.clone(), two_hero_state()).await;
        let sink = RecordingSink::new();
        svc.start_action_timer_for(id.clone(), sink.clone());

        clock.set(10_600);
        // Drive the handler directly rather than through the scheduled
        // real-time callback, which would spawn it onto the runtime instead
        // of letting this test await it deterministically.
        svc.handle_action_timeout(&id, sink.clone()).await;

        let m = registry.get(&id).await.unwrap();
        let state = m.state.lock().await.clone();
        let p1 = state.unit_by_id(&UnitId::new("p1-hero")).unwrap();
        assert_eq!(p1.hp, 9);
        assert_eq!(state.current_player, PlayerSlot::P2);
    }

    #[tokio::test]
    async fn draft_timeout_surfaces_without_touching_state() {
        let (svc, registry, _clock) = service().await;
        let id = MatchId::new("m1");
        registry.get_or_create(id.clone(), two_hero_state()).await;
        let sink = RecordingSink::new();
        svc.handle_draft_timeout(&id, sink).await;
    }
}
