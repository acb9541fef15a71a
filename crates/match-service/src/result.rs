use fbf_core::PlayerSlot;
use fbf_core::TimerType;
use fbf_state::GameState;

/// The outcome of a successful `applyActionWithTimer` call (spec.md §4.4).
///
/// `timer_type`/`start_time`/`timeout_ms` describe whichever timer the
/// dispatcher should now report to clients — the fresh ACTION timer on
/// normal progression, or the DEATH_CHOICE timer when the apply just
/// produced a pending choice. All four are `None` together exactly when
/// `game_over` is `true`: a finished match starts no further timer.
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub state: GameState,
    pub next_player: Option<PlayerSlot>,
    pub start_time: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub timer_type: Option<TimerType>,
    pub game_over: bool,
}

impl ActionResult {
    pub fn game_over(state: GameState) -> Self {
        Self {
            state,
            next_player: None,
            start_time: None,
            timeout_ms: None,
            timer_type: None,
            game_over: true,
        }
    }

    pub fn progressed(
        state: GameState,
        next_player: PlayerSlot,
        start_time: u64,
        timeout_ms: u64,
        timer_type: TimerType,
    ) -> Self {
        Self {
            state,
            next_player: Some(next_player),
            start_time: Some(start_time),
            timeout_ms: Some(timeout_ms),
            timer_type: Some(timer_type),
            game_over: false,
        }
    }
}

/// The HP penalty the Hero HP Penalty Rule levies on an ACTION timeout
/// (spec.md §4.4). `kind` is always `"HERO_HP_LOSS"` today; carried as a
/// field rather than a constant so the wire payload matches spec.md §6's
/// `penalty?: {kind, amount}` shape verbatim.
#[derive(Debug, Clone, Copy)]
pub struct Penalty {
    pub kind: &'static str,
    pub amount: i32,
}

/// The timer a timeout handler started for whoever acts next.
#[derive(Debug, Clone, Copy)]
pub struct NextTimer {
    pub start_time: u64,
    pub timeout_ms: u64,
    pub timer_type: TimerType,
}

/// Everything the dispatcher needs to build a `timeout` broadcast
/// (spec.md §6) after one of `MatchService`'s timeout handlers has run.
#[derive(Debug, Clone)]
pub struct TimeoutOutcome {
    pub timer_type: TimerType,
    pub player_id: PlayerSlot,
    pub penalty: Option<Penalty>,
    pub default_action: &'static str,
    pub state: GameState,
    pub next_timer: Option<NextTimer>,
    pub next_player_id: Option<PlayerSlot>,
    pub game_over: bool,
}
