//! Shared identifiers, board geometry, and timing constants for the match server.
//!
//! Everything below C2 in the dependency order (`fbf-state`, `fbf-rules`) depends
//! only on this crate; nothing here knows about connections, timers, or the wire
//! format.
#![allow(dead_code)]

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

// ============================================================================
// BOARD GEOMETRY
// ============================================================================
/// Width and height of the fixed square board.
pub const BOARD_SIZE: u8 = 5;

/// A grid coordinate. Both axes run `0..BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates lie within the board.
    pub fn on_board(&self) -> bool {
        self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }

    /// Orthogonal Manhattan distance, used by MOVE and melee ATTACK.
    pub fn manhattan(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) as u32 + self.y.abs_diff(other.y) as u32
    }

    /// Chebyshev distance (diagonal-inclusive), used by ranged ATTACK.
    pub fn chebyshev(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y)) as u32
    }

    /// True if `other` is one of the four orthogonal neighbors.
    pub fn is_orthogonally_adjacent(&self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
/// Opaque, match-unique unit identifier. Assigned by the external draft/setup
/// factory; the core never constructs one itself (see spec.md §1, §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque obstacle/buff-tile identifier, distinct from `UnitId` for type safety.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a match within the registry. Caller-supplied over the wire
/// (`join_match.matchId`), not generated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque per-connection identifier, assigned by the dispatcher when a
/// transport-level connection is accepted. Distinct from any player/unit
/// identity: a connection occupies a slot, it does not own one permanently
/// (spec.md §4.5, §9 "Cyclic references").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generates a fresh, process-unique connection id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two fixed slots within a match (glossary: "Slot").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    #[serde(rename = "P1")]
    P1,
    #[serde(rename = "P2")]
    P2,
}

impl PlayerSlot {
    pub fn other(self) -> Self {
        match self {
            Self::P1 => Self::P2,
            Self::P2 => Self::P1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlayerSlot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            _ => Err(()),
        }
    }
}

// ============================================================================
// TIMING CONSTANTS (§2 C4, §4.3)
// ============================================================================
/// Per-turn decision window.
pub const ACTION_TIMEOUT_MS: u64 = 10_000;
/// Window to answer a pending DEATH_CHOICE.
pub const DEATH_CHOICE_TIMEOUT_MS: u64 = 5_000;
/// Window for the external draft/setup phase to complete.
pub const DRAFT_TIMEOUT_MS: u64 = 60_000;
/// Late window in which an action arriving just after nominal expiry is
/// still accepted (glossary: "Grace period").
pub const GRACE_PERIOD_MS: u64 = 500;

/// The three timer kinds the server drives, one record per `(matchId, type)`
/// (spec.md §2 C4, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerType {
    #[serde(rename = "ACTION")]
    Action,
    #[serde(rename = "DEATH_CHOICE")]
    DeathChoice,
    #[serde(rename = "DRAFT")]
    Draft,
}

impl TimerType {
    /// The nominal timeout window for this timer kind.
    pub fn default_timeout_ms(self) -> u64 {
        match self {
            Self::Action => ACTION_TIMEOUT_MS,
            Self::DeathChoice => DEATH_CHOICE_TIMEOUT_MS,
            Self::Draft => DRAFT_TIMEOUT_MS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Action => "ACTION",
            Self::DeathChoice => "DEATH_CHOICE",
            Self::Draft => "DRAFT",
        }
    }
}

impl fmt::Display for TimerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RULE ENGINE CONSTANTS (§4.1)
// ============================================================================
/// Round at which Decay damage begins ticking every live minion.
pub const DECAY_START_ROUND: u32 = 3;
/// Round at which late-game pressure begins ticking every live unit.
pub const PRESSURE_START_ROUND: u32 = 8;
/// Default skill cooldown in rounds when a skill definition does not override it.
pub const DEFAULT_SKILL_COOLDOWN: u32 = 2;
/// Number of actions a unit may take in a round while under a SPEED buff.
pub const SPEED_ACTIONS_PER_ROUND: u8 = 2;
/// Number of actions a unit may take in a round by default.
pub const DEFAULT_ACTIONS_PER_ROUND: u8 = 1;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with a timestamped log file.
/// Creates `logs/` and writes DEBUG level to file, INFO to terminal, mirroring
/// the bootstrap every binary in this workspace shares.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register a Ctrl+C handler for immediate shutdown.
#[cfg(feature = "server")]
pub fn install_shutdown_handler() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_on_board() {
        assert!(Position::new(0, 0).on_board());
        assert!(Position::new(4, 4).on_board());
        assert!(!Position::new(5, 0).on_board());
    }

    #[test]
    fn manhattan_vs_chebyshev() {
        let a = Position::new(0, 0);
        let b = Position::new(2, 3);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(a.chebyshev(b), 3);
    }

    #[test]
    fn orthogonal_adjacency() {
        let a = Position::new(2, 2);
        assert!(a.is_orthogonally_adjacent(Position::new(2, 3)));
        assert!(!a.is_orthogonally_adjacent(Position::new(3, 3)));
    }

    #[test]
    fn player_slot_other_and_parse() {
        assert_eq!(PlayerSlot::P1.other(), PlayerSlot::P2);
        assert_eq!("P2".parse::<PlayerSlot>(), Ok(PlayerSlot::P2));
    }
}
