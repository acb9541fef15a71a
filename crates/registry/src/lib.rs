//! In-memory match registry (spec.md §4.2, component C3).
//!
//! A `Match` pairs one match's canonical state with the two fixed slots a
//! connection may occupy. `MatchRegistry` is the process-wide, concurrent
//! keyed store of these — the only global mutable state the core carries
//! (spec.md §9 "Global mutable state"), mirrored on the teacher's `Casino`
//! (`RwLock<HashMap<RoomId, RoomHandle>>`) composed with its `Table`
//! (per-match seat/sender bookkeeping).

use fbf_core::MatchId;
use fbf_core::PlayerSlot;
use fbf_state::GameState;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

/// Outbound channel to one connected client. Transport-agnostic: the
/// dispatcher hands this crate an `UnboundedSender` that writes wire-format
/// JSON text frames; nothing below C7 knows what sits on the other end.
pub type OutboundSender = tokio::sync::mpsc::UnboundedSender<String>;

/// One hosted match: its canonical state, guarded by a single mutex so
/// every mutating operation serializes per match (spec.md §5 "one logical
/// writer at a time per matchId" — the "per-match lock covering state and
/// timers" alternative the spec explicitly sanctions; `fbf-match` holds this
/// lock for the duration of an applied action, including the timer
/// bookkeeping it performs while holding it).
pub struct Match {
    pub id: MatchId,
    pub state: Mutex<GameState>,
    connections: SyncMutex<HashMap<PlayerSlot, OutboundSender>>,
    disconnected: SyncMutex<HashSet<PlayerSlot>>,
}

impl Match {
    fn new(id: MatchId, state: GameState) -> Self {
        Self {
            id,
            state: Mutex::new(state),
            connections: SyncMutex::new(HashMap::new()),
            disconnected: SyncMutex::new(HashSet::new()),
        }
    }

    /// Seats a connection in `slot`, clearing any prior disconnect mark for
    /// it (SPEC_FULL.md §C.3 "graceful disconnect bookkeeping" — a rejoin
    /// re-occupies its slot rather than requiring a brand-new one).
    pub fn seat(&self, slot: PlayerSlot, sender: OutboundSender) {
        self.connections.lock().unwrap().insert(slot, sender);
        self.disconnected.lock().unwrap().remove(&slot);
    }

    /// First unoccupied slot, P1 before P2, or `None` if both are taken.
    pub fn free_slot(&self) -> Option<PlayerSlot> {
        let connections = self.connections.lock().unwrap();
        [PlayerSlot::P1, PlayerSlot::P2]
            .into_iter()
            .find(|slot| !connections.contains_key(slot))
    }

    /// Atomically finds the first unoccupied slot and seats `sender` in it
    /// under a single lock acquisition, or returns `None` if both are taken.
    /// Unlike calling `free_slot` then `seat` separately, this closes the
    /// check-then-act race between two concurrent `join_match`s for the same
    /// match (spec.md §4.5 "Slot assignment").
    pub fn seat_first_free(&self, sender: OutboundSender) -> Option<PlayerSlot> {
        let mut connections = self.connections.lock().unwrap();
        let slot = [PlayerSlot::P1, PlayerSlot::P2]
            .into_iter()
            .find(|slot| !connections.contains_key(slot))?;
        connections.insert(slot, sender);
        drop(connections);
        self.disconnected.lock().unwrap().remove(&slot);
        Some(slot)
    }

    /// Marks `slot` disconnected without evicting its sender from the map;
    /// sends through a disconnected slot are simply not attempted (mirrors
    /// `gameroom::table::Table::disconnect`, but the core additionally keeps
    /// the seat reservation so a later `join_match` can reclaim it).
    pub fn mark_disconnected(&self, slot: PlayerSlot) {
        self.disconnected.lock().unwrap().insert(slot);
    }

    pub fn is_connected(&self, slot: PlayerSlot) -> bool {
        let connected = self.connections.lock().unwrap().contains_key(&slot);
        let disconnected = self.disconnected.lock().unwrap().contains(&slot);
        connected && !disconnected
    }

    pub fn connected_count(&self) -> usize {
        [PlayerSlot::P1, PlayerSlot::P2]
            .into_iter()
            .filter(|slot| self.is_connected(*slot))
            .count()
    }

    /// Sends `text` to the occupant of `slot`, if any and still connected.
    pub fn unicast(&self, slot: PlayerSlot, text: String) {
        if !self.is_connected(slot) {
            return;
        }
        let sender = self.connections.lock().unwrap().get(&slot).cloned();
        if let Some(sender) = sender {
            if sender.send(text).is_err() {
                log::warn!("[registry] unicast to {} in {} failed: channel closed", slot, self.id);
            }
        }
    }

    /// Sends `text` to both slots currently connected.
    pub fn broadcast(&self, text: String) {
        for slot in [PlayerSlot::P1, PlayerSlot::P2] {
            self.unicast(slot, text.clone());
        }
    }
}

/// Process-wide keyed store of active matches (spec.md §4.2). Reads may be
/// concurrent; creation/removal never exposes a half-initialized match.
#[derive(Default)]
pub struct MatchRegistry {
    matches: RwLock<HashMap<MatchId, Arc<Match>>>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &MatchId) -> Option<Arc<Match>> {
        self.matches.read().await.get(id).cloned()
    }

    /// Creates a match with `initial_state` (produced by the external
    /// draft/setup factory, spec.md §1) if one doesn't already exist for
    /// `id`, returning the existing or newly-created match either way.
    pub async fn get_or_create(&self, id: MatchId, initial_state: GameState) -> Arc<Match> {
        let mut matches = self.matches.write().await;
        matches
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Match::new(id, initial_state)))
            .clone()
    }

    pub async fn list(&self) -> Vec<MatchId> {
        self.matches.read().await.keys().cloned().collect()
    }

    pub async fn remove(&self, id: &MatchId) -> Option<Arc<Match>> {
        self.matches.write().await.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbf_state::Board;
    use std::collections::HashMap as StdHashMap;

    fn empty_state() -> GameState {
        GameState {
            board: Board::default(),
            units: Vec::new(),
            current_player: PlayerSlot::P1,
            game_over: false,
            winner: None,
            unit_buffs: StdHashMap::new(),
            buff_tiles: Vec::new(),
            obstacles: Vec::new(),
            current_round: 1,
            pending_death_choice: None,
        }
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let registry = MatchRegistry::new();
        let id = MatchId::new("m1");
        let a = registry.get_or_create(id.clone(), empty_state()).await;
        let b = registry.get_or_create(id.clone(), empty_state()).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.list().await, vec![id]);
    }

    #[tokio::test]
    async fn remove_drops_the_match() {
        let registry = MatchRegistry::new();
        let id = MatchId::new("m1");
        registry.get_or_create(id.clone(), empty_state()).await;
        assert!(registry.remove(&id).await.is_some());
        assert!(registry.get(&id).await.is_none());
    }

    #[test]
    fn free_slot_assigns_p1_then_p2() {
        let m = Match::new(MatchId::new("m1"), empty_state());
        assert_eq!(m.free_slot(), Some(PlayerSlot::P1));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        m.seat(PlayerSlot::P1, tx);
        assert_eq!(m.free_slot(), Some(PlayerSlot::P2));
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();
        m.seat(PlayerSlot::P2, tx2);
        assert_eq!(m.free_slot(), None);
    }

    #[test]
    fn seat_first_free_assigns_both_slots_then_rejects() {
        let m = Match::new(MatchId::new("m1"), empty_state());
        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        assert_eq!(m.seat_first_free(tx1), Some(PlayerSlot::P1));
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();
        assert_eq!(m.seat_first_free(tx2), Some(PlayerSlot::P2));
        let (tx3, _rx3) = tokio::sync::mpsc::unbounded_channel();
        assert_eq!(m.seat_first_free(tx3), None);
    }

    #[test]
    fn disconnect_marks_without_evicting_seat() {
        let m = Match::new(MatchId::new("m1"), empty_state());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        m.seat(PlayerSlot::P1, tx);
        assert!(m.is_connected(PlayerSlot::P1));
        m.mark_disconnected(PlayerSlot::P1);
        assert!(!m.is_connected(PlayerSlot::P1));
        assert_eq!(m.connected_count(), 0);
    }
}
