//! Keyed session storage.
//!
//! Live sessions sit behind a per-session `tokio::sync::Mutex`, so turns for
//! the same session run one at a time while different sessions proceed in
//! parallel. Finished sessions leave the live map and only their summary is
//! kept.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use quizcraft_domain::{HintPlan, QuizSession, SessionId, SessionSummary, Transcript};

/// Everything a live session carries between turns.
///
/// Use cases work on a clone of the record and write it back only when the
/// whole turn succeeded.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session: QuizSession,
    pub transcript: Transcript,
    /// Hints for the current round's item
    pub current_hints: HintPlan,
    /// Hints precomputed for the queued next item
    pub lookahead_hints: Option<HintPlan>,
    /// Options last shown to the player, in display order
    pub current_options: Vec<String>,
}

impl SessionRecord {
    pub fn new(session: QuizSession, current_hints: HintPlan, lookahead_hints: Option<HintPlan>) -> Self {
        Self {
            session,
            transcript: Transcript::new(),
            current_hints,
            lookahead_hints,
            current_options: Vec::new(),
        }
    }
}

pub struct SessionStore {
    live: DashMap<SessionId, Arc<Mutex<SessionRecord>>>,
    archive: DashMap<SessionId, SessionSummary>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            live: DashMap::new(),
            archive: DashMap::new(),
        }
    }

    pub fn insert(&self, record: SessionRecord) -> SessionId {
        let id = record.session.id();
        self.live.insert(id, Arc::new(Mutex::new(record)));
        id
    }

    /// Handle to a live session. Lock it for the duration of a turn.
    pub fn get(&self, id: SessionId) -> Option<Arc<Mutex<SessionRecord>>> {
        self.live.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the live session and keep its summary.
    pub fn archive(&self, summary: SessionSummary) {
        let id = summary.session_id;
        self.live.remove(&id);
        self.archive.insert(id, summary);
    }

    pub fn summary(&self, id: SessionId) -> Option<SessionSummary> {
        self.archive.get(&id).map(|entry| entry.value().clone())
    }

    pub fn is_archived(&self, id: SessionId) -> bool {
        self.archive.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
