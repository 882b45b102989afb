//! Get summary use case.

use std::sync::Arc;

use quizcraft_domain::{SessionId, SessionSummary};

use crate::infrastructure::ports::ClockPort;
use crate::stores::SessionStore;

use super::QuizError;

/// Summary of a finished session, or a snapshot of a live one.
pub struct GetSummary {
    store: Arc<SessionStore>,
    clock: Arc<dyn ClockPort>,
}

impl GetSummary {
    pub fn new(store: Arc<SessionStore>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, clock }
    }

    pub async fn execute(&self, session_id: SessionId) -> Result<SessionSummary, QuizError> {
        if let Some(summary) = self.store.summary(session_id) {
            return Ok(summary);
        }
        let handle = self
            .store
            .get(session_id)
            .ok_or(QuizError::SessionNotFound(session_id))?;
        let record = handle.lock().await;
        Ok(record.session.summary(self.clock.now()))
    }
}
