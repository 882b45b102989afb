//! End session use case.
//!
//! Terminates a live session immediately and archives its summary. Ending a
//! session that already finished returns the archived summary unchanged.

use std::sync::Arc;

use quizcraft_domain::{SessionId, SessionSummary};

use crate::infrastructure::ports::ClockPort;
use crate::stores::SessionStore;

use super::QuizError;

pub struct EndSession {
    store: Arc<SessionStore>,
    clock: Arc<dyn ClockPort>,
}

impl EndSession {
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

        // Waits for any turn in progress, so the snapshot is never mid-turn
        let mut record = handle.lock().await;
        if let Some(summary) = self.store.summary(session_id) {
            return Ok(summary);
        }

        let now = self.clock.now();
        if let Some(update) = record.session.terminate(now) {
            tracing::info!(session_id = %session_id, update = ?update, "Quiz session ended early");
        }
        let summary = record.session.summary(now);
        self.store.archive(summary.clone());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{test_app, ScriptedLlm};
    use crate::use_cases::quiz::{PlayerInput, StartRequest};
    use quizcraft_domain::{AgeBand, Difficulty, FinishReason};

    #[tokio::test]
    async fn terminates_without_bonus() {
        let app = test_app(Arc::new(ScriptedLlm::offline()));
        let started = app
            .use_cases
            .quiz
            .start
            .execute(StartRequest {
                difficulty: Difficulty::Easy,
                age_band: AgeBand::Young,
                total_rounds: 3,
                seed: None,
            })
            .await
            .unwrap();
        let id = started.session_id;
        app.use_cases
            .quiz
            .submit
            .execute(id, PlayerInput::Text("Koala".into()))
            .await
            .unwrap();

        let summary = app.use_cases.quiz.end.execute(id).await.unwrap();

        assert_eq!(summary.finish_reason, Some(FinishReason::Terminated));
        assert_eq!(summary.score, 10);
        assert_eq!(summary.bonus_earned, 0);
        assert_eq!(summary.rounds_played, 1);
        assert_eq!(app.store.live_count(), 0);

        // Idempotent
        let again = app.use_cases.quiz.end.execute(id).await.unwrap();
        assert_eq!(again, summary);
    }

    #[tokio::test]
    async fn unknown_session() {
        let app = test_app(Arc::new(ScriptedLlm::offline()));
        assert!(matches!(
            app.use_cases.quiz.end.execute(SessionId::new()).await,
            Err(QuizError::SessionNotFound(_))
        ));
    }
}
