//! One generator turn: call, time-box, parse, regenerate on malformed output.

use std::sync::Arc;
use std::time::Duration;

use crate::game_tools::{parse_quiz_turn, quiz_turn_tool, QuizTurn};
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutcome {
    Turn(QuizTurn),
    /// Timed out or unreachable after the client's retries
    Unavailable(String),
    /// Answered, but never with a usable `quiz_turn` within the retry cap
    Malformed(String),
}

pub struct TurnGenerator {
    llm: Arc<dyn LlmPort>,
    /// Deadline for one whole call, client retries included
    timeout: Duration,
    malformed_retry_cap: u32,
}

impl TurnGenerator {
    pub fn new(llm: Arc<dyn LlmPort>, timeout: Duration, malformed_retry_cap: u32) -> Self {
        Self {
            llm,
            timeout,
            malformed_retry_cap,
        }
    }

    pub async fn generate(&self, request: LlmRequest) -> GeneratorOutcome {
        let mut attempt = 0;
        loop {
            let call = self
                .llm
                .generate_with_tools(request.clone(), vec![quiz_turn_tool()]);

            let problem = match tokio::time::timeout(self.timeout, call).await {
                Err(_) => {
                    let error = LlmError::Timeout(self.timeout.as_secs());
                    tracing::warn!(error = %error, "Generator call timed out");
                    return GeneratorOutcome::Unavailable(error.to_string());
                }
                Ok(Err(error)) if error.is_unavailable() => {
                    tracing::warn!(error = %error, "Generator unavailable");
                    return GeneratorOutcome::Unavailable(error.to_string());
                }
                Ok(Err(error)) => error.to_string(),
                Ok(Ok(response)) => match parse_quiz_turn(&response) {
                    Ok(turn) => return GeneratorOutcome::Turn(turn),
                    Err(error) => error.to_string(),
                },
            };

            if attempt >= self.malformed_retry_cap {
                tracing::warn!(attempts = attempt + 1, error = %problem, "Generator output still malformed");
                return GeneratorOutcome::Malformed(problem);
            }
            attempt += 1;
            tracing::debug!(attempt, error = %problem, "Regenerating malformed generator output");
        }
    }
}
