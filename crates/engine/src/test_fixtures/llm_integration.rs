//! Integration helpers for running against a local Ollama instance.
//!
//! Tests here are `#[ignore]`d; run them with `cargo test -- --ignored`
//! when a model is being served. Configuration comes from the same
//! `QUIZCRAFT_OLLAMA_*` variables the engine reads.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::app_settings::EngineSettings;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};

/// Creates an OllamaClient from the environment.
pub fn create_test_ollama_client() -> OllamaClient {
    let settings = EngineSettings::from_env();
    OllamaClient::new(
        &settings.ollama_base_url,
        &settings.ollama_model,
        settings.llm_timeout_secs,
    )
}

/// Returns true if the server is reachable and answers a tiny request.
pub async fn ollama_available() -> bool {
    let client = create_test_ollama_client();
    let request = LlmRequest::new(vec![ChatMessage::user("Hi")])
        .with_temperature(0.0)
        .with_max_tokens(Some(5));
    client.generate(request).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::quiz::{GeneratorOutcome, PromptAssembler, TurnGenerator};
    use crate::prompt_templates::PromptTemplates;
    use crate::test_fixtures::{sample_content, start_record};

    #[tokio::test]
    #[ignore = "requires ollama"]
    async fn live_model_reports_through_quiz_turn() {
        if !ollama_available().await {
            eprintln!("Ollama not reachable, skipping");
            return;
        }

        let content = Arc::new(sample_content());
        let record = start_record(content.catalog(), 3);
        let assembler = PromptAssembler::new(Arc::clone(&content), PromptTemplates::default());
        let bundle = assembler.bundle(&record).unwrap();
        let request = assembler.request(&bundle, &record.transcript, Some("Is it a koala?"));

        let generator = TurnGenerator::new(
            Arc::new(create_test_ollama_client()),
            Duration::from_secs(120),
            2,
        );
        match generator.generate(request).await {
            GeneratorOutcome::Turn(turn) => assert!(!turn.message.is_empty()),
            other => panic!("model did not produce a usable quiz_turn: {other:?}"),
        }
    }
}
