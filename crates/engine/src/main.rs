//! Quizcraft Engine - terminal runner.
//!
//! Plays one session over stdin: `1..n` picks an option, `/hint` asks for a
//! hint, `/skip` gives up on the question, `/quit` ends the game, and any
//! other text is a free-form answer.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizcraft_domain::SessionSummary;
use quizcraft_engine::infrastructure::{
    app_settings::EngineSettings,
    catalog_file::load_catalog,
    media::NoMediaSearch,
    ollama::OllamaClient,
    resilient_llm::ResilientLlmClient,
};
use quizcraft_engine::use_cases::quiz::{PlayerInput, QuizError, StartRequest, TurnOutcome};
use quizcraft_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizcraft_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = EngineSettings::from_env();
    tracing::info!(catalog = %settings.catalog_path, model = %settings.ollama_model, "Starting Quizcraft");

    let catalog = load_catalog(&settings.catalog_path)?;

    // Create infrastructure clients
    let ollama = Arc::new(OllamaClient::new(
        &settings.ollama_base_url,
        &settings.ollama_model,
        settings.llm_timeout_secs,
    ));
    let retry_config = settings.retry_config();
    tracing::info!(
        "LLM client configured with retry: max_retries={}, base_delay_ms={}",
        retry_config.max_retries,
        retry_config.base_delay_ms
    );
    let llm = Arc::new(ResilientLlmClient::new(ollama, retry_config));

    let app = App::new(catalog, llm, Arc::new(NoMediaSearch), &settings);

    let started = app
        .use_cases
        .quiz
        .start
        .execute(StartRequest {
            difficulty: settings.difficulty,
            age_band: settings.age_band,
            total_rounds: settings.rounds,
            seed: settings.seed,
        })
        .await?;
    let session_id = started.session_id;

    println!("{}", started.question);
    print_options(&started.options);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut summary: Option<SessionSummary> = None;

    while let Some(line) = lines.next_line().await? {
        let input = match parse_input(&line) {
            Some(input) => input,
            None => {
                summary = Some(app.use_cases.quiz.end.execute(session_id).await?);
                break;
            }
        };

        match app.use_cases.quiz.submit.execute(session_id, input).await {
            Ok(outcome) => {
                print_turn(&outcome);
                if outcome.summary.is_some() {
                    summary = outcome.summary;
                    break;
                }
            }
            Err(QuizError::TryAgain(_)) => println!("Sorry, I lost my train of thought. Please try again."),
            Err(QuizError::InvalidRequest(reason)) => println!("{reason}"),
            Err(error) => return Err(error.into()),
        }
    }

    let summary = match summary {
        Some(summary) => summary,
        // stdin closed mid-game
        None => app.use_cases.quiz.end.execute(session_id).await?,
    };
    print_summary(&summary);
    Ok(())
}

/// Map a line of input to a player action. `None` means quit.
fn parse_input(line: &str) -> Option<PlayerInput> {
    let line = line.trim();
    Some(match line {
        "/quit" => return None,
        "/hint" => PlayerInput::DontKnow,
        "/skip" => PlayerInput::Skip,
        "" => PlayerInput::Continue,
        _ => match line.parse::<usize>() {
            Ok(number) => PlayerInput::Choice(number),
            Err(_) => PlayerInput::Text(line.to_string()),
        },
    })
}

fn print_options(options: &[String]) {
    for (index, option) in options.iter().enumerate() {
        println!("  {}. {}", index + 1, option);
    }
}

fn print_turn(outcome: &TurnOutcome) {
    println!("{}", outcome.message);
    if let Some(hint) = &outcome.hint {
        if !outcome.message.contains(hint.text()) {
            println!("Hint: {}", hint.text());
        }
    }
    if let Some(media) = &outcome.media {
        println!("(picture: {})", media.url);
    }
    if let Some(result) = &outcome.round_result {
        if let Some(explanation) = &result.explanation {
            println!("{explanation}");
        }
        println!("+{} points (score: {})", result.points_delta, result.score);
    }
    print_options(&outcome.options);
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!("Final score: {}", summary.score);
    println!(
        "Correct: {} of {} rounds ({} played)",
        summary.correct_count, summary.total_rounds, summary.rounds_played
    );
    println!("Hints used: {}", summary.hints_used);
    if summary.bonus_earned > 0 {
        println!("Completion bonus: {}", summary.bonus_earned);
    }
    println!("Time: {}s", summary.duration_ms / 1000);
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_choices() {
        assert_eq!(parse_input("/quit"), None);
        assert_eq!(parse_input(" /hint "), Some(PlayerInput::DontKnow));
        assert_eq!(parse_input("/skip"), Some(PlayerInput::Skip));
        assert_eq!(parse_input(""), Some(PlayerInput::Continue));
        assert_eq!(parse_input("2"), Some(PlayerInput::Choice(2)));
        assert_eq!(
            parse_input("a koala"),
            Some(PlayerInput::Text("a koala".to_string()))
        );
    }
}
