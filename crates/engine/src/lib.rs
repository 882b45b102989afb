//! Quizcraft Engine library.
//!
//! Async orchestration around the pure rules in `quizcraft-domain`.
//!
//! ## Structure
//!
//! - `use_cases/` - Session flows (start, submit turn, end, summary)
//! - `infrastructure/` - Ports and their adapters (generator, media, clock, settings, catalog file)
//! - `stores/` - Keyed in-memory session storage
//! - `llm_context`, `prompt_templates`, `game_tools` - What the generator is told and how it answers
//! - `app` - Application composition

pub mod app;
pub mod game_tools;
pub mod infrastructure;
pub mod llm_context;
pub mod prompt_templates;
pub mod stores;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
