//! Shared test helpers: a small catalog, ready-made session records and a
//! scripted generator.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{sample_content, start_record, turn_response, ScriptedLlm};
//!
//! #[tokio::test]
//! async fn test_correct_answer() {
//!     let llm = ScriptedLlm::new(vec![Ok(turn_response("answer", Some(true), "Yes!", &[]))]);
//!     // ... test logic
//! }
//! ```

pub mod llm_integration;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;

use quizcraft_domain::{
    AgeBand, CategoryRegistry, CategoryTag, ContentCatalog, Difficulty, DisplayName, FameTier,
    HintPlanner, ItemId, QuizItem, QuizSession, ScoringRules, Selection, SessionId,
    SessionSettings,
};

use crate::app::App;
use crate::game_tools::QUIZ_TURN_TOOL;
use crate::infrastructure::app_settings::EngineSettings;
use crate::infrastructure::clock::{FixedClock, FixedRandom};
use crate::infrastructure::media::NoMediaSearch;
use crate::infrastructure::ports::{
    LlmError, LlmPort, LlmRequest, LlmResponse, MediaSearchPort, ToolDefinition,
};
use crate::prompt_templates::PromptTemplates;
use crate::stores::SessionRecord;
use crate::use_cases::quiz::{QuizContent, TurnPolicy};

fn item(id: &str, name: &str, category: &str, tier: FameTier, facts: &[&str]) -> QuizItem {
    QuizItem::new(
        ItemId::new(id).unwrap(),
        DisplayName::new(name).unwrap(),
        CategoryTag::new(category).unwrap(),
        tier,
        facts.iter().map(|f| f.to_string()).collect(),
    )
    .unwrap()
}

/// Seven items over three categories and all three tiers.
pub fn sample_catalog() -> ContentCatalog {
    ContentCatalog::new(vec![
        item(
            "koala",
            "Koala",
            "animals",
            FameTier::Common,
            &[
                "I sleep up to twenty hours a day.",
                "I eat almost nothing but eucalyptus leaves.",
                "I carry my baby in a pouch.",
            ],
        )
        .with_media_hint("koala in a eucalyptus tree"),
        item(
            "paris",
            "Paris",
            "places",
            FameTier::Common,
            &[
                "An iron tower built for a world's fair is my landmark.",
                "A river called the Seine runs through me.",
                "The Louvre museum is here.",
            ],
        ),
        item(
            "emu",
            "Emu",
            "animals",
            FameTier::Common,
            &[
                "I am a bird that cannot fly.",
                "I can run at fifty kilometres an hour.",
                "The father sits on the eggs.",
            ],
        ),
        item(
            "wombat",
            "Wombat",
            "animals",
            FameTier::Familiar,
            &[
                "My droppings are shaped like cubes.",
                "I dig long burrows with strong claws.",
                "My pouch faces backwards.",
            ],
        ),
        item(
            "kyoto",
            "Kyoto",
            "places",
            FameTier::Familiar,
            &[
                "I was an imperial capital for over a thousand years.",
                "I have more than a thousand temples.",
                "A famous bamboo grove grows on my western edge.",
            ],
        )
        .with_media_hint("Kyoto bamboo grove"),
        item(
            "marie-curie",
            "Marie Curie",
            "people",
            FameTier::Familiar,
            &[
                "I won Nobel Prizes in two different sciences.",
                "I discovered polonium and radium.",
                "I was born in Warsaw.",
            ],
        ),
        item(
            "axolotl",
            "Axolotl",
            "animals",
            FameTier::Obscure,
            &[
                "I can regrow my legs and even parts of my heart.",
                "I keep my feathery gills for my whole life.",
                "I live in lakes near Mexico City.",
            ],
        ),
    ])
    .unwrap()
}

pub fn sample_content() -> QuizContent {
    QuizContent::new(
        sample_catalog(),
        CategoryRegistry::new(),
        ScoringRules::default(),
        TurnPolicy::default(),
    )
}

/// Record for an easy session on the first two catalog items, with hint
/// plans in place and an empty transcript.
pub fn start_record(catalog: &ContentCatalog, total_rounds: u32) -> SessionRecord {
    let registry = CategoryRegistry::new();
    let rules = ScoringRules::default();
    let planner = HintPlanner::new(&registry, &rules);

    let items = catalog.items();
    let settings = SessionSettings::new(Difficulty::Easy, AgeBand::Young, total_rounds).unwrap();
    let current = Selection::new(items[0].id().clone(), items[0].tier(), false);
    let next = (total_rounds > 1).then(|| Selection::new(items[1].id().clone(), items[1].tier(), false));

    let session = QuizSession::start(
        SessionId::new(),
        settings,
        &current,
        next.as_ref(),
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
    );
    let current_hints = planner.plan(&items[0], Difficulty::Easy);
    let lookahead_hints = next.map(|_| planner.plan(&items[1], Difficulty::Easy));
    SessionRecord::new(session, current_hints, lookahead_hints)
}

/// A `quiz_turn` tool call as the generator would send it.
pub fn turn_response(
    signal: &str,
    correct: Option<bool>,
    message: &str,
    options: &[&str],
) -> LlmResponse {
    let mut arguments = json!({ "signal": signal, "message": message });
    if let Some(correct) = correct {
        arguments["correct"] = json!(correct);
    }
    if !options.is_empty() {
        arguments["options"] = json!(options);
    }
    LlmResponse::tool_call(QUIZ_TURN_TOOL, arguments)
}

/// Generator that replays a fixed script of responses.
///
/// Once the script runs out every call fails as unavailable.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<LlmResponse, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Always failing generator.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    async fn next(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::RequestFailed("script exhausted".into())))
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.next(request).await
    }

    async fn generate_with_tools(
        &self,
        request: LlmRequest,
        _tools: Vec<ToolDefinition>,
    ) -> Result<LlmResponse, LlmError> {
        self.next(request).await
    }
}

/// Settings for use-case tests: easy, young audience, no retries.
pub fn test_settings() -> EngineSettings {
    EngineSettings {
        difficulty: Difficulty::Easy,
        age_band: AgeBand::Young,
        llm_max_retries: 0,
        ..EngineSettings::default()
    }
}

/// App over the sample catalog with a fixed clock and index-0 randomness.
pub fn test_app(llm: Arc<dyn LlmPort>) -> App {
    test_app_with(llm, Arc::new(NoMediaSearch), test_settings())
}

pub fn test_app_with(
    llm: Arc<dyn LlmPort>,
    media: Arc<dyn MediaSearchPort>,
    settings: EngineSettings,
) -> App {
    App::with_ports(
        sample_catalog(),
        llm,
        media,
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())),
        Arc::new(FixedRandom::new(0)),
        &settings,
        PromptTemplates::default(),
    )
}
