//! Application state and composition.

use std::sync::Arc;

use quizcraft_domain::{CategoryRegistry, ContentCatalog};

use crate::infrastructure::{
    app_settings::EngineSettings,
    clock::{SystemClock, SystemRandom},
    ports::{ClockPort, LlmPort, MediaSearchPort, RandomPort},
};
use crate::prompt_templates::PromptTemplates;
use crate::stores::SessionStore;
use crate::use_cases;
use crate::use_cases::quiz::{
    EndSession, GetSummary, PromptAssembler, QuizContent, StartSession, SubmitTurn,
    TurnGenerator, TurnPolicy,
};

/// Main application state.
///
/// Holds the shared game content, the session store and all use cases.
pub struct App {
    pub content: Arc<QuizContent>,
    pub store: Arc<SessionStore>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub quiz: use_cases::QuizUseCases,
}

impl App {
    /// Create a new App with system time and randomness.
    pub fn new(
        catalog: ContentCatalog,
        llm: Arc<dyn LlmPort>,
        media: Arc<dyn MediaSearchPort>,
        settings: &EngineSettings,
    ) -> Self {
        Self::with_ports(
            catalog,
            llm,
            media,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
            settings,
            PromptTemplates::from_env(),
        )
    }

    /// Create an App with every port supplied by the caller.
    pub fn with_ports(
        catalog: ContentCatalog,
        llm: Arc<dyn LlmPort>,
        media: Arc<dyn MediaSearchPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        settings: &EngineSettings,
        templates: PromptTemplates,
    ) -> Self {
        let content = Arc::new(QuizContent::new(
            catalog,
            CategoryRegistry::new(),
            settings.scoring_rules(),
            TurnPolicy::from(settings),
        ));
        let store = Arc::new(SessionStore::new());
        let assembler = Arc::new(PromptAssembler::new(Arc::clone(&content), templates));
        let generator = Arc::new(TurnGenerator::new(
            llm,
            settings.generator_deadline(),
            settings.malformed_retry_cap,
        ));

        let quiz = use_cases::QuizUseCases::new(
            Arc::new(StartSession::new(
                content.clone(),
                assembler.clone(),
                generator.clone(),
                store.clone(),
                clock.clone(),
                random.clone(),
            )),
            Arc::new(SubmitTurn::new(
                content.clone(),
                assembler,
                generator,
                store.clone(),
                media,
                clock.clone(),
                random,
            )),
            Arc::new(EndSession::new(store.clone(), clock.clone())),
            Arc::new(GetSummary::new(store.clone(), clock)),
        );

        Self {
            content,
            store,
            use_cases: UseCases { quiz },
        }
    }
}
