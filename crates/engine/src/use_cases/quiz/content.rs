//! Immutable game content shared by every session: catalog, category
//! strategies, scoring table and turn policy.

use quizcraft_domain::{
    AnswerSetValidator, CategoryPrompt, CategoryRegistry, ContentCatalog, DomainError, HintPlan,
    HintPlanner, HistoryCompactor, ItemId, ItemSelector, QuizItem, QuizSession, ScoringRules,
    Selection, SelectionRequest, SessionSettings,
};

use crate::infrastructure::app_settings::EngineSettings;

/// Turn policy knobs that are not part of the scoring table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPolicy {
    pub max_total_rounds: u32,
    pub options_per_question: usize,
    pub hint_on_wrong_answer: bool,
    pub keep_round_markers: usize,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self::from(&EngineSettings::default())
    }
}

impl From<&EngineSettings> for TurnPolicy {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            max_total_rounds: settings.max_total_rounds,
            options_per_question: settings.options_per_question,
            hint_on_wrong_answer: settings.hint_on_wrong_answer,
            keep_round_markers: settings.keep_round_markers,
        }
    }
}

pub struct QuizContent {
    catalog: ContentCatalog,
    registry: CategoryRegistry,
    rules: ScoringRules,
    policy: TurnPolicy,
}

impl QuizContent {
    pub fn new(
        catalog: ContentCatalog,
        registry: CategoryRegistry,
        rules: ScoringRules,
        policy: TurnPolicy,
    ) -> Self {
        Self {
            catalog,
            registry,
            rules,
            policy,
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn policy(&self) -> &TurnPolicy {
        &self.policy
    }

    pub fn item(&self, id: &ItemId) -> Result<&QuizItem, DomainError> {
        self.catalog.require(id)
    }

    pub fn category_prompt(&self, item: &QuizItem) -> CategoryPrompt {
        self.registry.get(item.category()).build_prompt(item)
    }

    pub fn compactor(&self) -> HistoryCompactor {
        HistoryCompactor::new(self.policy.keep_round_markers)
    }

    pub fn validator(&self) -> AnswerSetValidator<'_> {
        AnswerSetValidator::new(&self.catalog)
    }

    /// Pick the item for `round_number` of a session with `settings`.
    pub fn select(
        &self,
        settings: &SessionSettings,
        exclude: &[ItemId],
        round_number: u32,
        random_index: impl FnOnce(usize) -> usize,
    ) -> Selection {
        let request = SelectionRequest {
            exclude,
            round_number,
            difficulty: settings.difficulty(),
            age_band: settings.age_band(),
            seed: settings.seed(),
        };
        ItemSelector::new(&self.catalog, &self.registry).select(&request, random_index)
    }

    /// Look-ahead pick for the round after the next one, if the session needs one.
    pub fn select_lookahead(
        &self,
        session: &QuizSession,
        random_index: impl FnOnce(usize) -> usize,
    ) -> Option<Selection> {
        let round = session.lookahead_round()?;
        let exclude = session.lookahead_exclusions();
        Some(self.select(session.settings(), &exclude, round, random_index))
    }

    pub fn plan_hints(&self, item_id: &ItemId, session: &QuizSession) -> Result<HintPlan, DomainError> {
        let item = self.item(item_id)?;
        Ok(HintPlanner::new(&self.registry, &self.rules).plan(item, session.difficulty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{sample_content, start_record};

    #[test]
    fn lookahead_avoids_current_and_next_items() {
        let content = sample_content();
        let record = start_record(content.catalog(), 5);
        let session = &record.session;

        for index in 0..content.catalog().len() {
            let pick = content.select_lookahead(session, |_| index).unwrap();
            assert_ne!(pick.item_id(), session.current_item());
            assert_ne!(Some(pick.item_id()), session.next_item());
        }
    }

    #[test]
    fn no_lookahead_near_the_end() {
        let content = sample_content();
        let record = start_record(content.catalog(), 1);
        assert!(content.select_lookahead(&record.session, |_| 0).is_none());
    }

    #[test]
    fn hint_plan_matches_budget() {
        let content = sample_content();
        let record = start_record(content.catalog(), 3);
        let plan = content
            .plan_hints(record.session.current_item(), &record.session)
            .unwrap();
        assert_eq!(plan.len() as u32, content.rules().max_hints_per_round);
        assert_eq!(plan.item_id(), record.session.current_item());
    }
}
