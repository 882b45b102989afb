//! Per-category strategies.
//!
//! Each content category (animals, places, people, ...) frames its questions
//! and hints differently. Instead of branching on the category inside the
//! selector, hint builder and prompt assembler, each category implements
//! `CategoryStrategy`, and the `CategoryRegistry` resolves the strategy for
//! an item's tag (falling back to a generic entry for unknown tags).

mod table;

pub use table::TableStrategy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::QuizItem;
use crate::hints::{fact_for_hint, hint_fact_count, name_shape_hint, HintSource, PrecomputedHint};
use crate::value_objects::CategoryTag;

/// Category-specific framing handed to the prompt assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPrompt {
    /// Question posed to the player, e.g. "Which animal am I?"
    pub question_frame: String,
    /// Noun for the answer, e.g. "animal"
    pub subject_noun: String,
    /// Extra instructions for the generator for this category
    pub guidance: String,
}

pub trait CategoryStrategy: Send + Sync {
    /// Category tag this strategy handles (`"*"` for the fallback)
    fn category(&self) -> &str;

    fn subject_noun(&self) -> &str {
        "answer"
    }

    fn question_frame(&self) -> &str {
        "What am I?"
    }

    fn guidance(&self) -> &str {
        ""
    }

    /// Narrow a pool of same-category candidates to the ones this category
    /// wants to ask about. Returning an empty list means "no preference";
    /// the selector then keeps the unfiltered pool.
    fn select_content<'a>(&self, candidates: Vec<&'a QuizItem>) -> Vec<&'a QuizItem> {
        candidates
    }

    /// Build hint number `hint_number` (1-based) for `item`.
    fn build_hint(&self, item: &QuizItem, hint_number: u32, points_deduction: u32) -> PrecomputedHint {
        match fact_for_hint(item, hint_number) {
            Some((index, fact)) => PrecomputedHint::new(
                item.id().clone(),
                hint_number,
                fact,
                points_deduction,
                HintSource::Fact { index },
            )
            .with_media_query(item.media_hint().map(str::to_string)),
            None => {
                let shape_number = hint_number.saturating_sub(hint_fact_count(item));
                PrecomputedHint::new(
                    item.id().clone(),
                    hint_number,
                    name_shape_hint(item, self.subject_noun(), shape_number),
                    points_deduction,
                    HintSource::NameShape,
                )
            }
        }
    }

    fn build_prompt(&self, _item: &QuizItem) -> CategoryPrompt {
        CategoryPrompt {
            question_frame: self.question_frame().to_string(),
            subject_noun: self.subject_noun().to_string(),
            guidance: self.guidance().to_string(),
        }
    }
}

/// Registry of category strategies.
pub struct CategoryRegistry {
    strategies: Vec<Arc<dyn CategoryStrategy>>,
    fallback: Arc<dyn CategoryStrategy>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRegistry {
    /// Create a registry with the built-in category table.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(TableStrategy::animals()));
        registry.register(Arc::new(TableStrategy::places()));
        registry.register(Arc::new(TableStrategy::people()));
        registry
    }

    /// Create a registry with only the generic fallback strategy.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
            fallback: Arc::new(TableStrategy::generic()),
        }
    }

    /// Register a strategy, replacing any existing one for the same category.
    pub fn register(&mut self, strategy: Arc<dyn CategoryStrategy>) {
        self.strategies
            .retain(|s| s.category() != strategy.category());
        self.strategies.push(strategy);
    }

    /// Strategy for `category`, or the generic fallback.
    pub fn get(&self, category: &CategoryTag) -> &dyn CategoryStrategy {
        self.strategies
            .iter()
            .find(|s| s.category() == category.as_str())
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    pub fn list_categories(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.category()).collect()
    }
}
