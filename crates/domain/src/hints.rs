//! Hint precomputation.
//!
//! Hints are derived deterministically from catalog facts, never from the
//! external generator. The opening clue uses `facts[0]`; hint *k* uses the
//! *k*-th later fact that does not repeat the clue or an earlier hint. When
//! the facts run out, the category strategy falls back to name-shape hints.
//!
//! Costs come from the `ScoringRules` table, which keeps scoring auditable.

use serde::{Deserialize, Serialize};

use crate::catalog::{normalize, QuizItem};
use crate::categories::CategoryRegistry;
use crate::ids::ItemId;
use crate::value_objects::{Difficulty, ScoringRules};

/// Where a hint's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintSource {
    /// A catalog fact, by index into the item's fact list
    Fact { index: usize },
    /// Derived from the answer's spelling
    NameShape,
}

/// A hint ready to be shown, with its precomputed cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedHint {
    item_id: ItemId,
    hint_number: u32,
    text: String,
    points_deduction: u32,
    media_query: Option<String>,
    source: HintSource,
}

impl PrecomputedHint {
    pub fn new(
        item_id: ItemId,
        hint_number: u32,
        text: impl Into<String>,
        points_deduction: u32,
        source: HintSource,
    ) -> Self {
        Self {
            item_id,
            hint_number,
            text: text.into(),
            points_deduction,
            media_query: None,
            source,
        }
    }

    pub fn with_media_query(mut self, query: Option<String>) -> Self {
        self.media_query = query;
        self
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// 1-based position of this hint within its round
    pub fn hint_number(&self) -> u32 {
        self.hint_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn points_deduction(&self) -> u32 {
        self.points_deduction
    }

    pub fn media_query(&self) -> Option<&str> {
        self.media_query.as_deref()
    }

    pub fn source(&self) -> HintSource {
        self.source
    }
}

/// Index and text of the `hint_number`-th usable hint fact, if any.
///
/// Facts that repeat the opening clue or an earlier hint fact (compared
/// case- and whitespace-insensitively) are skipped.
pub fn fact_for_hint(item: &QuizItem, hint_number: u32) -> Option<(usize, &str)> {
    if hint_number == 0 {
        return None;
    }
    let mut seen = vec![normalize(item.opening_clue())];
    let mut found = 0;
    for (index, fact) in item.facts().iter().enumerate().skip(1) {
        let key = normalize(fact);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        found += 1;
        if found == hint_number {
            return Some((index, fact.as_str()));
        }
    }
    None
}

/// Number of distinct hint facts an item offers.
pub fn hint_fact_count(item: &QuizItem) -> u32 {
    let mut count = 0;
    while fact_for_hint(item, count + 1).is_some() {
        count += 1;
    }
    count
}

/// Name-shape hint for when facts are exhausted.
///
/// `shape_number` counts from 1 across name-shape hints: the first reveals
/// the initial letter, later ones reveal the letter count.
pub fn name_shape_hint(item: &QuizItem, subject_noun: &str, shape_number: u32) -> String {
    let answer = item.answer();
    let first = answer
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    if shape_number <= 1 && !first.is_empty() {
        return format!("This {} starts with the letter \"{}\".", subject_noun, first);
    }
    let letters = answer.chars().filter(|c| c.is_alphanumeric()).count();
    let words = answer.split_whitespace().count();
    if words > 1 {
        format!(
            "This {} is {} words long, with {} letters in total.",
            subject_noun, words, letters
        )
    } else {
        format!("This {} has {} letters.", subject_noun, letters)
    }
}

// ============================================================================
// Hint plans
// ============================================================================

/// Every hint a round can hand out, precomputed when the item is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintPlan {
    item_id: ItemId,
    hints: Vec<PrecomputedHint>,
}

impl HintPlan {
    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn hints(&self) -> &[PrecomputedHint] {
        &self.hints
    }

    /// The hint to give after `hints_used` hints were already taken.
    pub fn next_hint(&self, hints_used: u32) -> Option<&PrecomputedHint> {
        self.hints.get(hints_used as usize)
    }

    pub fn first(&self) -> Option<&PrecomputedHint> {
        self.hints.first()
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

/// Builds hints through the category strategy table with table-driven costs.
pub struct HintPlanner<'a> {
    registry: &'a CategoryRegistry,
    rules: &'a ScoringRules,
}

impl<'a> HintPlanner<'a> {
    pub fn new(registry: &'a CategoryRegistry, rules: &'a ScoringRules) -> Self {
        Self { registry, rules }
    }

    /// First hint of the round for `item`.
    pub fn build_hint(&self, item: &QuizItem, difficulty: Difficulty) -> PrecomputedHint {
        self.build_hint_at(item, difficulty, 1)
    }

    pub fn build_hint_at(
        &self,
        item: &QuizItem,
        difficulty: Difficulty,
        hint_number: u32,
    ) -> PrecomputedHint {
        let cost = self.rules.hint_cost(difficulty);
        self.registry
            .get(item.category())
            .build_hint(item, hint_number.max(1), cost)
    }

    /// All hints up to the per-round budget.
    pub fn plan(&self, item: &QuizItem, difficulty: Difficulty) -> HintPlan {
        let hints = (1..=self.rules.max_hints_per_round)
            .map(|n| self.build_hint_at(item, difficulty, n))
            .collect();
        HintPlan {
            item_id: item.id().clone(),
            hints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{CategoryTag, DisplayName, FameTier};

    fn item(name: &str, facts: &[&str]) -> QuizItem {
        QuizItem::new(
            ItemId::new(name.to_lowercase().replace(' ', "-")).unwrap(),
            DisplayName::new(name).unwrap(),
            CategoryTag::new("places").unwrap(),
            FameTier::Common,
            facts.iter().map(|f| f.to_string()).collect(),
        )
        .unwrap()
        .with_media_hint(format!("{name} photo"))
    }

    #[test]
    fn first_hint_uses_second_fact() {
        let item = item("Paris", &["City of light.", "Has a famous iron tower.", "On the Seine."]);
        assert_eq!(fact_for_hint(&item, 1), Some((1, "Has a famous iron tower.")));
        assert_eq!(fact_for_hint(&item, 2), Some((2, "On the Seine.")));
        assert_eq!(hint_fact_count(&item), 2);
    }

    #[test]
    fn duplicate_of_clue_is_skipped() {
        let item = item("Paris", &["City of light.", "city of  LIGHT.", "On the Seine."]);
        assert_eq!(fact_for_hint(&item, 1), Some((2, "On the Seine.")));
        assert_eq!(fact_for_hint(&item, 2), None);
    }

    #[test]
    fn name_shape_hints_reveal_letter_then_length() {
        let item = item("Mount Everest", &["Tallest."]);
        assert_eq!(
            name_shape_hint(&item, "place", 1),
            "This place starts with the letter \"M\"."
        );
        assert_eq!(
            name_shape_hint(&item, "place", 2),
            "This place is 2 words long, with 12 letters in total."
        );
    }

    #[test]
    fn planner_applies_cost_table() {
        let registry = CategoryRegistry::new();
        let rules = ScoringRules::default();
        let planner = HintPlanner::new(&registry, &rules);
        let item = item("Paris", &["City of light.", "Has a famous iron tower."]);

        let hard = planner.build_hint(&item, Difficulty::Hard);
        assert_eq!(hard.points_deduction(), 2);
        assert_eq!(hard.text(), "Has a famous iron tower.");
        assert_eq!(hard.media_query(), Some("Paris photo"));

        let easy = planner.build_hint(&item, Difficulty::Easy);
        assert_eq!(easy.points_deduction(), 0);
    }

    #[test]
    fn plan_falls_back_to_name_shape_when_facts_run_out() {
        let registry = CategoryRegistry::new();
        let rules = ScoringRules::default();
        let planner = HintPlanner::new(&registry, &rules);
        let item = item("Paris", &["City of light.", "Has a famous iron tower."]);

        let plan = planner.plan(&item, Difficulty::Medium);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.hints()[0].source(), HintSource::Fact { index: 1 });
        assert_eq!(plan.hints()[1].source(), HintSource::NameShape);
        assert_eq!(plan.hints()[1].hint_number(), 2);
        assert!(plan.next_hint(2).is_none());
    }

    #[test]
    fn hints_are_deterministic() {
        let registry = CategoryRegistry::new();
        let rules = ScoringRules::default();
        let planner = HintPlanner::new(&registry, &rules);
        let item = item("Paris", &["City of light.", "Has a famous iron tower."]);
        assert_eq!(
            planner.plan(&item, Difficulty::Hard),
            planner.plan(&item, Difficulty::Hard)
        );
    }
}
