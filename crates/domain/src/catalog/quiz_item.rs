//! QuizItem - one immutable entry of the content catalog.
//!
//! Facts are used positionally: `facts[0]` is the opening clue, later
//! facts feed the hint plan.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ItemId;
use crate::value_objects::{CategoryTag, DisplayName, FameTier};

/// Maximum length of a single fact
const MAX_FACT_LENGTH: usize = 1000;

/// A quiz item. The display name is the correct answer.
///
/// # Invariants
///
/// - `facts` is never empty and holds no blank entries
/// - Items are never mutated after catalog load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    id: ItemId,
    display_name: DisplayName,
    category: CategoryTag,
    tier: FameTier,
    facts: Vec<String>,
    media_hint: Option<String>,
}

impl QuizItem {
    pub fn new(
        id: ItemId,
        display_name: DisplayName,
        category: CategoryTag,
        tier: FameTier,
        facts: Vec<String>,
    ) -> Result<Self, DomainError> {
        let facts: Vec<String> = facts.into_iter().map(|f| f.trim().to_string()).collect();
        if facts.is_empty() {
            return Err(DomainError::validation(format!(
                "Quiz item '{}' needs at least one fact",
                id
            )));
        }
        if facts.iter().any(String::is_empty) {
            return Err(DomainError::validation(format!(
                "Quiz item '{}' has a blank fact",
                id
            )));
        }
        if facts.iter().any(|f| f.len() > MAX_FACT_LENGTH) {
            return Err(DomainError::validation(format!(
                "Quiz item '{}' has a fact longer than {} characters",
                id, MAX_FACT_LENGTH
            )));
        }
        Ok(Self {
            id,
            display_name,
            category,
            tier,
            facts,
            media_hint: None,
        })
    }

    pub fn with_media_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        let trimmed = hint.trim();
        self.media_hint = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// The exact correct-answer string for this item.
    pub fn answer(&self) -> &str {
        self.display_name.as_str()
    }

    pub fn category(&self) -> &CategoryTag {
        &self.category
    }

    pub fn tier(&self) -> FameTier {
        self.tier
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    pub fn fact(&self, index: usize) -> Option<&str> {
        self.facts.get(index).map(String::as_str)
    }

    /// Opening clue shown at the start of the round (`facts[0]`).
    pub fn opening_clue(&self) -> &str {
        &self.facts[0]
    }

    pub fn media_hint(&self) -> Option<&str> {
        self.media_hint.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(facts: Vec<&str>) -> Result<QuizItem, DomainError> {
        QuizItem::new(
            ItemId::new("koala").unwrap(),
            DisplayName::new("Koala").unwrap(),
            CategoryTag::new("animals").unwrap(),
            FameTier::Common,
            facts.into_iter().map(String::from).collect(),
        )
    }

    #[test]
    fn opening_clue_is_first_fact() {
        let item = item(vec!["I sleep 20 hours a day.", "I eat eucalyptus."]).unwrap();
        assert_eq!(item.opening_clue(), "I sleep 20 hours a day.");
        assert_eq!(item.answer(), "Koala");
        assert_eq!(item.fact(1), Some("I eat eucalyptus."));
        assert_eq!(item.fact(2), None);
    }

    #[test]
    fn rejects_empty_fact_list() {
        assert!(item(vec![]).is_err());
    }

    #[test]
    fn rejects_blank_fact() {
        assert!(item(vec!["ok", "  "]).is_err());
    }

    #[test]
    fn blank_media_hint_is_dropped() {
        let item = item(vec!["clue"]).unwrap().with_media_hint("   ");
        assert_eq!(item.media_hint(), None);
    }
}
