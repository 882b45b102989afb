//! Content catalog - the immutable table of quiz items shared by all sessions.
//!
//! The catalog is built once at load time and injected wherever it is needed
//! (typically behind an `Arc`). It is never mutated afterwards, so sessions
//! can read it concurrently without locking.

mod quiz_item;

pub use quiz_item::QuizItem;

use std::collections::{HashMap, HashSet};

use crate::error::DomainError;
use crate::ids::ItemId;

#[derive(Debug, Clone)]
pub struct ContentCatalog {
    items: Vec<QuizItem>,
    index: HashMap<ItemId, usize>,
}

impl ContentCatalog {
    /// Build a catalog from loaded items.
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation` if `items` is empty
    /// - `DomainError::Constraint` if two items share an ID
    pub fn new(items: Vec<QuizItem>) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::validation("Content catalog cannot be empty"));
        }
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id().clone(), position).is_some() {
                return Err(DomainError::constraint(format!(
                    "Duplicate quiz item id: {}",
                    item.id()
                )));
            }
        }
        Ok(Self { items, index })
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&QuizItem> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    /// Like `get`, but a missing item is a `NotFound` error.
    pub fn require(&self, id: &ItemId) -> Result<&QuizItem, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found("QuizItem", id.as_str()))
    }

    /// Display names usable as wrong options for `item`.
    ///
    /// Candidates are other items' names not already in `taken` (compared
    /// case-insensitively), ordered by closeness: same category and tier
    /// first, then same category, then same tier, then anything else.
    /// Within a group, catalog order is kept so results are deterministic.
    pub fn decoys_for<'a>(&'a self, item: &QuizItem, taken: &[String], limit: usize) -> Vec<&'a str> {
        let mut seen: HashSet<String> = taken.iter().map(|t| normalize(t)).collect();
        seen.insert(normalize(item.answer()));

        let mut ranked: Vec<(u8, &QuizItem)> = self
            .items
            .iter()
            .filter(|candidate| candidate.id() != item.id())
            .map(|candidate| {
                let same_category = candidate.category() == item.category();
                let same_tier = candidate.tier() == item.tier();
                let rank = match (same_category, same_tier) {
                    (true, true) => 0,
                    (true, false) => 1,
                    (false, true) => 2,
                    (false, false) => 3,
                };
                (rank, candidate)
            })
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);

        let mut decoys = Vec::with_capacity(limit);
        for (_, candidate) in ranked {
            if decoys.len() >= limit {
                break;
            }
            if seen.insert(normalize(candidate.answer())) {
                decoys.push(candidate.answer());
            }
        }
        decoys
    }
}

/// Case- and whitespace-insensitive form used for answer comparison.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{CategoryTag, DisplayName, FameTier};

    fn item(id: &str, category: &str, tier: FameTier) -> QuizItem {
        QuizItem::new(
            ItemId::new(id).unwrap(),
            DisplayName::new(id.to_uppercase()).unwrap(),
            CategoryTag::new(category).unwrap(),
            tier,
            vec![format!("clue for {id}")],
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(ContentCatalog::new(vec![]).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = ContentCatalog::new(vec![
            item("a", "animals", FameTier::Common),
            item("a", "places", FameTier::Common),
        ]);
        assert!(matches!(result, Err(DomainError::Constraint(_))));
    }

    #[test]
    fn looks_up_by_id() {
        let catalog = ContentCatalog::new(vec![
            item("a", "animals", FameTier::Common),
            item("b", "places", FameTier::Common),
        ])
        .unwrap();
        assert_eq!(catalog.get(&ItemId::new("b").unwrap()).unwrap().answer(), "B");
        assert!(catalog.require(&ItemId::new("zz").unwrap()).is_err());
    }

    #[test]
    fn decoys_prefer_same_category_and_tier() {
        let catalog = ContentCatalog::new(vec![
            item("target", "animals", FameTier::Common),
            item("other-place", "places", FameTier::Obscure),
            item("same-tier-place", "places", FameTier::Common),
            item("animal-obscure", "animals", FameTier::Obscure),
            item("animal-common", "animals", FameTier::Common),
        ])
        .unwrap();
        let target = catalog.get(&ItemId::new("target").unwrap()).unwrap();

        let decoys = catalog.decoys_for(target, &[], 3);
        assert_eq!(
            decoys,
            vec!["ANIMAL-COMMON", "ANIMAL-OBSCURE", "SAME-TIER-PLACE"]
        );
    }

    #[test]
    fn decoys_skip_taken_and_correct_answers() {
        let catalog = ContentCatalog::new(vec![
            item("target", "animals", FameTier::Common),
            item("b", "animals", FameTier::Common),
            item("c", "animals", FameTier::Common),
        ])
        .unwrap();
        let target = catalog.get(&ItemId::new("target").unwrap()).unwrap();

        let decoys = catalog.decoys_for(target, &["b".to_string()], 5);
        assert_eq!(decoys, vec!["C"]);
    }

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize("  Mount   EVEREST "), "mount everest");
    }
}
