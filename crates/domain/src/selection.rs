//! Item selection.
//!
//! Chooses the next quiz item from the catalog given the session's history
//! and calibration. Selection is a pure function of its inputs plus catalog
//! state and always yields an item:
//!
//! 1. Target tier from the (difficulty, age band, round) table
//! 2. Non-excluded items of that tier, else all non-excluded items,
//!    else the whole catalog in review mode
//! 3. Category strategies narrow each category's candidates
//! 4. Least-recently-used category wins
//! 5. Index from `hash(seed, round)` when seeded, otherwise the injected RNG

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog::{ContentCatalog, QuizItem};
use crate::categories::CategoryRegistry;
use crate::ids::ItemId;
use crate::value_objects::{target_tier, AgeBand, CategoryTag, Difficulty, FameTier};

/// Inputs of one selection.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Items already used this session, oldest first
    pub exclude: &'a [ItemId],
    pub round_number: u32,
    pub difficulty: Difficulty,
    pub age_band: AgeBand,
    pub seed: Option<u64>,
}

/// Outcome of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    item_id: ItemId,
    target_tier: FameTier,
    review_mode: bool,
}

impl Selection {
    pub fn new(item_id: ItemId, target_tier: FameTier, review_mode: bool) -> Self {
        Self {
            item_id,
            target_tier,
            review_mode,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn target_tier(&self) -> FameTier {
        self.target_tier
    }

    /// True when every catalog item was already used and the pick is a repeat
    pub fn is_review_mode(&self) -> bool {
        self.review_mode
    }
}

pub struct ItemSelector<'a> {
    catalog: &'a ContentCatalog,
    registry: &'a CategoryRegistry,
}

impl<'a> ItemSelector<'a> {
    pub fn new(catalog: &'a ContentCatalog, registry: &'a CategoryRegistry) -> Self {
        Self { catalog, registry }
    }

    /// Select an item.
    ///
    /// `random_index` is only consulted for unseeded requests; it receives the
    /// candidate count and returns an index (reduced modulo the count).
    pub fn select(
        &self,
        request: &SelectionRequest<'_>,
        random_index: impl FnOnce(usize) -> usize,
    ) -> Selection {
        let tier = target_tier(request.difficulty, request.age_band, request.round_number);
        let excluded: HashSet<&ItemId> = request.exclude.iter().collect();

        let remaining: Vec<&QuizItem> = self
            .catalog
            .items()
            .iter()
            .filter(|item| !excluded.contains(item.id()))
            .collect();

        let (pool, review_mode) = if remaining.is_empty() {
            (self.review_pool(request.exclude), true)
        } else {
            let tiered: Vec<&QuizItem> = remaining
                .iter()
                .copied()
                .filter(|item| item.tier() == tier)
                .collect();
            if tiered.is_empty() {
                (remaining, false)
            } else {
                (tiered, false)
            }
        };

        let pool = self.apply_category_preferences(pool);
        let candidates = prefer_least_recent_category(pool, request.exclude, self.catalog);

        let len = candidates.len();
        let index = match request.seed {
            Some(seed) => seeded_index(seed, request.round_number, len),
            None => random_index(len) % len,
        };

        Selection::new(candidates[index].id().clone(), tier, review_mode)
    }

    /// Whole catalog, minus the most recent pick when that leaves anything.
    fn review_pool(&self, exclude: &[ItemId]) -> Vec<&'a QuizItem> {
        let all: Vec<&QuizItem> = self.catalog.items().iter().collect();
        match exclude.last() {
            Some(last) if all.len() > 1 => all.into_iter().filter(|i| i.id() != last).collect(),
            _ => all,
        }
    }

    fn apply_category_preferences(&self, pool: Vec<&'a QuizItem>) -> Vec<&'a QuizItem> {
        let mut categories: Vec<&CategoryTag> = Vec::new();
        for item in &pool {
            if !categories.contains(&item.category()) {
                categories.push(item.category());
            }
        }

        let mut kept = Vec::with_capacity(pool.len());
        for category in categories {
            let group: Vec<&QuizItem> = pool
                .iter()
                .copied()
                .filter(|item| item.category() == category)
                .collect();
            let preferred = self.registry.get(category).select_content(group.clone());
            kept.extend(if preferred.is_empty() { group } else { preferred });
        }
        kept
    }
}

/// Keep only candidates from the category used least recently.
///
/// Categories never used this session rank first; otherwise the category
/// whose last use is oldest wins.
fn prefer_least_recent_category<'a>(
    pool: Vec<&'a QuizItem>,
    exclude: &[ItemId],
    catalog: &ContentCatalog,
) -> Vec<&'a QuizItem> {
    let mut last_used: HashMap<&CategoryTag, usize> = HashMap::new();
    for (position, id) in exclude.iter().enumerate() {
        if let Some(item) = catalog.get(id) {
            last_used.insert(item.category(), position);
        }
    }

    let recency = |item: &QuizItem| match last_used.get(item.category()) {
        None => (0u8, 0usize),
        Some(&position) => (1u8, position),
    };

    let Some(best) = pool.iter().map(|item| recency(item)).min() else {
        return pool;
    };
    pool.into_iter().filter(|item| recency(item) == best).collect()
}

/// Deterministic index derived from `(seed, round_number)`.
pub fn seeded_index(seed: u64, round_number: u32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(round_number.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(bytes) % len as u64) as usize
}
