//! Answer-set validation.
//!
//! The generator proposes the multiple-choice options for a question, but
//! its output is untrusted. Every option list is passed through
//! `validate_options` before the player sees it, which guarantees the
//! verbatim correct answer is present and that at least two options exist.
//! A list that already holds the answer is left as it is; otherwise blanks
//! and repeats are dropped before the answer is restored. Repairs are
//! reported so the caller can record a compliance failure.

use serde::{Deserialize, Serialize};

use crate::catalog::{normalize, ContentCatalog, QuizItem};

/// Minimum number of options a question must offer
pub const MIN_OPTIONS: usize = 2;

/// A repair applied to a proposed option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionRepair {
    /// Blank or repeated options were removed
    Deduplicated { removed: usize },
    /// An option matching the answer up to case/whitespace was replaced in place
    Normalized { index: usize },
    /// The answer was missing and was inserted at `index`
    Inserted { index: usize },
    /// Catalog decoys were appended to reach the minimum option count
    Padded { added: usize },
}

impl OptionRepair {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deduplicated { .. } => "deduplicated",
            Self::Normalized { .. } => "normalized",
            Self::Inserted { .. } => "inserted",
            Self::Padded { .. } => "padded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedOptions {
    options: Vec<String>,
    repairs: Vec<OptionRepair>,
}

impl ValidatedOptions {
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn into_options(self) -> Vec<String> {
        self.options
    }

    pub fn repairs(&self) -> &[OptionRepair] {
        &self.repairs
    }

    /// True when the generator's list needed no repair at all
    pub fn is_compliant(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Repair `proposed` so it contains `correct` verbatim.
///
/// A list that already contains the answer is returned untouched apart
/// from padding. A missing answer is inserted at `random_index(len + 1)`
/// after blanks and repeats are dropped. Short lists are padded from
/// `decoys` (skipping any already offered).
pub fn validate_options(
    proposed: Vec<String>,
    correct: &str,
    decoys: &[&str],
    random_index: impl FnOnce(usize) -> usize,
) -> ValidatedOptions {
    let mut repairs = Vec::new();

    let mut options = if proposed.iter().any(|o| o == correct) {
        proposed
    } else {
        let mut options = without_blanks_and_repeats(proposed, &mut repairs);
        let correct_key = normalize(correct);
        match options.iter().position(|o| normalize(o) == correct_key) {
            Some(index) => {
                options[index] = correct.to_string();
                repairs.push(OptionRepair::Normalized { index });
            }
            None => {
                let index = random_index(options.len() + 1) % (options.len() + 1);
                options.insert(index, correct.to_string());
                repairs.push(OptionRepair::Inserted { index });
            }
        }
        options
    };

    if options.len() < MIN_OPTIONS {
        let mut added = 0;
        for decoy in decoys {
            if options.len() >= MIN_OPTIONS {
                break;
            }
            let key = normalize(decoy);
            if key.is_empty() || options.iter().any(|o| normalize(o) == key) {
                continue;
            }
            options.push((*decoy).to_string());
            added += 1;
        }
        if added > 0 {
            repairs.push(OptionRepair::Padded { added });
        }
    }

    ValidatedOptions { options, repairs }
}

/// Drop blank options and repeats (compared normalised), keeping first occurrences.
fn without_blanks_and_repeats(proposed: Vec<String>, repairs: &mut Vec<OptionRepair>) -> Vec<String> {
    let proposed_len = proposed.len();
    let mut seen: Vec<String> = Vec::with_capacity(proposed_len);
    let mut options: Vec<String> = Vec::with_capacity(proposed_len + 1);
    for option in proposed {
        let key = normalize(&option);
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        options.push(option);
    }
    if options.len() < proposed_len {
        repairs.push(OptionRepair::Deduplicated {
            removed: proposed_len - options.len(),
        });
    }
    options
}

/// Validator bound to the catalog, which supplies padding decoys.
pub struct AnswerSetValidator<'a> {
    catalog: &'a ContentCatalog,
}

impl<'a> AnswerSetValidator<'a> {
    pub fn new(catalog: &'a ContentCatalog) -> Self {
        Self { catalog }
    }

    pub fn validate(
        &self,
        proposed: Vec<String>,
        item: &QuizItem,
        random_index: impl FnOnce(usize) -> usize,
    ) -> ValidatedOptions {
        let decoys = self.catalog.decoys_for(item, &proposed, MIN_OPTIONS);
        validate_options(proposed, item.answer(), &decoys, random_index)
    }

    /// Options built purely from the catalog: the answer plus up to
    /// `count - 1` decoys, with the answer at `random_index(count)`.
    pub fn fallback_options(
        &self,
        item: &QuizItem,
        count: usize,
        random_index: impl FnOnce(usize) -> usize,
    ) -> ValidatedOptions {
        let decoys = self
            .catalog
            .decoys_for(item, &[], count.max(MIN_OPTIONS).saturating_sub(1));
        let proposed: Vec<String> = decoys.iter().map(|d| d.to_string()).collect();
        let mut validated = validate_options(proposed, item.answer(), &[], random_index);
        // Catalog-built lists are not generator output
        validated.repairs.clear();
        validated
    }
}
