//! Table-driven category strategy.
//!
//! Most categories only differ in wording and in how many facts an item
//! needs before it is worth asking, so one data-carrying strategy covers them.

use crate::catalog::QuizItem;
use crate::categories::CategoryStrategy;

#[derive(Debug, Clone)]
pub struct TableStrategy {
    category: String,
    subject_noun: String,
    question_frame: String,
    guidance: String,
    /// Items with fewer facts are only asked when nothing else is left
    min_facts: usize,
}

impl TableStrategy {
    pub fn new(
        category: impl Into<String>,
        subject_noun: impl Into<String>,
        question_frame: impl Into<String>,
        guidance: impl Into<String>,
        min_facts: usize,
    ) -> Self {
        Self {
            category: category.into(),
            subject_noun: subject_noun.into(),
            question_frame: question_frame.into(),
            guidance: guidance.into(),
            min_facts,
        }
    }

    pub fn animals() -> Self {
        Self::new(
            "animals",
            "animal",
            "Which animal am I?",
            "Speak as the animal in the first person. Mention habitat or diet only if the clue already does.",
            1,
        )
    }

    pub fn places() -> Self {
        Self::new(
            "places",
            "place",
            "Where am I?",
            "Describe the place as a traveller would experience it. Never name the country if it gives the answer away.",
            1,
        )
    }

    pub fn people() -> Self {
        Self::new(
            "people",
            "person",
            "Who am I?",
            "Speak as the person in the first person. Avoid dates of birth and death, which make the answer a lookup.",
            2,
        )
    }

    /// Fallback for tags without a dedicated entry
    pub fn generic() -> Self {
        Self::new("*", "answer", "What am I?", "", 1)
    }
}

impl CategoryStrategy for TableStrategy {
    fn category(&self) -> &str {
        &self.category
    }

    fn subject_noun(&self) -> &str {
        &self.subject_noun
    }

    fn question_frame(&self) -> &str {
        &self.question_frame
    }

    fn guidance(&self) -> &str {
        &self.guidance
    }

    fn select_content<'a>(&self, candidates: Vec<&'a QuizItem>) -> Vec<&'a QuizItem> {
        candidates
            .into_iter()
            .filter(|item| item.facts().len() >= self.min_facts)
            .collect()
    }
}
