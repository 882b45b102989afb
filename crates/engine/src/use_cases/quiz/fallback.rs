//! Catalog-only play for when the generator cannot be used.

use quizcraft_domain::normalize;

use crate::game_tools::ClassifiedSignal;

const DONT_KNOW_PHRASES: &[&str] = &[
    "dont know",
    "don't know",
    "do not know",
    "no idea",
    "not sure",
    "hint",
    "help",
    "clue",
];

const SKIP_PHRASES: &[&str] = &["skip", "give up", "i give up", "pass", "next", "tell me"];

/// Classify free text without the generator.
///
/// Only an exact (normalized) match of the answer counts as correct.
pub fn classify_locally(text: &str, answer: &str) -> ClassifiedSignal {
    let said = normalize(text);
    if said.is_empty() {
        return ClassifiedSignal::Unclear;
    }
    if said == normalize(answer) {
        return ClassifiedSignal::Answer { correct: true };
    }
    let said_words = words(&said);
    if SKIP_PHRASES
        .iter()
        .any(|p| said_words.starts_with(&phrase_words(p)))
    {
        return ClassifiedSignal::Skip;
    }
    if DONT_KNOW_PHRASES.iter().any(|p| {
        let phrase = phrase_words(p);
        said_words.windows(phrase.len()).any(|w| w == phrase.as_slice())
    }) {
        return ClassifiedSignal::DontKnow;
    }
    ClassifiedSignal::Answer { correct: false }
}

/// Lowercased words with surrounding punctuation stripped; apostrophes stay.
fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect()
}

fn phrase_words(phrase: &str) -> Vec<&str> {
    phrase.split(' ').collect()
}

/// Question text built from the catalog alone.
pub fn fallback_question(round_number: u32, total_rounds: u32, question_frame: &str, clue: &str) -> String {
    format!(
        "Round {} of {}. {} Here's your clue: {}",
        round_number, total_rounds, question_frame, clue
    )
}

/// Host line for a turn without generator narration.
pub fn fallback_reply(signal: ClassifiedSignal) -> &'static str {
    match signal {
        ClassifiedSignal::Answer { correct: true } => "Correct!",
        ClassifiedSignal::Answer { correct: false } => "Not quite. Try again!",
        ClassifiedSignal::DontKnow | ClassifiedSignal::Skip => "Here's a hint.",
        ClassifiedSignal::Continue | ClassifiedSignal::Unclear => {
            "Take a guess, ask for a hint, or skip."
        }
    }
}
