//! Option lists shown to the player.

use quizcraft_domain::{OptionRepair, QuizItem, QuizSession};

use crate::infrastructure::ports::RandomPort;

use super::content::QuizContent;

/// Repair the generator's option list for `item`.
///
/// An empty list or any repair counts as a compliance failure on the
/// session; the player only ever sees the repaired list.
pub(crate) fn generator_options(
    content: &QuizContent,
    session: &mut QuizSession,
    item: &QuizItem,
    proposed: Vec<String>,
    random: &dyn RandomPort,
) -> Vec<String> {
    if proposed.is_empty() {
        note_compliance_failure(session, item, &["empty"]);
        return catalog_options(content, item, random);
    }

    let validated = content
        .validator()
        .validate(proposed, item, |len| random.gen_index(len));
    if !validated.is_compliant() {
        let kinds: Vec<&str> = validated.repairs().iter().map(OptionRepair::kind).collect();
        note_compliance_failure(session, item, &kinds);
    }
    validated.into_options()
}

fn note_compliance_failure(session: &mut QuizSession, item: &QuizItem, repairs: &[&str]) {
    session.note_compliance_failure();
    tracing::warn!(
        target: "quizcraft::compliance",
        session_id = %session.id(),
        round = session.round_number(),
        item_id = %item.id(),
        repairs = ?repairs,
        "Generator options repaired"
    );
}

/// Options built from the catalog alone.
pub(crate) fn catalog_options(
    content: &QuizContent,
    item: &QuizItem,
    random: &dyn RandomPort,
) -> Vec<String> {
    content
        .validator()
        .fallback_options(item, content.policy().options_per_question, |len| {
            random.gen_index(len)
        })
        .into_options()
}
