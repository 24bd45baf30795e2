//! DISC trait aggregation and 0–100 normalization.
//!
//! Each submitted answer is resolved against the question bank by numeric ID. The
//! selected answer's score (1..5) is summed per trait and the per-trait average is mapped
//! linearly onto 0..100 (1 → 0, 5 → 100). Unresolvable references are skipped and
//! reported in [`ScoringDiagnostics`] rather than failing the submission.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assessment::model::{Question, Trait, TraitScores, UserAnswer};

/// Per-trait running totals.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    sums: TraitScores,
    counts: TraitScores,
}

/// What happened to each submitted answer while scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringDiagnostics {
    pub answered: usize,
    pub resolved: usize,
    pub unresolved_questions: Vec<String>,
    pub unresolved_answers: Vec<String>,
    pub ignored_traits: Vec<String>,
}

impl ScoringDiagnostics {
    pub fn skipped(&self) -> usize {
        self.answered.saturating_sub(self.resolved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub scores: TraitScores,
    pub diagnostics: ScoringDiagnostics,
}

/// Normalized DISC scores for a submission.
pub fn calculate_disc_scores(answers: &[UserAnswer], questions: &[Question]) -> TraitScores {
    score_answers(answers, questions).scores
}

/// Like [`calculate_disc_scores`] but keeps the record of skipped references.
pub fn score_answers(answers: &[UserAnswer], questions: &[Question]) -> ScoreReport {
    let mut tally = Tally::default();
    let mut diagnostics = ScoringDiagnostics {
        answered: answers.len(),
        ..Default::default()
    };

    for user_answer in answers {
        let question_id = user_answer.question_id.as_number();
        let Some(question) = questions.iter().find(|q| Some(q.id) == question_id) else {
            warn!("Question not found for ID: {}", user_answer.question_id);
            diagnostics
                .unresolved_questions
                .push(user_answer.question_id.to_string());
            continue;
        };

        let answer_id = user_answer.answer_id.as_number();
        let Some(selected) = question.answers.iter().find(|a| Some(a.id) == answer_id) else {
            warn!(
                "Answer not found for question {}, answer ID: {}",
                question.id, user_answer.answer_id
            );
            diagnostics
                .unresolved_answers
                .push(format!("{}:{}", question.id, user_answer.answer_id));
            continue;
        };

        let Some(t) = Trait::from_label(&selected.trait_label) else {
            warn!(
                "Invalid trait: {} for question {}",
                selected.trait_label, question.id
            );
            diagnostics.ignored_traits.push(selected.trait_label.clone());
            continue;
        };

        *tally.sums.get_mut(t) += selected.score;
        *tally.counts.get_mut(t) += 1;
        diagnostics.resolved += 1;
    }

    debug!(counts = ?tally.counts, raw = ?tally.sums, "DISC trait tally");

    let mut scores = TraitScores::default();
    for t in Trait::ALL {
        *scores.get_mut(t) = normalize(tally.sums.get(t), tally.counts.get(t));
    }

    debug!(normalized = ?scores, "DISC normalized scores");

    ScoreReport {
        scores,
        diagnostics,
    }
}

/// Maps the average of `count` answers summing to `sum` from 1..5 onto 0..100.
fn normalize(sum: u32, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    let avg = f64::from(sum) / f64::from(count);
    (((avg - 1.0) / 4.0) * 100.0).round().clamp(0.0, 100.0) as u32
}
