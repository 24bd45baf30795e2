//! Mean-and-permutation classification.
//!
//! Responses are joined to questions by ID and to answers by exact answer text. Raw
//! scores are summed over an extended 13-trait model of which only the DISC totals are
//! reported. Every DISC trait scoring at or above the mean of the four totals contributes
//! its initial; the first profile whose key is any ordering of those initials wins.

use crate::assessment::error::AssessmentError;
use crate::assessment::model::{Answer, PersonalityProfile, Question, Trait, TraitScores, UserAnswer};

/// Traits tracked by the extended model, in tally order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedTrait {
    Dominance,
    Influence,
    Steadiness,
    Conscientiousness,
    Introversion,
    Extraversion,
    Sensing,
    Intuition,
    Thinking,
    Feeling,
    Judging,
    Perceiving,
    Openness,
}

impl ExtendedTrait {
    pub const ALL: [ExtendedTrait; 13] = [
        ExtendedTrait::Dominance,
        ExtendedTrait::Influence,
        ExtendedTrait::Steadiness,
        ExtendedTrait::Conscientiousness,
        ExtendedTrait::Introversion,
        ExtendedTrait::Extraversion,
        ExtendedTrait::Sensing,
        ExtendedTrait::Intuition,
        ExtendedTrait::Thinking,
        ExtendedTrait::Feeling,
        ExtendedTrait::Judging,
        ExtendedTrait::Perceiving,
        ExtendedTrait::Openness,
    ];

    /// Accepts exact full trait names and the DISC single-letter codes.
    pub fn from_label(label: &str) -> Option<Self> {
        if let Some(t) = Trait::from_label(label) {
            return Some(Self::from(t));
        }
        Self::ALL.into_iter().find(|t| format!("{t:?}") == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl From<Trait> for ExtendedTrait {
    fn from(value: Trait) -> Self {
        match value {
            Trait::D => ExtendedTrait::Dominance,
            Trait::I => ExtendedTrait::Influence,
            Trait::S => ExtendedTrait::Steadiness,
            Trait::C => ExtendedTrait::Conscientiousness,
        }
    }
}

/// A response joined to its question and answer.
#[derive(Debug, Clone, Copy)]
pub struct OrganizedResponse<'a> {
    pub question: &'a Question,
    pub answer: &'a Answer,
}

/// Joins responses to the question bank. Any unknown question or answer text is an error.
pub fn organize_responses<'a>(
    questions: &'a [Question],
    responses: &[UserAnswer],
) -> Result<Vec<OrganizedResponse<'a>>, AssessmentError> {
    responses
        .iter()
        .map(|response| -> Result<OrganizedResponse<'a>, AssessmentError> {
            let question_id = response.question_id.as_number();
            let question = questions
                .iter()
                .find(|q| Some(q.id) == question_id)
                .ok_or_else(|| AssessmentError::InvalidQuestion(response.question_id.to_string()))?;

            let text = response.answer_text.as_deref().unwrap_or_default();
            let answer = question
                .answers
                .iter()
                .find(|a| a.text == text)
                .ok_or_else(|| AssessmentError::InvalidAnswerText(text.to_string()))?;

            Ok(OrganizedResponse { question, answer })
        })
        .collect()
}

/// Raw score sums; only the DISC subset is returned.
pub fn calculate_raw_scores(responses: &[OrganizedResponse<'_>]) -> TraitScores {
    let mut totals = [0u32; 13];
    for response in responses {
        if let Some(t) = ExtendedTrait::from_label(&response.answer.trait_label) {
            totals[t.index()] += response.answer.score;
        }
    }

    let mut scores = TraitScores::default();
    for t in Trait::ALL {
        *scores.get_mut(t) = totals[ExtendedTrait::from(t).index()];
    }
    scores
}

/// Initials of every trait at or above the mean score, in D, I, S, C order.
pub fn initials_at_or_above_mean(scores: &TraitScores) -> String {
    let entries = scores.entries();
    let mean = entries.iter().map(|(_, v)| f64::from(*v)).sum::<f64>() / entries.len() as f64;
    entries
        .iter()
        .filter(|(_, v)| f64::from(*v) >= mean)
        .map(|(t, _)| t.letter())
        .collect()
}

/// Every ordering of `letters`, duplicates included.
pub fn permutations(letters: &str) -> Vec<String> {
    fn permute(chars: &mut Vec<char>, start: usize, out: &mut Vec<String>) {
        if start + 1 >= chars.len() {
            out.push(chars.iter().collect());
            return;
        }
        for i in start..chars.len() {
            chars.swap(start, i);
            permute(chars, start + 1, out);
            chars.swap(start, i);
        }
    }

    let mut chars: Vec<char> = letters.chars().collect();
    let mut out = Vec::new();
    if chars.is_empty() {
        return out;
    }
    permute(&mut chars, 0, &mut out);
    out
}

/// First profile, in catalog order, keyed by any permutation of the above-mean initials.
pub fn calculate_results<'a>(
    scores: &TraitScores,
    profiles: &'a [PersonalityProfile],
) -> Option<&'a PersonalityProfile> {
    let candidates = permutations(&initials_at_or_above_mean(scores));
    profiles
        .iter()
        .find(|p| candidates.iter().any(|k| *k == p.key))
}
