//! Pluggable classifiers over an assessment submission.
//!
//! Default: `ThresholdClassifier` (normalized 0..100 scores, dominant-trait thresholds).
//! Alternate: `PermutationClassifier` (raw sums, above-mean initials, key permutations).
//!
//! `AppState` holds an `Arc<dyn ClassificationStrategy>`, chosen at startup via config.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assessment::classification::{determine_disc_type, TypeKey};
use crate::assessment::error::AssessmentError;
use crate::assessment::legacy::{
    calculate_raw_scores, calculate_results, initials_at_or_above_mean, organize_responses,
};
use crate::assessment::model::{PersonalityProfile, Question, TraitScores, UserAnswer};
use crate::assessment::profiles::{
    match_personality_profile, ProfileFallback, ProfileMatch, ProfileResolution,
};
use crate::assessment::scoring::{score_answers, ScoringDiagnostics};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Threshold,
    Permutation,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threshold" => Ok(StrategyKind::Threshold),
            "permutation" | "legacy" => Ok(StrategyKind::Permutation),
            other => Err(format!("unknown classification strategy '{other}'")),
        }
    }
}

/// How the reported scores should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// 0..100 per trait.
    Normalized,
    /// Sum of answer scores per trait.
    RawSum,
}

/// Output shared by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub strategy: StrategyKind,
    pub personality_type: String,
    pub scores: TraitScores,
    pub scale: ScoreScale,
    pub profile: Option<PersonalityProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ProfileResolution>,
    pub diagnostics: ScoringDiagnostics,
}

/// The classifier trait. Implement this to swap algorithms without touching the
/// submission handler.
pub trait ClassificationStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn classify(
        &self,
        answers: &[UserAnswer],
        questions: &[Question],
        profiles: &[PersonalityProfile],
    ) -> Result<ClassificationResult, AssessmentError>;
}

/// Result of the threshold pipeline, borrowing the matched profile.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscAnalysis<'a> {
    pub personality_type: TypeKey,
    pub scores: TraitScores,
    pub profile: Option<ProfileMatch<'a>>,
    pub diagnostics: ScoringDiagnostics,
}

/// Scores, classifies and looks up the profile for a submission.
pub fn analyze_disc_assessment<'a>(
    answers: &[UserAnswer],
    questions: &[Question],
    profiles: &'a [PersonalityProfile],
    fallback: ProfileFallback,
) -> DiscAnalysis<'a> {
    let report = score_answers(answers, questions);
    let personality_type = determine_disc_type(&report.scores);
    let profile = match_personality_profile(&personality_type, profiles, fallback);

    DiscAnalysis {
        personality_type,
        scores: report.scores,
        profile,
        diagnostics: report.diagnostics,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdClassifier {
    pub fallback: ProfileFallback,
}

impl ClassificationStrategy for ThresholdClassifier {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Threshold
    }

    fn classify(
        &self,
        answers: &[UserAnswer],
        questions: &[Question],
        profiles: &[PersonalityProfile],
    ) -> Result<ClassificationResult, AssessmentError> {
        let analysis = analyze_disc_assessment(answers, questions, profiles, self.fallback);
        Ok(ClassificationResult {
            strategy: StrategyKind::Threshold,
            personality_type: analysis.personality_type.to_string(),
            scores: analysis.scores,
            scale: ScoreScale::Normalized,
            profile: analysis.profile.map(|m| m.profile.clone()),
            resolution: analysis.profile.map(|m| m.resolution),
            diagnostics: analysis.diagnostics,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationClassifier;

impl ClassificationStrategy for PermutationClassifier {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Permutation
    }

    fn classify(
        &self,
        answers: &[UserAnswer],
        questions: &[Question],
        profiles: &[PersonalityProfile],
    ) -> Result<ClassificationResult, AssessmentError> {
        let organized = organize_responses(questions, answers)?;
        let scores = calculate_raw_scores(&organized);
        let profile = calculate_results(&scores, profiles);

        let personality_type = match profile {
            Some(p) => p.key.clone(),
            None => initials_at_or_above_mean(&scores),
        };

        Ok(ClassificationResult {
            strategy: StrategyKind::Permutation,
            personality_type,
            scores,
            scale: ScoreScale::RawSum,
            profile: profile.cloned(),
            resolution: profile.map(|_| ProfileResolution::Exact),
            diagnostics: ScoringDiagnostics {
                answered: answers.len(),
                resolved: organized.len(),
                ..Default::default()
            },
        })
    }
}

/// Builds the configured strategy.
pub fn build_strategy(
    kind: StrategyKind,
    fallback: ProfileFallback,
) -> Box<dyn ClassificationStrategy> {
    match kind {
        StrategyKind::Threshold => Box::new(ThresholdClassifier { fallback }),
        StrategyKind::Permutation => Box::new(PermutationClassifier),
    }
}
