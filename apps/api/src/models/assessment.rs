use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessment::catalog::AssessmentRecord;
use crate::assessment::model::{Answer, PersonalityProfile, Question, TraitScores, UserAnswer};
use crate::assessment::scoring::ScoringDiagnostics;
use crate::assessment::strategy::{ScoreScale, StrategyKind};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub position: i32,
    pub text: String,
    pub trait_code: String,
    pub reverse: bool,
    pub answers: Json<Vec<Answer>>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            order: row.position,
            text: row.text,
            trait_label: row.trait_code,
            reverse: row.reverse,
            answers: row.answers.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub key: String,
    pub title: String,
    pub detail: String,
    pub strengths: Vec<String>,
    pub core_values: Vec<String>,
    pub recommended_jobs: Vec<String>,
    pub company_culture: String,
    pub traits: Json<BTreeMap<String, String>>,
}

impl From<ProfileRow> for PersonalityProfile {
    fn from(row: ProfileRow) -> Self {
        PersonalityProfile {
            id: row.id,
            key: row.key,
            title: row.title,
            detail: row.detail,
            strengths: row.strengths,
            values: row.core_values,
            recommended_jobs: row.recommended_jobs,
            company_culture: row.company_culture,
            traits: row.traits.0,
        }
    }
}

/// `assessments` joined with the matched profile, if any.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub personality_type: String,
    pub strategy: Json<StrategyKind>,
    pub scale: Json<ScoreScale>,
    pub scores: Json<TraitScores>,
    pub profile: Option<Json<PersonalityProfile>>,
    pub responses: Json<Vec<UserAnswer>>,
    pub diagnostics: Json<ScoringDiagnostics>,
    pub created_at: DateTime<Utc>,
}

impl From<AssessmentRow> for AssessmentRecord {
    fn from(row: AssessmentRow) -> Self {
        AssessmentRecord {
            id: row.id,
            user_id: row.user_id,
            personality_type: row.personality_type,
            strategy: row.strategy.0,
            scale: row.scale.0,
            scores: row.scores.0,
            profile: row.profile.map(|p| p.0),
            responses: row.responses.0,
            diagnostics: row.diagnostics.0,
            created_at: row.created_at,
        }
    }
}
