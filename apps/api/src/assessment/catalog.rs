use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::error::CatalogError;
use crate::assessment::model::{PersonalityProfile, Question, TraitScores, UserAnswer};
use crate::assessment::scoring::ScoringDiagnostics;
use crate::assessment::strategy::{ClassificationResult, ScoreScale, StrategyKind};

/// A stored assessment outcome. One per user; a new submission replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub personality_type: String,
    pub strategy: StrategyKind,
    pub scale: ScoreScale,
    pub scores: TraitScores,
    pub profile: Option<PersonalityProfile>,
    pub responses: Vec<UserAnswer>,
    pub diagnostics: ScoringDiagnostics,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn from_result(user_id: Uuid, responses: Vec<UserAnswer>, result: ClassificationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            personality_type: result.personality_type,
            strategy: result.strategy,
            scale: result.scale,
            scores: result.scores,
            profile: result.profile,
            responses,
            diagnostics: result.diagnostics,
            created_at: Utc::now(),
        }
    }
}

/// Read/write port for assessment reference data and results.
#[async_trait]
pub trait AssessmentCatalog: Send + Sync {
    /// Questions ordered by `order`.
    async fn questions(&self) -> Result<Vec<Question>, CatalogError>;

    /// Profiles in catalog order.
    async fn profiles(&self) -> Result<Vec<PersonalityProfile>, CatalogError>;

    /// Replaces the user's stored assessment and records the classification on the user.
    async fn save_result(&self, record: &AssessmentRecord) -> Result<(), CatalogError>;

    async fn latest_result(&self, user_id: Uuid) -> Result<Option<AssessmentRecord>, CatalogError>;
}
