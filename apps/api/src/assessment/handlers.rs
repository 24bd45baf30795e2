use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::assessment::catalog::AssessmentRecord;
use crate::assessment::error::AssessmentError;
use crate::assessment::model::{PersonalityProfile, Question, TraitScores, UserAnswer};
use crate::assessment::scoring::ScoringDiagnostics;
use crate::assessment::strategy::StrategyKind;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub answers: Vec<UserAnswer>,
}

#[derive(Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub personality: PersonalityProfile,
    pub personality_type: String,
    pub scores: TraitScores,
    pub diagnostics: ScoringDiagnostics,
    pub strategy: StrategyKind,
    pub taken_at: DateTime<Utc>,
}

impl AssessmentView {
    fn from_record(record: AssessmentRecord) -> Result<Self, AssessmentError> {
        Ok(Self {
            personality: record.profile.ok_or(AssessmentError::NoProfile)?,
            personality_type: record.personality_type,
            scores: record.scores,
            diagnostics: record.diagnostics,
            strategy: record.strategy,
            taken_at: record.created_at,
        })
    }
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub data: AssessmentView,
    pub message: &'static str,
}

/// GET /api/v1/assessment/questions
pub async fn handle_get_questions(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<Question>>>, AppError> {
    let questions = state.catalog.questions().await?;
    Ok(Json(DataResponse { data: questions }))
}

/// POST /api/v1/assessment/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    if req.answers.is_empty() {
        return Err(AppError::Validation("No answers provided".to_string()));
    }

    let questions = state.catalog.questions().await?;
    let profiles = state.catalog.profiles().await?;
    let result = state
        .classifier
        .classify(&req.answers, &questions, &profiles)?;

    info!(
        user_id = %req.user_id,
        personality_type = %result.personality_type,
        strategy = ?result.strategy,
        skipped = result.diagnostics.skipped(),
        "assessment classified"
    );

    let record = AssessmentRecord::from_result(req.user_id, req.answers, result);
    if record.profile.is_some() {
        // The computed result is returned even when it cannot be stored.
        if let Err(e) = state.catalog.save_result(&record).await {
            error!(user_id = %record.user_id, "failed to save assessment: {e}");
        }
    }

    Ok(Json(SubmitResponse {
        data: AssessmentView::from_record(record)?,
        message: "Assessment submitted successfully",
    }))
}

/// GET /api/v1/assessment/results
pub async fn handle_get_results(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DataResponse<AssessmentView>>, AppError> {
    let record = state
        .catalog
        .latest_result(params.user_id)
        .await?
        .ok_or_else(|| {
            AppError::UnprocessableEntity("User has not taken the assessment.".to_string())
        })?;
    Ok(Json(DataResponse {
        data: AssessmentView::from_record(record)?,
    }))
}
