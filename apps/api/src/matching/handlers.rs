use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::model::{MatchRecord, UserRole};
use crate::matching::service::{LikeReport, DEFAULT_PAGE_SIZE};
use crate::state::AppState;

const MATCH_MESSAGE: &str = "It's a match!";

#[derive(Deserialize)]
pub struct PostLikeRequest {
    pub user_id: Uuid,
    pub post_id: Uuid,
}

#[derive(Deserialize)]
pub struct CandidateLikeRequest {
    pub user_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub message: &'static str,
    pub did_like: bool,
    pub is_a_match: bool,
    pub like_count: i64,
}

impl From<LikeReport> for LikeResponse {
    fn from(report: LikeReport) -> Self {
        let outcome = report.outcome;
        let message = if outcome.is_a_match {
            MATCH_MESSAGE
        } else if outcome.did_like {
            "Liked job"
        } else {
            "Unliked job"
        };
        Self {
            message,
            did_like: outcome.did_like,
            is_a_match: outcome.is_a_match,
            like_count: outcome.like_count.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterLikeResponse {
    pub message: &'static str,
    pub is_a_match: bool,
}

impl From<LikeReport> for RecruiterLikeResponse {
    fn from(report: LikeReport) -> Self {
        let outcome = report.outcome;
        let message = if outcome.is_a_match {
            MATCH_MESSAGE
        } else if outcome.did_like {
            "Record created."
        } else {
            "Record removed."
        };
        Self {
            message,
            is_a_match: outcome.is_a_match,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleParam {
    Candidate,
    Recruiter,
}

impl From<RoleParam> for UserRole {
    fn from(role: RoleParam) -> Self {
        match role {
            RoleParam::Candidate => UserRole::Candidate,
            RoleParam::Recruiter => UserRole::Recruiter,
        }
    }
}

#[derive(Deserialize)]
pub struct MatchListQuery {
    pub user_id: Uuid,
    pub role: RoleParam,
    #[serde(default)]
    pub page: i64,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
pub struct MatchListResponse {
    pub data: Vec<MatchRecord>,
    pub page: i64,
    pub page_size: i64,
}

/// POST /api/v1/posts/like
pub async fn handle_like_post(
    State(state): State<AppState>,
    Json(req): Json<PostLikeRequest>,
) -> Result<Json<LikeResponse>, AppError> {
    let report = state.matches.candidate_like(req.user_id, req.post_id).await?;
    Ok(Json(report.into()))
}

/// POST /api/v1/recruiter/like-candidate
pub async fn handle_like_candidate(
    State(state): State<AppState>,
    Json(req): Json<CandidateLikeRequest>,
) -> Result<Json<RecruiterLikeResponse>, AppError> {
    let report = state
        .matches
        .recruiter_like(req.user_id, req.candidate_id)
        .await?;
    Ok(Json(report.into()))
}

/// GET /api/v1/matches
pub async fn handle_list_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchListQuery>,
) -> Result<Json<MatchListResponse>, AppError> {
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let data = state
        .matches
        .matches_for_user(params.user_id, params.role.into(), params.page, page_size)
        .await?;
    Ok(Json(MatchListResponse {
        data,
        page: params.page,
        page_size,
    }))
}

/// GET /api/v1/matches/post/:post_id
pub async fn handle_post_matches(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<MatchRecord>>, AppError> {
    Ok(Json(state.matches.matches_for_post(post_id).await?))
}
