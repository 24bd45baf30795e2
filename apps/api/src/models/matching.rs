use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::model::{JobPost, MatchRecord, PostLike, PostType, UserRole, UserSummary};
use crate::matching::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub post_id: Option<Uuid>,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        MatchRecord {
            id: row.id,
            candidate_id: row.candidate_id,
            recruiter_id: row.recruiter_id,
            post_id: row.post_id,
            accepted: row.accepted,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostLikeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<PostLikeRow> for PostLike {
    fn from(row: PostLikeRow) -> Self {
        PostLike {
            id: row.id,
            user_id: row.user_id,
            post_id: row.post_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub post_type: String,
    pub likes: i64,
    pub match_count: i64,
}

impl TryFrom<PostRow> for JobPost {
    type Error = StoreError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let post_type = match row.post_type.as_str() {
            "JOB" => PostType::Job,
            "CANDIDATE" => PostType::Candidate,
            other => return Err(StoreError::Decode(format!("post type '{other}'"))),
        };
        Ok(JobPost {
            id: row.id,
            owner_id: row.owner_id,
            post_type,
            likes: row.likes,
            match_count: row.match_count,
        })
    }
}

/// `users` joined with assessment and intro-video presence.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub has_assessment: bool,
    pub intro_videos: i64,
}

impl TryFrom<UserSummaryRow> for UserSummary {
    type Error = StoreError;

    fn try_from(row: UserSummaryRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_str() {
            "CANDIDATE" => UserRole::Candidate,
            "RECRUITER" => UserRole::Recruiter,
            other => return Err(StoreError::Decode(format!("user role '{other}'"))),
        };
        Ok(UserSummary {
            id: row.id,
            name: row.name,
            role,
            has_assessment: row.has_assessment,
            intro_videos: u32::try_from(row.intro_videos).unwrap_or(u32::MAX),
        })
    }
}
