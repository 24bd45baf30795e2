use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::matching::model::{JobPost, MatchRecord, PostLike, UserRole, UserSummary};
use crate::matching::transitions::MatchWrite;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique (candidate, recruiter) or (user, post) constraint was hit.
    #[error("record already exists")]
    Conflict,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid stored value: {0}")]
    Decode(String),

    /// A counter adjustment would take `likes` or `match_count` below zero.
    #[error("counters on post {0} would go negative")]
    NegativeCounter(Uuid),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            _ => StoreError::Database(e),
        }
    }
}

/// Listing filter for mutual matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuery {
    /// Matches where the user is the candidate or the recruiter, newest first.
    ForUser {
        user_id: Uuid,
        role: UserRole,
        limit: i64,
        offset: i64,
    },
    /// Matches attached to a job post, newest first.
    ForPost { post_id: Uuid },
}

/// Persistence port for likes, matches and the post counters.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserSummary>, StoreError>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<JobPost>, StoreError>;

    /// Whether the user owns at least one JOB post.
    async fn has_job_post(&self, owner_id: Uuid) -> Result<bool, StoreError>;

    async fn find_match(
        &self,
        candidate_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Option<MatchRecord>, StoreError>;

    async fn find_like(&self, user_id: Uuid, post_id: Uuid)
        -> Result<Option<PostLike>, StoreError>;

    /// Job posts of `recruiter_id` the candidate likes, most recently liked first.
    async fn liked_posts(
        &self,
        candidate_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError>;

    /// Applies every write or none of them.
    async fn apply(&self, writes: &[MatchWrite]) -> Result<(), StoreError>;

    /// Accepted matches that carry a post.
    async fn mutual_matches(&self, query: MatchQuery) -> Result<Vec<MatchRecord>, StoreError>;
}
