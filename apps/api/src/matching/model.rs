use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interest between a candidate and a recruiter. At most one per pair.
///
/// `post_id` is set while the candidate's interest is attached to a job post; a
/// recruiter-initiated match has none until the candidate likes one of the recruiter's posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub post_id: Option<Uuid>,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn pending(candidate_id: Uuid, recruiter_id: Uuid, post_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            recruiter_id,
            post_id,
            accepted: false,
            created_at: Utc::now(),
        }
    }

    pub fn state(&self) -> MatchState {
        match (self.accepted, self.post_id) {
            (true, _) => MatchState::Mutual,
            (false, Some(_)) => MatchState::PendingCandidate,
            (false, None) => MatchState::PendingRecruiter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Absent,
    PendingCandidate,
    PendingRecruiter,
    Mutual,
}

/// A candidate's like of a job post. Unique per (user, post); deleted on unlike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLike {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl PostLike {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    Job,
    Candidate,
}

/// The slice of a post the state machine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPost {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub post_type: PostType,
    pub likes: i64,
    pub match_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Candidate,
    Recruiter,
}

/// What the like flows need to know about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub has_assessment: bool,
    pub intro_videos: u32,
}
