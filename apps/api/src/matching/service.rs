//! Like/unlike orchestration.
//!
//! Each call checks eligibility, takes the pair lock, reads the current Like/Match rows,
//! plans the transition and applies its write-set atomically. Notices go out after the
//! lock is released; delivery failures are logged and never undo the match.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::matching::locks::PairLocks;
use crate::matching::model::{JobPost, MatchRecord, MatchState, PostType, UserRole, UserSummary};
use crate::matching::notify::MatchNotifier;
use crate::matching::store::{MatchQuery, MatchStore, StoreError};
use crate::matching::transitions::{
    plan_candidate_like, plan_recruiter_like, CandidateLikeContext, LikeOutcome, MatchNotice,
    RecruiterLikeContext, Transition, TransitionPlan,
};

pub const USER_NOT_FOUND: &str = "User account not found.";
pub const ASSESSMENT_REQUIRED: &str = "You must complete your assessment before liking jobs.";
pub const INTRO_VIDEO_REQUIRED: &str =
    "You must have at least 1 intro video uploaded to like jobs.";
pub const INVALID_JOB_POST: &str = "Job does not exist or its a candidate.";
pub const JOB_POST_REQUIRED: &str = "You must create a job to like a candidate.";
pub const CANDIDATE_ONLY: &str = "Only candidates can like jobs.";
pub const RECRUITER_ONLY: &str = "Only recruiters can like candidates.";
pub const CANDIDATE_NOT_FOUND: &str = "Candidate does not exist.";

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidTarget(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a like call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeReport {
    pub transition: Transition,
    pub outcome: LikeOutcome,
    pub state: MatchState,
}

impl From<&TransitionPlan> for LikeReport {
    fn from(plan: &TransitionPlan) -> Self {
        Self {
            transition: plan.transition,
            outcome: plan.outcome,
            state: plan.next_state,
        }
    }
}

pub struct MatchService {
    store: Arc<dyn MatchStore>,
    notifier: Arc<dyn MatchNotifier>,
    locks: PairLocks,
}

impl MatchService {
    pub fn new(store: Arc<dyn MatchStore>, notifier: Arc<dyn MatchNotifier>) -> Self {
        Self {
            store,
            notifier,
            locks: PairLocks::new(),
        }
    }

    /// Toggles a candidate's like on a job post.
    pub async fn candidate_like(
        &self,
        candidate_id: Uuid,
        post_id: Uuid,
    ) -> Result<LikeReport, MatchError> {
        let candidate = self.require_user(candidate_id).await?;
        if candidate.role != UserRole::Candidate {
            return Err(MatchError::Forbidden(CANDIDATE_ONLY));
        }
        if !candidate.has_assessment {
            return Err(MatchError::Forbidden(ASSESSMENT_REQUIRED));
        }
        if candidate.intro_videos < 1 {
            return Err(MatchError::Forbidden(INTRO_VIDEO_REQUIRED));
        }

        let owner_id = self.job_post(post_id).await?.owner_id;
        let recruiter = self
            .store
            .find_user(owner_id)
            .await?
            .ok_or(MatchError::InvalidTarget(INVALID_JOB_POST))?;

        let plan = {
            let _pair = self.locks.acquire(candidate.id, recruiter.id).await;
            // Counters are read under the lock so the reported like count is current.
            let post = self.job_post(post_id).await?;
            let existing_like = self.store.find_like(candidate.id, post.id).await?;
            let existing_match = self.store.find_match(candidate.id, recruiter.id).await?;
            let other_liked_post = self
                .store
                .liked_posts(candidate.id, recruiter.id)
                .await?
                .into_iter()
                .find(|id| *id != post.id);

            let plan = plan_candidate_like(&CandidateLikeContext {
                candidate: &candidate,
                recruiter: &recruiter,
                post: &post,
                existing_like: existing_like.as_ref(),
                existing_match: existing_match.as_ref(),
                other_liked_post,
            });
            self.store.apply(&plan.writes).await?;
            plan
        };

        info!(
            candidate_id = %candidate.id,
            recruiter_id = %recruiter.id,
            %post_id,
            transition = ?plan.transition,
            "candidate like applied"
        );
        self.deliver(&plan.notices).await;
        Ok(LikeReport::from(&plan))
    }

    /// Toggles a recruiter's like on a candidate.
    pub async fn recruiter_like(
        &self,
        recruiter_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<LikeReport, MatchError> {
        let recruiter = self.require_user(recruiter_id).await?;
        if recruiter.role != UserRole::Recruiter {
            return Err(MatchError::Forbidden(RECRUITER_ONLY));
        }
        if !self.store.has_job_post(recruiter.id).await? {
            return Err(MatchError::Forbidden(JOB_POST_REQUIRED));
        }

        let candidate = self
            .store
            .find_user(candidate_id)
            .await?
            .filter(|u| u.role == UserRole::Candidate)
            .ok_or(MatchError::NotFound(CANDIDATE_NOT_FOUND))?;

        let plan = {
            let _pair = self.locks.acquire(candidate.id, recruiter.id).await;
            let existing_match = self.store.find_match(candidate.id, recruiter.id).await?;

            let plan = plan_recruiter_like(&RecruiterLikeContext {
                recruiter: &recruiter,
                candidate: &candidate,
                existing_match: existing_match.as_ref(),
            });
            self.store.apply(&plan.writes).await?;
            plan
        };

        info!(
            candidate_id = %candidate.id,
            recruiter_id = %recruiter.id,
            transition = ?plan.transition,
            "recruiter like applied"
        );
        self.deliver(&plan.notices).await;
        Ok(LikeReport::from(&plan))
    }

    /// Mutual matches for a user, newest first. `page` is zero-based.
    pub async fn matches_for_user(
        &self,
        user_id: Uuid,
        role: UserRole,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<MatchRecord>, MatchError> {
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = page.max(0) * limit;
        Ok(self
            .store
            .mutual_matches(MatchQuery::ForUser {
                user_id,
                role,
                limit,
                offset,
            })
            .await?)
    }

    pub async fn matches_for_post(&self, post_id: Uuid) -> Result<Vec<MatchRecord>, MatchError> {
        Ok(self
            .store
            .mutual_matches(MatchQuery::ForPost { post_id })
            .await?)
    }

    async fn require_user(&self, user_id: Uuid) -> Result<UserSummary, MatchError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(MatchError::Unauthorized(USER_NOT_FOUND))
    }

    async fn job_post(&self, post_id: Uuid) -> Result<JobPost, MatchError> {
        self.store
            .find_post(post_id)
            .await?
            .filter(|p| p.post_type == PostType::Job)
            .ok_or(MatchError::InvalidTarget(INVALID_JOB_POST))
    }

    async fn deliver(&self, notices: &[MatchNotice]) {
        for notice in notices {
            match self.notifier.deliver(notice).await {
                Ok(()) => debug!(?notice, "notice delivered"),
                Err(e) => warn!(error = %e, "failed to deliver match notice"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::notify::NotifyError;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        delivered: Mutex<Vec<MatchNotice>>,
        fail: bool,
    }

    #[async_trait]
    impl MatchNotifier for RecordingNotifier {
        async fn deliver(&self, notice: &MatchNotice) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Unavailable("offline".to_string()));
            }
            self.delivered.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        service: MatchService,
        candidate: Uuid,
        recruiter: Uuid,
        post: Uuid,
    }

    fn user(name: &str, role: UserRole) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            has_assessment: true,
            intro_videos: 1,
        }
    }

    async fn harness_with(notifier: RecordingNotifier) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let candidate = user("Casey", UserRole::Candidate);
        let recruiter = user("Riley", UserRole::Recruiter);
        let post = JobPost {
            id: Uuid::new_v4(),
            owner_id: recruiter.id,
            post_type: PostType::Job,
            likes: 0,
            match_count: 0,
        };
        let ids = (candidate.id, recruiter.id, post.id);
        store.insert_user(candidate).await;
        store.insert_user(recruiter).await;
        store.insert_post(post).await;

        let notifier = Arc::new(notifier);
        let service = MatchService::new(store.clone(), notifier.clone());
        Harness {
            store,
            notifier,
            service,
            candidate: ids.0,
            recruiter: ids.1,
            post: ids.2,
        }
    }

    async fn harness() -> Harness {
        harness_with(RecordingNotifier::default()).await
    }

    impl Harness {
        async fn counters(&self) -> (i64, i64) {
            self.counters_on(self.post).await
        }

        async fn counters_on(&self, post_id: Uuid) -> (i64, i64) {
            let post = self.store.find_post(post_id).await.unwrap().unwrap();
            (post.likes, post.match_count)
        }

        async fn add_job_post(&self) -> Uuid {
            let post = JobPost {
                id: Uuid::new_v4(),
                owner_id: self.recruiter,
                post_type: PostType::Job,
                likes: 0,
                match_count: 0,
            };
            let id = post.id;
            self.store.insert_post(post).await;
            id
        }

        async fn liked(&self, post_id: Uuid) -> bool {
            self.store
                .find_like(self.candidate, post_id)
                .await
                .unwrap()
                .is_some()
        }

        async fn match_post(&self) -> Option<Uuid> {
            self.store
                .find_match(self.candidate, self.recruiter)
                .await
                .unwrap()
                .and_then(|m| m.post_id)
        }

        async fn state(&self) -> MatchState {
            let m = self
                .store
                .find_match(self.candidate, self.recruiter)
                .await
                .unwrap();
            m.map_or(MatchState::Absent, |m| m.state())
        }
    }

    #[tokio::test]
    async fn candidate_then_recruiter_is_a_match() {
        let h = harness().await;

        let first = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(first.transition, Transition::CandidateLiked);
        assert_eq!(first.outcome.like_count, Some(1));
        assert_eq!(h.state().await, MatchState::PendingCandidate);

        let second = h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();
        assert!(second.outcome.is_a_match);
        assert_eq!(h.state().await, MatchState::Mutual);
        assert_eq!(h.counters().await, (1, 1));
        assert_eq!(h.notifier.delivered.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn recruiter_then_candidate_is_a_match() {
        let h = harness().await;

        h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();
        assert_eq!(h.state().await, MatchState::PendingRecruiter);

        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(report.transition, Transition::CandidateMatched);
        assert!(report.outcome.is_a_match);
        assert_eq!(h.counters().await, (1, 1));

        let matches = h
            .service
            .matches_for_user(h.candidate, UserRole::Candidate, 0, DEFAULT_PAGE_SIZE)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].post_id, Some(h.post));
        assert_eq!(h.service.matches_for_post(h.post).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn candidate_like_twice_restores_counters() {
        let h = harness().await;

        h.service.candidate_like(h.candidate, h.post).await.unwrap();
        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(report.transition, Transition::CandidateUnliked);
        assert!(!report.outcome.did_like);
        assert_eq!(h.state().await, MatchState::Absent);
        assert_eq!(h.counters().await, (0, 0));
        assert!(h.store.find_like(h.candidate, h.post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn withdrawing_from_a_match_keeps_the_other_side() {
        let h = harness().await;
        h.service.candidate_like(h.candidate, h.post).await.unwrap();
        h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();

        // Recruiter withdraws: the candidate's like on the post stays.
        let report = h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();
        assert_eq!(report.transition, Transition::RecruiterUnlikedMatch);
        assert_eq!(h.state().await, MatchState::PendingCandidate);
        assert_eq!(h.counters().await, (1, 0));

        // Liking back re-forms the match exactly once.
        h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();
        assert_eq!(h.counters().await, (1, 1));

        // Candidate withdraws: the recruiter's interest stays.
        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(report.transition, Transition::CandidateUnlikedMatch);
        assert_eq!(h.state().await, MatchState::PendingRecruiter);
        assert_eq!(h.counters().await, (0, 0));
    }

    #[tokio::test]
    async fn unliking_the_match_post_keeps_the_match_on_another_liked_post() {
        let h = harness().await;
        let second = h.add_job_post().await;

        h.service.candidate_like(h.candidate, h.post).await.unwrap();
        let report = h.service.candidate_like(h.candidate, second).await.unwrap();
        assert_eq!(report.transition, Transition::LikedAdditionalPost);

        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(report.transition, Transition::RescopedMatch);
        assert!(!report.outcome.did_like);
        assert_eq!(h.state().await, MatchState::PendingCandidate);
        assert_eq!(h.match_post().await, Some(second));
        assert!(!h.liked(h.post).await);
        assert_eq!(h.counters_on(h.post).await, (0, 0));
        assert_eq!(h.counters_on(second).await, (1, 0));

        // The next click on the remaining post is an unlike, not a restore.
        let report = h.service.candidate_like(h.candidate, second).await.unwrap();
        assert_eq!(report.transition, Transition::CandidateUnliked);
        assert!(!report.outcome.did_like);
        assert_eq!(h.state().await, MatchState::Absent);
        assert!(!h.liked(second).await);
        assert_eq!(h.counters_on(second).await, (0, 0));
    }

    #[tokio::test]
    async fn unliking_the_other_post_first_leaves_the_match_in_place() {
        let h = harness().await;
        let second = h.add_job_post().await;
        h.service.candidate_like(h.candidate, h.post).await.unwrap();
        h.service.candidate_like(h.candidate, second).await.unwrap();

        let report = h.service.candidate_like(h.candidate, second).await.unwrap();
        assert_eq!(report.transition, Transition::UnlikedAdditionalPost);
        assert_eq!(h.match_post().await, Some(h.post));

        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(report.transition, Transition::CandidateUnliked);
        assert_eq!(h.state().await, MatchState::Absent);
        assert_eq!(h.counters_on(h.post).await, (0, 0));
        assert_eq!(h.counters_on(second).await, (0, 0));
    }

    #[tokio::test]
    async fn withdrawing_from_the_match_post_keeps_a_mutual_match_alive() {
        let h = harness().await;
        let second = h.add_job_post().await;
        h.service.candidate_like(h.candidate, h.post).await.unwrap();
        h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();
        h.service.candidate_like(h.candidate, second).await.unwrap();
        assert_eq!(h.counters_on(h.post).await, (1, 1));
        assert_eq!(h.counters_on(second).await, (1, 0));

        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();
        assert_eq!(report.transition, Transition::RescopedMatch);
        assert_eq!(h.state().await, MatchState::Mutual);
        assert_eq!(h.match_post().await, Some(second));
        assert_eq!(h.counters_on(h.post).await, (0, 0));
        assert_eq!(h.counters_on(second).await, (1, 1));
        assert!(h.service.matches_for_post(h.post).await.unwrap().is_empty());
        assert_eq!(h.service.matches_for_post(second).await.unwrap().len(), 1);

        let report = h.service.candidate_like(h.candidate, second).await.unwrap();
        assert_eq!(report.transition, Transition::CandidateUnlikedMatch);
        assert_eq!(h.state().await, MatchState::PendingRecruiter);
        assert_eq!(h.counters_on(second).await, (0, 0));
    }

    #[tokio::test]
    async fn ineligible_candidates_are_rejected() {
        let h = harness().await;

        let err = h.service.candidate_like(Uuid::new_v4(), h.post).await.unwrap_err();
        assert!(matches!(err, MatchError::Unauthorized(USER_NOT_FOUND)));

        let mut no_video = user("Noor", UserRole::Candidate);
        no_video.intro_videos = 0;
        let id = no_video.id;
        h.store.insert_user(no_video).await;
        let err = h.service.candidate_like(id, h.post).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden(INTRO_VIDEO_REQUIRED)));

        let mut no_assessment = user("Ade", UserRole::Candidate);
        no_assessment.has_assessment = false;
        let id = no_assessment.id;
        h.store.insert_user(no_assessment).await;
        let err = h.service.candidate_like(id, h.post).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden(ASSESSMENT_REQUIRED)));

        let err = h.service.candidate_like(h.candidate, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, MatchError::InvalidTarget(INVALID_JOB_POST)));
    }

    #[tokio::test]
    async fn candidate_posts_cannot_be_liked() {
        let h = harness().await;
        let other = user("Sam", UserRole::Candidate);
        let post = JobPost {
            id: Uuid::new_v4(),
            owner_id: other.id,
            post_type: PostType::Candidate,
            likes: 0,
            match_count: 0,
        };
        let post_id = post.id;
        h.store.insert_user(other).await;
        h.store.insert_post(post).await;

        let err = h.service.candidate_like(h.candidate, post_id).await.unwrap_err();
        assert!(matches!(err, MatchError::InvalidTarget(INVALID_JOB_POST)));
    }

    #[tokio::test]
    async fn recruiter_without_job_post_is_rejected() {
        let h = harness().await;
        let recruiter = user("Jo", UserRole::Recruiter);
        let id = recruiter.id;
        h.store.insert_user(recruiter).await;

        let err = h.service.recruiter_like(id, h.candidate).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden(JOB_POST_REQUIRED)));

        let err = h.service.recruiter_like(h.recruiter, h.recruiter).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound(CANDIDATE_NOT_FOUND)));
    }

    #[tokio::test]
    async fn notifier_failure_does_not_undo_the_match() {
        let h = harness_with(RecordingNotifier {
            fail: true,
            ..Default::default()
        })
        .await;
        h.service.recruiter_like(h.recruiter, h.candidate).await.unwrap();
        let report = h.service.candidate_like(h.candidate, h.post).await.unwrap();

        assert!(report.outcome.is_a_match);
        assert_eq!(h.state().await, MatchState::Mutual);
    }

    #[tokio::test]
    async fn concurrent_mutual_likes_count_once() {
        let h = Arc::new(harness().await);
        let mut tasks = Vec::new();
        for i in 0..8 {
            let h = Arc::clone(&h);
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    h.service.candidate_like(h.candidate, h.post).await.map(|_| ())
                } else {
                    h.service.recruiter_like(h.recruiter, h.candidate).await.map(|_| ())
                }
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Four toggles each: both sides end where they started.
        assert_eq!(h.state().await, MatchState::Absent);
        assert_eq!(h.counters().await, (0, 0));
    }
}
