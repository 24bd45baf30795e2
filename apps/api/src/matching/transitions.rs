//! Like/match state transitions.
//!
//! The planners are pure: given the current Like/Match rows they return the write-set
//! the store must apply atomically, the notices to send once it has, and the outcome
//! reported to the caller. Counter deltas are part of the write-set so `likes` and
//! `match_count` move in the same transaction as the rows they count.
//!
//! Match states per (candidate, recruiter) pair:
//!
//! | state             | row                               |
//! |-------------------|-----------------------------------|
//! | absent            | no match                          |
//! | pending candidate | `accepted = false`, `post_id` set |
//! | pending recruiter | `accepted = false`, no `post_id`  |
//! | mutual            | `accepted = true`                 |

use serde::Serialize;
use uuid::Uuid;

use crate::matching::model::{JobPost, MatchRecord, MatchState, PostLike, UserSummary};

/// One persistence step. A plan's writes succeed or fail together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchWrite {
    CreateMatch(MatchRecord),
    UpdateMatch {
        match_id: Uuid,
        accepted: bool,
        post_id: Option<Uuid>,
    },
    DeleteMatch {
        match_id: Uuid,
    },
    CreateLike(PostLike),
    DeleteLike {
        user_id: Uuid,
        post_id: Uuid,
    },
    AdjustPostCounters {
        post_id: Uuid,
        likes: i64,
        match_count: i64,
    },
}

/// Which row of the transition table was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Candidate liked a post with no prior interest on either side.
    CandidateLiked,
    /// Candidate liked a post after the recruiter had liked them.
    CandidateMatched,
    /// Candidate withdrew a one-sided like.
    CandidateUnliked,
    /// Candidate withdrew from a mutual match; the recruiter's interest remains.
    CandidateUnlikedMatch,
    /// Candidate unliked the post carrying the match while still liking another post of
    /// the same recruiter; the match moves to that post.
    RescopedMatch,
    /// A like existed without its match; the match is recreated.
    RestoredMissingMatch,
    /// Candidate liked another post of a recruiter they already have a match with.
    LikedAdditionalPost,
    /// Candidate unliked a post that does not carry the match.
    UnlikedAdditionalPost,
    /// Recruiter liked a candidate with no prior interest on either side.
    RecruiterLiked,
    /// Recruiter liked a candidate who had already liked one of their posts.
    RecruiterMatched,
    /// Recruiter withdrew a one-sided like.
    RecruiterUnliked,
    /// Recruiter withdrew from a mutual match; the candidate's like remains.
    RecruiterUnlikedMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeKind {
    Match,
}

/// Side effects delivered after the write-set commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum MatchNotice {
    Notification {
        from: Uuid,
        to: Uuid,
        kind: NoticeKind,
        message: String,
    },
    Message {
        from: Uuid,
        to: Vec<Uuid>,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    /// Whether the acting user likes the target after this action.
    pub did_like: bool,
    pub is_a_match: bool,
    /// Post like count after this action; candidate likes only.
    pub like_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub transition: Transition,
    pub writes: Vec<MatchWrite>,
    pub notices: Vec<MatchNotice>,
    pub outcome: LikeOutcome,
    pub next_state: MatchState,
}

/// Current rows for a candidate acting on a job post.
#[derive(Debug, Clone, Copy)]
pub struct CandidateLikeContext<'a> {
    pub candidate: &'a UserSummary,
    pub recruiter: &'a UserSummary,
    pub post: &'a JobPost,
    pub existing_like: Option<&'a PostLike>,
    pub existing_match: Option<&'a MatchRecord>,
    /// Another job post of the same recruiter the candidate still likes.
    pub other_liked_post: Option<Uuid>,
}

/// Current rows for a recruiter acting on a candidate.
#[derive(Debug, Clone, Copy)]
pub struct RecruiterLikeContext<'a> {
    pub recruiter: &'a UserSummary,
    pub candidate: &'a UserSummary,
    pub existing_match: Option<&'a MatchRecord>,
}

fn mutual_notices(initiator: &UserSummary, other: &UserSummary) -> Vec<MatchNotice> {
    vec![
        MatchNotice::Notification {
            from: initiator.id,
            to: other.id,
            kind: NoticeKind::Match,
            message: format!("You received a match from {}!", initiator.name),
        },
        MatchNotice::Notification {
            from: other.id,
            to: initiator.id,
            kind: NoticeKind::Match,
            message: format!("You and {} have matched!", other.name),
        },
        MatchNotice::Message {
            from: initiator.id,
            to: vec![other.id],
            body: format!("Hi {}, we've matched!", other.name),
        },
    ]
}

fn counters(post_id: Uuid, likes: i64, match_count: i64) -> MatchWrite {
    MatchWrite::AdjustPostCounters {
        post_id,
        likes,
        match_count,
    }
}

/// Plans a candidate's like/unlike toggle on a job post.
pub fn plan_candidate_like(ctx: &CandidateLikeContext<'_>) -> TransitionPlan {
    let candidate_id = ctx.candidate.id;
    let recruiter_id = ctx.recruiter.id;
    let post_id = ctx.post.id;
    let likes = ctx.post.likes;

    let liked = |like_delta: i64| LikeOutcome {
        did_like: like_delta >= 0,
        is_a_match: false,
        like_count: Some(likes + like_delta),
    };

    match (ctx.existing_like, ctx.existing_match) {
        (None, None) => TransitionPlan {
            transition: Transition::CandidateLiked,
            writes: vec![
                MatchWrite::CreateMatch(MatchRecord::pending(
                    candidate_id,
                    recruiter_id,
                    Some(post_id),
                )),
                MatchWrite::CreateLike(PostLike::new(candidate_id, post_id)),
                counters(post_id, 1, 0),
            ],
            notices: vec![],
            outcome: liked(1),
            next_state: MatchState::PendingCandidate,
        },

        (Some(_), None) => TransitionPlan {
            transition: Transition::RestoredMissingMatch,
            writes: vec![MatchWrite::CreateMatch(MatchRecord::pending(
                candidate_id,
                recruiter_id,
                Some(post_id),
            ))],
            notices: vec![],
            outcome: liked(0),
            next_state: MatchState::PendingCandidate,
        },

        (Some(_), Some(m)) if m.post_id == Some(post_id) => {
            let unlike = MatchWrite::DeleteLike {
                user_id: candidate_id,
                post_id,
            };
            match (ctx.other_liked_post, m.accepted) {
                (Some(other), accepted) => {
                    let moved = i64::from(accepted);
                    let mut writes = vec![
                        unlike,
                        MatchWrite::UpdateMatch {
                            match_id: m.id,
                            accepted,
                            post_id: Some(other),
                        },
                        counters(post_id, -1, -moved),
                    ];
                    if accepted {
                        writes.push(counters(other, 0, moved));
                    }
                    TransitionPlan {
                        transition: Transition::RescopedMatch,
                        writes,
                        notices: vec![],
                        outcome: liked(-1),
                        next_state: m.state(),
                    }
                }
                (None, true) => TransitionPlan {
                    transition: Transition::CandidateUnlikedMatch,
                    writes: vec![
                        unlike,
                        MatchWrite::UpdateMatch {
                            match_id: m.id,
                            accepted: false,
                            post_id: None,
                        },
                        counters(post_id, -1, -1),
                    ],
                    notices: vec![],
                    outcome: liked(-1),
                    next_state: MatchState::PendingRecruiter,
                },
                (None, false) => TransitionPlan {
                    transition: Transition::CandidateUnliked,
                    writes: vec![
                        unlike,
                        MatchWrite::DeleteMatch { match_id: m.id },
                        counters(post_id, -1, 0),
                    ],
                    notices: vec![],
                    outcome: liked(-1),
                    next_state: MatchState::Absent,
                },
            }
        }

        (None, Some(m)) if m.state() == MatchState::PendingRecruiter => TransitionPlan {
            transition: Transition::CandidateMatched,
            writes: vec![
                MatchWrite::UpdateMatch {
                    match_id: m.id,
                    accepted: true,
                    post_id: Some(post_id),
                },
                MatchWrite::CreateLike(PostLike::new(candidate_id, post_id)),
                counters(post_id, 1, 1),
            ],
            notices: mutual_notices(ctx.candidate, ctx.recruiter),
            outcome: LikeOutcome {
                is_a_match: true,
                ..liked(1)
            },
            next_state: MatchState::Mutual,
        },

        (None, Some(m)) => TransitionPlan {
            transition: Transition::LikedAdditionalPost,
            writes: vec![
                MatchWrite::CreateLike(PostLike::new(candidate_id, post_id)),
                counters(post_id, 1, 0),
            ],
            notices: vec![],
            outcome: liked(1),
            next_state: m.state(),
        },

        (Some(_), Some(m)) => TransitionPlan {
            transition: Transition::UnlikedAdditionalPost,
            writes: vec![
                MatchWrite::DeleteLike {
                    user_id: candidate_id,
                    post_id,
                },
                counters(post_id, -1, 0),
            ],
            notices: vec![],
            outcome: liked(-1),
            next_state: m.state(),
        },
    }
}

/// Plans a recruiter's like/unlike toggle on a candidate.
pub fn plan_recruiter_like(ctx: &RecruiterLikeContext<'_>) -> TransitionPlan {
    let outcome = |did_like: bool, is_a_match: bool| LikeOutcome {
        did_like,
        is_a_match,
        like_count: None,
    };

    let Some(m) = ctx.existing_match else {
        return TransitionPlan {
            transition: Transition::RecruiterLiked,
            writes: vec![MatchWrite::CreateMatch(MatchRecord::pending(
                ctx.candidate.id,
                ctx.recruiter.id,
                None,
            ))],
            notices: vec![],
            outcome: outcome(true, false),
            next_state: MatchState::PendingRecruiter,
        };
    };

    match m.state() {
        MatchState::Mutual => {
            let mut writes = vec![MatchWrite::UpdateMatch {
                match_id: m.id,
                accepted: false,
                post_id: m.post_id,
            }];
            if let Some(post_id) = m.post_id {
                writes.push(counters(post_id, 0, -1));
            }
            TransitionPlan {
                transition: Transition::RecruiterUnlikedMatch,
                writes,
                notices: vec![],
                outcome: outcome(false, false),
                next_state: if m.post_id.is_some() {
                    MatchState::PendingCandidate
                } else {
                    MatchState::PendingRecruiter
                },
            }
        }
        MatchState::PendingRecruiter => TransitionPlan {
            transition: Transition::RecruiterUnliked,
            writes: vec![MatchWrite::DeleteMatch { match_id: m.id }],
            notices: vec![],
            outcome: outcome(false, false),
            next_state: MatchState::Absent,
        },
        // `post_id` is always set in this state.
        MatchState::PendingCandidate | MatchState::Absent => {
            let mut writes = vec![MatchWrite::UpdateMatch {
                match_id: m.id,
                accepted: true,
                post_id: m.post_id,
            }];
            if let Some(post_id) = m.post_id {
                writes.push(counters(post_id, 0, 1));
            }
            TransitionPlan {
                transition: Transition::RecruiterMatched,
                writes,
                notices: mutual_notices(ctx.recruiter, ctx.candidate),
                outcome: outcome(true, true),
                next_state: MatchState::Mutual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::model::{PostType, UserRole};

    fn user(name: &str, role: UserRole) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            has_assessment: true,
            intro_videos: 1,
        }
    }

    struct Fixture {
        candidate: UserSummary,
        recruiter: UserSummary,
        post: JobPost,
    }

    fn fixture() -> Fixture {
        let candidate = user("Casey", UserRole::Candidate);
        let recruiter = user("Riley", UserRole::Recruiter);
        let post = JobPost {
            id: Uuid::new_v4(),
            owner_id: recruiter.id,
            post_type: PostType::Job,
            likes: 3,
            match_count: 1,
        };
        Fixture {
            candidate,
            recruiter,
            post,
        }
    }

    fn candidate_plan(
        f: &Fixture,
        like: Option<&PostLike>,
        existing: Option<&MatchRecord>,
    ) -> TransitionPlan {
        candidate_plan_with_other(f, like, existing, None)
    }

    fn candidate_plan_with_other(
        f: &Fixture,
        like: Option<&PostLike>,
        existing: Option<&MatchRecord>,
        other_liked_post: Option<Uuid>,
    ) -> TransitionPlan {
        plan_candidate_like(&CandidateLikeContext {
            candidate: &f.candidate,
            recruiter: &f.recruiter,
            post: &f.post,
            existing_like: like,
            existing_match: existing,
            other_liked_post,
        })
    }

    fn recruiter_plan(f: &Fixture, existing: Option<&MatchRecord>) -> TransitionPlan {
        plan_recruiter_like(&RecruiterLikeContext {
            recruiter: &f.recruiter,
            candidate: &f.candidate,
            existing_match: existing,
        })
    }

    fn counter_deltas(plan: &TransitionPlan) -> (i64, i64) {
        plan.writes
            .iter()
            .filter_map(|w| match w {
                MatchWrite::AdjustPostCounters {
                    likes, match_count, ..
                } => Some((*likes, *match_count)),
                _ => None,
            })
            .fold((0, 0), |acc, d| (acc.0 + d.0, acc.1 + d.1))
    }

    fn deltas_on(plan: &TransitionPlan, post: Uuid) -> (i64, i64) {
        plan.writes
            .iter()
            .filter_map(|w| match w {
                MatchWrite::AdjustPostCounters {
                    post_id,
                    likes,
                    match_count,
                } if *post_id == post => Some((*likes, *match_count)),
                _ => None,
            })
            .fold((0, 0), |acc, d| (acc.0 + d.0, acc.1 + d.1))
    }

    #[test]
    fn first_candidate_like_creates_pending_match_and_like() {
        let f = fixture();
        let plan = candidate_plan(&f, None, None);

        assert_eq!(plan.transition, Transition::CandidateLiked);
        assert_eq!(plan.next_state, MatchState::PendingCandidate);
        assert!(plan.writes.iter().any(|w| matches!(
            w,
            MatchWrite::CreateMatch(m) if !m.accepted && m.post_id == Some(f.post.id)
        )));
        assert!(plan
            .writes
            .iter()
            .any(|w| matches!(w, MatchWrite::CreateLike(l) if l.post_id == f.post.id)));
        assert_eq!(counter_deltas(&plan), (1, 0));
        assert_eq!(plan.outcome.like_count, Some(4));
        assert!(plan.notices.is_empty());
    }

    #[test]
    fn candidate_like_after_recruiter_like_is_mutual() {
        let f = fixture();
        let existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, None);
        let plan = candidate_plan(&f, None, Some(&existing));

        assert_eq!(plan.transition, Transition::CandidateMatched);
        assert!(plan.outcome.is_a_match);
        assert_eq!(counter_deltas(&plan), (1, 1));
        assert!(plan.writes.contains(&MatchWrite::UpdateMatch {
            match_id: existing.id,
            accepted: true,
            post_id: Some(f.post.id),
        }));
        assert_eq!(plan.notices.len(), 3);
        assert!(plan.notices.contains(&MatchNotice::Message {
            from: f.candidate.id,
            to: vec![f.recruiter.id],
            body: "Hi Riley, we've matched!".to_string(),
        }));
    }

    #[test]
    fn candidate_unlike_of_pending_match_deletes_everything() {
        let f = fixture();
        let existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(f.post.id));
        let like = PostLike::new(f.candidate.id, f.post.id);
        let plan = candidate_plan(&f, Some(&like), Some(&existing));

        assert_eq!(plan.transition, Transition::CandidateUnliked);
        assert_eq!(plan.next_state, MatchState::Absent);
        assert!(plan.writes.contains(&MatchWrite::DeleteMatch {
            match_id: existing.id
        }));
        assert_eq!(counter_deltas(&plan), (-1, 0));
        assert!(!plan.outcome.did_like);
    }

    #[test]
    fn candidate_unlike_of_mutual_match_reverts_to_recruiter_pending() {
        let f = fixture();
        let mut existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(f.post.id));
        existing.accepted = true;
        let like = PostLike::new(f.candidate.id, f.post.id);
        let plan = candidate_plan(&f, Some(&like), Some(&existing));

        assert_eq!(plan.transition, Transition::CandidateUnlikedMatch);
        assert_eq!(plan.next_state, MatchState::PendingRecruiter);
        assert!(plan.writes.contains(&MatchWrite::UpdateMatch {
            match_id: existing.id,
            accepted: false,
            post_id: None,
        }));
        assert_eq!(counter_deltas(&plan), (-1, -1));
        assert_eq!(plan.outcome.like_count, Some(2));
    }

    #[test]
    fn like_without_match_recreates_match_without_counting() {
        let f = fixture();
        let like = PostLike::new(f.candidate.id, f.post.id);
        let plan = candidate_plan(&f, Some(&like), None);

        assert_eq!(plan.transition, Transition::RestoredMissingMatch);
        assert_eq!(counter_deltas(&plan), (0, 0));
        assert_eq!(plan.outcome.like_count, Some(3));
    }

    #[test]
    fn second_post_of_same_recruiter_only_toggles_the_like() {
        let f = fixture();
        let other_post = Uuid::new_v4();
        let existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(other_post));

        let plan = candidate_plan(&f, None, Some(&existing));
        assert_eq!(plan.transition, Transition::LikedAdditionalPost);
        assert_eq!(plan.next_state, MatchState::PendingCandidate);
        assert_eq!(counter_deltas(&plan), (1, 0));

        let like = PostLike::new(f.candidate.id, f.post.id);
        let plan = candidate_plan(&f, Some(&like), Some(&existing));
        assert_eq!(plan.transition, Transition::UnlikedAdditionalPost);
        assert_eq!(counter_deltas(&plan), (-1, 0));
    }

    #[test]
    fn unliking_the_match_post_moves_a_pending_match_to_another_liked_post() {
        let f = fixture();
        let other_post = Uuid::new_v4();
        let existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(f.post.id));
        let like = PostLike::new(f.candidate.id, f.post.id);
        let plan = candidate_plan_with_other(&f, Some(&like), Some(&existing), Some(other_post));

        assert_eq!(plan.transition, Transition::RescopedMatch);
        assert_eq!(plan.next_state, MatchState::PendingCandidate);
        assert!(!plan.outcome.did_like);
        assert!(plan.writes.contains(&MatchWrite::UpdateMatch {
            match_id: existing.id,
            accepted: false,
            post_id: Some(other_post),
        }));
        assert!(!plan
            .writes
            .iter()
            .any(|w| matches!(w, MatchWrite::DeleteMatch { .. })));
        assert_eq!(deltas_on(&plan, f.post.id), (-1, 0));
        assert_eq!(deltas_on(&plan, other_post), (0, 0));
    }

    #[test]
    fn unliking_the_match_post_keeps_a_mutual_match_on_another_liked_post() {
        let f = fixture();
        let other_post = Uuid::new_v4();
        let mut existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(f.post.id));
        existing.accepted = true;
        let like = PostLike::new(f.candidate.id, f.post.id);
        let plan = candidate_plan_with_other(&f, Some(&like), Some(&existing), Some(other_post));

        assert_eq!(plan.transition, Transition::RescopedMatch);
        assert_eq!(plan.next_state, MatchState::Mutual);
        assert!(!plan.outcome.is_a_match);
        assert!(plan.writes.contains(&MatchWrite::UpdateMatch {
            match_id: existing.id,
            accepted: true,
            post_id: Some(other_post),
        }));
        assert_eq!(deltas_on(&plan, f.post.id), (-1, -1));
        assert_eq!(deltas_on(&plan, other_post), (0, 1));
        assert!(plan.notices.is_empty());
    }

    #[test]
    fn recruiter_first_like_creates_match_without_post() {
        let f = fixture();
        let plan = recruiter_plan(&f, None);

        assert_eq!(plan.transition, Transition::RecruiterLiked);
        assert!(matches!(
            &plan.writes[..],
            [MatchWrite::CreateMatch(m)] if m.post_id.is_none() && !m.accepted
        ));
    }

    #[test]
    fn recruiter_like_back_completes_the_match() {
        let f = fixture();
        let existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(f.post.id));
        let plan = recruiter_plan(&f, Some(&existing));

        assert_eq!(plan.transition, Transition::RecruiterMatched);
        assert!(plan.outcome.is_a_match);
        assert_eq!(counter_deltas(&plan), (0, 1));
        let notified: Vec<Uuid> = plan
            .notices
            .iter()
            .filter_map(|n| match n {
                MatchNotice::Notification { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(notified, vec![f.candidate.id, f.recruiter.id]);
    }

    #[test]
    fn recruiter_like_on_mutual_match_reverts_instead_of_recounting() {
        let f = fixture();
        let mut existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, Some(f.post.id));
        existing.accepted = true;
        let plan = recruiter_plan(&f, Some(&existing));

        assert_eq!(plan.transition, Transition::RecruiterUnlikedMatch);
        assert_eq!(plan.next_state, MatchState::PendingCandidate);
        assert_eq!(counter_deltas(&plan), (0, -1));
        assert!(!plan.outcome.is_a_match);
    }

    #[test]
    fn recruiter_unlike_of_own_pending_like_deletes_match() {
        let f = fixture();
        let existing = MatchRecord::pending(f.candidate.id, f.recruiter.id, None);
        let plan = recruiter_plan(&f, Some(&existing));

        assert_eq!(plan.transition, Transition::RecruiterUnliked);
        assert_eq!(
            plan.writes,
            vec![MatchWrite::DeleteMatch {
                match_id: existing.id
            }]
        );
    }
}
