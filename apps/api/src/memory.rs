//! In-process stores, used when no `DATABASE_URL` is configured and by tests.
//!
//! Mirrors the PostgreSQL constraints: one match per (candidate, recruiter), one like per
//! (user, post). `apply` stages the write-set on a copy and swaps it in only if every
//! write succeeds.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assessment::catalog::{AssessmentCatalog, AssessmentRecord};
use crate::assessment::error::CatalogError;
use crate::assessment::model::{PersonalityProfile, Question};
use crate::assessment::seed;
use crate::matching::model::{JobPost, MatchRecord, PostLike, PostType, UserRole, UserSummary};
use crate::matching::store::{MatchQuery, MatchStore, StoreError};
use crate::matching::transitions::MatchWrite;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, UserSummary>,
    posts: HashMap<Uuid, JobPost>,
    matches: HashMap<Uuid, MatchRecord>,
    likes: HashMap<(Uuid, Uuid), PostLike>,
}

impl Tables {
    fn match_for_pair(&self, candidate_id: Uuid, recruiter_id: Uuid) -> Option<&MatchRecord> {
        self.matches
            .values()
            .find(|m| m.candidate_id == candidate_id && m.recruiter_id == recruiter_id)
    }

    fn write(&mut self, write: &MatchWrite) -> Result<(), StoreError> {
        match write {
            MatchWrite::CreateMatch(m) => {
                if self.match_for_pair(m.candidate_id, m.recruiter_id).is_some() {
                    return Err(StoreError::Conflict);
                }
                self.matches.insert(m.id, m.clone());
            }
            MatchWrite::UpdateMatch {
                match_id,
                accepted,
                post_id,
            } => {
                let m = self
                    .matches
                    .get_mut(match_id)
                    .ok_or_else(|| StoreError::NotFound("match".to_string()))?;
                m.accepted = *accepted;
                m.post_id = *post_id;
            }
            MatchWrite::DeleteMatch { match_id } => {
                self.matches
                    .remove(match_id)
                    .ok_or_else(|| StoreError::NotFound("match".to_string()))?;
            }
            MatchWrite::CreateLike(like) => {
                let key = (like.user_id, like.post_id);
                if self.likes.contains_key(&key) {
                    return Err(StoreError::Conflict);
                }
                self.likes.insert(key, like.clone());
            }
            MatchWrite::DeleteLike { user_id, post_id } => {
                self.likes
                    .remove(&(*user_id, *post_id))
                    .ok_or_else(|| StoreError::NotFound("like".to_string()))?;
            }
            MatchWrite::AdjustPostCounters {
                post_id,
                likes,
                match_count,
            } => {
                let post = self
                    .posts
                    .get_mut(post_id)
                    .ok_or_else(|| StoreError::NotFound("post".to_string()))?;
                let (next_likes, next_matches) =
                    (post.likes + likes, post.match_count + match_count);
                if next_likes < 0 || next_matches < 0 {
                    return Err(StoreError::NegativeCounter(*post_id));
                }
                post.likes = next_likes;
                post.match_count = next_matches;
            }
        }
        Ok(())
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    assessments: RwLock<HashMap<Uuid, AssessmentRecord>>,
    questions: Vec<Question>,
    profiles: Vec<PersonalityProfile>,
}

impl MemoryStore {
    /// An empty store with an empty catalog.
    pub fn new() -> Self {
        Self::with_catalog(Vec::new(), Vec::new())
    }

    pub fn with_catalog(questions: Vec<Question>, profiles: Vec<PersonalityProfile>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            assessments: RwLock::new(HashMap::new()),
            questions,
            profiles,
        }
    }

    /// A store holding the bundled question bank and profiles.
    pub fn seeded() -> Result<Self, CatalogError> {
        Ok(Self::with_catalog(seed::questions()?, seed::profiles()?))
    }

    pub async fn insert_user(&self, user: UserSummary) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn insert_post(&self, post: JobPost) {
        self.tables.write().await.posts.insert(post.id, post);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserSummary>, StoreError> {
        let tables = self.tables.read().await;
        let Some(user) = tables.users.get(&user_id).cloned() else {
            return Ok(None);
        };
        let has_assessment =
            user.has_assessment || self.assessments.read().await.contains_key(&user_id);
        Ok(Some(UserSummary {
            has_assessment,
            ..user
        }))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<JobPost>, StoreError> {
        Ok(self.tables.read().await.posts.get(&post_id).cloned())
    }

    async fn has_job_post(&self, owner_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .posts
            .values()
            .any(|p| p.owner_id == owner_id && p.post_type == PostType::Job))
    }

    async fn find_match(
        &self,
        candidate_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .match_for_pair(candidate_id, recruiter_id)
            .cloned())
    }

    async fn find_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<PostLike>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .likes
            .get(&(user_id, post_id))
            .cloned())
    }

    async fn liked_posts(
        &self,
        candidate_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        let tables = self.tables.read().await;
        let mut liked: Vec<&PostLike> = tables
            .likes
            .values()
            .filter(|l| l.user_id == candidate_id)
            .filter(|l| {
                tables.posts.get(&l.post_id).is_some_and(|p| {
                    p.owner_id == recruiter_id && p.post_type == PostType::Job
                })
            })
            .collect();
        liked.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(liked.into_iter().map(|l| l.post_id).collect())
    }

    async fn apply(&self, writes: &[MatchWrite]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        for write in writes {
            staged.write(write)?;
        }
        *tables = staged;
        Ok(())
    }

    async fn mutual_matches(&self, query: MatchQuery) -> Result<Vec<MatchRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut found: Vec<MatchRecord> = tables
            .matches
            .values()
            .filter(|m| m.accepted)
            .filter(|m| match query {
                MatchQuery::ForUser { user_id, role, .. } => {
                    let party = match role {
                        UserRole::Candidate => m.candidate_id,
                        UserRole::Recruiter => m.recruiter_id,
                    };
                    party == user_id && m.post_id.is_some()
                }
                MatchQuery::ForPost { post_id } => m.post_id == Some(post_id),
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let MatchQuery::ForUser { limit, offset, .. } = query {
            let offset = usize::try_from(offset).unwrap_or(0);
            let limit = usize::try_from(limit).unwrap_or(0);
            found = found.into_iter().skip(offset).take(limit).collect();
        }
        Ok(found)
    }
}

#[async_trait]
impl AssessmentCatalog for MemoryStore {
    async fn questions(&self) -> Result<Vec<Question>, CatalogError> {
        Ok(self.questions.clone())
    }

    async fn profiles(&self) -> Result<Vec<PersonalityProfile>, CatalogError> {
        Ok(self.profiles.clone())
    }

    async fn save_result(&self, record: &AssessmentRecord) -> Result<(), CatalogError> {
        self.assessments
            .write()
            .await
            .insert(record.user_id, record.clone());
        Ok(())
    }

    async fn latest_result(&self, user_id: Uuid) -> Result<Option<AssessmentRecord>, CatalogError> {
        Ok(self.assessments.read().await.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::strategy::{ClassificationStrategy, ThresholdClassifier};

    fn post(owner_id: Uuid) -> JobPost {
        JobPost {
            id: Uuid::new_v4(),
            owner_id,
            post_type: PostType::Job,
            likes: 0,
            match_count: 0,
        }
    }

    #[tokio::test]
    async fn failed_write_set_leaves_tables_untouched() {
        let store = MemoryStore::new();
        let p = post(Uuid::new_v4());
        let post_id = p.id;
        store.insert_post(p).await;
        let candidate = Uuid::new_v4();

        let writes = vec![
            MatchWrite::CreateLike(PostLike::new(candidate, post_id)),
            MatchWrite::AdjustPostCounters {
                post_id,
                likes: 1,
                match_count: 0,
            },
            MatchWrite::DeleteMatch {
                match_id: Uuid::new_v4(),
            },
        ];
        let err = store.apply(&writes).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.find_like(candidate, post_id).await.unwrap().is_none());
        assert_eq!(store.find_post(post_id).await.unwrap().unwrap().likes, 0);
    }

    #[tokio::test]
    async fn negative_counters_reject_the_write_set() {
        let store = MemoryStore::new();
        let p = post(Uuid::new_v4());
        let post_id = p.id;
        store.insert_post(p).await;

        let err = store
            .apply(&[MatchWrite::AdjustPostCounters {
                post_id,
                likes: -1,
                match_count: 0,
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NegativeCounter(id) if id == post_id));
        assert_eq!(store.find_post(post_id).await.unwrap().unwrap().likes, 0);
    }

    #[tokio::test]
    async fn liked_posts_are_scoped_to_the_recruiter() {
        let store = MemoryStore::new();
        let (candidate, recruiter) = (Uuid::new_v4(), Uuid::new_v4());
        let (mine, theirs) = (post(recruiter), post(Uuid::new_v4()));
        let (mine_id, theirs_id) = (mine.id, theirs.id);
        store.insert_post(mine).await;
        store.insert_post(theirs).await;
        store
            .apply(&[
                MatchWrite::CreateLike(PostLike::new(candidate, mine_id)),
                MatchWrite::CreateLike(PostLike::new(candidate, theirs_id)),
            ])
            .await
            .unwrap();

        assert_eq!(
            store.liked_posts(candidate, recruiter).await.unwrap(),
            vec![mine_id]
        );
    }

    #[tokio::test]
    async fn duplicate_pair_is_a_conflict() {
        let store = MemoryStore::new();
        let (c, r) = (Uuid::new_v4(), Uuid::new_v4());
        store
            .apply(&[MatchWrite::CreateMatch(MatchRecord::pending(c, r, None))])
            .await
            .unwrap();
        let err = store
            .apply(&[MatchWrite::CreateMatch(MatchRecord::pending(c, r, None))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn saved_assessment_marks_user_assessed() {
        let store = MemoryStore::seeded().unwrap();
        let user = UserSummary {
            id: Uuid::new_v4(),
            name: "Casey".to_string(),
            role: UserRole::Candidate,
            has_assessment: false,
            intro_videos: 1,
        };
        let user_id = user.id;
        store.insert_user(user).await;

        let questions = store.questions().await.unwrap();
        let profiles = store.profiles().await.unwrap();
        let result = ThresholdClassifier::default()
            .classify(&[], &questions, &profiles)
            .unwrap();
        store
            .save_result(&AssessmentRecord::from_result(user_id, vec![], result))
            .await
            .unwrap();

        assert!(store.find_user(user_id).await.unwrap().unwrap().has_assessment);
        assert_eq!(
            store.latest_result(user_id).await.unwrap().unwrap().personality_type,
            "D"
        );
    }
}
