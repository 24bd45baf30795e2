use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::matching::model::{JobPost, MatchRecord, PostLike, UserRole, UserSummary};
use crate::matching::store::{MatchQuery, MatchStore, StoreError};
use crate::matching::transitions::MatchWrite;
use crate::models::matching::{MatchRow, PostLikeRow, PostRow, UserSummaryRow};

const MATCH_COLUMNS: &str = "id, candidate_id, recruiter_id, post_id, accepted, created_at";

/// PostgreSQL-backed [`MatchStore`]. `apply` runs in one transaction.
#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserSummary>, StoreError> {
        let row: Option<UserSummaryRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.name, u.role,
                   EXISTS (SELECT 1 FROM assessments a WHERE a.user_id = u.id) AS has_assessment,
                   (SELECT COUNT(*) FROM match_media m
                     WHERE m.user_id = u.id AND m.kind = 'INTRO_VIDEO') AS intro_videos
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserSummary::try_from).transpose()
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<JobPost>, StoreError> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT id, owner_id, post_type, likes, match_count FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobPost::try_from).transpose()
    }

    async fn has_job_post(&self, owner_id: Uuid) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE owner_id = $1 AND post_type = 'JOB')",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_match(
        &self,
        candidate_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Option<MatchRecord>, StoreError> {
        let row: Option<MatchRow> = sqlx::query_as(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE candidate_id = $1 AND recruiter_id = $2"
        ))
        .bind(candidate_id)
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MatchRecord::from))
    }

    async fn find_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<PostLike>, StoreError> {
        let row: Option<PostLikeRow> = sqlx::query_as(
            "SELECT id, user_id, post_id, created_at FROM post_likes WHERE user_id = $1 AND post_id = $2",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostLike::from))
    }

    async fn liked_posts(
        &self,
        candidate_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        Ok(sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT l.post_id
            FROM post_likes l
            JOIN posts p ON p.id = l.post_id
            WHERE l.user_id = $1 AND p.owner_id = $2 AND p.post_type = 'JOB'
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(candidate_id)
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn apply(&self, writes: &[MatchWrite]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for write in writes {
            let affected = match write {
                MatchWrite::CreateMatch(m) => sqlx::query(
                    r#"
                    INSERT INTO matches (id, candidate_id, recruiter_id, post_id, accepted, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(m.id)
                .bind(m.candidate_id)
                .bind(m.recruiter_id)
                .bind(m.post_id)
                .bind(m.accepted)
                .bind(m.created_at)
                .execute(&mut *tx)
                .await?
                .rows_affected(),

                MatchWrite::UpdateMatch {
                    match_id,
                    accepted,
                    post_id,
                } => sqlx::query("UPDATE matches SET accepted = $2, post_id = $3 WHERE id = $1")
                    .bind(match_id)
                    .bind(accepted)
                    .bind(post_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected(),

                MatchWrite::DeleteMatch { match_id } => {
                    sqlx::query("DELETE FROM matches WHERE id = $1")
                        .bind(match_id)
                        .execute(&mut *tx)
                        .await?
                        .rows_affected()
                }

                MatchWrite::CreateLike(like) => sqlx::query(
                    "INSERT INTO post_likes (id, user_id, post_id, created_at) VALUES ($1, $2, $3, $4)",
                )
                .bind(like.id)
                .bind(like.user_id)
                .bind(like.post_id)
                .bind(like.created_at)
                .execute(&mut *tx)
                .await?
                .rows_affected(),

                MatchWrite::DeleteLike { user_id, post_id } => {
                    sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
                        .bind(user_id)
                        .bind(post_id)
                        .execute(&mut *tx)
                        .await?
                        .rows_affected()
                }

                MatchWrite::AdjustPostCounters {
                    post_id,
                    likes,
                    match_count,
                } => sqlx::query(
                    r#"
                    UPDATE posts
                    SET likes = likes + $2,
                        match_count = match_count + $3
                    WHERE id = $1
                    "#,
                )
                .bind(post_id)
                .bind(likes)
                .bind(match_count)
                .execute(&mut *tx)
                .await
                .map_err(|e| counter_error(e, *post_id))?
                .rows_affected(),
            };

            // Another writer got there first; dropping `tx` rolls everything back.
            if affected == 0 {
                return Err(StoreError::NotFound(write_target(write).to_string()));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn mutual_matches(&self, query: MatchQuery) -> Result<Vec<MatchRecord>, StoreError> {
        let rows: Vec<MatchRow> = match query {
            MatchQuery::ForUser {
                user_id,
                role,
                limit,
                offset,
            } => {
                let column = match role {
                    UserRole::Candidate => "candidate_id",
                    UserRole::Recruiter => "recruiter_id",
                };
                sqlx::query_as(&format!(
                    r#"
                    SELECT {MATCH_COLUMNS} FROM matches
                    WHERE {column} = $1 AND accepted AND post_id IS NOT NULL
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            MatchQuery::ForPost { post_id } => {
                sqlx::query_as(&format!(
                    r#"
                    SELECT {MATCH_COLUMNS} FROM matches
                    WHERE post_id = $1 AND accepted
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }
}

/// The `CHECK (likes >= 0)` constraints reject counter drift instead of hiding it.
fn counter_error(e: sqlx::Error, post_id: Uuid) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_check_violation() => {
            StoreError::NegativeCounter(post_id)
        }
        _ => StoreError::from(e),
    }
}

fn write_target(write: &MatchWrite) -> &'static str {
    match write {
        MatchWrite::CreateMatch(_) | MatchWrite::UpdateMatch { .. } | MatchWrite::DeleteMatch { .. } => {
            "match"
        }
        MatchWrite::CreateLike(_) | MatchWrite::DeleteLike { .. } => "like",
        MatchWrite::AdjustPostCounters { .. } => "post",
    }
}
