use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::assessment::catalog::{AssessmentCatalog, AssessmentRecord};
use crate::assessment::error::CatalogError;
use crate::assessment::model::{PersonalityProfile, Question};
use crate::assessment::seed;
use crate::models::assessment::{AssessmentRow, ProfileRow, QuestionRow};

/// PostgreSQL-backed [`AssessmentCatalog`].
#[derive(Clone)]
pub struct PgAssessmentCatalog {
    pool: PgPool,
}

impl PgAssessmentCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the bundled question bank and profiles into empty tables.
    pub async fn seed_if_empty(&self) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await?;

        let question_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessment_questions")
            .fetch_one(&mut *tx)
            .await?;
        if question_count == 0 {
            let questions = seed::questions()?;
            for q in &questions {
                sqlx::query(
                    r#"
                    INSERT INTO assessment_questions (id, position, text, trait_code, reverse, answers)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(q.id)
                .bind(q.order)
                .bind(&q.text)
                .bind(&q.trait_label)
                .bind(q.reverse)
                .bind(Json(&q.answers))
                .execute(&mut *tx)
                .await?;
            }
            info!("Seeded {} assessment questions", questions.len());
        }

        let profile_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM personality_profiles")
            .fetch_one(&mut *tx)
            .await?;
        if profile_count == 0 {
            let profiles = seed::profiles()?;
            for (position, p) in profiles.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO personality_profiles
                        (id, position, key, title, detail, strengths, core_values,
                         recommended_jobs, company_culture, traits)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                )
                .bind(p.id)
                .bind(position as i32)
                .bind(&p.key)
                .bind(&p.title)
                .bind(&p.detail)
                .bind(&p.strengths)
                .bind(&p.values)
                .bind(&p.recommended_jobs)
                .bind(&p.company_culture)
                .bind(Json(&p.traits))
                .execute(&mut *tx)
                .await?;
            }
            info!("Seeded {} personality profiles", profiles.len());
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AssessmentCatalog for PgAssessmentCatalog {
    async fn questions(&self) -> Result<Vec<Question>, CatalogError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            "SELECT id, position, text, trait_code, reverse, answers FROM assessment_questions ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn profiles(&self) -> Result<Vec<PersonalityProfile>, CatalogError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, key, title, detail, strengths, core_values, recommended_jobs,
                   company_culture, traits
            FROM personality_profiles
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PersonalityProfile::from).collect())
    }

    async fn save_result(&self, record: &AssessmentRecord) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await?;
        let profile_id: Option<Uuid> = record.profile.as_ref().map(|p| p.id);

        sqlx::query(
            r#"
            INSERT INTO assessments
                (id, user_id, personality_type, strategy, scale, scores, profile_id,
                 responses, diagnostics, created_at)
            VALUES ($1, $2, $3, $4, $5, $6,
                    (SELECT id FROM personality_profiles WHERE id = $7),
                    $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                id = EXCLUDED.id,
                personality_type = EXCLUDED.personality_type,
                strategy = EXCLUDED.strategy,
                scale = EXCLUDED.scale,
                scores = EXCLUDED.scores,
                profile_id = EXCLUDED.profile_id,
                responses = EXCLUDED.responses,
                diagnostics = EXCLUDED.diagnostics,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.personality_type)
        .bind(Json(record.strategy))
        .bind(Json(record.scale))
        .bind(Json(record.scores))
        .bind(profile_id)
        .bind(Json(&record.responses))
        .bind(Json(&record.diagnostics))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET personality_type = $2, personality_id = $3 WHERE id = $1")
            .bind(record.user_id)
            .bind(&record.personality_type)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn latest_result(&self, user_id: Uuid) -> Result<Option<AssessmentRecord>, CatalogError> {
        let row: Option<AssessmentRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.user_id, a.personality_type, a.strategy, a.scale, a.scores,
                   CASE WHEN p.id IS NULL THEN NULL ELSE jsonb_build_object(
                       'id', p.id, 'key', p.key, 'title', p.title, 'detail', p.detail,
                       'strengths', p.strengths, 'values', p.core_values,
                       'recommended_jobs', p.recommended_jobs,
                       'company_culture', p.company_culture, 'traits', p.traits
                   ) END AS profile,
                   a.responses, a.diagnostics, a.created_at
            FROM assessments a
            LEFT JOIN personality_profiles p ON p.id = a.profile_id
            WHERE a.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AssessmentRecord::from))
    }
}
