// src/db/evaluation_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::evaluation::Evaluation;

const EVALUATION_COLUMNS: &str =
    "id, scholarship_id, final_grade, final_remarks, final_status, created_at, updated_at";

#[derive(Clone)]
pub struct EvaluationRepository {
    pool: PgPool,
}

impl EvaluationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Semeia a evaluación Pendiente no fechamento da beca. Idempotente:
    // se já existe, não toca nela.
    pub async fn seed_pending<'e, E>(
        &self,
        executor: E,
        scholarship_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO evaluations (scholarship_id)
             VALUES ($1)
             ON CONFLICT (scholarship_id) DO NOTHING",
        )
        .bind(scholarship_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Registro idempotente-por-substituição: a unique em scholarship_id
    // transforma o segundo envio em atualização da mesma linha.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        scholarship_id: Uuid,
        final_grade: i32,
        final_remarks: &str,
    ) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO evaluations (scholarship_id, final_grade, final_remarks, final_status)
             VALUES ($1, $2, $3, 'Finalizada')
             ON CONFLICT (scholarship_id) DO UPDATE SET
                final_grade = EXCLUDED.final_grade,
                final_remarks = EXCLUDED.final_remarks,
                final_status = 'Finalizada',
                updated_at = NOW()
             RETURNING {EVALUATION_COLUMNS}"
        );
        let evaluation = sqlx::query_as::<_, Evaluation>(&query)
            .bind(scholarship_id)
            .bind(final_grade)
            .bind(final_remarks)
            .fetch_one(executor)
            .await?;
        Ok(evaluation)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Evaluation>, AppError> {
        let query = format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE id = $1");
        let evaluation = sqlx::query_as::<_, Evaluation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(evaluation)
    }

    pub async fn find_by_scholarship(
        &self,
        scholarship_id: Uuid,
    ) -> Result<Option<Evaluation>, AppError> {
        let query =
            format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE scholarship_id = $1");
        let evaluation = sqlx::query_as::<_, Evaluation>(&query)
            .bind(scholarship_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(evaluation)
    }

    pub async fn list(&self) -> Result<Vec<Evaluation>, AppError> {
        let query = format!(
            "SELECT {EVALUATION_COLUMNS} FROM evaluations ORDER BY created_at DESC"
        );
        let evaluations = sqlx::query_as::<_, Evaluation>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(evaluations)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM evaluations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
