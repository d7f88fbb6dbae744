// src/db/scholarship_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::scholarship::{Scholarship, ScholarshipStatus};

const SCHOLARSHIP_COLUMNS: &str = "id, code, student_id, tutor_id, start_date, end_date, \
    status, closed_by, closed_at, archived, archived_at, created_at, updated_at";

#[derive(Clone)]
pub struct ScholarshipRepository {
    pool: PgPool,
}

impl ScholarshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        code: &str,
        student_id: Uuid,
        tutor_id: Uuid,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        status: ScholarshipStatus,
    ) -> Result<Scholarship, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO scholarships (code, student_id, tutor_id, start_date, end_date, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SCHOLARSHIP_COLUMNS}"
        );
        let scholarship = sqlx::query_as::<_, Scholarship>(&query)
            .bind(code)
            .bind(student_id)
            .bind(tutor_id)
            .bind(start_date)
            .bind(end_date)
            .bind(status)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict(format!(
                            "Ya existe una beca con el código {code}."
                        ));
                    }
                }
                e.into()
            })?;
        Ok(scholarship)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Scholarship>, AppError> {
        let query = format!("SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships WHERE id = $1");
        let scholarship = sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(scholarship)
    }

    // Leitura dentro de uma transação já aberta, sem trava.
    pub async fn find_by_id_with<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Scholarship>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships WHERE id = $1");
        let scholarship = sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(scholarship)
    }

    // Variante com trava de linha, para as operações de ciclo de vida que
    // leem-decidem-gravam dentro de uma transação.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Scholarship>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query =
            format!("SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships WHERE id = $1 FOR UPDATE");
        let scholarship = sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(scholarship)
    }

    // Filtros opcionais via `$n IS NULL OR ...`: evita montar SQL dinâmico.
    pub async fn list(
        &self,
        tutor_id: Option<Uuid>,
        student_id: Option<Uuid>,
    ) -> Result<Vec<Scholarship>, AppError> {
        let query = format!(
            "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships
             WHERE ($1::uuid IS NULL OR tutor_id = $1)
               AND ($2::uuid IS NULL OR student_id = $2)
             ORDER BY created_at DESC"
        );
        let scholarships = sqlx::query_as::<_, Scholarship>(&query)
            .bind(tutor_id)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(scholarships)
    }

    // Grava todos os campos mutáveis da linha; quem decide o que muda é o
    // service, dentro da transação que fez o FOR UPDATE.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        scholarship: &Scholarship,
    ) -> Result<Scholarship, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE scholarships SET
                code = $2, tutor_id = $3, start_date = $4, end_date = $5, status = $6,
                closed_by = $7, closed_at = $8, archived = $9, archived_at = $10,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {SCHOLARSHIP_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Scholarship>(&query)
            .bind(scholarship.id)
            .bind(&scholarship.code)
            .bind(scholarship.tutor_id)
            .bind(scholarship.start_date)
            .bind(scholarship.end_date)
            .bind(scholarship.status)
            .bind(scholarship.closed_by)
            .bind(scholarship.closed_at)
            .bind(scholarship.archived)
            .bind(scholarship.archived_at)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict(
                            "Ya existe una beca con ese código.".into(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(updated)
    }

    // O ON DELETE CASCADE das migrations leva junto reportes e evaluación.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM scholarships WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Scholarship>, AppError> {
        let query = format!("SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships WHERE id = ANY($1)");
        let scholarships = sqlx::query_as::<_, Scholarship>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(scholarships)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scholarships")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
