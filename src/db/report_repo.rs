// src/db/report_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::report::{Report, ReportStatus};

const REPORT_COLUMNS: &str = "id, scholarship_id, report_number, tutor_id, title, \
    deadline_start, deadline_end, production_date, problem_description, activities, \
    file_path, status, grade, feedback, submitted_at, reviewed_at, created_at, updated_at";

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Abre o slot N+1. A unique (scholarship_id, report_number) é a última
    // linha de defesa contra corrida entre dois tutores.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        scholarship_id: Uuid,
        report_number: i32,
        tutor_id: Option<Uuid>,
        title: Option<&str>,
        deadline_start: NaiveDate,
        deadline_end: NaiveDate,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO reports (scholarship_id, report_number, tutor_id, title, deadline_start, deadline_end)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REPORT_COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(scholarship_id)
            .bind(report_number)
            .bind(tutor_id)
            .bind(title)
            .bind(deadline_start)
            .bind(deadline_end)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation()
                        && db_err.constraint() == Some("uq_reports_scholarship_number")
                    {
                        return AppError::Conflict(format!(
                            "El reporte número {report_number} ya existe para esta beca."
                        ));
                    }
                }
                e.into()
            })?;
        Ok(report)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Report>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1 FOR UPDATE");
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(report)
    }

    pub async fn list_for_scholarship(&self, scholarship_id: Uuid) -> Result<Vec<Report>, AppError> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE scholarship_id = $1
             ORDER BY report_number ASC"
        );
        let reports = sqlx::query_as::<_, Report>(&query)
            .bind(scholarship_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    // Lista com filtros opcionais: por beca, por tutor designado e por
    // becario dono da beca (escopo das listagens por papel).
    pub async fn list(
        &self,
        scholarship_id: Option<Uuid>,
        tutor_id: Option<Uuid>,
        student_id: Option<Uuid>,
    ) -> Result<Vec<Report>, AppError> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE ($1::uuid IS NULL OR scholarship_id = $1)
               AND ($2::uuid IS NULL OR tutor_id = $2)
               AND ($3::uuid IS NULL OR scholarship_id IN
                    (SELECT id FROM scholarships WHERE student_id = $3))
             ORDER BY created_at DESC"
        );
        let reports = sqlx::query_as::<_, Report>(&query)
            .bind(scholarship_id)
            .bind(tutor_id)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    // Gate de fechamento: a beca só fecha sem reporte pendente de aprovação.
    pub async fn count_unapproved<'e, E>(
        &self,
        executor: E,
        scholarship_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE scholarship_id = $1 AND status <> 'approved'",
        )
        .bind(scholarship_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn last_report<'e, E>(
        &self,
        executor: E,
        scholarship_id: Uuid,
    ) -> Result<Option<Report>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE scholarship_id = $1
             ORDER BY report_number DESC
             LIMIT 1"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(scholarship_id)
            .fetch_optional(executor)
            .await?;
        Ok(report)
    }

    pub async fn update<'e, E>(&self, executor: E, report: &Report) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE reports SET
                tutor_id = $2, title = $3, deadline_start = $4, deadline_end = $5,
                production_date = $6, problem_description = $7, activities = $8,
                file_path = $9, status = $10, grade = $11, feedback = $12,
                submitted_at = $13, reviewed_at = $14, updated_at = NOW()
             WHERE id = $1
             RETURNING {REPORT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Report>(&query)
            .bind(report.id)
            .bind(report.tutor_id)
            .bind(&report.title)
            .bind(report.deadline_start)
            .bind(report.deadline_end)
            .bind(report.production_date)
            .bind(&report.problem_description)
            .bind(&report.activities)
            .bind(&report.file_path)
            .bind(report.status)
            .bind(report.grade)
            .bind(&report.feedback)
            .bind(report.submitted_at)
            .bind(report.reviewed_at)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    // Troca de tutor da beca: reportes ainda não aprovados passam a apontar
    // para o novo tutor; os aprovados preservam quem revisou.
    pub async fn reassign_tutor<'e, E>(
        &self,
        executor: E,
        scholarship_id: Uuid,
        new_tutor_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE reports SET tutor_id = $2, updated_at = NOW()
             WHERE scholarship_id = $1 AND status <> 'approved'",
        )
        .bind(scholarship_id)
        .bind(new_tutor_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // Contagem por estado para o resumo de métricas.
    pub async fn counts_by_status(&self) -> Result<Vec<(ReportStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (ReportStatus, i64)>(
            "SELECT status, COUNT(*) FROM reports GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
