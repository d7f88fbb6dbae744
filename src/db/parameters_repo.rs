// src/db/parameters_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::common::error::AppError;
use crate::models::parameters::{SystemParameters, UpdateParametersPayload};

const PARAMETER_COLUMNS: &str = "id, academic_year, management_start, management_end, \
    report_deadline, max_reports_per_scholar, system_status, research_lines, updated_at";

// Linha única semeada pela migration; get/update, nunca insert.
#[derive(Clone)]
pub struct ParametersRepository {
    pool: PgPool,
}

impl ParametersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<SystemParameters, AppError> {
        let query = format!("SELECT {PARAMETER_COLUMNS} FROM system_parameters WHERE id = 1");
        let parameters = sqlx::query_as::<_, SystemParameters>(&query)
            .fetch_one(&self.pool)
            .await?;
        Ok(parameters)
    }

    // Leitura dentro de transação (gate de max_reports_per_scholar).
    pub async fn get_with<'e, E>(&self, executor: E) -> Result<SystemParameters, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {PARAMETER_COLUMNS} FROM system_parameters WHERE id = 1");
        let parameters = sqlx::query_as::<_, SystemParameters>(&query)
            .fetch_one(executor)
            .await?;
        Ok(parameters)
    }

    pub async fn update(
        &self,
        payload: &UpdateParametersPayload,
    ) -> Result<SystemParameters, AppError> {
        let query = format!(
            "UPDATE system_parameters SET
                academic_year = $1, management_start = $2, management_end = $3,
                report_deadline = $4, max_reports_per_scholar = $5,
                system_status = $6, research_lines = $7, updated_at = NOW()
             WHERE id = 1
             RETURNING {PARAMETER_COLUMNS}"
        );
        let research_lines = payload.research_lines.clone().unwrap_or_default();
        let updated = sqlx::query_as::<_, SystemParameters>(&query)
            .bind(&payload.academic_year)
            .bind(payload.management_start)
            .bind(payload.management_end)
            .bind(payload.report_deadline)
            .bind(payload.max_reports_per_scholar)
            .bind(payload.system_status)
            .bind(&research_lines)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }
}
