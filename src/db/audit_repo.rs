// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::{AuditLog, NewAuditEntry};

const AUDIT_COLUMNS: &str =
    "id, user_id, action, module, outcome, before_data, after_data, created_at";

// Trilha de auditoria: este repositório só insere e lista. Não existe
// update nem delete aqui de propósito.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Genérico sobre o executor: dentro da transação da operação quando o
    // resultado é exito, direto no pool quando registra uma rejeição.
    pub async fn insert<'e, E>(&self, executor: E, entry: &NewAuditEntry) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO audit_logs (user_id, action, module, outcome, before_data, after_data)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.module)
        .bind(&entry.outcome)
        .bind(&entry.before_data)
        .bind(&entry.after_data)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Registro de rejeição fora de transação; falha aqui não pode derrubar
    // a resposta original, então o chamador decide o que logar.
    pub async fn insert_best_effort(&self, entry: &NewAuditEntry) {
        if let Err(e) = self.insert(&self.pool, entry).await {
            tracing::warn!("Falha ao registrar auditoría de rechazo: {}", e);
        }
    }

    pub async fn list(
        &self,
        module: Option<&str>,
        user_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<AuditLog>, AppError> {
        let query = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs
             WHERE ($1::text IS NULL OR module = $1)
               AND ($2::uuid IS NULL OR user_id = $2)
             ORDER BY created_at DESC
             LIMIT $3"
        );
        let logs = sqlx::query_as::<_, AuditLog>(&query)
            .bind(module)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }
}
