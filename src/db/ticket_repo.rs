// src/db/ticket_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::support::SupportTicket;

const TICKET_COLUMNS: &str = "id, reporter_id, technician_id, category, status, description, \
    attachment_path, estimated_resolution, resolved_at, created_at, updated_at";

#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        reporter_id: Uuid,
        category: &str,
        description: &str,
        attachment_path: Option<&str>,
    ) -> Result<SupportTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO support_tickets (reporter_id, category, description, attachment_path)
             VALUES ($1, $2, $3, $4)
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, SupportTicket>(&query)
            .bind(reporter_id)
            .bind(category)
            .bind(description)
            .bind(attachment_path)
            .fetch_one(executor)
            .await?;
        Ok(ticket)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SupportTicket>, AppError> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1");
        let ticket = sqlx::query_as::<_, SupportTicket>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<SupportTicket>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1 FOR UPDATE");
        let ticket = sqlx::query_as::<_, SupportTicket>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(ticket)
    }

    // Sem filtro: visão do admin. Com usuário: só os tickets em que ele é
    // o relator ou o técnico designado.
    pub async fn list(&self, involving: Option<Uuid>) -> Result<Vec<SupportTicket>, AppError> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets
             WHERE ($1::uuid IS NULL OR reporter_id = $1 OR technician_id = $1)
             ORDER BY created_at DESC"
        );
        let tickets = sqlx::query_as::<_, SupportTicket>(&query)
            .bind(involving)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        ticket: &SupportTicket,
    ) -> Result<SupportTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE support_tickets SET
                technician_id = $2, status = $3, description = $4,
                estimated_resolution = $5, resolved_at = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {TICKET_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, SupportTicket>(&query)
            .bind(ticket.id)
            .bind(ticket.technician_id)
            .bind(ticket.status)
            .bind(&ticket.description)
            .bind(ticket.estimated_resolution)
            .bind(ticket.resolved_at)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM support_tickets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
