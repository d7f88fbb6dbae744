// src/services/ticket_service.rs

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{AuditRepository, TicketRepository, UserRepository};
use crate::models::audit::NewAuditEntry;
use crate::models::auth::{User, UserRole, UserSummary};
use crate::models::support::{
    CreateTicketPayload, SupportTicket, TicketResource, TicketStatus, UpdateTicketPayload,
};

const MODULE_SOPORTE: &str = "soporte";

#[derive(Clone)]
pub struct TicketService {
    pool: PgPool,
    ticket_repo: TicketRepository,
    user_repo: UserRepository,
    audit_repo: AuditRepository,
}

impl TicketService {
    pub fn new(
        pool: PgPool,
        ticket_repo: TicketRepository,
        user_repo: UserRepository,
        audit_repo: AuditRepository,
    ) -> Self {
        Self {
            pool,
            ticket_repo,
            user_repo,
            audit_repo,
        }
    }

    async fn reject(
        &self,
        tx: Transaction<'_, Postgres>,
        actor: &User,
        action: &str,
        reason: String,
    ) -> AppError {
        if let Err(e) = tx.rollback().await {
            tracing::warn!("Falha no rollback: {}", e);
        }
        self.audit_repo
            .insert_best_effort(&NewAuditEntry::rejected(
                Some(actor.id),
                MODULE_SOPORTE,
                action,
                &reason,
            ))
            .await;
        AppError::InvalidTransition(reason)
    }

    fn is_involved(actor: &User, ticket: &SupportTicket) -> bool {
        ticket.reporter_id == actor.id || ticket.technician_id == Some(actor.id)
    }

    // Qualquer usuário autenticado abre ticket em seu próprio nome.
    pub async fn create(
        &self,
        actor: &User,
        payload: &CreateTicketPayload,
    ) -> Result<TicketResource, AppError> {
        let mut tx = self.pool.begin().await?;
        let ticket = self
            .ticket_repo
            .create(
                &mut *tx,
                actor.id,
                &payload.category,
                &payload.description,
                payload.attachment_path.as_deref(),
            )
            .await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_SOPORTE,
                    "crear_ticket",
                    None,
                    Some(serde_json::to_value(&ticket)?),
                ),
            )
            .await?;
        tx.commit().await?;
        Ok(TicketResource::from(&ticket))
    }

    pub async fn list(&self, actor: &User) -> Result<Vec<TicketResource>, AppError> {
        let involving = match actor.role {
            UserRole::Admin => None,
            _ => Some(actor.id),
        };
        let tickets = self.ticket_repo.list(involving).await?;
        Ok(tickets.iter().map(TicketResource::from).collect())
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<TicketResource, AppError> {
        let ticket = self
            .ticket_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket no encontrado.".into()))?;

        if actor.role != UserRole::Admin && !Self::is_involved(actor, &ticket) {
            return Err(AppError::Forbidden("No tienes acceso a este ticket.".into()));
        }

        let mut resource = TicketResource::from(&ticket);
        if let Some(reporter) = self.user_repo.find_by_id(ticket.reporter_id).await? {
            resource = resource.with_reporter(UserSummary::from(&reporter));
        }
        if let Some(technician_id) = ticket.technician_id {
            if let Some(technician) = self.user_repo.find_by_id(technician_id).await? {
                resource = resource.with_technician(UserSummary::from(&technician));
            }
        }
        Ok(resource)
    }

    // Atribuição e avanço de estado: admin pode tudo; o técnico designado
    // pode mover o estado e a estimativa, mas não se substituir.
    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: &UpdateTicketPayload,
    ) -> Result<TicketResource, AppError> {
        if let Some(technician_id) = payload.technician_id {
            self.user_repo
                .find_by_id(technician_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Técnico no encontrado.".into()))?;
        }

        let mut tx = self.pool.begin().await?;
        let current = self
            .ticket_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket no encontrado.".into()))?;

        let is_assigned = current.technician_id == Some(actor.id);
        if actor.role != UserRole::Admin && !is_assigned {
            return Err(AppError::Forbidden(
                "Solo un administrador o el técnico designado pueden actualizar el ticket.".into(),
            ));
        }
        if actor.role != UserRole::Admin
            && payload.technician_id.is_some()
            && payload.technician_id != current.technician_id
        {
            return Err(AppError::Forbidden(
                "Solo un administrador puede reasignar el ticket.".into(),
            ));
        }

        let before = serde_json::to_value(&current)?;
        let mut next = current;

        if payload.technician_id.is_some() {
            next.technician_id = payload.technician_id;
        }
        if let Some(description) = &payload.description {
            next.description = description.clone();
        }
        if payload.estimated_resolution.is_some() {
            next.estimated_resolution = payload.estimated_resolution;
        }
        if let Some(new_status) = payload.status {
            if new_status != next.status {
                if !next.status.can_transition_to(new_status) {
                    return Err(self
                        .reject(
                            tx,
                            actor,
                            "actualizar_ticket",
                            format!(
                                "Un ticket no puede retroceder de estado ({} a {}).",
                                next.status.as_str(),
                                new_status.as_str()
                            ),
                        )
                        .await);
                }
                next.status = new_status;
                if new_status == TicketStatus::Resolved {
                    next.resolved_at = Some(Utc::now());
                }
            }
        }

        let updated = self.ticket_repo.update(&mut *tx, &next).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_SOPORTE,
                    "actualizar_ticket",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;
        Ok(TicketResource::from(&updated))
    }
}
