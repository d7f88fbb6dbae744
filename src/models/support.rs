// src/models/support.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::UserSummary;

// --- Enums ---

// Ticket de soporte: open → in_progress → resolved. Pode pular direto
// para resolved; nunca volta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }

    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress) | (Open, Resolved) | (InProgress, Resolved)
        )
    }
}

// --- Registros do banco ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub technician_id: Option<Uuid>,
    #[schema(example = "Acceso al sistema")]
    pub category: String,
    pub status: TicketStatus,
    pub description: String,
    pub attachment_path: Option<String>,
    pub estimated_resolution: Option<NaiveDate>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketPayload {
    #[validate(length(min = 1, max = 80, message = "La categoría es obligatoria."))]
    pub category: String,
    #[validate(length(min = 1, max = 4000, message = "La descripción es obligatoria."))]
    pub description: String,
    #[validate(length(max = 500, message = "La ruta del adjunto admite hasta 500 caracteres."))]
    pub attachment_path: Option<String>,
}

// Atualização pelo admin ou pelo técnico designado: atribuição, estado
// e estimativa de resolução.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketPayload {
    pub technician_id: Option<Uuid>,
    pub status: Option<TicketStatus>,
    pub estimated_resolution: Option<NaiveDate>,
    #[validate(length(min = 1, max = 4000, message = "La descripción no puede quedar vacía."))]
    pub description: Option<String>,
}

// --- Recursos (forma de fio) ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResource {
    pub id: Uuid,
    pub reporter_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<Uuid>,
    pub category: String,
    pub status: TicketStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_resolution: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician: Option<UserSummary>,
}

impl From<&SupportTicket> for TicketResource {
    fn from(t: &SupportTicket) -> Self {
        Self {
            id: t.id,
            reporter_id: t.reporter_id,
            technician_id: t.technician_id,
            category: t.category.clone(),
            status: t.status,
            description: t.description.clone(),
            attachment_path: t.attachment_path.clone(),
            estimated_resolution: t.estimated_resolution,
            resolved_at: t.resolved_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
            reporter: None,
            technician: None,
        }
    }
}

impl TicketResource {
    pub fn with_reporter(mut self, reporter: UserSummary) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn with_technician(mut self, technician: UserSummary) -> Self {
        self.technician = Some(technician);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_avanca_e_pode_pular_in_progress() {
        use TicketStatus::*;
        assert!(Open.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Resolved));
        assert!(Open.can_transition_to(Resolved)); // pulo permitido

        assert!(!Resolved.can_transition_to(Open)); // nunca volta
        assert!(!Resolved.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(Open));
    }

    #[test]
    fn status_serializa_em_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: TicketStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(parsed, TicketStatus::Resolved);
    }
}
