// src/models/report.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::auth::UserSummary;

// --- Enums ---

// Workflow do reporte, sequencial por report_number:
// pending → submitted → (changes_requested → submitted)* → approved.
// Só um reporte approved libera a abertura do próximo número.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Submitted,
    ChangesRequested,
    Approved,
}

impl ReportStatus {
    // Rótulo em espanhol para telas e para o resumo de métricas.
    pub fn display_label(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pendiente",
            ReportStatus::Submitted => "Enviado",
            ReportStatus::ChangesRequested => "Cambios solicitados",
            ReportStatus::Approved => "Aprobado",
        }
    }

    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Pending, Submitted)
                | (ChangesRequested, Submitted)
                | (Submitted, Approved)
                | (Submitted, ChangesRequested)
        )
    }
}

// Decisão do tutor ao revisar um reporte entregado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Aprobar,
    SolicitarCambios,
}

// --- Registros do banco ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    // Começa em 1 e avança um a um; único por beca.
    pub report_number: i32,
    pub tutor_id: Option<Uuid>,
    pub title: Option<String>,

    // Janela definida pelo tutor ao abrir o slot.
    pub deadline_start: NaiveDate,
    pub deadline_end: NaiveDate,

    // Conteúdo preenchido pelo becario na entrega.
    pub production_date: Option<NaiveDate>,
    pub problem_description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub activities: Option<serde_json::Value>,
    pub file_path: Option<String>,

    pub status: ReportStatus,
    #[schema(example = 85)]
    pub grade: Option<i32>,
    pub feedback: Option<String>,

    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

// Abertura do próximo slot de reporte pelo tutor (ou admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenReportPayload {
    pub deadline_start: NaiveDate,
    pub deadline_end: NaiveDate,
    #[validate(length(max = 200, message = "El título admite hasta 200 caracteres."))]
    pub title: Option<String>,
}

impl OpenReportPayload {
    pub fn validate_consistency(&self) -> Result<(), AppError> {
        if self.deadline_end < self.deadline_start {
            return Err(AppError::InvalidArgument(
                "La fecha límite de fin no puede ser anterior a la de inicio.".into(),
            ));
        }
        Ok(())
    }
}

// Entrega do becario: move pending/changes_requested → submitted.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportPayload {
    pub production_date: NaiveDate,
    #[validate(length(min = 1, max = 4000, message = "La descripción del problema es obligatoria."))]
    pub problem_description: String,
    #[schema(value_type = Option<Object>)]
    pub activities: Option<serde_json::Value>,
    #[validate(length(max = 500, message = "La ruta del archivo admite hasta 500 caracteres."))]
    pub file_path: Option<String>,
    #[validate(length(max = 200, message = "El título admite hasta 200 caracteres."))]
    pub title: Option<String>,
}

// Revisão do tutor: aprobar exige calificación; solicitar_cambios exige feedback.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportPayload {
    pub decision: ReviewDecision,
    #[validate(range(min = 0, max = 100, message = "La calificación debe estar entre 0 y 100."))]
    pub grade: Option<i32>,
    #[validate(length(max = 2000, message = "La retroalimentación admite hasta 2000 caracteres."))]
    pub feedback: Option<String>,
}

impl ReviewReportPayload {
    pub fn validate_consistency(&self) -> Result<(), AppError> {
        match self.decision {
            ReviewDecision::Aprobar if self.grade.is_none() => Err(AppError::InvalidArgument(
                "Aprobar un reporte requiere una calificación.".into(),
            )),
            ReviewDecision::SolicitarCambios
                if self.feedback.as_deref().map_or(true, |f| f.trim().is_empty()) =>
            {
                Err(AppError::InvalidArgument(
                    "Solicitar cambios requiere retroalimentación para el becario.".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

// --- Recursos (forma de fio) ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResource {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    pub report_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub deadline_start: NaiveDate,
    pub deadline_end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub activities: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub status: ReportStatus,
    #[schema(example = "Pendiente")]
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutor: Option<UserSummary>,
}

impl From<&Report> for ReportResource {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id,
            scholarship_id: r.scholarship_id,
            report_number: r.report_number,
            title: r.title.clone(),
            deadline_start: r.deadline_start,
            deadline_end: r.deadline_end,
            production_date: r.production_date,
            problem_description: r.problem_description.clone(),
            activities: r.activities.clone(),
            file_path: r.file_path.clone(),
            status: r.status,
            status_label: r.status.display_label().to_string(),
            grade: r.grade,
            feedback: r.feedback.clone(),
            submitted_at: r.submitted_at,
            reviewed_at: r.reviewed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
            tutor: None,
        }
    }
}

impl ReportResource {
    pub fn with_tutor(mut self, tutor: UserSummary) -> Self {
        self.tutor = Some(tutor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_avanca_na_ordem_e_permite_o_laco_de_cambios() {
        use ReportStatus::*;
        assert!(Pending.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(ChangesRequested));
        assert!(ChangesRequested.can_transition_to(Submitted)); // reentrega

        assert!(!Pending.can_transition_to(Approved)); // não pula a entrega
        assert!(!Approved.can_transition_to(Submitted)); // approved é terminal
        assert!(!Approved.can_transition_to(ChangesRequested));
        assert!(!ChangesRequested.can_transition_to(Approved));
    }

    #[test]
    fn status_serializa_em_snake_case_e_rotula_em_espanhol() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::ChangesRequested).unwrap(),
            "\"changes_requested\""
        );
        assert_eq!(ReportStatus::Pending.display_label(), "Pendiente");
        assert_eq!(ReportStatus::Submitted.display_label(), "Enviado");
        assert_eq!(
            ReportStatus::ChangesRequested.display_label(),
            "Cambios solicitados"
        );
        assert_eq!(ReportStatus::Approved.display_label(), "Aprobado");
    }

    #[test]
    fn aprovar_sem_calificacion_e_rejeitado() {
        let payload = ReviewReportPayload {
            decision: ReviewDecision::Aprobar,
            grade: None,
            feedback: None,
        };
        assert!(payload.validate_consistency().is_err());

        let ok = ReviewReportPayload {
            decision: ReviewDecision::Aprobar,
            grade: Some(90),
            feedback: None,
        };
        assert!(ok.validate_consistency().is_ok());
    }

    #[test]
    fn solicitar_cambios_exige_feedback_nao_vazio() {
        let vazio = ReviewReportPayload {
            decision: ReviewDecision::SolicitarCambios,
            grade: None,
            feedback: Some("   ".into()),
        };
        assert!(vazio.validate_consistency().is_err());

        let ok = ReviewReportPayload {
            decision: ReviewDecision::SolicitarCambios,
            grade: None,
            feedback: Some("Falta detallar la metodología.".into()),
        };
        assert!(ok.validate_consistency().is_ok());
    }

    #[test]
    fn janela_de_prazo_invertida_e_rejeitada() {
        let payload = OpenReportPayload {
            deadline_start: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            deadline_end: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            title: None,
        };
        assert!(payload.validate_consistency().is_err());
    }

    #[test]
    fn decisao_de_revisao_desserializa_em_snake_case() {
        let d: ReviewDecision = serde_json::from_str("\"solicitar_cambios\"").unwrap();
        assert_eq!(d, ReviewDecision::SolicitarCambios);
        let d: ReviewDecision = serde_json::from_str("\"aprobar\"").unwrap();
        assert_eq!(d, ReviewDecision::Aprobar);
    }
}
