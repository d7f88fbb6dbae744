// src/models/evaluation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::scholarship::ScholarshipSummary;

// --- Enums ---

// A evaluación nasce Pendiente quando a beca fecha e vira Finalizada
// quando a nota final é registrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "evaluation_status")]
pub enum EvaluationStatus {
    Pendiente,
    Finalizada,
}

// --- Registros do banco ---

// No máximo uma por beca (unique em scholarship_id); registrar de novo
// substitui a existente em vez de duplicar.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    #[schema(example = 88)]
    pub final_grade: Option<i32>,
    pub final_remarks: Option<String>,
    pub final_status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordEvaluationPayload {
    #[validate(range(min = 0, max = 100, message = "La calificación final debe estar entre 0 y 100."))]
    #[schema(example = 88)]
    pub grade: i32,
    #[validate(length(min = 1, max = 2000, message = "Las observaciones finales son obligatorias."))]
    pub remarks: String,
}

// --- Recursos (forma de fio) ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResource {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_grade: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_remarks: Option<String>,
    pub final_status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship: Option<ScholarshipSummary>,
}

impl From<&Evaluation> for EvaluationResource {
    fn from(e: &Evaluation) -> Self {
        Self {
            id: e.id,
            scholarship_id: e.scholarship_id,
            final_grade: e.final_grade,
            final_remarks: e.final_remarks.clone(),
            final_status: e.final_status,
            created_at: e.created_at,
            updated_at: e.updated_at,
            scholarship: None,
        }
    }
}

impl EvaluationResource {
    pub fn with_scholarship(mut self, scholarship: ScholarshipSummary) -> Self {
        self.scholarship = Some(scholarship);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estado_final_serializa_com_os_nomes_em_espanhol() {
        assert_eq!(
            serde_json::to_string(&EvaluationStatus::Pendiente).unwrap(),
            "\"Pendiente\""
        );
        assert_eq!(
            serde_json::to_string(&EvaluationStatus::Finalizada).unwrap(),
            "\"Finalizada\""
        );
    }

    #[test]
    fn calificacion_fora_do_intervalo_falha_na_validacao() {
        let payload = RecordEvaluationPayload {
            grade: 140,
            remarks: "Trabajo sobresaliente.".into(),
        };
        assert!(payload.validate().is_err());

        let ok = RecordEvaluationPayload {
            grade: 88,
            remarks: "Trabajo sobresaliente.".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn recurso_em_camel_case_omite_opcionais_vazios() {
        let e = Evaluation {
            id: Uuid::new_v4(),
            scholarship_id: Uuid::new_v4(),
            final_grade: None,
            final_remarks: None,
            final_status: EvaluationStatus::Pendiente,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(EvaluationResource::from(&e)).unwrap();
        assert_eq!(json["finalStatus"], "Pendiente");
        assert!(json.get("finalGrade").is_none());
        assert!(json.get("scholarship").is_none());
        assert!(json.get("scholarshipId").is_some());
    }
}
