// src/models/parameters.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::error::AppError;

// --- Enums ---

// Estado global do sistema de gestión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "system_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Activo,
    Cerrado,
}

// --- Registros do banco ---

// Linha única (id = 1, garantido por CHECK); só existe caminho de update.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemParameters {
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub id: i32,
    #[schema(example = "2025")]
    pub academic_year: String,
    pub management_start: NaiveDate,
    pub management_end: NaiveDate,
    pub report_deadline: NaiveDate,
    #[schema(example = 4)]
    pub max_reports_per_scholar: i32,
    pub system_status: SystemStatus,
    pub research_lines: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

// PUT substitui a configuração inteira; research_lines ausente vira lista vazia.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParametersPayload {
    #[validate(length(min = 1, max = 12, message = "El año académico admite hasta 12 caracteres."))]
    #[schema(example = "2025")]
    pub academic_year: String,
    pub management_start: NaiveDate,
    pub management_end: NaiveDate,
    pub report_deadline: NaiveDate,
    #[validate(range(min = 0, message = "El máximo de reportes por becario no puede ser negativo."))]
    pub max_reports_per_scholar: i32,
    pub system_status: SystemStatus,
    pub research_lines: Option<Vec<String>>,
}

impl UpdateParametersPayload {
    pub fn validate_consistency(&self) -> Result<(), AppError> {
        if self.management_end < self.management_start {
            return Err(AppError::InvalidArgument(
                "El fin de gestión no puede ser anterior a su inicio.".into(),
            ));
        }
        if self.report_deadline < self.management_start {
            return Err(AppError::InvalidArgument(
                "La fecha límite de reportes no puede ser anterior al inicio de gestión.".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> UpdateParametersPayload {
        UpdateParametersPayload {
            academic_year: "2025".into(),
            management_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            management_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            report_deadline: NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
            max_reports_per_scholar: 4,
            system_status: SystemStatus::Activo,
            research_lines: None,
        }
    }

    #[test]
    fn configuracao_valida_passa() {
        let p = payload();
        assert!(p.validate().is_ok());
        assert!(p.validate_consistency().is_ok());
    }

    #[test]
    fn fim_de_gestao_antes_do_inicio_e_rejeitado() {
        let mut p = payload();
        p.management_end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(p.validate_consistency().is_err());
    }

    #[test]
    fn prazo_de_reportes_antes_da_gestao_e_rejeitado() {
        let mut p = payload();
        p.report_deadline = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(p.validate_consistency().is_err());
    }

    #[test]
    fn ano_academico_longo_demais_falha_na_validacao() {
        let mut p = payload();
        p.academic_year = "2025-2026-EXT".into(); // 13 caracteres
        assert!(p.validate().is_err());
    }

    #[test]
    fn estado_do_sistema_serializa_em_minusculas() {
        assert_eq!(
            serde_json::to_string(&SystemStatus::Cerrado).unwrap(),
            "\"cerrado\""
        );
    }
}
