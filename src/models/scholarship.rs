// src/models/scholarship.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::auth::UserSummary;
use crate::models::evaluation::EvaluationResource;
use crate::models::report::{Report, ReportResource};

// --- Enums ---

// Estado da beca. Os valores no fio e no banco ficam em espanhol porque o
// contrato externo os fixa assim ("Activa", "En evaluación", "Archivada").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "scholarship_status")]
pub enum ScholarshipStatus {
    #[sqlx(rename = "Activa")]
    #[serde(rename = "Activa")]
    Activa,
    #[sqlx(rename = "En evaluación")]
    #[serde(rename = "En evaluación")]
    EnEvaluacion,
    #[sqlx(rename = "Archivada")]
    #[serde(rename = "Archivada")]
    Archivada,
}

impl ScholarshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScholarshipStatus::Activa => "Activa",
            ScholarshipStatus::EnEvaluacion => "En evaluación",
            ScholarshipStatus::Archivada => "Archivada",
        }
    }

    // Ciclo de vida avança só para frente: Activa → En evaluación → Archivada.
    // Não existe transição saindo de Archivada.
    pub fn can_transition_to(self, next: ScholarshipStatus) -> bool {
        matches!(
            (self, next),
            (ScholarshipStatus::Activa, ScholarshipStatus::EnEvaluacion)
                | (ScholarshipStatus::EnEvaluacion, ScholarshipStatus::Archivada)
        )
    }
}

impl std::fmt::Display for ScholarshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Registros do banco ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scholarship {
    pub id: Uuid,
    #[schema(example = "BAI-2025-005")]
    pub code: String,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: ScholarshipStatus,

    // Metadados de fechamento, gravados por closeScholarship.
    pub closed_by: Option<Uuid>,
    pub closed_at: Option<DateTime<Utc>>,

    // Invariante: archived = true ⇔ archived_at preenchido (CHECK no banco).
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scholarship {
    // Espelho em código do CHECK chk_scholarships_archive_pair.
    pub fn archive_pair_consistent(&self) -> bool {
        self.archived == self.archived_at.is_some()
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScholarshipPayload {
    #[validate(length(min = 3, max = 30, message = "El código debe tener entre 3 y 30 caracteres."))]
    #[schema(example = "BAI-2025-005")]
    pub code: String,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    // Opcional; quando ausente a beca nasce Activa.
    pub status: Option<ScholarshipStatus>,
}

impl CreateScholarshipPayload {
    pub fn validate_consistency(&self) -> Result<(), AppError> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(AppError::InvalidArgument(
                    "La fecha de fin no puede ser anterior a la fecha de inicio.".into(),
                ));
            }
        }
        if self.student_id == self.tutor_id {
            return Err(AppError::InvalidArgument(
                "El becario y el tutor deben ser usuarios distintos.".into(),
            ));
        }
        Ok(())
    }
}

// Atualização parcial. Um novo `status` passa pelas mesmas regras de
// transição dos endpoints dedicados (cerrar/archivar), com efeitos iguais.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScholarshipPayload {
    #[validate(length(min = 3, max = 30, message = "El código debe tener entre 3 y 30 caracteres."))]
    pub code: Option<String>,
    pub tutor_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ScholarshipStatus>,
}

// Corpo opcional de POST /api/becas/{id}/cerrar. Sem `closedBy` explícito,
// quem fecha é o usuário autenticado.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseScholarshipPayload {
    pub closed_by: Option<Uuid>,
}

// --- Recursos (forma de fio) ---

// Forma mínima de beca para aninhar em outros recursos (evaluaciones).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipSummary {
    pub id: Uuid,
    pub code: String,
    pub status: ScholarshipStatus,
}

impl From<&Scholarship> for ScholarshipSummary {
    fn from(s: &Scholarship) -> Self {
        Self {
            id: s.id,
            code: s.code.clone(),
            status: s.status,
        }
    }
}

// Forma externa de uma beca. Relações aparecem apenas quando o chamador as
// carregou; `averageGrade` só existe quando há reporte calificado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipResource {
    pub id: Uuid,
    pub code: String,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: ScholarshipStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutor: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<Vec<ReportResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>, example = 87.5)]
    pub average_grade: Option<Decimal>,
}

impl From<&Scholarship> for ScholarshipResource {
    fn from(s: &Scholarship) -> Self {
        Self {
            id: s.id,
            code: s.code.clone(),
            student_id: s.student_id,
            tutor_id: s.tutor_id,
            start_date: s.start_date,
            end_date: s.end_date,
            status: s.status,
            closed_by: s.closed_by,
            closed_at: s.closed_at,
            archived: s.archived,
            archived_at: s.archived_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
            student: None,
            tutor: None,
            reports: None,
            evaluation: None,
            average_grade: None,
        }
    }
}

impl ScholarshipResource {
    pub fn with_student(mut self, student: UserSummary) -> Self {
        self.student = Some(student);
        self
    }

    pub fn with_tutor(mut self, tutor: UserSummary) -> Self {
        self.tutor = Some(tutor);
        self
    }

    pub fn with_reports(mut self, reports: Vec<ReportResource>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationResource) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    pub fn with_average_grade(mut self, average: Option<Decimal>) -> Self {
        self.average_grade = average;
        self
    }
}

// Média das calificaciones dos reportes já calificados, com 2 decimais.
// Sem reporte calificado não há média (o campo some do JSON).
pub fn average_grade(reports: &[Report]) -> Option<Decimal> {
    let grades: Vec<i32> = reports.iter().filter_map(|r| r.grade).collect();
    if grades.is_empty() {
        return None;
    }
    let sum: i64 = grades.iter().map(|g| *g as i64).sum();
    let mean = Decimal::from(sum) / Decimal::from(grades.len() as i64);
    Some(mean.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::ReportStatus;

    fn report_with_grade(grade: Option<i32>) -> Report {
        Report {
            id: Uuid::new_v4(),
            scholarship_id: Uuid::new_v4(),
            report_number: 1,
            tutor_id: None,
            title: None,
            deadline_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            deadline_end: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            production_date: None,
            problem_description: None,
            activities: None,
            file_path: None,
            status: ReportStatus::Approved,
            grade,
            feedback: None,
            submitted_at: None,
            reviewed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn transicoes_validas_sao_apenas_as_duas_do_ciclo() {
        use ScholarshipStatus::*;
        assert!(Activa.can_transition_to(EnEvaluacion));
        assert!(EnEvaluacion.can_transition_to(Archivada));

        assert!(!Activa.can_transition_to(Archivada)); // não pode pular etapa
        assert!(!EnEvaluacion.can_transition_to(Activa)); // nem voltar
        assert!(!Archivada.can_transition_to(Activa)); // Archivada é terminal
        assert!(!Archivada.can_transition_to(EnEvaluacion));
        assert!(!Activa.can_transition_to(Activa));
    }

    #[test]
    fn estado_serializa_com_os_valores_fixados_pelo_contrato() {
        assert_eq!(
            serde_json::to_string(&ScholarshipStatus::EnEvaluacion).unwrap(),
            "\"En evaluación\""
        );
        assert_eq!(
            serde_json::to_string(&ScholarshipStatus::Activa).unwrap(),
            "\"Activa\""
        );
        let parsed: ScholarshipStatus = serde_json::from_str("\"Archivada\"").unwrap();
        assert_eq!(parsed, ScholarshipStatus::Archivada);
    }

    #[test]
    fn media_arredonda_a_dois_decimais_e_ignora_nao_calificados() {
        let reports = vec![
            report_with_grade(Some(80)),
            report_with_grade(Some(85)),
            report_with_grade(Some(92)),
            report_with_grade(None), // pendente, fora da média
        ];
        let avg = average_grade(&reports).unwrap();
        assert_eq!(avg.to_string(), "85.67");
    }

    #[test]
    fn media_ausente_sem_reportes_calificados() {
        assert!(average_grade(&[]).is_none());
        assert!(average_grade(&[report_with_grade(None)]).is_none());
    }

    #[test]
    fn datas_inconsistentes_sao_rejeitadas_na_criacao() {
        let payload = CreateScholarshipPayload {
            code: "BAI-2025-005".into(),
            student_id: Uuid::new_v4(),
            tutor_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            status: None,
        };
        assert!(payload.validate_consistency().is_err());
    }

    #[test]
    fn becario_e_tutor_nao_podem_ser_a_mesma_pessoa() {
        let same = Uuid::new_v4();
        let payload = CreateScholarshipPayload {
            code: "BAI-2025-006".into(),
            student_id: same,
            tutor_id: same,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            end_date: None,
            status: None,
        };
        assert!(payload.validate_consistency().is_err());
    }

    #[test]
    fn par_de_arquivamento_consistente() {
        let mut s = Scholarship {
            id: Uuid::new_v4(),
            code: "BAI-2025-001".into(),
            student_id: Uuid::new_v4(),
            tutor_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            end_date: None,
            status: ScholarshipStatus::Archivada,
            closed_by: None,
            closed_at: None,
            archived: true,
            archived_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(s.archive_pair_consistent());

        s.archived_at = None; // flag sem timestamp viola o invariante
        assert!(!s.archive_pair_consistent());
    }

    #[test]
    fn relacoes_nao_carregadas_somem_do_json() {
        let s = Scholarship {
            id: Uuid::new_v4(),
            code: "BAI-2025-005".into(),
            student_id: Uuid::new_v4(),
            tutor_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            end_date: None,
            status: ScholarshipStatus::Activa,
            closed_by: None,
            closed_at: None,
            archived: false,
            archived_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(ScholarshipResource::from(&s)).unwrap();
        assert_eq!(json["code"], "BAI-2025-005");
        assert_eq!(json["status"], "Activa");
        assert!(json.get("student").is_none());
        assert!(json.get("reports").is_none());
        assert!(json.get("averageGrade").is_none());
        assert!(json.get("endDate").is_none());
    }
}
