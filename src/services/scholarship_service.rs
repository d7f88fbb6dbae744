// src/services/scholarship_service.rs
//
// O coração do sistema: as transições de beca, reporte e evaluación.
// Cada operação de escrita roda numa transação; a trava FOR UPDATE na
// beca serializa as decisões de ciclo de vida concorrentes.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{
    AuditRepository, EvaluationRepository, ParametersRepository, ReportRepository,
    ScholarshipRepository, UserRepository,
};
use crate::models::audit::NewAuditEntry;
use crate::models::auth::{User, UserRole, UserSummary};
use crate::models::evaluation::{EvaluationResource, RecordEvaluationPayload};
use crate::models::report::{
    OpenReportPayload, ReportResource, ReportStatus, ReviewDecision, ReviewReportPayload,
    SubmitReportPayload,
};
use crate::models::scholarship::{
    average_grade, CreateScholarshipPayload, Scholarship, ScholarshipResource,
    ScholarshipStatus, ScholarshipSummary, UpdateScholarshipPayload,
};

const MODULE_BECAS: &str = "becas";
const MODULE_REPORTES: &str = "reportes";
const MODULE_EVALUACIONES: &str = "evaluaciones";

#[derive(Clone)]
pub struct ScholarshipService {
    pool: PgPool,
    scholarship_repo: ScholarshipRepository,
    report_repo: ReportRepository,
    evaluation_repo: EvaluationRepository,
    user_repo: UserRepository,
    parameters_repo: ParametersRepository,
    audit_repo: AuditRepository,
}

impl ScholarshipService {
    pub fn new(
        pool: PgPool,
        scholarship_repo: ScholarshipRepository,
        report_repo: ReportRepository,
        evaluation_repo: EvaluationRepository,
        user_repo: UserRepository,
        parameters_repo: ParametersRepository,
        audit_repo: AuditRepository,
    ) -> Self {
        Self {
            pool,
            scholarship_repo,
            report_repo,
            evaluation_repo,
            user_repo,
            parameters_repo,
            audit_repo,
        }
    }

    // Transição recusada: desfaz a transação, registra a rejeição na
    // auditoria (fora dela, best-effort) e devolve o erro de validação.
    async fn reject(
        &self,
        tx: Transaction<'_, Postgres>,
        actor: &User,
        module: &str,
        action: &str,
        reason: String,
    ) -> AppError {
        if let Err(e) = tx.rollback().await {
            tracing::warn!("Falha no rollback: {}", e);
        }
        self.audit_repo
            .insert_best_effort(&NewAuditEntry::rejected(Some(actor.id), module, action, &reason))
            .await;
        AppError::InvalidTransition(reason)
    }

    fn ensure_can_view(&self, actor: &User, scholarship: &Scholarship) -> Result<(), AppError> {
        let allowed = match actor.role {
            UserRole::Admin | UserRole::Director => true,
            UserRole::Tutor => scholarship.tutor_id == actor.id,
            UserRole::Becario => scholarship.student_id == actor.id,
        };
        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden("No tienes acceso a esta beca.".into()))
        }
    }

    // --- Becas ---

    pub async fn create(
        &self,
        actor: &User,
        payload: &CreateScholarshipPayload,
    ) -> Result<ScholarshipResource, AppError> {
        let status = payload.status.unwrap_or(ScholarshipStatus::Activa);
        if status != ScholarshipStatus::Activa {
            return Err(AppError::InvalidTransition(
                "Una beca nueva debe iniciar en estado Activa.".into(),
            ));
        }

        let student = self
            .user_repo
            .find_by_id(payload.student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Becario no encontrado.".into()))?;
        if student.role != UserRole::Becario {
            return Err(AppError::InvalidArgument(
                "El estudiante de una beca debe tener rol becario.".into(),
            ));
        }

        let tutor = self
            .user_repo
            .find_by_id(payload.tutor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tutor no encontrado.".into()))?;
        if tutor.role != UserRole::Tutor {
            return Err(AppError::InvalidArgument(
                "El tutor de una beca debe tener rol tutor.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let scholarship = self
            .scholarship_repo
            .create(
                &mut *tx,
                &payload.code,
                payload.student_id,
                payload.tutor_id,
                payload.start_date,
                payload.end_date,
                status,
            )
            .await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_BECAS,
                    "crear_beca",
                    None,
                    Some(serde_json::to_value(&scholarship)?),
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("Beca {} creada por {}", scholarship.code, actor.username);
        Ok(ScholarshipResource::from(&scholarship))
    }

    pub async fn list(
        &self,
        actor: &User,
        tutor_filter: Option<Uuid>,
    ) -> Result<Vec<ScholarshipResource>, AppError> {
        // Tutores e becarios só enxergam as próprias becas; o filtro por
        // tutor fica disponível para admin e director.
        let (tutor_id, student_id) = match actor.role {
            UserRole::Admin | UserRole::Director => (tutor_filter, None),
            UserRole::Tutor => (Some(actor.id), None),
            UserRole::Becario => (None, Some(actor.id)),
        };
        let scholarships = self.scholarship_repo.list(tutor_id, student_id).await?;
        Ok(scholarships.iter().map(ScholarshipResource::from).collect())
    }

    // Detalhe com as relações carregadas explicitamente: estudante, tutor,
    // reportes, evaluación e a média calculada.
    pub async fn get_detail(&self, actor: &User, id: Uuid) -> Result<ScholarshipResource, AppError> {
        let scholarship = self
            .scholarship_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;
        self.ensure_can_view(actor, &scholarship)?;

        let reports = self.report_repo.list_for_scholarship(id).await?;
        let evaluation = self.evaluation_repo.find_by_scholarship(id).await?;
        let users = self
            .user_repo
            .find_many(&[scholarship.student_id, scholarship.tutor_id])
            .await?;

        let mut resource = ScholarshipResource::from(&scholarship)
            .with_reports(reports.iter().map(ReportResource::from).collect())
            .with_average_grade(average_grade(&reports));

        if let Some(student) = users.iter().find(|u| u.id == scholarship.student_id) {
            resource = resource.with_student(UserSummary::from(student));
        }
        if let Some(tutor) = users.iter().find(|u| u.id == scholarship.tutor_id) {
            resource = resource.with_tutor(UserSummary::from(tutor));
        }
        if let Some(evaluation) = &evaluation {
            resource = resource.with_evaluation(EvaluationResource::from(evaluation));
        }
        Ok(resource)
    }

    // Atualização geral. Um novo `status` no corpo passa pelas MESMAS
    // regras e efeitos de cerrar/archivar; não existe atalho por aqui.
    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: &UpdateScholarshipPayload,
    ) -> Result<ScholarshipResource, AppError> {
        let mut tx = self.pool.begin().await?;
        let current = self
            .scholarship_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        if current.archived {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_BECAS,
                    "actualizar_beca",
                    "Una beca archivada es de solo lectura.".to_string(),
                )
                .await);
        }

        let before = serde_json::to_value(&current)?;
        let mut next = current.clone();

        if let Some(code) = &payload.code {
            next.code = code.clone();
        }
        if let Some(start) = payload.start_date {
            next.start_date = start;
        }
        if let Some(end) = payload.end_date {
            next.end_date = Some(end);
        }
        if let Some(end) = next.end_date {
            if end < next.start_date {
                return Err(AppError::InvalidArgument(
                    "La fecha de fin no puede ser anterior a la fecha de inicio.".into(),
                ));
            }
        }

        let mut tutor_changed = false;
        if let Some(new_tutor) = payload.tutor_id {
            if new_tutor != next.tutor_id {
                let tutor = self
                    .user_repo
                    .find_by_id(new_tutor)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Tutor no encontrado.".into()))?;
                if tutor.role != UserRole::Tutor {
                    return Err(AppError::InvalidArgument(
                        "El tutor de una beca debe tener rol tutor.".into(),
                    ));
                }
                next.tutor_id = new_tutor;
                tutor_changed = true;
            }
        }

        if let Some(new_status) = payload.status {
            if new_status != next.status {
                if !next.status.can_transition_to(new_status) {
                    return Err(self
                        .reject(
                            tx,
                            actor,
                            MODULE_BECAS,
                            "actualizar_beca",
                            format!(
                                "Transición de {} a {} no permitida.",
                                next.status, new_status
                            ),
                        )
                        .await);
                }
                match new_status {
                    ScholarshipStatus::EnEvaluacion => {
                        let unapproved =
                            self.report_repo.count_unapproved(&mut *tx, id).await?;
                        if unapproved > 0 {
                            return Err(self
                                .reject(
                                    tx,
                                    actor,
                                    MODULE_BECAS,
                                    "cerrar_beca",
                                    format!(
                                        "La beca tiene {unapproved} reporte(s) sin aprobar."
                                    ),
                                )
                                .await);
                        }
                        next.status = ScholarshipStatus::EnEvaluacion;
                        next.closed_by = Some(actor.id);
                        next.closed_at = Some(Utc::now());
                    }
                    ScholarshipStatus::Archivada => {
                        next.status = ScholarshipStatus::Archivada;
                        next.archived = true;
                        next.archived_at = Some(Utc::now());
                    }
                    // can_transition_to já barrou qualquer volta para Activa
                    ScholarshipStatus::Activa => {}
                }
            }
        }

        let updated = self.scholarship_repo.update(&mut *tx, &next).await?;

        // O fechamento via PUT também semeia a evaluación pendiente.
        if current.status == ScholarshipStatus::Activa
            && updated.status == ScholarshipStatus::EnEvaluacion
        {
            self.evaluation_repo.seed_pending(&mut *tx, id).await?;
        }
        if tutor_changed {
            self.report_repo
                .reassign_tutor(&mut *tx, id, next.tutor_id)
                .await?;
        }

        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_BECAS,
                    "actualizar_beca",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;
        Ok(ScholarshipResource::from(&updated))
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let current = self
            .scholarship_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        let before = serde_json::to_value(&current)?;
        self.scholarship_repo.delete(&mut *tx, id).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_BECAS,
                    "eliminar_beca",
                    Some(before),
                    None,
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("Beca {} eliminada (reportes y evaluación en cascada)", current.code);
        Ok(())
    }

    // closeScholarship: Activa → En evaluación. Exige todos os reportes
    // aprovados (lista vazia conta como aprovada) e semeia a evaluación.
    pub async fn close(
        &self,
        actor: &User,
        id: Uuid,
        closed_by: Option<Uuid>,
    ) -> Result<ScholarshipResource, AppError> {
        let closer = closed_by.unwrap_or(actor.id);
        if closer != actor.id {
            self.user_repo
                .find_by_id(closer)
                .await?
                .ok_or_else(|| AppError::NotFound("Usuario que cierra no encontrado.".into()))?;
        }

        let mut tx = self.pool.begin().await?;
        let current = self
            .scholarship_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        if current.status != ScholarshipStatus::Activa {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_BECAS,
                    "cerrar_beca",
                    format!(
                        "Solo una beca Activa puede pasar a En evaluación (estado actual: {}).",
                        current.status
                    ),
                )
                .await);
        }

        let unapproved = self.report_repo.count_unapproved(&mut *tx, id).await?;
        if unapproved > 0 {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_BECAS,
                    "cerrar_beca",
                    format!("La beca tiene {unapproved} reporte(s) sin aprobar."),
                )
                .await);
        }

        let before = serde_json::to_value(&current)?;
        let mut next = current;
        next.status = ScholarshipStatus::EnEvaluacion;
        next.closed_by = Some(closer);
        next.closed_at = Some(Utc::now());

        let updated = self.scholarship_repo.update(&mut *tx, &next).await?;
        self.evaluation_repo.seed_pending(&mut *tx, id).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_BECAS,
                    "cerrar_beca",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("Beca {} cerrada; evaluación Pendiente sembrada", updated.code);
        Ok(ScholarshipResource::from(&updated))
    }

    // archiveScholarship: En evaluación → Archivada (terminal).
    pub async fn archive(&self, actor: &User, id: Uuid) -> Result<ScholarshipResource, AppError> {
        let mut tx = self.pool.begin().await?;
        let current = self
            .scholarship_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        if current.status != ScholarshipStatus::EnEvaluacion {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_BECAS,
                    "archivar_beca",
                    format!(
                        "Solo una beca En evaluación puede archivarse (estado actual: {}).",
                        current.status
                    ),
                )
                .await);
        }

        let before = serde_json::to_value(&current)?;
        let mut next = current;
        next.status = ScholarshipStatus::Archivada;
        next.archived = true;
        next.archived_at = Some(Utc::now());

        let updated = self.scholarship_repo.update(&mut *tx, &next).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_BECAS,
                    "archivar_beca",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("Beca {} archivada", updated.code);
        Ok(ScholarshipResource::from(&updated))
    }

    // --- Reportes ---

    // Abre o slot N+1. O gate: o último reporte precisa estar aprovado e o
    // total não pode passar de max_reports_per_scholar.
    pub async fn open_report(
        &self,
        actor: &User,
        scholarship_id: Uuid,
        payload: &OpenReportPayload,
    ) -> Result<ReportResource, AppError> {
        let mut tx = self.pool.begin().await?;
        let scholarship = self
            .scholarship_repo
            .find_by_id_for_update(&mut *tx, scholarship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        if actor.role != UserRole::Admin && scholarship.tutor_id != actor.id {
            return Err(AppError::Forbidden(
                "Solo el tutor designado puede abrir reportes de esta beca.".into(),
            ));
        }
        if scholarship.status != ScholarshipStatus::Activa {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_REPORTES,
                    "abrir_reporte",
                    format!(
                        "Solo una beca Activa recibe nuevos reportes (estado actual: {}).",
                        scholarship.status
                    ),
                )
                .await);
        }

        let last = self.report_repo.last_report(&mut *tx, scholarship_id).await?;
        if let Some(last) = &last {
            if last.status != ReportStatus::Approved {
                return Err(self
                    .reject(
                        tx,
                        actor,
                        MODULE_REPORTES,
                        "abrir_reporte",
                        format!(
                            "El reporte {} aún no está aprobado; no se puede abrir el siguiente.",
                            last.report_number
                        ),
                    )
                    .await);
            }
        }
        let next_number = last.map_or(1, |r| r.report_number + 1);

        let parameters = self.parameters_repo.get_with(&mut *tx).await?;
        if next_number > parameters.max_reports_per_scholar {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_REPORTES,
                    "abrir_reporte",
                    format!(
                        "Se alcanzó el máximo de {} reportes por becario.",
                        parameters.max_reports_per_scholar
                    ),
                )
                .await);
        }

        let report = self
            .report_repo
            .create(
                &mut *tx,
                scholarship_id,
                next_number,
                Some(scholarship.tutor_id),
                payload.title.as_deref(),
                payload.deadline_start,
                payload.deadline_end,
            )
            .await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_REPORTES,
                    "abrir_reporte",
                    None,
                    Some(serde_json::to_value(&report)?),
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            "Reporte {} abierto para la beca {}",
            report.report_number,
            scholarship.code
        );
        Ok(ReportResource::from(&report))
    }

    pub async fn list_reports(
        &self,
        actor: &User,
        scholarship_filter: Option<Uuid>,
    ) -> Result<Vec<ReportResource>, AppError> {
        let (tutor_id, student_id) = match actor.role {
            UserRole::Admin | UserRole::Director => (None, None),
            UserRole::Tutor => (Some(actor.id), None),
            UserRole::Becario => (None, Some(actor.id)),
        };
        let reports = self
            .report_repo
            .list(scholarship_filter, tutor_id, student_id)
            .await?;
        Ok(reports.iter().map(ReportResource::from).collect())
    }

    pub async fn get_report(&self, actor: &User, id: Uuid) -> Result<ReportResource, AppError> {
        let report = self
            .report_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reporte no encontrado.".into()))?;
        let scholarship = self
            .scholarship_repo
            .find_by_id(report.scholarship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;
        self.ensure_can_view(actor, &scholarship)?;

        let mut resource = ReportResource::from(&report);
        if let Some(tutor_id) = report.tutor_id {
            if let Some(tutor) = self.user_repo.find_by_id(tutor_id).await? {
                resource = resource.with_tutor(UserSummary::from(&tutor));
            }
        }
        Ok(resource)
    }

    // submitReport: o becario dono entrega o conteúdo.
    pub async fn submit_report(
        &self,
        actor: &User,
        report_id: Uuid,
        payload: &SubmitReportPayload,
    ) -> Result<ReportResource, AppError> {
        let mut tx = self.pool.begin().await?;
        let report = self
            .report_repo
            .find_by_id_for_update(&mut *tx, report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reporte no encontrado.".into()))?;
        let scholarship = self
            .scholarship_repo
            .find_by_id_with(&mut *tx, report.scholarship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        if scholarship.student_id != actor.id {
            return Err(AppError::Forbidden(
                "Solo el becario dueño de la beca puede entregar este reporte.".into(),
            ));
        }
        if scholarship.archived {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_REPORTES,
                    "entregar_reporte",
                    "Una beca archivada es de solo lectura.".to_string(),
                )
                .await);
        }
        if !report.status.can_transition_to(ReportStatus::Submitted) {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_REPORTES,
                    "entregar_reporte",
                    format!(
                        "Un reporte {} no puede ser entregado.",
                        report.status.display_label()
                    ),
                )
                .await);
        }

        let before = serde_json::to_value(&report)?;
        let mut next = report;
        next.production_date = Some(payload.production_date);
        next.problem_description = Some(payload.problem_description.clone());
        next.activities = payload.activities.clone();
        if payload.file_path.is_some() {
            next.file_path = payload.file_path.clone();
        }
        if payload.title.is_some() {
            next.title = payload.title.clone();
        }
        next.status = ReportStatus::Submitted;
        next.submitted_at = Some(Utc::now());

        let updated = self.report_repo.update(&mut *tx, &next).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_REPORTES,
                    "entregar_reporte",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;
        Ok(ReportResource::from(&updated))
    }

    // reviewReport: o tutor designado aprova (com calificación) ou pede
    // cambios (com feedback). Ambos marcam reviewed_at.
    pub async fn review_report(
        &self,
        actor: &User,
        report_id: Uuid,
        payload: &ReviewReportPayload,
    ) -> Result<ReportResource, AppError> {
        let mut tx = self.pool.begin().await?;
        let report = self
            .report_repo
            .find_by_id_for_update(&mut *tx, report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reporte no encontrado.".into()))?;
        let scholarship = self
            .scholarship_repo
            .find_by_id_with(&mut *tx, report.scholarship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        let is_assigned_tutor = report.tutor_id == Some(actor.id);
        if actor.role != UserRole::Admin && !is_assigned_tutor {
            return Err(AppError::Forbidden(
                "Solo el tutor designado puede revisar este reporte.".into(),
            ));
        }
        if scholarship.archived {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_REPORTES,
                    "revisar_reporte",
                    "Una beca archivada es de solo lectura.".to_string(),
                )
                .await);
        }
        if report.status != ReportStatus::Submitted {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_REPORTES,
                    "revisar_reporte",
                    format!(
                        "Solo un reporte entregado puede revisarse (estado actual: {}).",
                        report.status.display_label()
                    ),
                )
                .await);
        }

        let before = serde_json::to_value(&report)?;
        let mut next = report;
        match payload.decision {
            ReviewDecision::Aprobar => {
                next.status = ReportStatus::Approved;
                next.grade = payload.grade;
                next.feedback = payload.feedback.clone();
            }
            ReviewDecision::SolicitarCambios => {
                next.status = ReportStatus::ChangesRequested;
                next.grade = payload.grade;
                next.feedback = payload.feedback.clone();
            }
        }
        next.reviewed_at = Some(Utc::now());

        let updated = self.report_repo.update(&mut *tx, &next).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_REPORTES,
                    "revisar_reporte",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;
        Ok(ReportResource::from(&updated))
    }

    // --- Evaluaciones ---

    // recordEvaluation: upsert na unique de scholarship_id. Registrar duas
    // vezes atualiza a mesma linha, nunca duplica.
    pub async fn record_evaluation(
        &self,
        actor: &User,
        scholarship_id: Uuid,
        payload: &RecordEvaluationPayload,
    ) -> Result<EvaluationResource, AppError> {
        let previous = self.evaluation_repo.find_by_scholarship(scholarship_id).await?;

        let mut tx = self.pool.begin().await?;
        let scholarship = self
            .scholarship_repo
            .find_by_id_for_update(&mut *tx, scholarship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;

        if scholarship.status != ScholarshipStatus::EnEvaluacion {
            return Err(self
                .reject(
                    tx,
                    actor,
                    MODULE_EVALUACIONES,
                    "registrar_evaluacion",
                    format!(
                        "La evaluación final exige una beca En evaluación (estado actual: {}).",
                        scholarship.status
                    ),
                )
                .await);
        }

        let evaluation = self
            .evaluation_repo
            .upsert(&mut *tx, scholarship_id, payload.grade, &payload.remarks)
            .await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_EVALUACIONES,
                    "registrar_evaluacion",
                    previous.as_ref().map(serde_json::to_value).transpose()?,
                    Some(serde_json::to_value(&evaluation)?),
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("Evaluación registrada para la beca {}", scholarship.code);
        Ok(EvaluationResource::from(&evaluation))
    }

    pub async fn list_evaluations(&self) -> Result<Vec<EvaluationResource>, AppError> {
        let evaluations = self.evaluation_repo.list().await?;
        let ids: Vec<Uuid> = evaluations.iter().map(|e| e.scholarship_id).collect();
        let scholarships = self.scholarship_repo.find_many(&ids).await?;

        Ok(evaluations
            .iter()
            .map(|evaluation| {
                let mut resource = EvaluationResource::from(evaluation);
                if let Some(s) = scholarships
                    .iter()
                    .find(|s| s.id == evaluation.scholarship_id)
                {
                    resource = resource.with_scholarship(ScholarshipSummary::from(s));
                }
                resource
            })
            .collect())
    }

    pub async fn get_evaluation(&self, actor: &User, id: Uuid) -> Result<EvaluationResource, AppError> {
        let evaluation = self
            .evaluation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Evaluación no encontrada.".into()))?;
        let scholarship = self
            .scholarship_repo
            .find_by_id(evaluation.scholarship_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Beca no encontrada.".into()))?;
        self.ensure_can_view(actor, &scholarship)?;

        Ok(EvaluationResource::from(&evaluation)
            .with_scholarship(ScholarshipSummary::from(&scholarship)))
    }
}
