// src/handlers/scholarships.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, AdminOrDirector, RequireRole},
    },
    models::{
        evaluation::{EvaluationResource, RecordEvaluationPayload},
        report::{OpenReportPayload, ReportResource},
        scholarship::{
            CloseScholarshipPayload, CreateScholarshipPayload, ScholarshipResource,
            UpdateScholarshipPayload,
        },
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListScholarshipsQuery {
    pub tutor_id: Option<Uuid>,
}

// =============================================================================
//  1. CRUD DE BECAS
// =============================================================================

// POST /api/becas
#[utoipa::path(
    post,
    path = "/api/becas",
    tag = "Becas",
    request_body = CreateScholarshipPayload,
    responses(
        (status = 201, description = "Beca creada", body = ScholarshipResource),
        (status = 409, description = "El código de beca ya existe"),
        (status = 422, description = "Datos inválidos o estado inicial distinto de Activa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_scholarship(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Json(payload): Json<CreateScholarshipPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    payload.validate_consistency()?;

    let scholarship = app_state
        .scholarship_service
        .create(&actor, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(scholarship)))
}

// GET /api/becas
#[utoipa::path(
    get,
    path = "/api/becas",
    tag = "Becas",
    responses(
        (status = 200, description = "Listado de becas visible para el rol", body = [ScholarshipResource])
    ),
    params(
        ("tutorId" = Option<Uuid>, Query, description = "Filtra por tutor (solo admin y director)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_scholarships(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ListScholarshipsQuery>,
) -> Result<Json<Vec<ScholarshipResource>>, AppError> {
    let scholarships = app_state
        .scholarship_service
        .list(&actor, query.tutor_id)
        .await?;
    Ok(Json(scholarships))
}

// GET /api/becas/{id}
#[utoipa::path(
    get,
    path = "/api/becas/{id}",
    tag = "Becas",
    responses(
        (status = 200, description = "Detalle con estudiante, tutor, reportes y evaluación", body = ScholarshipResource),
        (status = 404, description = "Beca no encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_scholarship(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ScholarshipResource>, AppError> {
    let scholarship = app_state.scholarship_service.get_detail(&actor, id).await?;
    Ok(Json(scholarship))
}

// PUT /api/becas/{id}
#[utoipa::path(
    put,
    path = "/api/becas/{id}",
    tag = "Becas",
    request_body = UpdateScholarshipPayload,
    responses(
        (status = 200, description = "Beca actualizada", body = ScholarshipResource),
        (status = 404, description = "Beca no encontrada"),
        (status = 422, description = "Transición de estado no permitida")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_scholarship(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScholarshipPayload>,
) -> Result<Json<ScholarshipResource>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scholarship = app_state
        .scholarship_service
        .update(&actor, id, &payload)
        .await?;
    Ok(Json(scholarship))
}

// DELETE /api/becas/{id}
#[utoipa::path(
    delete,
    path = "/api/becas/{id}",
    tag = "Becas",
    responses(
        (status = 204, description = "Beca eliminada junto con sus reportes y evaluación"),
        (status = 404, description = "Beca no encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_scholarship(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.scholarship_service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. CICLO DE VIDA
// =============================================================================

// POST /api/becas/{id}/cerrar
#[utoipa::path(
    post,
    path = "/api/becas/{id}/cerrar",
    tag = "Becas",
    request_body = CloseScholarshipPayload,
    responses(
        (status = 200, description = "Beca cerrada y pasada a En evaluación", body = ScholarshipResource),
        (status = 404, description = "Beca no encontrada"),
        (status = 422, description = "La beca no está Activa o tiene reportes sin aprobar")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn close_scholarship(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOrDirector>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseScholarshipPayload>,
) -> Result<Json<ScholarshipResource>, AppError> {
    let scholarship = app_state
        .scholarship_service
        .close(&actor, id, payload.closed_by)
        .await?;
    Ok(Json(scholarship))
}

// POST /api/becas/{id}/archivar
#[utoipa::path(
    post,
    path = "/api/becas/{id}/archivar",
    tag = "Becas",
    responses(
        (status = 200, description = "Beca archivada (solo lectura)", body = ScholarshipResource),
        (status = 404, description = "Beca no encontrada"),
        (status = 422, description = "Solo una beca En evaluación puede archivarse")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_scholarship(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOrDirector>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScholarshipResource>, AppError> {
    let scholarship = app_state.scholarship_service.archive(&actor, id).await?;
    Ok(Json(scholarship))
}

// POST /api/becas/{id}/reportes
#[utoipa::path(
    post,
    path = "/api/becas/{id}/reportes",
    tag = "Reportes",
    request_body = OpenReportPayload,
    responses(
        (status = 201, description = "Reporte abierto en estado pendiente", body = ReportResource),
        (status = 403, description = "Solo el tutor asignado o un administrador"),
        (status = 404, description = "Beca no encontrada"),
        (status = 422, description = "Reporte anterior sin aprobar, beca no Activa o cupo agotado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpenReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    payload.validate_consistency()?;

    let report = app_state
        .scholarship_service
        .open_report(&actor, id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

// PUT /api/becas/{id}/evaluacion
#[utoipa::path(
    put,
    path = "/api/becas/{id}/evaluacion",
    tag = "Evaluaciones",
    request_body = RecordEvaluationPayload,
    responses(
        (status = 200, description = "Evaluación registrada (idempotente por beca)", body = EvaluationResource),
        (status = 404, description = "Beca no encontrada"),
        (status = 422, description = "La beca no está En evaluación")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_evaluation(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOrDirector>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordEvaluationPayload>,
) -> Result<Json<EvaluationResource>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let evaluation = app_state
        .scholarship_service
        .record_evaluation(&actor, id, &payload)
        .await?;
    Ok(Json(evaluation))
}
