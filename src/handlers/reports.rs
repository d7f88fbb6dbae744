// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::report::{ReportResource, ReviewReportPayload, SubmitReportPayload},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub beca_id: Option<Uuid>,
}

// GET /api/reportes
#[utoipa::path(
    get,
    path = "/api/reportes",
    tag = "Reportes",
    responses(
        (status = 200, description = "Reportes visibles para el rol", body = [ReportResource])
    ),
    params(
        ("becaId" = Option<Uuid>, Query, description = "Filtra por beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Vec<ReportResource>>, AppError> {
    let reports = app_state
        .scholarship_service
        .list_reports(&actor, query.beca_id)
        .await?;
    Ok(Json(reports))
}

// GET /api/reportes-avance
//
// Alias conservado para las pantallas antiguas que consultaban el
// esquema en español. Mismo listado canónico.
#[utoipa::path(
    get,
    path = "/api/reportes-avance",
    tag = "Reportes",
    responses(
        (status = 200, description = "Alias de /api/reportes", body = [ReportResource])
    ),
    params(
        ("becaId" = Option<Uuid>, Query, description = "Filtra por beca")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reports_legacy(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Vec<ReportResource>>, AppError> {
    let reports = app_state
        .scholarship_service
        .list_reports(&actor, query.beca_id)
        .await?;
    Ok(Json(reports))
}

// GET /api/reportes/{id}
#[utoipa::path(
    get,
    path = "/api/reportes/{id}",
    tag = "Reportes",
    responses(
        (status = 200, description = "Reporte con su tutor", body = ReportResource),
        (status = 404, description = "Reporte no encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del reporte")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResource>, AppError> {
    let report = app_state.scholarship_service.get_report(&actor, id).await?;
    Ok(Json(report))
}

// POST /api/reportes/{id}/entregar
#[utoipa::path(
    post,
    path = "/api/reportes/{id}/entregar",
    tag = "Reportes",
    request_body = SubmitReportPayload,
    responses(
        (status = 200, description = "Reporte entregado para revisión", body = ReportResource),
        (status = 403, description = "Solo el becario titular de la beca"),
        (status = 404, description = "Reporte no encontrado"),
        (status = 422, description = "El reporte no admite entrega en su estado actual")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del reporte")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitReportPayload>,
) -> Result<Json<ReportResource>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let report = app_state
        .scholarship_service
        .submit_report(&actor, id, &payload)
        .await?;
    Ok(Json(report))
}

// POST /api/reportes/{id}/revisar
#[utoipa::path(
    post,
    path = "/api/reportes/{id}/revisar",
    tag = "Reportes",
    request_body = ReviewReportPayload,
    responses(
        (status = 200, description = "Revisión registrada", body = ReportResource),
        (status = 403, description = "Solo el tutor asignado o un administrador"),
        (status = 404, description = "Reporte no encontrado"),
        (status = 422, description = "El reporte no está entregado o la decisión está incompleta")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del reporte")
    ),
    security(("api_jwt" = []))
)]
pub async fn review_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewReportPayload>,
) -> Result<Json<ReportResource>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    payload.validate_consistency()?;

    let report = app_state
        .scholarship_service
        .review_report(&actor, id, &payload)
        .await?;
    Ok(Json(report))
}
