// src/handlers/evaluations.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOrDirector, RequireRole},
    },
    models::evaluation::EvaluationResource,
};

// GET /api/evaluaciones
#[utoipa::path(
    get,
    path = "/api/evaluaciones",
    tag = "Evaluaciones",
    responses(
        (status = 200, description = "Listado de evaluaciones con su beca", body = [EvaluationResource])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_evaluations(
    State(app_state): State<AppState>,
    RequireRole(_actor, _): RequireRole<AdminOrDirector>,
) -> Result<Json<Vec<EvaluationResource>>, AppError> {
    let evaluations = app_state.scholarship_service.list_evaluations().await?;
    Ok(Json(evaluations))
}

// GET /api/evaluaciones/{id}
#[utoipa::path(
    get,
    path = "/api/evaluaciones/{id}",
    tag = "Evaluaciones",
    responses(
        (status = 200, description = "Evaluación encontrada", body = EvaluationResource),
        (status = 404, description = "Evaluación no encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID de la evaluación")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_evaluation(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationResource>, AppError> {
    let evaluation = app_state
        .scholarship_service
        .get_evaluation(&actor, id)
        .await?;
    Ok(Json(evaluation))
}
