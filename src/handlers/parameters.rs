// src/handlers/parameters.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::parameters::{SystemParameters, UpdateParametersPayload},
};

// GET /api/system-parameters
#[utoipa::path(
    get,
    path = "/api/system-parameters",
    tag = "Parámetros",
    responses(
        (status = 200, description = "Parámetros vigentes de la gestión", body = SystemParameters)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_parameters(
    State(app_state): State<AppState>,
) -> Result<Json<SystemParameters>, AppError> {
    let parameters = app_state.parameters_repo.get().await?;
    Ok(Json(parameters))
}

// PUT /api/system-parameters
#[utoipa::path(
    put,
    path = "/api/system-parameters",
    tag = "Parámetros",
    request_body = UpdateParametersPayload,
    responses(
        (status = 200, description = "Parámetros actualizados", body = SystemParameters),
        (status = 422, description = "Fechas o cupos inconsistentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_parameters(
    State(app_state): State<AppState>,
    RequireRole(_actor, _): RequireRole<AdminOnly>,
    Json(payload): Json<UpdateParametersPayload>,
) -> Result<Json<SystemParameters>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    payload.validate_consistency()?;

    let parameters = app_state.parameters_repo.update(&payload).await?;
    Ok(Json(parameters))
}
