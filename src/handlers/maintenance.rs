// src/handlers/maintenance.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct MaintenanceOutcome {
    #[schema(example = "Respaldo generado en backups/system-backup-2025-03-01_09-30-00.json.")]
    pub mensaje: String,
}

// POST /api/mantenimiento/{action}
#[utoipa::path(
    post,
    path = "/api/mantenimiento/{action}",
    tag = "Mantenimiento",
    responses(
        (status = 200, description = "Acción ejecutada", body = MaintenanceOutcome),
        (status = 422, description = "Acción desconocida"),
        (status = 500, description = "Fallo de E/S; no queda artefacto parcial")
    ),
    params(
        ("action" = String, Path, description = "backup | clean-temp | recalculate-metrics")
    ),
    security(("api_jwt" = []))
)]
pub async fn run_maintenance(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Path(action): Path<String>,
) -> Result<Json<MaintenanceOutcome>, AppError> {
    let mensaje = app_state
        .maintenance_service
        .run(&actor, &action)
        .await?;
    Ok(Json(MaintenanceOutcome { mensaje }))
}
