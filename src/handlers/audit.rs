// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::audit::AuditLog,
};

// O listado siempre viene acotado; 100 entradas recientes por defecto.
const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditQuery {
    pub module: Option<String>,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
}

// GET /api/audit-logs
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "Auditoría",
    responses(
        (status = 200, description = "Bitácora de cambios, más reciente primero", body = [AuditLog])
    ),
    params(
        ("module" = Option<String>, Query, description = "Filtra por módulo (becas, reportes, evaluaciones, usuarios, soporte, mantenimiento)"),
        ("userId" = Option<Uuid>, Query, description = "Filtra por usuario actor"),
        ("limit" = Option<i64>, Query, description = "Máximo de entradas (tope 500)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    RequireRole(_actor, _): RequireRole<AdminOnly>,
    Query(query): Query<ListAuditQuery>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);

    let entries = app_state
        .audit_repo
        .list(query.module.as_deref(), query.user_id, limit)
        .await?;
    Ok(Json(entries))
}
