// src/handlers/users.rs

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
    middleware::rbac::{AdminOnly, RequireRole},
    models::auth::{Career, CreateCareerPayload, CreateUserPayload, UpdateUserPayload, User, UserRole},
};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<UserRole>,
}

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Listado de usuarios", body = [User])
    ),
    params(
        ("role" = Option<UserRole>, Query, description = "Filtra por rol")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    RequireRole(_actor, _): RequireRole<AdminOnly>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = app_state.user_service.list_users(query.role).await?;
    Ok(Json(users))
}

// POST /api/usuarios
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuario creado", body = User),
        (status = 409, description = "Nombre de usuario o correo ya en uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state.user_service.create_user(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/usuarios/{id}
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuario encontrado", body = User),
        (status = 404, description = "Usuario no encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del usuario")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    RequireRole(_actor, _): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = app_state.user_service.get_user(id).await?;
    Ok(Json(user))
}

// PUT /api/usuarios/{id}
#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuario actualizado", body = User),
        (status = 404, description = "Usuario no encontrado"),
        (status = 409, description = "Nombre de usuario o correo ya en uso")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del usuario")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state
        .user_service
        .update_user(&actor, id, &payload)
        .await?;
    Ok(Json(user))
}

// --- Carreras ---

// GET /api/carreras
#[utoipa::path(
    get,
    path = "/api/carreras",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Listado de carreras", body = [Career])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_careers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Career>>, AppError> {
    let careers = app_state.user_service.list_careers().await?;
    Ok(Json(careers))
}

// POST /api/carreras
#[utoipa::path(
    post,
    path = "/api/carreras",
    tag = "Usuarios",
    request_body = CreateCareerPayload,
    responses(
        (status = 201, description = "Carrera creada", body = Career),
        (status = 409, description = "Ya existe una carrera con ese nombre")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_career(
    State(app_state): State<AppState>,
    RequireRole(actor, _): RequireRole<AdminOnly>,
    Json(payload): Json<CreateCareerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let career = app_state
        .user_service
        .create_career(&actor, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(career)))
}
