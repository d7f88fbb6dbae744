// src/handlers/tickets.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::support::{CreateTicketPayload, TicketResource, UpdateTicketPayload},
};

// POST /api/support-tickets
#[utoipa::path(
    post,
    path = "/api/support-tickets",
    tag = "Soporte",
    request_body = CreateTicketPayload,
    responses(
        (status = 201, description = "Ticket abierto", body = TicketResource)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateTicketPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ticket = app_state.ticket_service.create(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

// GET /api/support-tickets
#[utoipa::path(
    get,
    path = "/api/support-tickets",
    tag = "Soporte",
    responses(
        (status = 200, description = "Tickets del usuario (todos para admin)", body = [TicketResource])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Vec<TicketResource>>, AppError> {
    let tickets = app_state.ticket_service.list(&actor).await?;
    Ok(Json(tickets))
}

// GET /api/support-tickets/{id}
#[utoipa::path(
    get,
    path = "/api/support-tickets/{id}",
    tag = "Soporte",
    responses(
        (status = 200, description = "Ticket con reportante y técnico", body = TicketResource),
        (status = 403, description = "El ticket no involucra al usuario"),
        (status = 404, description = "Ticket no encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del ticket")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_ticket(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResource>, AppError> {
    let ticket = app_state.ticket_service.get(&actor, id).await?;
    Ok(Json(ticket))
}

// PUT /api/support-tickets/{id}
#[utoipa::path(
    put,
    path = "/api/support-tickets/{id}",
    tag = "Soporte",
    request_body = UpdateTicketPayload,
    responses(
        (status = 200, description = "Ticket actualizado", body = TicketResource),
        (status = 403, description = "Solo admin o el técnico asignado"),
        (status = 404, description = "Ticket no encontrado"),
        (status = 422, description = "Retroceso de estado no permitido")
    ),
    params(
        ("id" = Uuid, Path, description = "ID del ticket")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_ticket(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTicketPayload>,
) -> Result<Json<TicketResource>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ticket = app_state
        .ticket_service
        .update(&actor, id, &payload)
        .await?;
    Ok(Json(ticket))
}
