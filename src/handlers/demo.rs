// src/handlers/demo.rs
//
// Superficie de demostración: datos fijos en memoria para las pantallas
// de vista previa del portal. Público y sin estado; nada aquí toca la
// base de datos ni el ciclo de vida de becas.

use axum::Json;

use crate::models::demo::{
    self, Designacion, Estudiante, HistorialEstudiante, Materia, Notificacion,
};

// GET /api/designaciones
#[utoipa::path(
    get,
    path = "/api/designaciones",
    tag = "Demo",
    responses(
        (status = 200, description = "Designaciones de muestra", body = [Designacion])
    )
)]
pub async fn list_designaciones() -> Json<Vec<Designacion>> {
    Json(demo::sample_designaciones())
}

// GET /api/estudiantes
#[utoipa::path(
    get,
    path = "/api/estudiantes",
    tag = "Demo",
    responses(
        (status = 200, description = "Estudiantes de muestra", body = [Estudiante])
    )
)]
pub async fn list_estudiantes() -> Json<Vec<Estudiante>> {
    Json(demo::sample_estudiantes())
}

// GET /api/materias
#[utoipa::path(
    get,
    path = "/api/materias",
    tag = "Demo",
    responses(
        (status = 200, description = "Materias de muestra", body = [Materia])
    )
)]
pub async fn list_materias() -> Json<Vec<Materia>> {
    Json(demo::sample_materias())
}

// GET /api/notificaciones
#[utoipa::path(
    get,
    path = "/api/notificaciones",
    tag = "Demo",
    responses(
        (status = 200, description = "Notificaciones de muestra", body = [Notificacion])
    )
)]
pub async fn list_notificaciones() -> Json<Vec<Notificacion>> {
    Json(demo::sample_notificaciones())
}

// GET /api/historial-estudiantes
#[utoipa::path(
    get,
    path = "/api/historial-estudiantes",
    tag = "Demo",
    responses(
        (status = 200, description = "Historial académico de muestra", body = [HistorialEstudiante])
    )
)]
pub async fn list_historial() -> Json<Vec<HistorialEstudiante>> {
    Json(demo::sample_historial())
}
