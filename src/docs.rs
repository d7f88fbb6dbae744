// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Becas ---
        handlers::scholarships::create_scholarship,
        handlers::scholarships::list_scholarships,
        handlers::scholarships::get_scholarship,
        handlers::scholarships::update_scholarship,
        handlers::scholarships::delete_scholarship,
        handlers::scholarships::close_scholarship,
        handlers::scholarships::archive_scholarship,

        // --- Reportes ---
        handlers::scholarships::open_report,
        handlers::reports::list_reports,
        handlers::reports::list_reports_legacy,
        handlers::reports::get_report,
        handlers::reports::submit_report,
        handlers::reports::review_report,

        // --- Evaluaciones ---
        handlers::scholarships::record_evaluation,
        handlers::evaluations::list_evaluations,
        handlers::evaluations::get_evaluation,

        // --- Soporte ---
        handlers::tickets::create_ticket,
        handlers::tickets::list_tickets,
        handlers::tickets::get_ticket,
        handlers::tickets::update_ticket,

        // --- Usuarios ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::list_careers,
        handlers::users::create_career,

        // --- Administración ---
        handlers::audit::list_audit_logs,
        handlers::parameters::get_parameters,
        handlers::parameters::update_parameters,
        handlers::maintenance::run_maintenance,

        // --- Demo ---
        handlers::demo::list_designaciones,
        handlers::demo::list_estudiantes,
        handlers::demo::list_materias,
        handlers::demo::list_notificaciones,
        handlers::demo::list_historial,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::Career,
            models::auth::UniversityMember,
            models::auth::UserSummary,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::CreateCareerPayload,

            // --- Becas ---
            models::scholarship::ScholarshipStatus,
            models::scholarship::Scholarship,
            models::scholarship::ScholarshipSummary,
            models::scholarship::ScholarshipResource,
            models::scholarship::CreateScholarshipPayload,
            models::scholarship::UpdateScholarshipPayload,
            models::scholarship::CloseScholarshipPayload,

            // --- Reportes ---
            models::report::ReportStatus,
            models::report::ReviewDecision,
            models::report::Report,
            models::report::ReportResource,
            models::report::OpenReportPayload,
            models::report::SubmitReportPayload,
            models::report::ReviewReportPayload,

            // --- Evaluaciones ---
            models::evaluation::EvaluationStatus,
            models::evaluation::Evaluation,
            models::evaluation::EvaluationResource,
            models::evaluation::RecordEvaluationPayload,

            // --- Soporte ---
            models::support::TicketStatus,
            models::support::SupportTicket,
            models::support::TicketResource,
            models::support::CreateTicketPayload,
            models::support::UpdateTicketPayload,

            // --- Administración ---
            models::audit::AuditLog,
            models::parameters::SystemStatus,
            models::parameters::SystemParameters,
            models::parameters::UpdateParametersPayload,
            handlers::maintenance::MaintenanceOutcome,

            // --- Demo ---
            models::demo::Designacion,
            models::demo::Estudiante,
            models::demo::Materia,
            models::demo::Notificacion,
            models::demo::HistorialEstudiante,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y sesión"),
        (name = "Becas", description = "Ciclo de vida de las becas de investigación"),
        (name = "Reportes", description = "Reportes de avance y su revisión"),
        (name = "Evaluaciones", description = "Evaluación final de cada beca"),
        (name = "Soporte", description = "Tickets de soporte técnico"),
        (name = "Usuarios", description = "Gestión de usuarios y carreras"),
        (name = "Auditoría", description = "Bitácora de cambios"),
        (name = "Parámetros", description = "Parámetros de la gestión académica"),
        (name = "Mantenimiento", description = "Acciones administrativas bajo demanda"),
        (name = "Demo", description = "Datos de muestra para el portal")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
