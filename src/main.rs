//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger, que movemos para o main.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: saúde, login e a superfície de demonstração
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/login", post(handlers::auth::login))
        .route("/designaciones", get(handlers::demo::list_designaciones))
        .route("/estudiantes", get(handlers::demo::list_estudiantes))
        .route("/materias", get(handlers::demo::list_materias))
        .route("/notificaciones", get(handlers::demo::list_notificaciones))
        .route(
            "/historial-estudiantes",
            get(handlers::demo::list_historial),
        );

    // Becas e seu ciclo de vida
    let scholarship_routes = Router::new()
        .route(
            "/becas",
            post(handlers::scholarships::create_scholarship)
                .get(handlers::scholarships::list_scholarships),
        )
        .route(
            "/becas/{id}",
            get(handlers::scholarships::get_scholarship)
                .put(handlers::scholarships::update_scholarship)
                .delete(handlers::scholarships::delete_scholarship),
        )
        .route(
            "/becas/{id}/cerrar",
            post(handlers::scholarships::close_scholarship),
        )
        .route(
            "/becas/{id}/archivar",
            post(handlers::scholarships::archive_scholarship),
        )
        .route(
            "/becas/{id}/reportes",
            post(handlers::scholarships::open_report),
        )
        .route(
            "/becas/{id}/evaluacion",
            put(handlers::scholarships::record_evaluation),
        );

    // Reportes de avance (o alias antigo segue respondendo)
    let report_routes = Router::new()
        .route("/reportes", get(handlers::reports::list_reports))
        .route(
            "/reportes-avance",
            get(handlers::reports::list_reports_legacy),
        )
        .route("/reportes/{id}", get(handlers::reports::get_report))
        .route(
            "/reportes/{id}/entregar",
            post(handlers::reports::submit_report),
        )
        .route(
            "/reportes/{id}/revisar",
            post(handlers::reports::review_report),
        );

    let evaluation_routes = Router::new()
        .route(
            "/evaluaciones",
            get(handlers::evaluations::list_evaluations),
        )
        .route(
            "/evaluaciones/{id}",
            get(handlers::evaluations::get_evaluation),
        );

    let support_routes = Router::new()
        .route(
            "/support-tickets",
            post(handlers::tickets::create_ticket).get(handlers::tickets::list_tickets),
        )
        .route(
            "/support-tickets/{id}",
            get(handlers::tickets::get_ticket).put(handlers::tickets::update_ticket),
        );

    // Administração: usuários, carreras, bitácora, parâmetros e mantenimiento
    let admin_routes = Router::new()
        .route(
            "/usuarios",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route(
            "/usuarios/{id}",
            get(handlers::users::get_user).put(handlers::users::update_user),
        )
        .route(
            "/carreras",
            post(handlers::users::create_career).get(handlers::users::list_careers),
        )
        .route("/audit-logs", get(handlers::audit::list_audit_logs))
        .route(
            "/system-parameters",
            get(handlers::parameters::get_parameters).put(handlers::parameters::update_parameters),
        )
        .route(
            "/mantenimiento/{action}",
            post(handlers::maintenance::run_maintenance),
        );

    // Tudo que exige token fica atrás do auth_guard
    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .merge(scholarship_routes)
        .merge(report_routes)
        .merge(evaluation_routes)
        .merge(support_routes)
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .nest("/api", public_routes)
        .nest("/api", protected_routes)
        .with_state(app_state.clone());

    // Inicia o servidor
    let addr = app_state.server_addr.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app) // .into_make_service() não é mais necessário nas versões recentes de Axum
        .await
        .expect("Erro no servidor Axum");
}
