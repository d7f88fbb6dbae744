// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AuditRepository, CareerRepository, EvaluationRepository, ParametersRepository,
        ReportRepository, ScholarshipRepository, TicketRepository, UniversityMemberRepository,
        UserRepository,
    },
    services::{
        AuthService, MaintenanceService, ScholarshipService, TicketService, UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub server_addr: String,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub scholarship_service: ScholarshipService,
    pub ticket_service: TicketService,
    pub maintenance_service: MaintenanceService,
    // Repositórios acessados direto pelos handlers de parâmetros e auditoria
    pub parameters_repo: ParametersRepository,
    pub audit_repo: AuditRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let storage_dir =
            PathBuf::from(env::var("STORAGE_DIR").unwrap_or_else(|_| "storage/app".to_string()));
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let career_repo = CareerRepository::new(db_pool.clone());
        let member_repo = UniversityMemberRepository::new(db_pool.clone());
        let scholarship_repo = ScholarshipRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let evaluation_repo = EvaluationRepository::new(db_pool.clone());
        let ticket_repo = TicketRepository::new(db_pool.clone());
        let parameters_repo = ParametersRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone());
        let user_service = UserService::new(
            db_pool.clone(),
            user_repo.clone(),
            career_repo,
            member_repo,
            audit_repo.clone(),
        );
        let scholarship_service = ScholarshipService::new(
            db_pool.clone(),
            scholarship_repo.clone(),
            report_repo.clone(),
            evaluation_repo.clone(),
            user_repo.clone(),
            parameters_repo.clone(),
            audit_repo.clone(),
        );
        let ticket_service = TicketService::new(
            db_pool.clone(),
            ticket_repo.clone(),
            user_repo.clone(),
            audit_repo.clone(),
        );
        let maintenance_service = MaintenanceService::new(
            storage_dir,
            parameters_repo.clone(),
            user_repo,
            scholarship_repo,
            report_repo,
            evaluation_repo,
            ticket_repo,
            audit_repo.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            server_addr,
            auth_service,
            user_service,
            scholarship_service,
            ticket_service,
            maintenance_service,
            parameters_repo,
            audit_repo,
        })
    }
}
