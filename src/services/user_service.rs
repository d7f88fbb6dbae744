// src/services/user_service.rs

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{AuditRepository, CareerRepository, UniversityMemberRepository, UserRepository};
use crate::models::audit::NewAuditEntry;
use crate::models::auth::{
    Career, CreateCareerPayload, CreateUserPayload, UpdateUserPayload, User, UserRole,
};

const MODULE_USUARIOS: &str = "usuarios";
const MODULE_CARRERAS: &str = "carreras";

// Administração de usuários e carreras. Não existe delete de usuário:
// desativar (is_active = false) corta o login e todas as chamadas.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    user_repo: UserRepository,
    career_repo: CareerRepository,
    member_repo: UniversityMemberRepository,
    audit_repo: AuditRepository,
}

impl UserService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        career_repo: CareerRepository,
        member_repo: UniversityMemberRepository,
        audit_repo: AuditRepository,
    ) -> Self {
        Self {
            pool,
            user_repo,
            career_repo,
            member_repo,
            audit_repo,
        }
    }

    async fn ensure_links_exist(
        &self,
        career_id: Option<Uuid>,
        university_member_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(career_id) = career_id {
            self.career_repo
                .find_by_id(career_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Carrera no encontrada.".into()))?;
        }
        if let Some(member_id) = university_member_id {
            self.member_repo
                .find_by_id(member_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound("Registro universitario no encontrado.".into())
                })?;
        }
        Ok(())
    }

    pub async fn create_user(
        &self,
        actor: &User,
        payload: &CreateUserPayload,
    ) -> Result<User, AppError> {
        self.ensure_links_exist(payload.career_id, payload.university_member_id)
            .await?;

        // Bcrypt fora do executor async, como em toda operação de senha.
        let password_clone = payload.password.clone();
        let hashed =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create(
                &mut *tx,
                &payload.username,
                &payload.full_name,
                &payload.email,
                &hashed,
                payload.role,
                payload.career_id,
                payload.university_member_id,
            )
            .await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_USUARIOS,
                    "crear_usuario",
                    None,
                    Some(serde_json::to_value(&user)?),
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("Usuario {} creado con rol {}", user.username, user.role.label());
        Ok(user)
    }

    pub async fn update_user(
        &self,
        actor: &User,
        id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<User, AppError> {
        let current = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado.".into()))?;

        self.ensure_links_exist(payload.career_id, payload.university_member_id)
            .await?;

        let before = serde_json::to_value(&current)?;
        let mut next = current;

        if let Some(full_name) = &payload.full_name {
            next.full_name = full_name.clone();
        }
        if let Some(email) = &payload.email {
            next.email = email.clone();
        }
        if let Some(role) = payload.role {
            next.role = role;
        }
        if payload.career_id.is_some() {
            next.career_id = payload.career_id;
        }
        if payload.university_member_id.is_some() {
            next.university_member_id = payload.university_member_id;
        }
        if let Some(is_active) = payload.is_active {
            next.is_active = is_active;
        }
        if let Some(password) = &payload.password {
            let password_clone = password.clone();
            next.password_hash =
                tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        }

        let mut tx = self.pool.begin().await?;
        let updated = self.user_repo.update(&mut *tx, &next).await?;
        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditEntry::success(
                    Some(actor.id),
                    MODULE_USUARIOS,
                    "actualizar_usuario",
                    Some(before),
                    Some(serde_json::to_value(&updated)?),
                ),
            )
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        self.user_repo.list(role).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado.".into()))
    }

    pub async fn list_careers(&self) -> Result<Vec<Career>, AppError> {
        self.career_repo.list().await
    }

    pub async fn create_career(
        &self,
        actor: &User,
        payload: &CreateCareerPayload,
    ) -> Result<Career, AppError> {
        let career = self.career_repo.create(&payload.name).await?;
        self.audit_repo
            .insert_best_effort(&NewAuditEntry::success(
                Some(actor.id),
                MODULE_CARRERAS,
                "crear_carrera",
                None,
                Some(serde_json::to_value(&career)?),
            ))
            .await;
        Ok(career)
    }
}
