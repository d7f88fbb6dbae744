// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::{Career, UniversityMember, User, UserRole};

const USER_COLUMNS: &str = "id, username, full_name, email, password_hash, role, \
    career_id, university_member_id, is_active, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users' (e as tabelas de apoio careers / university_members).
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca pelo username (login). `fetch_optional` + `?` mantém o fluxo limpo.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let maybe_user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let maybe_user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca vários de uma vez (aninhamento de estudante/tutor nas respostas).
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let users = sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE ($1::user_role IS NULL OR role = $1)
             ORDER BY created_at DESC"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Cria um novo usuário, com tratamento específico para duplicidade de
    // username/email (os nomes de constraint vêm das migrations).
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        username: &str,
        full_name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
        career_id: Option<Uuid>,
        university_member_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO users (username, full_name, email, password_hash, role, career_id, university_member_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(full_name)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(career_id)
            .bind(university_member_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        if let Some(constraint) = db_err.constraint() {
                            return match constraint {
                                "users_username_key" => AppError::Conflict(
                                    "El nombre de usuario ya está en uso.".into(),
                                ),
                                "users_email_key" => AppError::Conflict(
                                    "El correo electrónico ya está en uso.".into(),
                                ),
                                _ => AppError::Conflict(format!(
                                    "Violación de unicidad: {constraint}"
                                )),
                            };
                        }
                    }
                }
                e.into()
            })?;
        Ok(user)
    }

    // Atualização completa da linha; o service resolve os campos parciais
    // antes de chamar aqui.
    pub async fn update<'e, E>(&self, executor: E, user: &User) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE users SET
                full_name = $2, email = $3, password_hash = $4, role = $5,
                career_id = $6, university_member_id = $7, is_active = $8,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.career_id)
            .bind(user.university_member_id)
            .bind(user.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict("El correo electrónico ya está en uso.".into());
                    }
                }
                e.into()
            })?;
        Ok(updated)
    }

    pub async fn count_active(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE is_active = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

// Repositório das carreras acadêmicas.
#[derive(Clone)]
pub struct CareerRepository {
    pool: PgPool,
}

impl CareerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Career>, AppError> {
        let careers = sqlx::query_as::<_, Career>(
            "SELECT id, name, created_at FROM careers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(careers)
    }

    pub async fn create(&self, name: &str) -> Result<Career, AppError> {
        let career = sqlx::query_as::<_, Career>(
            "INSERT INTO careers (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Ya existe una carrera con ese nombre.".into());
                }
            }
            e.into()
        })?;
        Ok(career)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Career>, AppError> {
        let career = sqlx::query_as::<_, Career>(
            "SELECT id, name, created_at FROM careers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(career)
    }
}

// Registros institucionais opcionais vinculados a usuários.
#[derive(Clone)]
pub struct UniversityMemberRepository {
    pool: PgPool,
}

impl UniversityMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UniversityMember>, AppError> {
        let member = sqlx::query_as::<_, UniversityMember>(
            "SELECT id, member_code, department, created_at FROM university_members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }
}
