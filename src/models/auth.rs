// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

// Papel do usuário. O banco guarda o valor em minúsculas; o rótulo em
// espanhol e a rota do painel derivam daqui, nunca de texto livre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Tutor,
    Director,
    Becario,
}

impl UserRole {
    // Rótulo exibido ao usuário final.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Tutor => "Tutor",
            UserRole::Director => "Director de carrera",
            UserRole::Becario => "Becario",
        }
    }

    // Rota do painel que o frontend abre depois do login.
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            UserRole::Admin => "/admin",
            UserRole::Tutor => "/tutor",
            UserRole::Director => "/director",
            UserRole::Becario => "/becario",
        }
    }
}

// --- Registros do banco ---

// Representa um usuário vindo do banco de dados.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "mgarcia")]
    pub username: String,
    #[schema(example = "María García")]
    pub full_name: String,
    #[schema(example = "mgarcia@universidad.edu")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,
    pub career_id: Option<Uuid>,
    pub university_member_id: Option<Uuid>,

    // Gate de login: usuário inativo não autentica nem acessa nada.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Carrera acadêmica; referenciada pelos usuários.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    pub id: Uuid,
    #[schema(example = "Ingeniería de Sistemas")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// Registro institucional opcional vinculado a um usuário.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversityMember {
    pub id: Uuid,
    #[schema(example = "UM-2025-0042")]
    pub member_code: String,
    #[schema(example = "Facultad de Ingeniería")]
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

// Dados para login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "El nombre de usuario es obligatorio."))]
    #[schema(example = "mgarcia")]
    pub username: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria."))]
    #[schema(example = "secreta123")]
    pub password: String,
}

// Dados para criação de usuário (somente admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 50, message = "El usuario debe tener entre 3 y 50 caracteres."))]
    pub username: String,
    #[validate(length(min = 1, max = 120, message = "El nombre es obligatorio."))]
    pub full_name: String,
    #[validate(email(message = "El correo electrónico es inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
    pub role: UserRole,
    pub career_id: Option<Uuid>,
    pub university_member_id: Option<Uuid>,
}

// Atualização parcial de usuário (somente admin). Campos ausentes não mudam.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, max = 120, message = "El nombre es obligatorio."))]
    pub full_name: Option<String>,
    #[validate(email(message = "El correo electrónico es inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub career_id: Option<Uuid>,
    pub university_member_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCareerPayload {
    #[validate(length(min = 1, max = 120, message = "El nombre de la carrera es obligatorio."))]
    pub name: String,
}

// --- Respostas ---

// Forma resumida de um usuário para aninhar em outros recursos
// (estudante/tutor de uma beca, técnico de um ticket).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.full_name.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// Resposta de login: identidade resumida + rota do painel + token Bearer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: UserRole,
    #[schema(example = "Administrador")]
    pub role_label: String,
    #[schema(example = "/admin")]
    pub dashboard_route: String,
    pub token: String,
}

impl LoginResponse {
    pub fn from_user(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.full_name.clone(),
            username: user.username.clone(),
            role: user.role,
            role_label: user.role.label().to_string(),
            dashboard_route: user.role.dashboard_route().to_string(),
            token,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rota_do_painel_acompanha_o_papel() {
        assert_eq!(UserRole::Admin.dashboard_route(), "/admin");
        assert_eq!(UserRole::Tutor.dashboard_route(), "/tutor");
        assert_eq!(UserRole::Director.dashboard_route(), "/director");
        assert_eq!(UserRole::Becario.dashboard_route(), "/becario");
    }

    #[test]
    fn rotulos_em_espanhol_por_papel() {
        assert_eq!(UserRole::Admin.label(), "Administrador");
        assert_eq!(UserRole::Director.label(), "Director de carrera");
    }

    #[test]
    fn papel_serializa_em_minusculas() {
        assert_eq!(
            serde_json::to_string(&UserRole::Becario).unwrap(),
            "\"becario\""
        );
    }

    #[test]
    fn usuario_nunca_serializa_o_hash_da_senha() {
        let user = User {
            id: Uuid::new_v4(),
            username: "mgarcia".into(),
            full_name: "María García".into(),
            email: "mgarcia@universidad.edu".into(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".into(),
            role: UserRole::Tutor,
            career_id: None,
            university_member_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["username"], "mgarcia");
        assert_eq!(json["fullName"], "María García");
    }
}
