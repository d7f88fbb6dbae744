// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, LoginResponse, User},
};

// Funções livres de pool para emitir e validar tokens; o service só
// acrescenta a ida ao banco.
pub fn create_token(jwt_secret: &str, user_id: Uuid) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(7);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

pub fn decode_token(jwt_secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    // Login por username. Usuário inexistente e senha errada produzem a
    // MESMA resposta (nunca revelamos qual dos dois falhou); usuário
    // inativo é barrado depois de validar a senha.
    pub async fn login_user(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Bcrypt é caro de propósito; roda fora do executor async.
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::InactiveUser);
        }

        let token = create_token(&self.jwt_secret, user.id)?;
        Ok(LoginResponse::from_user(&user, token))
    }

    // Valida o Bearer token e recarrega o usuário: a revogação acontece
    // via is_active, então o token sozinho não basta.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InactiveUser);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_emitido_decodifica_para_o_mesmo_usuario() {
        let user_id = Uuid::new_v4();
        let token = create_token("segredo-de-teste", user_id).unwrap();
        let claims = decode_token("segredo-de-teste", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_com_segredo_errado_e_rejeitado() {
        let token = create_token("segredo-a", Uuid::new_v4()).unwrap();
        let result = decode_token("segredo-b", &token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn token_mal_formado_e_rejeitado() {
        let result = decode_token("segredo", "nao.e.um.jwt");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
