// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. O Trait que define um recorte de papéis permitidos
pub trait RoleGate: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
    // Texto que aparece no erro 403
    fn describe() -> &'static str;
}

/// 2. O Extractor (Guardião)
///
/// Usado como argumento extra do handler; a rota só executa se o
/// usuário inserido pelo auth_guard passar no recorte.
pub struct RequireRole<T>(pub User, pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleGate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O auth_guard roda antes e deixa o usuário nos extensions.
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        if !T::allows(user.role) {
            return Err(AppError::Forbidden(format!(
                "Esta acción requiere rol de {}.",
                T::describe()
            )));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS RECORTES (TIPOS)
// ---

pub struct AdminOnly;
impl RoleGate for AdminOnly {
    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin
    }
    fn describe() -> &'static str {
        "administrador"
    }
}

pub struct AdminOrDirector;
impl RoleGate for AdminOrDirector {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Admin | UserRole::Director)
    }
    fn describe() -> &'static str {
        "administrador o director de carrera"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_only_rechaza_os_demais_papeis() {
        assert!(AdminOnly::allows(UserRole::Admin));
        assert!(!AdminOnly::allows(UserRole::Director));
        assert!(!AdminOnly::allows(UserRole::Tutor));
        assert!(!AdminOnly::allows(UserRole::Becario));
    }

    #[test]
    fn admin_or_director_aceita_ambos() {
        assert!(AdminOrDirector::allows(UserRole::Admin));
        assert!(AdminOrDirector::allows(UserRole::Director));
        assert!(!AdminOrDirector::allows(UserRole::Tutor));
        assert!(!AdminOrDirector::allows(UserRole::Becario));
    }
}
