// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Toda falha é recuperada na borda HTTP e vira um corpo JSON estruturado;
// nada aqui derruba o processo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regra de ciclo de vida violada (transição fora de ordem, gate de
    // reporte, beca arquivada). A mensagem nomeia a regra específica.
    #[error("Transição inválida: {0}")]
    InvalidTransition(String),

    // Argumento fora do domínio esperado (ação de manutenção desconhecida,
    // decisão de revisão inválida...)
    #[error("Argumento inválido: {0}")]
    InvalidArgument(String),

    // Login com usuário ou senha errados. Vira erro de campo em `username`,
    // sem revelar qual dos dois falhou.
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Usuário inativo")]
    InactiveUser,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Recurso não encontrado: {0}")]
    NotFound(String),

    // Violação de unicidade (código de beca, número de reporte, evaluación)
    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização")]
    SerializationError(#[from] serde_json::Error),

    // Falha de infraestrutura nos jobs de manutenção (disco, diretórios).
    // O job aborta sem deixar artefato parcial no caminho final.
    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            // O contrato de login: 422 com erro de campo em `username`,
            // mesma resposta para usuário inexistente e senha errada.
            AppError::InvalidCredentials => {
                let body = Json(json!({
                    "error": "Las credenciales proporcionadas son incorrectas.",
                    "details": { "username": ["Las credenciales proporcionadas son incorrectas."] },
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            AppError::InvalidTransition(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InvalidArgument(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InactiveUser => (
                StatusCode::UNAUTHORIZED,
                "El usuario está inactivo.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente.".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),

            // Todos os outros (banco, storage, interno) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro interno do servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credenciais_invalidas_viram_422() {
        let resp = AppError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn taxonomia_mapeia_os_status_http_esperados() {
        assert_eq!(
            AppError::NotFound("Beca no encontrada.".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("Código duplicado.".into())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidTransition("Orden inválido.".into())
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InactiveUser.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("Solo administradores.".into())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
    }
}
