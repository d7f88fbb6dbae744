// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Resultados possíveis de uma entrada de auditoria.
pub const OUTCOME_SUCCESS: &str = "exito";
pub const OUTCOME_REJECTED: &str = "rechazado";

// Trilha append-only: nunca existe caminho de update ou delete para ela.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "cerrar_beca")]
    pub action: String,
    #[schema(example = "becas")]
    pub module: String,
    #[schema(example = "exito")]
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub before_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub after_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

// Entrada ainda não persistida; os repositórios só a inserem.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub module: String,
    pub outcome: String,
    pub before_data: Option<serde_json::Value>,
    pub after_data: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn success(
        user_id: Option<Uuid>,
        module: &str,
        action: &str,
        before_data: Option<serde_json::Value>,
        after_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            user_id,
            action: action.to_string(),
            module: module.to_string(),
            outcome: OUTCOME_SUCCESS.to_string(),
            before_data,
            after_data,
        }
    }

    pub fn rejected(user_id: Option<Uuid>, module: &str, action: &str, reason: &str) -> Self {
        Self {
            user_id,
            action: action.to_string(),
            module: module.to_string(),
            outcome: OUTCOME_REJECTED.to_string(),
            before_data: None,
            after_data: Some(serde_json::json!({ "motivo": reason })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entrada_rejeitada_guarda_o_motivo() {
        let entry = NewAuditEntry::rejected(None, "becas", "archivar_beca", "Orden inválido.");
        assert_eq!(entry.outcome, OUTCOME_REJECTED);
        assert_eq!(entry.after_data.unwrap()["motivo"], "Orden inválido.");
    }

    #[test]
    fn log_serializa_em_camel_case() {
        let log = AuditLog {
            id: Uuid::new_v4(),
            user_id: None,
            action: "cerrar_beca".into(),
            module: "becas".into(),
            outcome: OUTCOME_SUCCESS.into(),
            before_data: None,
            after_data: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("beforeData").is_none());
    }
}
