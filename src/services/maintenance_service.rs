// src/services/maintenance_service.rs
//
// Ações administrativas sob demanda, despachadas por chave de texto para
// um enum fechado. Idempotentes e fora do caminho quente de requisições.
// Todo artefato é escrito em arquivo temporário e renomeado no final:
// uma falha de disco nunca deixa artefato parcial no caminho definitivo.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::common::error::AppError;
use crate::db::{
    AuditRepository, EvaluationRepository, ParametersRepository, ReportRepository,
    ScholarshipRepository, TicketRepository, UserRepository,
};
use crate::models::audit::NewAuditEntry;
use crate::models::auth::User;
use crate::models::report::ReportStatus;

const MODULE_MANTENIMIENTO: &str = "mantenimiento";

// Diretórios de trabalho que o clean-temp esvazia e recria.
const WORK_DIRS: [&str; 3] = ["tmp", "tmp/uploads", "tmp/exports"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    Backup,
    CleanTemp,
    RecalculateMetrics,
}

impl MaintenanceAction {
    // Chave externa → variante. Chave desconhecida é erro de argumento,
    // não um caso silencioso.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "backup" => Some(Self::Backup),
            "clean-temp" => Some(Self::CleanTemp),
            "recalculate-metrics" => Some(Self::RecalculateMetrics),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::CleanTemp => "clean-temp",
            Self::RecalculateMetrics => "recalculate-metrics",
        }
    }
}

// Resumo de métricas com os rótulos em espanhol que as telas exibem.
// Só aparecem os estados presentes no banco.
fn metrics_summary(
    counts: &[(ReportStatus, i64)],
    active_users: i64,
    generated_at: DateTime<Utc>,
) -> serde_json::Value {
    let mut by_status = serde_json::Map::new();
    for (status, count) in counts {
        by_status.insert(
            status.display_label().to_string(),
            serde_json::json!(count),
        );
    }
    serde_json::json!({
        "generadoEn": generated_at.to_rfc3339(),
        "reportesPorEstado": by_status,
        "usuariosActivos": active_users,
    })
}

// Escreve no `.tmp` ao lado e renomeia por cima. O rename é atômico no
// mesmo sistema de arquivos.
async fn write_json_atomic(path: &Path, value: &serde_json::Value) -> Result<(), AppError> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::InvalidArgument("Ruta de artefacto sin directorio.".into()))?;
    tokio::fs::create_dir_all(parent).await?;

    let tmp_path = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(&tmp_path, &body).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

// Esvazia e recria os diretórios de trabalho. Seguro de rodar de novo.
async fn reset_work_dirs(root: &Path) -> Result<Vec<String>, AppError> {
    for dir in WORK_DIRS {
        let path = root.join(dir);
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    for dir in WORK_DIRS {
        tokio::fs::create_dir_all(root.join(dir)).await?;
    }
    Ok(WORK_DIRS.iter().map(|d| d.to_string()).collect())
}

#[derive(Clone)]
pub struct MaintenanceService {
    storage_dir: PathBuf,
    parameters_repo: ParametersRepository,
    user_repo: UserRepository,
    scholarship_repo: ScholarshipRepository,
    report_repo: ReportRepository,
    evaluation_repo: EvaluationRepository,
    ticket_repo: TicketRepository,
    audit_repo: AuditRepository,
}

impl MaintenanceService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage_dir: PathBuf,
        parameters_repo: ParametersRepository,
        user_repo: UserRepository,
        scholarship_repo: ScholarshipRepository,
        report_repo: ReportRepository,
        evaluation_repo: EvaluationRepository,
        ticket_repo: TicketRepository,
        audit_repo: AuditRepository,
    ) -> Self {
        Self {
            storage_dir,
            parameters_repo,
            user_repo,
            scholarship_repo,
            report_repo,
            evaluation_repo,
            ticket_repo,
            audit_repo,
        }
    }

    pub async fn run(&self, actor: &User, action_key: &str) -> Result<String, AppError> {
        let action = MaintenanceAction::from_key(action_key).ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "Acción de mantenimiento desconocida: {action_key}."
            ))
        })?;

        let message = match action {
            MaintenanceAction::Backup => self.backup().await?,
            MaintenanceAction::CleanTemp => self.clean_temp().await?,
            MaintenanceAction::RecalculateMetrics => self.recalculate_metrics().await?,
        };

        self.audit_repo
            .insert_best_effort(&NewAuditEntry::success(
                Some(actor.id),
                MODULE_MANTENIMIENTO,
                action.key(),
                None,
                Some(serde_json::json!({ "mensaje": message })),
            ))
            .await;

        tracing::info!("Mantenimiento {}: {}", action.key(), message);
        Ok(message)
    }

    // Parâmetros do sistema + totais agregados num JSON com carimbo de hora.
    async fn backup(&self) -> Result<String, AppError> {
        let parameters = self.parameters_repo.get().await?;
        let generated_at = Utc::now();

        let artifact = serde_json::json!({
            "generadoEn": generated_at.to_rfc3339(),
            "parametros": serde_json::to_value(&parameters)?,
            "totales": {
                "usuariosActivos": self.user_repo.count_active().await?,
                "becas": self.scholarship_repo.count().await?,
                "reportes": self.report_repo.count().await?,
                "evaluaciones": self.evaluation_repo.count().await?,
                "tickets": self.ticket_repo.count().await?,
            },
        });

        let file_name = format!(
            "system-backup-{}.json",
            generated_at.format("%Y-%m-%d_%H-%M-%S")
        );
        let path = self.storage_dir.join("backups").join(&file_name);
        write_json_atomic(&path, &artifact).await?;

        Ok(format!("Respaldo generado en backups/{file_name}."))
    }

    async fn clean_temp(&self) -> Result<String, AppError> {
        let recreated = reset_work_dirs(&self.storage_dir).await?;
        Ok(format!(
            "Directorios de trabajo recreados: {}.",
            recreated.join(", ")
        ))
    }

    async fn recalculate_metrics(&self) -> Result<String, AppError> {
        let counts = self.report_repo.counts_by_status().await?;
        let active_users = self.user_repo.count_active().await?;
        let summary = metrics_summary(&counts, active_users, Utc::now());

        let path = self
            .storage_dir
            .join("maintenance")
            .join("metrics-summary.json");
        write_json_atomic(&path, &summary).await?;

        Ok("Resumen de métricas recalculado en maintenance/metrics-summary.json.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaves_conhecidas_mapeiam_e_desconhecida_nao() {
        assert_eq!(
            MaintenanceAction::from_key("backup"),
            Some(MaintenanceAction::Backup)
        );
        assert_eq!(
            MaintenanceAction::from_key("clean-temp"),
            Some(MaintenanceAction::CleanTemp)
        );
        assert_eq!(
            MaintenanceAction::from_key("recalculate-metrics"),
            Some(MaintenanceAction::RecalculateMetrics)
        );
        assert_eq!(MaintenanceAction::from_key("optimize-db"), None);
    }

    #[test]
    fn resumo_de_metricas_conta_por_rotulo_em_espanhol() {
        // 3 becas com reportes divididos em 2 Pendiente / 1 Aprobado
        let counts = vec![(ReportStatus::Pending, 2i64), (ReportStatus::Approved, 1i64)];
        let summary = metrics_summary(&counts, 5, Utc::now());

        assert_eq!(
            summary["reportesPorEstado"],
            serde_json::json!({ "Pendiente": 2, "Aprobado": 1 })
        );
        assert_eq!(summary["usuariosActivos"], 5);
        assert!(summary["generadoEn"].is_string());
    }

    #[tokio::test]
    async fn escrita_atomica_nao_deixa_temporario_para_tras() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maintenance").join("metrics-summary.json");

        let value = serde_json::json!({ "ok": true });
        write_json_atomic(&path, &value).await.unwrap();

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, value);

        let tmp = path.with_extension("json.tmp");
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn escrita_atomica_substitui_o_artefato_anterior() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumen.json");

        write_json_atomic(&path, &serde_json::json!({ "v": 1 })).await.unwrap();
        write_json_atomic(&path, &serde_json::json!({ "v": 2 })).await.unwrap();

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["v"], 2);
    }

    #[tokio::test]
    async fn clean_temp_esvazia_e_recria_os_diretorios() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("tmp").join("uploads");
        tokio::fs::create_dir_all(&uploads).await.unwrap();
        tokio::fs::write(uploads.join("basura.bin"), b"x").await.unwrap();

        let recreated = reset_work_dirs(dir.path()).await.unwrap();
        assert_eq!(recreated, vec!["tmp", "tmp/uploads", "tmp/exports"]);

        assert!(uploads.exists());
        assert!(!uploads.join("basura.bin").exists());
        assert!(dir.path().join("tmp").join("exports").exists());

        // rodar de novo não falha (idempotência)
        reset_work_dirs(dir.path()).await.unwrap();
    }
}
