pub mod airports;
pub mod config;
pub mod conversation;
pub mod migrate;
pub mod turn;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tripline_core::config::{AppConfig, LoadOptions, StorageBackend, StorageConfig};
use tripline_db::{
    connect_with_settings, migrations, FileTripContextRepository, InMemoryTripContextRepository,
    SqlTripContextRepository, TripContextRepository,
};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with(command, message, None)
    }

    pub fn success_with(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Opens the configured context store. SQLite stores are migrated before use.
pub(crate) async fn open_store(
    storage: &StorageConfig,
) -> anyhow::Result<Box<dyn TripContextRepository>> {
    Ok(match storage.backend {
        StorageBackend::Memory => Box::new(InMemoryTripContextRepository::default()),
        StorageBackend::File => Box::new(FileTripContextRepository::new(storage.path.clone())),
        StorageBackend::Sqlite => {
            let pool = connect_with_settings(
                &storage.database_url,
                storage.max_connections,
                storage.timeout_secs,
            )
            .await
            .with_context(|| format!("failed to open {}", storage.database_url))?;
            migrations::run_pending(&pool).await.context("failed to apply migrations")?;
            Box::new(SqlTripContextRepository::new(pool))
        }
    })
}
