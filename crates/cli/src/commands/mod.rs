pub mod campaign;
pub mod config;
pub mod dashboard;
pub mod deals;
pub mod insights;
pub mod recommend;
pub mod seed;

use std::fs;
use std::path::Path;

use affinity_core::config::AppConfig;
use affinity_core::engine::Engine;
use affinity_core::errors::{DomainError, ErrorKind};
use affinity_core::snapshot;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_kind: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_kind: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_kind: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_kind: Some(error_kind.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_domain_error(command: &str, error: &DomainError) -> Self {
        let (label, exit_code) = match error.kind() {
            ErrorKind::Validation => ("validation", 2),
            ErrorKind::NotFound => ("not_found", 3),
            ErrorKind::State => ("state", 4),
        };
        Self::failure(command, label, error.to_string(), exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_kind\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads the snapshot file and rebuilds the engine around it. Load failures
/// are fatal to the command: no engine is handed out over partial state.
pub(crate) fn load_engine(
    config: &AppConfig,
    store: &Path,
    command: &str,
) -> Result<Engine, CommandResult> {
    if !store.exists() {
        return Err(CommandResult::failure(
            command,
            "store_missing",
            format!("store file `{}` not found; run `affinity seed` first", store.display()),
            5,
        ));
    }
    let blob = fs::read_to_string(store).map_err(|error| {
        CommandResult::failure(
            command,
            "store_io",
            format!("could not read `{}`: {error}", store.display()),
            5,
        )
    })?;
    let state = snapshot::deserialize_state(&blob)
        .map_err(|error| CommandResult::from_domain_error(command, &error))?;
    Ok(Engine::with_state(
        config.engine.clone(),
        config.engine.signals.build_provider(),
        state,
    ))
}

/// Writes the snapshot atomically: temp file in the same directory, then
/// rename over the target.
pub(crate) fn save_engine(
    engine: &Engine,
    store: &Path,
    command: &str,
) -> Result<(), CommandResult> {
    let blob = snapshot::serialize_state(&engine.export_state())
        .map_err(|error| CommandResult::from_domain_error(command, &error))?;

    let tmp = store.with_extension("json.tmp");
    let io_failure = |error: std::io::Error| {
        CommandResult::failure(
            command,
            "store_io",
            format!("could not write `{}`: {error}", store.display()),
            5,
        )
    };
    fs::write(&tmp, blob).map_err(io_failure)?;
    fs::rename(&tmp, store).map_err(io_failure)?;
    Ok(())
}

/// Cosmetic processing beat for interactive runs. Never correctness-bearing;
/// skipped entirely unless the user opted in with `--pace`.
pub(crate) async fn pace(enabled: bool) {
    if enabled {
        tokio::time::sleep(std::time::Duration::from_millis(600)).await;
    }
}
