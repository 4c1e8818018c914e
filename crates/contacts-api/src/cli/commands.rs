//! CLI command definitions and their execution

use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

use contacts_core::{validate_schema_document, Schema};

use super::ExitCode;
use crate::config::AppConfig;
use crate::error::{ServerError, ServerResult};

/// Contacts service
///
/// Serve the contacts API, or check schema documents and records offline.
#[derive(Parser, Debug)]
#[command(name = "contacts")]
#[command(about = "Schema-validated contact records", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "CONTACTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Schema document file
        #[arg(long, env = "CONFIG_FILE")]
        schema: Option<PathBuf>,

        /// Directory for uploaded files
        #[arg(long, env = "UPLOAD_FOLDER")]
        upload_dir: Option<PathBuf>,

        /// sled database directory
        #[arg(long, env = "DATABASE_PATH")]
        database: Option<PathBuf>,
    },

    /// Validate a schema document (JSON or YAML)
    CheckSchema {
        file: PathBuf,
    },

    /// Check a record (JSON or YAML) against a schema document
    CheckRecord {
        #[arg(short, long)]
        schema: PathBuf,

        record: PathBuf,

        /// Fields not checked, comma separated
        #[arg(long, value_delimiter = ',', default_value = "id")]
        skip: Vec<String>,
    },
}

/// Overrides given on the command line for `serve`
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub schema: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

impl ServeOverrides {
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(schema) = self.schema {
            config.schema_path = schema;
        }
        if let Some(upload_dir) = self.upload_dir {
            config.upload_dir = upload_dir;
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        config
    }
}

/// Configuration file if given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> ServerResult<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path),
        None => Ok(AppConfig::default()),
    }
}

/// Read a JSON or YAML document, chosen by file extension
pub fn read_document(path: &Path) -> ServerResult<Value> {
    let content = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Validate a schema document file, returning the exit code and a report
pub fn execute_check_schema(file: &Path) -> ServerResult<(ExitCode, Value)> {
    let document = read_document(file)?;
    match validate_schema_document(&document) {
        Ok(()) => {
            let fields = document.as_object().map_or(0, Map::len);
            Ok((ExitCode::Success, json!({ "valid": true, "fields": fields })))
        }
        Err(e) => Ok((ExitCode::ValidationFailed, json!({ "valid": false, "error": e }))),
    }
}

/// Check one record file against a schema document file
pub fn execute_check_record(
    schema: &Path,
    record: &Path,
    skip: &[String],
) -> ServerResult<(ExitCode, Value)> {
    let document = read_document(schema)?;
    let schema = match Schema::validated(&document) {
        Ok(schema) => schema,
        Err(e) => {
            tracing::warn!(error = %e, "schema document rejected");
            return Ok((ExitCode::InvalidInput, json!({ "valid": false, "error": e })));
        }
    };

    let Value::Object(instance) = read_document(record)? else {
        return Ok((
            ExitCode::InvalidInput,
            json!({ "valid": false, "error": "record must be an object" }),
        ));
    };

    let skip: Vec<&str> = skip.iter().map(String::as_str).collect();
    match schema.check(&instance, &skip) {
        Ok(()) => Ok((ExitCode::Success, json!({ "valid": true }))),
        Err(violation) => Ok((
            ExitCode::ValidationFailed,
            json!({ "valid": false, "error": violation }),
        )),
    }
}

/// Bind the listener and serve until ctrl-c
pub async fn execute_serve(config: AppConfig) -> ServerResult<ExitCode> {
    let addr = config.socket_addr()?;
    let state = crate::handler::AppState::open(config).await?;
    let router = crate::handler::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "contacts API listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("contacts API stopped");
    Ok(ExitCode::Success)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

impl From<ServerError> for ExitCode {
    fn from(err: ServerError) -> Self {
        if err.is_user_error() {
            ExitCode::InvalidInput
        } else {
            ExitCode::InternalError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "id": {"type": "integer", "primary_key": true, "required": true},
        "firstname": {"type": "str", "required": true},
        "tags": {"type": "list", "additional_type_parameters": {"inner_type": "str"}}
    }"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_cli_parses_check_record() {
        let cli = Cli::try_parse_from([
            "contacts",
            "check-record",
            "--schema",
            "config.json",
            "luke.json",
            "--skip",
            "id,photo",
        ])
        .unwrap();
        match cli.command {
            Commands::CheckRecord { skip, record, .. } => {
                assert_eq!(skip, ["id", "photo"]);
                assert_eq!(record, PathBuf::from("luke.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let overrides = ServeOverrides {
            port: Some(8000),
            schema: Some(PathBuf::from("schema.json")),
            ..ServeOverrides::default()
        };
        let config = overrides.apply(AppConfig::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.schema_path, PathBuf::from("schema.json"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_read_yaml_document_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.yaml",
            "zeta:\n  type: str\nalpha:\n  type: integer\n",
        );
        let document = read_document(&path).unwrap();
        let keys: Vec<&String> = document.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_check_schema() {
        let dir = tempfile::tempdir().unwrap();
        let valid = write(dir.path(), "valid.json", SCHEMA);
        let (code, report) = execute_check_schema(&valid).unwrap();
        assert_eq!(code, ExitCode::Success);
        assert_eq!(report["fields"], 3);

        let invalid = write(dir.path(), "invalid.json", r#"{"name": {"type": "str"}}"#);
        let (code, report) = execute_check_schema(&invalid).unwrap();
        assert_eq!(code, ExitCode::ValidationFailed);
        assert_eq!(report["error"]["param"], "primary_key");
    }

    #[test]
    fn test_check_record() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let skip = vec!["id".to_string()];

        let record = write(dir.path(), "ok.json", r#"{"firstname": "Luke"}"#);
        let (code, _) = execute_check_record(&schema, &record, &skip).unwrap();
        assert_eq!(code, ExitCode::Success);

        let record = write(dir.path(), "missing.json", r#"{"firstname": ""}"#);
        let (code, report) = execute_check_record(&schema, &record, &skip).unwrap();
        assert_eq!(code, ExitCode::ValidationFailed);
        assert_eq!(report["error"]["code"], "missing_required_value");

        let record = write(
            dir.path(),
            "tags.yaml",
            "firstname: Luke\ntags:\n  - jedi\n  - 3\n",
        );
        let (code, report) = execute_check_record(&schema, &record, &skip).unwrap();
        assert_eq!(code, ExitCode::ValidationFailed);
        assert_eq!(report["error"]["field"], "tags");
        assert_eq!(report["error"]["expected_type"], "str");
    }

    #[test]
    fn test_check_record_with_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", r#"{"tags": {"type": "list"}}"#);
        let record = write(dir.path(), "record.json", "{}");
        let (code, _) = execute_check_record(&schema, &record, &[]).unwrap();
        assert_eq!(code, ExitCode::InvalidInput);
    }

    #[test]
    fn test_missing_file_is_user_error() {
        let err = execute_check_schema(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert_eq!(ExitCode::from(err), ExitCode::InvalidInput);
    }
}
