//! Command-line interface
//!
//! ```bash
//! # Run the API
//! contacts serve --port 5000 --schema config.json
//!
//! # Validate a schema document
//! contacts check-schema config.json
//!
//! # Check a record against a schema
//! contacts check-record --schema config.json luke.yaml --skip id
//! ```
//!
//! Reports are printed to stdout as JSON; logs go to stderr.

pub mod commands;

pub use commands::{Cli, Commands, ServeOverrides};

use crate::error::ServerError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Valid input, or the server stopped cleanly
    Success = 0,
    /// The schema or record was rejected
    ValidationFailed = 1,
    /// Unreadable file, bad configuration or unusable schema
    InvalidInput = 3,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Run the CLI and return the exit code
pub async fn run(cli: Cli) -> Result<ExitCode, ServerError> {
    match cli.command {
        Commands::Serve {
            port,
            host,
            schema,
            upload_dir,
            database,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let overrides = ServeOverrides {
                port,
                host,
                schema,
                upload_dir,
                database,
            };
            commands::execute_serve(overrides.apply(config)).await
        }
        Commands::CheckSchema { file } => {
            let (code, report) = commands::execute_check_schema(&file)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(code)
        }
        Commands::CheckRecord {
            schema,
            record,
            skip,
        } => {
            let (code, report) = commands::execute_check_record(&schema, &record, &skip)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(code)
        }
    }
}
