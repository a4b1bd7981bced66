use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const DEFAULT_FILTER: &str = "tubesearch_core=info,tubesearch_cli=info";

/// Routes `tracing` output to `path`. Stdout belongs to the terminal UI.
pub fn init(path: &Path) -> Result<(), CliError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| CliError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}
