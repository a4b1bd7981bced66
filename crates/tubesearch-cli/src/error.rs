use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tubesearch_core::models::CoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.message)]
    Core(#[from] CoreError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },
    #[error("could not install logger: {0}")]
    Logging(String),
}
