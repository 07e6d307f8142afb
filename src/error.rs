use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("`{tool}` failed: {status}")]
    Tool { tool: String, status: ExitStatus },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{tool}` did not produce valid JSON: {source}")]
    ToolOutput {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} does not exist", .path.display())]
    MissingFile { path: PathBuf },

    #[error("{label} does not exist at {}", .path.display())]
    MissingDir { label: String, path: PathBuf },

    #[error("{} is not a git repository", .path.display())]
    NotCheckout { path: PathBuf },

    #[error("no genesis.raw.top table in raw spec produced from {}", .path.display())]
    MissingRawTop { path: PathBuf },

    #[error("--retester and --patch are mutually exclusive")]
    PatchConflict,

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
