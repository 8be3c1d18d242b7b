use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PulseError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run `{program}`: {source}")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("not supported on {0} distributions")]
    Unsupported(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("backup failed: {0}")]
    Backup(String),

    #[error("cancelled by user")]
    Cancelled,
}

impl PulseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PulseError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
