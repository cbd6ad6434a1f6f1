use std::path::PathBuf;

use registrar_core::StoreError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures a command can report in its JSON envelope.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] registrar_core::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open database: {0}")]
    Open(StoreError),

    #[error("failed to read batch file {}: {source}", path.display())]
    BatchRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid batch file {}: {source}", path.display())]
    BatchParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CliError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::Config(_) => "CONFIG_ERROR",
            Self::Open(_) => "DATABASE_UNAVAILABLE",
            Self::BatchRead { .. } | Self::BatchParse { .. } => "INVALID_BATCH",
        }
    }

    /// 1 for rejected requests, 2 for bad configuration or batch input,
    /// 3 when the store is unavailable.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) => e.exit_code(),
            Self::Config(_) | Self::BatchRead { .. } | Self::BatchParse { .. } => 2,
            Self::Open(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
