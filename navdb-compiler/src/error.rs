use std::path::PathBuf;

use bgl_reader::BglError;
use navdata_schema::ConfigError;
use thiserror::Error;

use crate::scenery::SceneryError;

/// Errors that stop a compile run. Problems of single files or records are
/// collected in `NavDatabaseErrors` instead.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scenery(#[from] SceneryError),

    #[error(transparent)]
    Bgl(#[from] BglError),

    #[error("invalid base path {path}: {reason}")]
    InvalidBasePath { path: PathBuf, reason: String },

    #[error("invalid scenery configuration {path}: {reason}")]
    InvalidSceneryConfig { path: PathBuf, reason: String },

    #[error("cannot encode geometry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no SQL script named {0}")]
    UnknownScript(String),
}

impl CompilerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T, E = CompilerError> = std::result::Result<T, E>;
