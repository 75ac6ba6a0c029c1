use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the settings store.
///
/// Read failures on load are recovered inside the store and never show up
/// here. Everything else propagates to the caller.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("top level of {} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("invalid value for `{key}`: {source}")]
    Invalid {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not determine home directory")]
    NoHomeDir,
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
