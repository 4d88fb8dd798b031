//! Error types for the entry point.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing the container.
///
/// Remote lookup failures are represented here too, but the overlay engine
/// never propagates them: they are logged and treated as "no value".
#[derive(Debug, Error)]
pub enum EntrypointError {
    /// The configuration file must exist before the overlay runs.
    #[error("configuration file not found: {}", .0.display())]
    ConfigFileMissing(PathBuf),

    /// The template used to seed a missing configuration file is absent.
    #[error("configuration template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Renaming the rewritten temporary file over the original failed.
    #[error("failed to replace {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid entry point settings: {0}")]
    Settings(String),

    #[error("unknown system user: {0}")]
    UnknownUser(String),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("failed to exec {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl EntrypointError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn settings(message: impl std::fmt::Display) -> Self {
        Self::Settings(message.to_string())
    }
}

impl From<redis::RedisError> for EntrypointError {
    fn from(err: redis::RedisError) -> Self {
        EntrypointError::Remote(err.to_string())
    }
}

/// Result type for entry point operations.
pub type Result<T> = std::result::Result<T, EntrypointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message_names_path() {
        let err = EntrypointError::ConfigFileMissing(PathBuf::from("/home/odoo/.openerp_serverrc"));
        assert_eq!(
            err.to_string(),
            "configuration file not found: /home/odoo/.openerp_serverrc"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EntrypointError::io("/tmp/x", inner);
        assert!(err.to_string().contains("/tmp/x"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
