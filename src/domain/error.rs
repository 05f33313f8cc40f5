//! Error types for the edges of diffpane.
//!
//! The diff model itself never fails: parsing and row building degrade to
//! smaller output. These errors belong to the collaborators that feed it
//! (diff acquisition, full-file loading, configuration).

use thiserror::Error;

/// Errors raised while acquiring diff text or full file contents.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Could not find '{0}' executable")]
    BinaryNotFound(String),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_message_includes_stderr() {
        let err = SourceError::CommandFailed {
            command: "git diff".into(),
            stderr: "fatal: bad revision".into(),
        };
        assert_eq!(err.to_string(), "git diff failed: fatal: bad revision");
    }

    #[test]
    fn missing_binary_names_the_executable() {
        let err = SourceError::BinaryNotFound("git".into());
        assert_eq!(err.to_string(), "Could not find 'git' executable");
    }
}
