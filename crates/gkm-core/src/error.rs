//! Core error types for git-key-manager

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for git-key-manager
#[derive(Error, Debug)]
pub enum GkmError {
    /// Registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Agent error
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Remote authentication error
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registry document could not be written
    #[error("Failed to write registry {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry could not be serialized
    #[error("Failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key name is empty or blank
    #[error("Invalid key name: {0:?}")]
    InvalidName(String),

    /// No key registered under this name
    #[error("Key not found: {0}")]
    NotFound(String),
}

/// Non-fatal condition raised while loading the registry.
///
/// The registry falls back to empty when one of these occurs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryWarning {
    /// Document exists but is not a JSON object of strings
    #[error("Ignoring malformed registry {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Document exists but could not be read
    #[error("Ignoring unreadable registry {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// SSH agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Resolved key path does not exist
    #[error("Key file not found: {}", .0.display())]
    KeyFileNotFound(PathBuf),

    /// External tool exited with a failure status
    #[error("{command} failed: {detail}")]
    Invocation { command: String, detail: String },

    /// External tool could not be started
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// External tool did not exit in time
    #[error("{command} did not respond within {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    /// Name is not present in the registry
    #[error("No key registered as '{0}'")]
    UnknownKey(String),
}

/// Remote authentication test errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Host answered without the confirmation phrase
    #[error("Authentication to {host} failed: {detail}")]
    Rejected { host: String, detail: String },

    /// Host did not answer before the deadline
    #[error("No response from {host} within {}s", .after.as_secs())]
    NoResponse { host: String, after: Duration },

    /// SSH client could not be run
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_file_not_found_message() {
        let err = AgentError::KeyFileNotFound(PathBuf::from("/home/me/.ssh/id_work"));
        assert_eq!(err.to_string(), "Key file not found: /home/me/.ssh/id_work");
    }

    #[test]
    fn test_invocation_keeps_detail_verbatim() {
        let err = AgentError::Invocation {
            command: "ssh-add".to_string(),
            detail: "Error loading key \"/k\": invalid format\n".to_string(),
        };
        assert!(err
            .to_string()
            .ends_with("Error loading key \"/k\": invalid format\n"));
    }

    #[test]
    fn test_errors_convert_into_top_level() {
        let err: GkmError = RegistryError::NotFound("work".to_string()).into();
        assert_eq!(err.to_string(), "Registry error: Key not found: work");

        let err: GkmError = AuthError::from(AgentError::UnknownKey("x".to_string())).into();
        assert_eq!(
            err.to_string(),
            "Authentication error: No key registered as 'x'"
        );
    }

    #[test]
    fn test_timeout_and_rejection_are_distinct() {
        let timeout = AuthError::NoResponse {
            host: "git@github.com".to_string(),
            after: Duration::from_secs(10),
        };
        let rejected = AuthError::Rejected {
            host: "git@github.com".to_string(),
            detail: "Permission denied (publickey).".to_string(),
        };
        assert_eq!(
            timeout.to_string(),
            "No response from git@github.com within 10s"
        );
        assert!(rejected.to_string().contains("Permission denied"));
    }
}
