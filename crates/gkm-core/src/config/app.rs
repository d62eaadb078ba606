//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::duration_secs;
use crate::paths::default_registry_path;

/// Configuration for git-key-manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Location of the key registry document
    pub registry_path: PathBuf,

    /// Remote used by the authentication test (e.g. `git@github.com`)
    pub auth_host: String,

    /// Interval between agent status refreshes
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,

    /// Deadline for the remote authentication test
    #[serde(with = "duration_secs")]
    pub auth_timeout: Duration,

    /// Deadline for every other agent invocation
    #[serde(with = "duration_secs")]
    pub command_timeout: Duration,

    /// External SSH binaries
    pub binaries: Binaries,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            auth_host: "git@github.com".to_string(),
            poll_interval: Duration::from_secs(5),
            auth_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(5),
            binaries: Binaries::default(),
        }
    }
}

/// Names or paths of the OpenSSH tools that get invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Binaries {
    pub ssh_add: String,
    pub ssh_agent: String,
    pub ssh: String,
}

impl Default for Binaries {
    fn default() -> Self {
        Self {
            ssh_add: "ssh-add".to_string(),
            ssh_agent: "ssh-agent".to_string(),
            ssh: "ssh".to_string(),
        }
    }
}
