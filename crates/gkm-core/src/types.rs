//! Core types used across git-key-manager

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named key in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    /// Friendly name (e.g. "work", "personal")
    pub name: String,
    /// Private key path, possibly starting with `~`
    pub path: String,
}

/// Snapshot of what the agent currently holds
///
/// Derived on demand from the agent and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Number of identities the agent reports
    pub loaded_count: usize,
    /// Registry name of the key most recently loaded by this process
    pub active_key: Option<String>,
}

impl AgentStatus {
    /// Status reported when the agent holds nothing or cannot be reached
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any identity is loaded
    pub fn has_keys(&self) -> bool {
        self.loaded_count > 0
    }

    /// Derived agent state for this snapshot
    pub fn state(&self) -> AgentState {
        if self.has_keys() {
            AgentState::KeyLoaded
        } else {
            AgentState::AgentIdle
        }
    }

    /// Short human-readable summary
    pub fn summary(&self) -> String {
        if !self.has_keys() {
            return "No keys loaded".to_string();
        }
        match &self.active_key {
            Some(name) => format!("{} key(s) loaded (active: {})", self.loaded_count, name),
            None => format!("{} key(s) loaded", self.loaded_count),
        }
    }
}

/// Agent state as perceived from the outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// No agent reachable
    NoAgent,
    /// Agent running without identities
    AgentIdle,
    /// At least one identity loaded
    KeyLoaded,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::NoAgent => write!(f, "no agent"),
            AgentState::AgentIdle => write!(f, "idle"),
            AgentState::KeyLoaded => write!(f, "key loaded"),
        }
    }
}

/// Result of asking the agent for its identities (`ssh-add -l`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityList {
    /// One entry per identity line
    Identities(Vec<String>),
    /// Agent reachable, nothing loaded
    NoIdentities,
    /// No agent reachable
    NoAgent,
}

impl IdentityList {
    /// Exit code `ssh-add -l` uses when it cannot reach an agent
    pub const NO_AGENT_EXIT_CODE: i32 = 2;

    /// Interpret the exit code and stdout of `ssh-add -l`
    ///
    /// Any failure other than the no-agent code means the agent is reachable
    /// but holds no identities.
    pub fn from_output(exit_code: Option<i32>, stdout: &str) -> Self {
        match exit_code {
            Some(0) => {
                let lines: Vec<String> = stdout
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();
                if lines.is_empty() {
                    IdentityList::NoIdentities
                } else {
                    IdentityList::Identities(lines)
                }
            }
            Some(Self::NO_AGENT_EXIT_CODE) => IdentityList::NoAgent,
            _ => IdentityList::NoIdentities,
        }
    }

    /// Number of identities listed
    pub fn count(&self) -> usize {
        match self {
            IdentityList::Identities(lines) => lines.len(),
            _ => 0,
        }
    }
}

/// Environment published by `ssh-agent -s`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentEnv {
    /// Value for `SSH_AUTH_SOCK`
    pub auth_sock: Option<String>,
    /// Value for `SSH_AGENT_PID`
    pub agent_pid: Option<u32>,
}

impl AgentEnv {
    /// Parse Bourne-shell output such as
    /// `SSH_AUTH_SOCK=/tmp/ssh-XYZ/agent.42; export SSH_AUTH_SOCK;`
    ///
    /// Returns `None` when neither variable is present.
    pub fn parse(output: &str) -> Option<Self> {
        let mut env = AgentEnv::default();

        for statement in output.split(|c: char| c == ';' || c == '\n') {
            let Some((key, value)) = statement.trim().split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "SSH_AUTH_SOCK" if !value.is_empty() => env.auth_sock = Some(value.to_string()),
                "SSH_AGENT_PID" => env.agent_pid = value.parse().ok(),
                _ => {}
            }
        }

        if env.auth_sock.is_none() && env.agent_pid.is_none() {
            None
        } else {
            Some(env)
        }
    }

    /// Shell lines exporting this environment
    pub fn export_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(sock) = &self.auth_sock {
            lines.push(format!("export SSH_AUTH_SOCK={}", sock));
        }
        if let Some(pid) = self.agent_pid {
            lines.push(format!("export SSH_AGENT_PID={}", pid));
        }
        lines
    }
}

/// Outcome of making sure an agent is reachable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentPresence {
    /// An agent was already answering
    Running,
    /// A new agent was started, with its environment if it printed one
    Started(Option<AgentEnv>),
}

/// Raw output of the remote authentication test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthProbe {
    /// Exit code of the SSH client (Git hosts usually exit 1 on success)
    pub exit_code: Option<i32>,
    /// Diagnostic text written by the SSH client
    pub diagnostics: String,
}

/// Identity confirmed by a remote Git host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentity {
    /// Host that was tested
    pub host: String,
    /// Username the host greeted us with, or `"unknown"`
    pub username: String,
}
