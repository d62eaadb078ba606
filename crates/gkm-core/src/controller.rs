//! Agent controller
//!
//! Translates registry entries into agent operations and normalizes agent
//! responses into [`AgentStatus`] snapshots.
//!
//! The agent only reports fingerprints, so the controller remembers the name
//! of the last key it loaded and reports that as the active key for as long
//! as the agent still holds identities.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::agent::SshAgentClient;
use crate::error::{AgentError, AuthError};
use crate::paths::expand_home;
use crate::registry::KeyRegistry;
use crate::types::{AgentPresence, AgentState, AgentStatus, IdentityList, RemoteIdentity};

/// Phrase Git hosts print after a successful key-only login
pub const AUTH_CONFIRMATION: &str = "successfully authenticated";

/// Username reported when the greeting can't be parsed
pub const UNKNOWN_USER: &str = "unknown";

/// Longest diagnostic excerpt attached to a rejected authentication
pub const MAX_AUTH_DETAIL_CHARS: usize = 200;

/// Drives the SSH agent on behalf of the presentation layer
pub struct AgentController {
    client: Arc<dyn SshAgentClient>,
    registry: Arc<RwLock<KeyRegistry>>,
    /// Name of the last key loaded by this controller
    last_loaded: Mutex<Option<String>>,
    command_timeout: Duration,
    auth_timeout: Duration,
}

impl std::fmt::Debug for AgentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentController")
            .field("command_timeout", &self.command_timeout)
            .field("auth_timeout", &self.auth_timeout)
            .finish_non_exhaustive()
    }
}

impl AgentController {
    pub fn new(
        client: Arc<dyn SshAgentClient>,
        registry: Arc<RwLock<KeyRegistry>>,
        command_timeout: Duration,
        auth_timeout: Duration,
    ) -> Self {
        Self {
            client,
            registry,
            last_loaded: Mutex::new(None),
            command_timeout,
            auth_timeout,
        }
    }

    /// Make sure an agent answers, starting one if none is reachable
    pub async fn ensure_agent_running(&self) -> Result<AgentPresence, AgentError> {
        match self
            .bounded("ssh-add -l", self.client.list_identities())
            .await?
        {
            IdentityList::NoAgent => {
                tracing::info!("SSH agent not running. Starting it...");
                let env = self
                    .bounded("ssh-agent -s", self.client.start_agent())
                    .await?;
                Ok(AgentPresence::Started(env))
            }
            _ => Ok(AgentPresence::Running),
        }
    }

    /// Load the key at `path` into the agent, remembering it as `name`
    ///
    /// A leading `~` is expanded. A missing file is reported without calling
    /// the agent. Returns the resolved path.
    pub async fn load_key(&self, name: &str, path: &str) -> Result<PathBuf, AgentError> {
        let resolved = expand_home(path);
        if !resolved.exists() {
            tracing::warn!("Key file not found: {:?}", resolved);
            return Err(AgentError::KeyFileNotFound(resolved));
        }

        self.bounded("ssh-add", self.client.add_identity(&resolved))
            .await?;

        *self.last_loaded.lock().await = Some(name.to_string());
        tracing::info!("Key '{}' loaded from {:?}", name, resolved);
        Ok(resolved)
    }

    /// Load a key by its registry name
    pub async fn load_registered(&self, name: &str) -> Result<PathBuf, AgentError> {
        let path = {
            let registry = self.registry.read().await;
            registry
                .get(name)
                .map(String::from)
                .ok_or_else(|| AgentError::UnknownKey(name.to_string()))?
        };
        self.load_key(name, &path).await
    }

    /// Remove every identity from the agent
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn unload_all(&self) {
        if let Err(e) = self
            .bounded("ssh-add -D", self.client.remove_all_identities())
            .await
        {
            tracing::warn!("Failed to unload keys: {}", e);
        }
        *self.last_loaded.lock().await = None;
        tracing::info!("All keys unloaded");
    }

    /// Snapshot of the agent's identities
    ///
    /// An unreachable agent, an empty agent and a failed query all read as
    /// zero keys, and forget the last loaded name.
    pub async fn current_status(&self) -> AgentStatus {
        let listed = match self
            .bounded("ssh-add -l", self.client.list_identities())
            .await
        {
            Ok(listed) => listed,
            Err(e) => {
                tracing::debug!("Status query failed: {}", e);
                IdentityList::NoIdentities
            }
        };

        let mut last_loaded = self.last_loaded.lock().await;
        match listed {
            IdentityList::Identities(lines) => AgentStatus {
                loaded_count: lines.len(),
                active_key: last_loaded.clone(),
            },
            IdentityList::NoIdentities | IdentityList::NoAgent => {
                *last_loaded = None;
                AgentStatus::empty()
            }
        }
    }

    /// Where the agent currently sits in its lifecycle
    ///
    /// A failed query counts as no agent.
    pub async fn agent_state(&self) -> AgentState {
        match self
            .bounded("ssh-add -l", self.client.list_identities())
            .await
        {
            Ok(IdentityList::Identities(_)) => AgentState::KeyLoaded,
            Ok(IdentityList::NoIdentities) => AgentState::AgentIdle,
            Ok(IdentityList::NoAgent) | Err(_) => AgentState::NoAgent,
        }
    }

    /// Check that `host` accepts one of the loaded keys
    pub async fn test_remote_auth(&self, host: &str) -> Result<RemoteIdentity, AuthError> {
        let probe = match tokio::time::timeout(self.auth_timeout, self.client.probe_auth(host))
            .await
        {
            Ok(probe) => probe?,
            Err(_) => {
                tracing::warn!("No response from {} within {:?}", host, self.auth_timeout);
                return Err(AuthError::NoResponse {
                    host: host.to_string(),
                    after: self.auth_timeout,
                });
            }
        };

        let result = classify_auth(host, &probe.diagnostics);
        match &result {
            Ok(identity) => tracing::info!("Authenticated to {} as {}", host, identity.username),
            Err(e) => tracing::warn!("{}", e),
        }
        result
    }

    pub fn registry(&self) -> &Arc<RwLock<KeyRegistry>> {
        &self.registry
    }

    async fn bounded<T, F>(&self, command: &str, fut: F) -> Result<T, AgentError>
    where
        F: Future<Output = Result<T, AgentError>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout {
                command: command.to_string(),
                after: self.command_timeout,
            }),
        }
    }
}

/// Decide whether an SSH diagnostic confirms authentication
pub fn classify_auth(host: &str, diagnostics: &str) -> Result<RemoteIdentity, AuthError> {
    if diagnostics.to_lowercase().contains(AUTH_CONFIRMATION) {
        let username = greeted_username(diagnostics).unwrap_or(UNKNOWN_USER);
        Ok(RemoteIdentity {
            host: host.to_string(),
            username: username.to_string(),
        })
    } else {
        Err(AuthError::Rejected {
            host: host.to_string(),
            detail: diagnostics.chars().take(MAX_AUTH_DETAIL_CHARS).collect(),
        })
    }
}

/// Extract `name` from a `Hi name!` greeting
fn greeted_username(diagnostics: &str) -> Option<&str> {
    let (_, rest) = diagnostics.split_once("Hi ")?;
    let name = rest.split_once('!').map_or(rest, |(name, _)| name).trim();
    (!name.is_empty()).then_some(name)
}
