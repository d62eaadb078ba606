//! Application context
//!
//! Owns everything the presentation layer needs: configuration, the shared
//! registry, the agent controller and the status poller. Built once at
//! startup and passed around explicitly.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::agent::{SshAgentClient, SystemAgentClient};
use crate::config::AppConfig;
use crate::controller::AgentController;
use crate::error::{GkmError, RegistryWarning};
use crate::poller::StatusPoller;
use crate::registry::KeyRegistry;
use crate::types::{AgentStatus, KeyEntry};

pub struct AppContext {
    config: AppConfig,
    registry: Arc<RwLock<KeyRegistry>>,
    controller: Arc<AgentController>,
    poller: StatusPoller,
    load_warning: Option<RegistryWarning>,
}

impl AppContext {
    /// Build a context around an arbitrary agent client
    pub fn new(config: AppConfig, client: Arc<dyn SshAgentClient>) -> Self {
        let loaded = KeyRegistry::load(&config.registry_path);
        let registry = Arc::new(RwLock::new(loaded.registry));
        let controller = Arc::new(AgentController::new(
            client,
            Arc::clone(&registry),
            config.command_timeout,
            config.auth_timeout,
        ));
        let poller = StatusPoller::new(config.poll_interval);

        Self {
            config,
            registry,
            controller,
            poller,
            load_warning: loaded.warning,
        }
    }

    /// Build a context that drives the system's OpenSSH tools
    pub fn from_config(config: AppConfig) -> Self {
        let client = Arc::new(SystemAgentClient::new(config.binaries.clone()));
        Self::new(config, client)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn controller(&self) -> &Arc<AgentController> {
        &self.controller
    }

    /// Warning raised if the registry had to be reset while loading
    pub fn load_warning(&self) -> Option<&RegistryWarning> {
        self.load_warning.as_ref()
    }

    /// Configured keys, in registry order
    pub async fn keys(&self) -> Vec<KeyEntry> {
        self.registry.read().await.entries()
    }

    /// Register a key and persist the registry
    pub async fn add_key(&self, name: &str, path: &str) -> Result<Option<String>, GkmError> {
        Ok(self.registry.write().await.add(name, path)?)
    }

    /// Unregister a key and persist the registry
    pub async fn remove_key(&self, name: &str) -> Result<String, GkmError> {
        Ok(self.registry.write().await.remove(name)?)
    }

    /// Begin periodic status refresh
    pub fn start(&mut self) {
        self.poller.start(Arc::clone(&self.controller));
    }

    /// Stop periodic status refresh
    pub async fn stop(&mut self) {
        self.poller.stop().await;
    }

    /// Status updates published by the poller
    pub fn subscribe(&self) -> watch::Receiver<AgentStatus> {
        self.poller.subscribe()
    }
}
