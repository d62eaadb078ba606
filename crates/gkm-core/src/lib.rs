//! gkm-core: Key registry and SSH agent synchronization for git-key-manager
//!
//! This crate keeps the persisted name → key path registry, drives the
//! external SSH agent through [`agent::SshAgentClient`], and exposes the
//! normalized status the CLI displays.

pub mod agent;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod paths;
pub mod poller;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testing;

pub use agent::{SshAgentClient, SystemAgentClient};
pub use context::AppContext;
pub use controller::AgentController;
pub use error::{AgentError, AuthError, GkmError, RegistryError, RegistryWarning};
pub use registry::KeyRegistry;
pub use types::{AgentPresence, AgentState, AgentStatus, KeyEntry, RemoteIdentity};
