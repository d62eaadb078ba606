//! git-key-manager CLI
//!
//! Presentation layer over `gkm-core`: registry management, loading keys
//! into the agent, status, and remote authentication checks.

pub mod commands;
pub mod output;
