//! CLI command implementations

mod agent;
mod config;
mod keys;
mod remote;
mod watch;

pub use agent::{ensure_agent, load_command, status_command, unload_command};
pub use config::{config_init, config_path, config_show};
pub use keys::{add_command, list_command, remove_command};
pub use remote::test_command;
pub use watch::watch_command;
