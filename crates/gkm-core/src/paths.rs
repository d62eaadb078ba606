//! Filesystem locations used by git-key-manager

use std::path::{Path, PathBuf};

/// Application directory name under `~/.config`
pub const APP_NAME: &str = "git-key-manager";

/// Registry file name inside the config directory
pub const REGISTRY_FILE_NAME: &str = "keys.json";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory (`~/.config/git-key-manager`)
///
/// Always rooted at `~/.config`, also on platforms whose native config
/// directory lives elsewhere.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_NAME)
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

/// Get the default registry file path
pub fn default_registry_path() -> PathBuf {
    default_config_dir().join(REGISTRY_FILE_NAME)
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    match dirs::home_dir() {
        Some(home) => expand_home_with(path, &home),
        None => PathBuf::from(path),
    }
}

/// Expand a leading `~` against an explicit home directory
///
/// Only `~` and `~/...` are expanded; `~user` forms are returned unchanged.
pub fn expand_home_with(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_with() {
        let home = Path::new("/home/alice");

        assert_eq!(
            expand_home_with("~/.ssh/id_work", home),
            PathBuf::from("/home/alice/.ssh/id_work")
        );
        assert_eq!(expand_home_with("~", home), PathBuf::from("/home/alice"));

        // Absolute and relative paths are untouched
        assert_eq!(
            expand_home_with("/etc/ssh/key", home),
            PathBuf::from("/etc/ssh/key")
        );
        assert_eq!(expand_home_with("keys/id", home), PathBuf::from("keys/id"));

        // Other users' homes are not resolved
        assert_eq!(expand_home_with("~bob/key", home), PathBuf::from("~bob/key"));
    }

    #[test]
    fn test_default_paths_share_dir() {
        let dir = default_config_dir();
        assert!(dir.ends_with(".config/git-key-manager"));
        assert_eq!(default_registry_path(), dir.join("keys.json"));
        assert_eq!(default_config_path(), dir.join("config.toml"));
    }
}
