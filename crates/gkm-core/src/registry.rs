//! Persistent name → key path registry
//!
//! The registry is a single JSON object (`{"work": "~/.ssh/id_work", ...}`)
//! rewritten in full after every mutation. Entries keep the order they were
//! added in, including the order of a hand-edited document. There is no
//! locking: two processes saving at once race and the last write wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{RegistryError, RegistryWarning};
use crate::types::KeyEntry;

/// Registry loaded from disk, with the warning raised if it had to be reset
#[derive(Debug)]
pub struct LoadedRegistry {
    pub registry: KeyRegistry,
    pub warning: Option<RegistryWarning>,
}

/// Named SSH private-key paths backed by a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRegistry {
    path: PathBuf,
    keys: IndexMap<String, String>,
}

impl KeyRegistry {
    /// Create an empty registry that will persist to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: IndexMap::new(),
        }
    }

    /// Load the registry stored at `path`
    ///
    /// A missing document yields an empty registry. A malformed or unreadable
    /// one also yields an empty registry, together with a warning; it is
    /// never reported as an error.
    pub fn load(path: impl Into<PathBuf>) -> LoadedRegistry {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No registry at {:?}, starting empty", path);
                return LoadedRegistry {
                    registry: Self::empty(path),
                    warning: None,
                };
            }
            Err(e) => {
                let warning = RegistryWarning::Unreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}", warning);
                return LoadedRegistry {
                    registry: Self::empty(path),
                    warning: Some(warning),
                };
            }
        };

        match serde_json::from_str::<IndexMap<String, String>>(&content) {
            Ok(keys) => {
                tracing::debug!("Loaded {} key(s) from {:?}", keys.len(), path);
                LoadedRegistry {
                    registry: Self { path, keys },
                    warning: None,
                }
            }
            Err(e) => {
                let warning = RegistryWarning::Malformed {
                    path: path.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}", warning);
                LoadedRegistry {
                    registry: Self::empty(path),
                    warning: Some(warning),
                }
            }
        }
    }

    /// Write the full mapping to disk, replacing the previous document
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<(), RegistryError> {
        let content = serde_json::to_string_pretty(&self.keys)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RegistryError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        fs::write(&self.path, content).map_err(|source| RegistryError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Register `path` under `name` and persist
    ///
    /// An existing entry with the same name is replaced in place; its previous
    /// path is returned. New names go last. The key file is not checked here. If persisting fails the
    /// registry is left as it was.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Option<String>, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName(name));
        }

        let previous = self.keys.insert(name.clone(), path.into());
        if let Err(e) = self.save() {
            match &previous {
                Some(old) => self.keys.insert(name, old.clone()),
                None => self.keys.shift_remove(&name),
            };
            return Err(e);
        }

        tracing::info!("Registered key '{}'", name);
        Ok(previous)
    }

    /// Remove the entry for `name` and persist, returning its path
    pub fn remove(&mut self, name: &str) -> Result<String, RegistryError> {
        let (index, _, path) = self
            .keys
            .shift_remove_full(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if let Err(e) = self.save() {
            self.keys.shift_insert(index, name.to_string(), path);
            return Err(e);
        }

        tracing::info!("Removed key '{}'", name);
        Ok(path)
    }

    /// Look up the path registered under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.keys.get(name).map(String::as_str)
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// All entries, in registry order
    pub fn entries(&self) -> Vec<KeyEntry> {
        self.keys
            .iter()
            .map(|(name, path)| KeyEntry {
                name: name.clone(),
                path: path.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }
}
