//! store::memory
//!
//! In-memory credential storage.
//!
//! Used by tests and by embedders that manage persistence themselves (for
//! example a host app that snapshots the map into its own storage). Nothing
//! survives process exit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{CredentialStore, StoreError};

/// In-memory credential storage backed by a mutex-guarded map.
///
/// Clones share the same map, so a cloned handle can stand in for another
/// writer against the same storage in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCredentialStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    ///
    /// Useful for tests that need a specific pre-initialization state.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::ReadError("store mutex poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::WriteError("store mutex poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::DeleteError("store mutex poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}
