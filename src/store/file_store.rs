//! store::file_store
//!
//! File-based credential storage.
//!
//! # Security
//!
//! - Entries are stored in `~/.dify-chat/credentials.toml`
//! - File permissions are set to 0600 on Unix (owner read/write only)
//! - All writes are atomic (write to temp file, then rename)
//! - Stored values are NEVER logged, printed, or included in error messages

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{CredentialStore, StoreError};

/// File-based credential storage.
///
/// Stores session credentials in a TOML file at `~/.dify-chat/credentials.toml`.
/// This is the default store.
///
/// # Security Considerations
///
/// - On Unix, file permissions are set to 0600 (owner read/write only)
/// - Writes are atomic (write to temp file, then rename)
/// - Values are never included in error messages or logs
#[derive(Debug)]
pub struct FileCredentialStore {
    /// Path to the credentials file
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a new file credential store at the default location.
    ///
    /// The default location is `~/.dify-chat/credentials.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, StoreError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StoreError::ReadError("cannot determine home directory".into()))?;
        let path = home.join(".dify-chat").join("credentials.toml");
        Ok(Self { path })
    }

    /// Create a file credential store at a custom path.
    ///
    /// This is primarily useful for testing.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the path to the credentials file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read all entries from the file.
    fn read_entries(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::ReadError(format!("cannot read credentials file: {}", e)))?;

        let entries: HashMap<String, String> = toml::from_str(&content)
            .map_err(|e| StoreError::ReadError(format!("cannot parse credentials file: {}", e)))?;

        Ok(entries)
    }

    /// Write entries to the file with atomic write and proper permissions.
    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(entries)
            .map_err(|e| StoreError::WriteError(format!("cannot serialize credentials: {}", e)))?;

        // Write to a temp file first for atomicity
        let temp_path = self.path.with_extension("tmp");

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StoreError::WriteError(format!("cannot create temp file: {}", e)))?;

            // Set restrictive permissions BEFORE writing content (Unix only)
            #[cfg(unix)]
            {
                let permissions = fs::Permissions::from_mode(0o600);
                file.set_permissions(permissions)
                    .map_err(|e| StoreError::WriteError(format!("cannot set permissions: {}", e)))?;
            }

            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::WriteError(format!("cannot write credentials: {}", e)))?;

            file.sync_all()
                .map_err(|e| StoreError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::WriteError(format!("cannot rename temp file: {}", e)))?;

        Ok(())
    }

    /// Verify file permissions are correct (Unix only).
    ///
    /// Returns true if the file doesn't exist or has 0600 permissions.
    #[cfg(unix)]
    pub fn verify_permissions(&self) -> Result<bool, StoreError> {
        if !self.path.exists() {
            return Ok(true);
        }

        let metadata = fs::metadata(&self.path)
            .map_err(|e| StoreError::ReadError(format!("cannot read file metadata: {}", e)))?;

        let mode = metadata.permissions().mode() & 0o777;
        Ok(mode == 0o600)
    }

    /// Verify file permissions are correct (non-Unix always returns true).
    #[cfg(not(unix))]
    pub fn verify_permissions(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.remove(key);
        self.write_entries(&entries)
    }
}
