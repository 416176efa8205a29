//! Credential lifecycle: login, logout, and persistence across restarts.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use crate::error::ClientError;
use crate::gateway::CrudGateway;

/// Fixed key the credential is persisted under
pub const API_KEY_STORAGE_KEY: &str = "depot_api_key";

/// Durable key/value storage for the credential.
pub trait CredentialStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn save(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// JSON file in the config directory, readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            path: config_dir.as_ref().join("credentials.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<HashMap<String, String>, ClientError> {
        if !self.path.exists() {
            debug!("Credential file {:?} does not exist", self.path);
            return Ok(HashMap::new());
        }
        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| {
            error!("Failed to parse credential file {:?}: {}", self.path, e);
            ClientError::Storage(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.load_entries()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self.load_entries().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        match self.load_entries() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    self.write_entries(&entries)?;
                }
                Ok(())
            }
            Err(_) => {
                debug!("Removing unreadable credential file {:?}", self.path);
                fs::remove_file(&self.path)?;
                Ok(())
            }
        }
    }
}

/// Process-local store, nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self
            .entries
            .lock()
            .map(|entries| entries.get(key).cloned())
            .unwrap_or_default())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ClientError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
        Ok(())
    }
}

/// The active credential, mirrored to a [`CredentialStore`].
pub struct AuthSession {
    store: Arc<dyn CredentialStore>,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}

impl AuthSession {
    /// Pick up a previously persisted credential, if any. The key is not
    /// validated; an invalid key surfaces on the first failed call. A store
    /// that cannot be read counts as holding no credential.
    pub fn restore(store: Arc<dyn CredentialStore>) -> Self {
        let api_key = match store.load(API_KEY_STORAGE_KEY) {
            Ok(value) => value.map(SecretString::from),
            Err(e) => {
                error!("Failed to read persisted credential: {}", e);
                None
            }
        };
        debug!("Restored session, authenticated: {}", api_key.is_some());
        Self { store, api_key }
    }

    pub fn current_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    /// On failure any prior credential is left untouched.
    pub async fn login(
        &mut self,
        gateway: &dyn CrudGateway,
        username: &str,
        password: &SecretString,
    ) -> Result<(), ClientError> {
        let api_key = gateway.login(username, password).await?;
        self.store
            .save(API_KEY_STORAGE_KEY, api_key.expose_secret())
            .inspect_err(|e| error!("Failed to persist credential: {}", e))?;
        self.api_key = Some(api_key);
        info!("Session authenticated");
        Ok(())
    }

    /// Always succeeds; a store failure is logged and the in-memory
    /// credential is dropped regardless.
    pub fn logout(&mut self) {
        self.api_key = None;
        if let Err(e) = self.store.remove(API_KEY_STORAGE_KEY) {
            error!("Failed to remove persisted credential: {}", e);
        }
        info!("Session cleared");
    }
}
