use crate::utils::ui::{Feedback, Ui};
use depot_core::controller::FileController;
use depot_core::gateway::RestGateway;
use depot_core::session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, API_KEY_STORAGE_KEY,
};
use depot_core::settings::ClientSettings;
use std::sync::Arc;

/// AppContext provides access to shared application resources
pub struct AppContext {
    ui: Arc<Ui>,
    settings: ClientSettings,
    api_key: Option<String>,
}

impl AppContext {
    pub fn new(settings: ClientSettings) -> Self {
        AppContext {
            ui: Arc::new(Ui::new()),
            settings,
            api_key: None,
        }
    }

    /// Use `api_key` for this run instead of the persisted credential
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn ui(&self) -> &Arc<Ui> {
        &self.ui
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn uses_api_key_override(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn credential_store(&self) -> anyhow::Result<Arc<dyn CredentialStore>> {
        if let Some(api_key) = &self.api_key {
            let store = MemoryCredentialStore::new();
            store.save(API_KEY_STORAGE_KEY, api_key)?;
            return Ok(Arc::new(store));
        }
        let config_dir = self.settings.config_dir()?;
        Ok(Arc::new(FileCredentialStore::new(config_dir)))
    }

    /// Controller wired to the configured server plus renderers for its
    /// toasts and list status
    pub fn controller(&self) -> anyhow::Result<(FileController, Feedback)> {
        let gateway = RestGateway::new(self.settings.http_client()?);
        let controller = FileController::new(
            Arc::new(gateway),
            self.credential_store()?,
            self.settings.items_per_page,
        )?;
        let feedback = Feedback::new(&controller);
        Ok((controller, feedback))
    }
}
