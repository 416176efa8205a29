//! The single owner of client state.
//!
//! [`FileController`] sequences every user operation: it gates access on
//! the [`AuthSession`], keeps the [`FileRegistry`] in step with the server
//! after each mutation and reports outcomes through the [`Notifier`] and
//! the list status channel. Front ends render what it exposes and never
//! mutate state directly.

use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::ClientError;
use crate::gateway::{require_file, CrudGateway, UploadFile};
use crate::notifier::Notifier;
use crate::pagination::PageView;
use crate::record::{FileRecord, UploadReceipt};
use crate::registry::{FileRegistry, RefreshOutcome};
use crate::session::{AuthSession, CredentialStore};

pub const LIST_FAILED_MESSAGE: &str = "Failed to load the file list. The API key may be invalid.";
pub const UPLOAD_NETWORK_MESSAGE: &str = "Network error while uploading the file.";
pub const DELETE_NETWORK_MESSAGE: &str = "Network error while deleting the file.";
pub const DOWNLOAD_NETWORK_MESSAGE: &str = "Network error while downloading the file.";

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Destination for copied public URLs.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Files,
}

/// State of the file list area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

pub struct FileController {
    gateway: Arc<dyn CrudGateway>,
    session: AuthSession,
    registry: FileRegistry,
    notifier: Notifier,
    status: watch::Sender<ListStatus>,
    login_message: Option<String>,
}

impl std::fmt::Debug for FileController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileController")
            .field("session", &self.session)
            .field("records", &self.registry.snapshot().len())
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl FileController {
    /// Restore any persisted credential. Nothing is fetched until
    /// [`FileController::start`] is called.
    pub fn new(
        gateway: Arc<dyn CrudGateway>,
        store: Arc<dyn CredentialStore>,
        items_per_page: usize,
    ) -> Result<Self, ClientError> {
        let (status, _) = watch::channel(ListStatus::Idle);
        Ok(Self {
            gateway,
            session: AuthSession::restore(store),
            registry: FileRegistry::new(items_per_page)?,
            notifier: Notifier::new(),
            status,
            login_message: None,
        })
    }

    /// Go straight to the file view when a credential was persisted.
    /// The key is not validated beyond the initial listing.
    pub async fn start(&mut self) -> View {
        if self.session.is_authenticated() {
            info!("Found persisted credential, loading file list");
            let _ = self.refresh().await;
        }
        self.current_view()
    }

    pub fn current_view(&self) -> View {
        if self.session.is_authenticated() {
            View::Files
        } else {
            View::Login
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn list_status(&self) -> ListStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ListStatus> {
        self.status.subscribe()
    }

    /// Last login failure text, cleared by the next attempt
    pub fn login_message(&self) -> Option<&str> {
        self.login_message.as_deref()
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), ClientError> {
        self.login_message = None;
        match self
            .session
            .login(self.gateway.as_ref(), username, password)
            .await
        {
            Ok(()) => {
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!("Login failed: {}", e);
                self.login_message = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.registry.clear();
        self.status.send_replace(ListStatus::Idle);
        self.login_message = None;
    }

    /// Pull the full record set and replace the snapshot.
    ///
    /// A failure leaves the previous snapshot visible and sets the list
    /// status to the failure text. 401 responses do not log the user out.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome, ClientError> {
        let api_key = self.require_key()?;
        self.status.send_replace(ListStatus::Loading);

        let ticket = self.registry.begin_refresh();
        let result = self.gateway.list(&api_key).await;
        match self.registry.complete_refresh(ticket, result) {
            Ok(outcome) => {
                if let RefreshOutcome::Applied(_) = outcome {
                    self.status.send_replace(ListStatus::Idle);
                }
                Ok(outcome)
            }
            Err(e) => {
                let message = if e.is_transport() {
                    e.user_message()
                } else {
                    LIST_FAILED_MESSAGE.to_string()
                };
                self.status.send_replace(ListStatus::Failed(message));
                Err(e)
            }
        }
    }

    /// Upload `file` and refresh on success.
    ///
    /// `None` stands for "no file chosen" and fails without a request.
    pub async fn upload(
        &mut self,
        file: Option<UploadFile>,
    ) -> Result<UploadReceipt, ClientError> {
        let file = match require_file(file) {
            Ok(file) => file,
            Err(e) => {
                self.notifier.error(e.user_message());
                return Err(e);
            }
        };
        let api_key = self.require_key()?;

        match self.gateway.upload(&api_key, &file).await {
            Ok(receipt) => {
                info!("Uploaded {}: {}", file.file_name, receipt.message);
                self.notifier.success("File uploaded successfully!");
                let _ = self.refresh().await;
                Ok(receipt)
            }
            Err(e) => {
                error!("Upload error: {}", e);
                if e.is_transport() {
                    self.notifier.error(UPLOAD_NETWORK_MESSAGE);
                } else {
                    self.notifier
                        .error(format!("Upload failed: {}", e.user_message()));
                }
                Err(e)
            }
        }
    }

    /// Fetch `stored_name` with the credential and save it into `dest_dir`
    /// under the same name. Returns the written path.
    pub async fn download(
        &mut self,
        stored_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let api_key = self.require_key()?;
        let target = match local_target(stored_name, dest_dir) {
            Ok(target) => target,
            Err(e) => {
                self.notifier
                    .error(format!("Download failed: {}", e.user_message()));
                return Err(e);
            }
        };

        let result = match self.gateway.download(&api_key, stored_name).await {
            Ok(bytes) => tokio::fs::write(&target, &bytes)
                .await
                .map(|_| bytes.len())
                .map_err(ClientError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(len) => {
                info!("Saved {} ({} bytes) to {}", stored_name, len, target.display());
                Ok(target)
            }
            Err(e) => {
                error!("Download error: {}", e);
                if e.is_transport() {
                    self.notifier.error(DOWNLOAD_NETWORK_MESSAGE);
                } else {
                    self.notifier
                        .error(format!("Download failed: {}", e.user_message()));
                }
                Err(e)
            }
        }
    }

    /// Delete after confirmation, then refresh.
    pub async fn delete(
        &mut self,
        stored_name: &str,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        let api_key = self.require_key()?;
        let prompt = format!("Are you sure you want to delete the file: {stored_name}?");
        if !confirm.confirm(&prompt) {
            info!("Delete of {} cancelled", stored_name);
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.gateway.delete(&api_key, stored_name).await {
            Ok(text) => {
                info!("{}", text.trim_end());
                self.notifier.success("File deleted successfully!");
                let _ = self.refresh().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                error!("Delete error: {}", e);
                if e.is_transport() {
                    self.notifier.error(DELETE_NETWORK_MESSAGE);
                } else {
                    self.notifier
                        .error(format!("Delete failed: {}", e.user_message()));
                }
                Err(e)
            }
        }
    }

    /// Public, unauthenticated URL of a stored file
    pub fn preview_url(&self, stored_name: &str) -> String {
        self.gateway.public_file_url(stored_name)
    }

    pub fn copy_url(
        &self,
        stored_name: &str,
        clipboard: &dyn Clipboard,
    ) -> Result<String, ClientError> {
        let url = self.preview_url(stored_name);
        match clipboard.write_text(&url) {
            Ok(()) => {
                self.notifier.success("URL copied!");
                Ok(url)
            }
            Err(e) => {
                error!("Clipboard error: {}", e);
                self.notifier.error("Failed to copy URL");
                Err(e)
            }
        }
    }

    pub fn view(&self) -> PageView<'_, FileRecord> {
        self.registry.view()
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.registry.go_to_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.registry.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.registry.prev_page()
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), ClientError> {
        self.registry.set_items_per_page(items_per_page)
    }

    fn require_key(&self) -> Result<SecretString, ClientError> {
        match self.session.current_key() {
            Some(key) => Ok(key.clone()),
            None => {
                warn!("Operation attempted without a credential");
                Err(ClientError::NotAuthenticated)
            }
        }
    }
}

/// Stored names are server-generated; refuse anything that would escape
/// the destination directory.
fn local_target(stored_name: &str, dest_dir: &Path) -> Result<PathBuf, ClientError> {
    if stored_name.is_empty()
        || stored_name.contains('/')
        || stored_name.contains('\\')
        || stored_name.contains("..")
    {
        return Err(ClientError::validation(format!(
            "Invalid file name: {stored_name}"
        )));
    }
    Ok(dest_dir.join(stored_name))
}
