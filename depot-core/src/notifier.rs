//! Transient user feedback with at most one visible toast.
//!
//! A new toast replaces whatever is showing and is removed again after
//! [`TOAST_DURATION`]. Nothing is queued, the last toast wins. Renderers
//! follow changes through [`Notifier::subscribe`].
//!
//! ```
//! use depot_core::notifier::{Notifier, ToastKind};
//!
//! let notifier = Notifier::new();
//! notifier.notify("first", ToastKind::Success);
//! notifier.notify("second", ToastKind::Error);
//!
//! let current = notifier.current().unwrap();
//! assert_eq!(current.message, "second");
//! assert_eq!(current.kind, ToastKind::Error);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    id: u64,
    pub message: String,
    pub kind: ToastKind,
}

struct NotifierInner {
    tx: watch::Sender<Option<Toast>>,
    next_id: AtomicU64,
    dismiss_timer: Mutex<Option<JoinHandle<()>>>,
    duration: Duration,
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("current", &self.current())
            .field("duration", &self.inner.duration)
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_duration(TOAST_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(NotifierInner {
                tx,
                next_id: AtomicU64::new(1),
                dismiss_timer: Mutex::new(None),
                duration,
            }),
        }
    }

    /// Show `message`, preempting any toast currently displayed.
    ///
    /// Auto-dismiss needs a running tokio runtime; without one the toast
    /// stays until replaced or dismissed.
    pub fn notify(&self, message: impl Into<String>, kind: ToastKind) -> Toast {
        let toast = Toast {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            kind,
        };
        debug!("Toast #{} ({:?}): {}", toast.id, toast.kind, toast.message);

        self.inner.tx.send_replace(Some(toast.clone()));
        self.schedule_dismiss(toast.id);
        toast
    }

    pub fn success(&self, message: impl Into<String>) -> Toast {
        self.notify(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Toast {
        self.notify(message, ToastKind::Error)
    }

    pub fn current(&self) -> Option<Toast> {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.inner.tx.subscribe()
    }

    pub fn dismiss(&self) {
        if let Ok(mut timer) = self.inner.dismiss_timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
        self.inner.tx.send_replace(None);
    }

    fn schedule_dismiss(&self, id: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available, toast #{} will not auto-dismiss", id);
            return;
        };

        let tx = self.inner.tx.clone();
        let duration = self.inner.duration;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            // only remove the toast this timer was started for
            tx.send_if_modified(|current| match current {
                Some(toast) if toast.id == id => {
                    *current = None;
                    true
                }
                _ => false,
            });
        });

        if let Ok(mut timer) = self.inner.dismiss_timer.lock() {
            if let Some(previous) = timer.replace(handle) {
                previous.abort();
            }
        }
    }
}
