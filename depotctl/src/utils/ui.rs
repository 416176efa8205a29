use owo_colors::OwoColorize;
use std::future::Future;
use std::sync::Mutex;

use depot_core::controller::{FileController, ListStatus};
use depot_core::notifier::{Toast, ToastKind};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Succeeded,
    Failed,
}

impl Status {
    pub fn get_emoji(&self) -> &str {
        match self {
            Status::Running => "💭",
            Status::Succeeded => "🚀",
            Status::Failed => "💥",
        }
    }
}

/// Terminal output for commands. Status lines and toasts go to stderr,
/// command results to stdout so they can be piped.
#[derive(Debug, Default)]
pub struct Ui {
    status: Mutex<Option<(Status, String)>>,
}

impl Ui {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_status(&self, status: Status, message: impl AsRef<str>) {
        let message = message.as_ref().to_string();
        let line = match status {
            Status::Running => format!("{} {}", status.get_emoji(), message.dimmed()),
            Status::Succeeded => format!("{} {}", status.get_emoji(), message.green()),
            Status::Failed => format!("{} {}", status.get_emoji(), message.bright_red()),
        };
        eprintln!("{line}");
        if let Ok(mut current) = self.status.lock() {
            *current = Some((status, message));
        }
    }

    pub fn new_status_line(&self, message: impl AsRef<str>) {
        self.set_status(Status::Running, message)
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.set_status(Status::Succeeded, message)
    }

    pub fn failed(&self, message: impl AsRef<str>) {
        self.set_status(Status::Failed, message)
    }

    pub fn last_status(&self) -> Option<(Status, String)> {
        self.status.lock().ok().and_then(|s| s.clone())
    }

    pub fn println(&self, message: impl AsRef<str>) {
        println!("{}", message.as_ref());
    }

    pub fn eprintln(&self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
    }

    pub fn toast(&self, toast: &Toast) {
        match toast.kind {
            ToastKind::Success => self.success(&toast.message),
            ToastKind::Error => self.failed(&toast.message),
        }
    }

    /// Await `task`, print its output on success and mark the status line
    /// failed otherwise.
    pub async fn run<F>(&self, task: F) -> anyhow::Result<()>
    where
        F: Future<Output = anyhow::Result<String>>,
    {
        match task.await {
            Ok(result) => {
                if !result.is_empty() {
                    self.println(result);
                }
                Ok(())
            }
            Err(e) => {
                self.failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn clear(&self) {
        if let Ok(mut current) = self.status.lock() {
            *current = None;
        }
    }
}

/// Follows a notifier and prints each new toast once.
pub struct ToastRenderer {
    rx: watch::Receiver<Option<Toast>>,
}

impl ToastRenderer {
    pub fn new(rx: watch::Receiver<Option<Toast>>) -> Self {
        Self { rx }
    }

    /// Print the toast shown since the last call, if any. Dismissals are
    /// not printed.
    pub fn render_pending(&mut self, ui: &Ui) -> Option<Toast> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        let toast = self.rx.borrow_and_update().clone()?;
        ui.toast(&toast);
        Some(toast)
    }
}

/// Follows the controller's list status and prints changes to it.
pub struct StatusRenderer {
    rx: watch::Receiver<ListStatus>,
}

impl StatusRenderer {
    pub fn new(rx: watch::Receiver<ListStatus>) -> Self {
        Self { rx }
    }

    /// Print the latest status if it changed since the last call
    pub fn render_pending(&mut self, ui: &Ui) -> Option<ListStatus> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        let status = self.rx.borrow_and_update().clone();
        match &status {
            ListStatus::Failed(message) => ui.failed(message),
            ListStatus::Loading => ui.new_status_line("Loading..."),
            ListStatus::Idle => {}
        }
        Some(status)
    }
}

/// Toasts and list status of one controller.
pub struct Feedback {
    toasts: ToastRenderer,
    status: StatusRenderer,
}

impl Feedback {
    pub fn new(controller: &FileController) -> Self {
        Self {
            toasts: ToastRenderer::new(controller.notifier().subscribe()),
            status: StatusRenderer::new(controller.subscribe_status()),
        }
    }

    /// Print what happened since the last call. A list that failed to load
    /// is returned as an error.
    pub fn render(&mut self, ui: &Ui) -> anyhow::Result<()> {
        self.toasts.render_pending(ui);
        match self.status.render_pending(ui) {
            Some(ListStatus::Failed(message)) => Err(anyhow::anyhow!(message)),
            _ => Ok(()),
        }
    }
}
