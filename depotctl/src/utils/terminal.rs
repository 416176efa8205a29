use base64::{engine::general_purpose::STANDARD, Engine as _};
use depot_core::controller::{Clipboard, Confirm};
use depot_core::error::ClientError;
use std::io::Write;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::error;

/// OSC 52 escape sequence asking the terminal to set the system clipboard
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Writes through the terminal, which also works over SSH.
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClientError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(osc52_sequence(text).as_bytes())?;
        stderr.flush()?;
        Ok(())
    }
}

/// Whether the current thread may hand its runtime work to another worker
/// while it blocks. Only a multi-thread runtime supports that.
fn can_block_in_place() -> bool {
    Handle::try_current()
        .map(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread)
        .unwrap_or(false)
}

/// Asks on the terminal; anything but an explicit yes cancels.
///
/// Inside a multi-thread runtime the prompt runs in `block_in_place`. On a
/// current-thread runtime or outside any runtime it blocks the calling
/// thread directly, stalling other tasks on that runtime until answered.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let ask = || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
        };
        let answer = if can_block_in_place() {
            tokio::task::block_in_place(ask)
        } else {
            ask()
        };
        answer.unwrap_or_else(|e| {
            error!("Confirmation prompt failed: {}", e);
            false
        })
    }
}

/// Confirmation given up front, e.g. with `--yes`
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub async fn prompt_text(prompt: &str) -> anyhow::Result<String> {
    let prompt = prompt.to_string();
    let value = tokio::task::spawn_blocking(move || {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await??;
    Ok(value)
}

pub async fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    let prompt = prompt.to_string();
    let value = tokio::task::spawn_blocking(move || {
        dialoguer::Password::new().with_prompt(prompt).interact()
    })
    .await??;
    Ok(value)
}
