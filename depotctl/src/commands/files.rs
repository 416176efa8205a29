use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::warn;

use crate::cli::{
    FileDeleteCommand, FileDownloadCommand, FileListCommand, FileNameCommand,
    FilePreviewCommand, FileUploadCommand,
};
use crate::context::AppContext;
use crate::utils::formatting::format_page;
use crate::utils::terminal::{AssumeYes, Osc52Clipboard, TerminalConfirm};
use depot_core::controller::{Confirm, DeleteOutcome, FileController, ListStatus};
use depot_core::gateway::UploadFile;

pub(crate) fn require_login(controller: &FileController) -> Result<()> {
    if !controller.session().is_authenticated() {
        bail!("Not logged in. Run depotctl auth:login first.");
    }
    Ok(())
}

/// Refresh and turn a failure into the text shown in the list area
pub(crate) async fn refresh_list(controller: &mut FileController) -> Result<()> {
    if let Err(e) = controller.refresh().await {
        if let ListStatus::Failed(message) = controller.list_status() {
            bail!(message);
        }
        return Err(e.into());
    }
    Ok(())
}

pub async fn list_files(app_context: &AppContext, cmd: &FileListCommand) -> Result<()> {
    let ui = app_context.ui();
    let (mut controller, _) = app_context.controller()?;
    require_login(&controller)?;

    if let Some(per_page) = cmd.per_page {
        controller.set_items_per_page(per_page)?;
    }

    ui.new_status_line(format!(
        "Getting list of files from {} ...",
        app_context.settings().server
    ));
    ui.run(async {
        refresh_list(&mut controller).await?;
        if !controller.go_to_page(cmd.page) {
            bail!(
                "Page {} does not exist, there are {} pages.",
                cmd.page,
                controller.view().total_pages
            );
        }
        ui.success("Got all files!");
        Ok::<_, anyhow::Error>(format_page(&controller.view()))
    })
    .await
}

pub async fn upload_file(app_context: &AppContext, cmd: &FileUploadCommand) -> Result<()> {
    let ui = app_context.ui();
    let (mut controller, mut feedback) = app_context.controller()?;
    require_login(&controller)?;

    let file = if cmd.path.is_file() {
        Some(UploadFile::from_path(&cmd.path).await?)
    } else {
        warn!("{} is not a readable file", cmd.path.display());
        None
    };

    ui.new_status_line(format!("Uploading {} ...", cmd.path.display().yellow()));
    let result = controller.upload(file).await;
    let rendered = feedback.render(ui);

    let receipt = result?;
    if let Some(url) = receipt.url {
        ui.println(url);
    }
    rendered
}

pub async fn download_file(app_context: &AppContext, cmd: &FileDownloadCommand) -> Result<()> {
    let ui = app_context.ui();
    let (mut controller, mut feedback) = app_context.controller()?;
    require_login(&controller)?;

    let dest_dir = match &cmd.output {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    if !dest_dir.is_dir() {
        bail!("{} is not a directory", dest_dir.display());
    }

    ui.new_status_line(format!("Downloading {} ...", cmd.name.yellow()));
    let result = controller.download(&cmd.name, &dest_dir).await;
    feedback.render(ui)?;

    let path: PathBuf = result?;
    ui.success(format!("Saved to {}", path.display()));
    Ok(())
}

pub async fn delete_file(app_context: &AppContext, cmd: &FileDeleteCommand) -> Result<()> {
    let ui = app_context.ui();
    let (mut controller, mut feedback) = app_context.controller()?;
    require_login(&controller)?;

    let confirm: &dyn Confirm = if cmd.yes { &AssumeYes } else { &TerminalConfirm };
    let result = controller.delete(&cmd.name, confirm).await;
    let rendered = feedback.render(ui);

    if result? == DeleteOutcome::Cancelled {
        ui.println("Cancelled.");
    }
    rendered
}

pub async fn preview_file(app_context: &AppContext, cmd: &FilePreviewCommand) -> Result<()> {
    let (controller, _) = app_context.controller()?;
    let url = controller.preview_url(&cmd.name);
    app_context.ui().println(&url);

    if !cmd.no_browser {
        if let Err(e) = open::that(&url) {
            warn!("Failed to open browser: {}", e);
            app_context
                .ui()
                .eprintln(format!("Could not open a browser, visit {} manually.", url));
        }
    }
    Ok(())
}

pub async fn copy_file_url(app_context: &AppContext, cmd: &FileNameCommand) -> Result<()> {
    let (controller, mut feedback) = app_context.controller()?;
    let result = controller.copy_url(&cmd.name, &Osc52Clipboard);
    feedback.render(app_context.ui())?;

    let url = result?;
    app_context.ui().println(url);
    Ok(())
}
