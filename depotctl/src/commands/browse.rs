use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use crate::commands::files::require_login;
use crate::context::AppContext;
use crate::utils::formatting::format_page;
use crate::utils::terminal::{prompt_text, Osc52Clipboard, TerminalConfirm};
use crate::utils::ui::Ui;
use depot_core::controller::FileController;

const HELP: &str = "\
Commands:
  n / p          next / previous page
  <number>       jump to page
  size <n>       items per page
  r              reload the list
  get <name>     download into the current directory
  rm <name>      delete
  url <name>     copy the public URL
  open <name>    open the public URL
  q              quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Page(usize),
    Size(usize),
    Refresh,
    Get(String),
    Remove(String),
    CopyUrl(String),
    Open(String),
    Help,
    Quit,
}

pub fn parse_browse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let name = || {
        if arg.is_empty() {
            Err(format!("{word} needs a file name"))
        } else {
            Ok(arg.to_string())
        }
    };

    match word {
        "n" | "next" => Ok(BrowseCommand::Next),
        "p" | "prev" => Ok(BrowseCommand::Prev),
        "r" | "refresh" => Ok(BrowseCommand::Refresh),
        "q" | "quit" | "exit" => Ok(BrowseCommand::Quit),
        "" | "h" | "help" | "?" => Ok(BrowseCommand::Help),
        "size" => arg
            .parse()
            .map(BrowseCommand::Size)
            .map_err(|_| format!("Invalid page size: {arg}")),
        "get" => name().map(BrowseCommand::Get),
        "rm" => name().map(BrowseCommand::Remove),
        "url" => name().map(BrowseCommand::CopyUrl),
        "open" => name().map(BrowseCommand::Open),
        other => other
            .parse()
            .map(BrowseCommand::Page)
            .map_err(|_| format!("Unknown command: {other}")),
    }
}

pub async fn browse(app_context: &AppContext) -> Result<()> {
    let ui = app_context.ui();
    let (mut controller, mut feedback) = app_context.controller()?;
    require_login(&controller)?;

    ui.new_status_line(format!(
        "Loading files from {} ...",
        app_context.settings().server
    ));
    controller.start().await;
    let _ = feedback.render(ui);
    render(ui, &controller);

    loop {
        let line = prompt_text("depot").await?;
        let command = match parse_browse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                ui.eprintln(message.yellow().to_string());
                continue;
            }
        };
        if command == BrowseCommand::Quit {
            break;
        }

        let redraw = apply(&mut controller, command, ui).await;
        let _ = feedback.render(ui);
        if redraw {
            render(ui, &controller);
        }
    }
    Ok(())
}

/// Run one browse command. Returns whether the page should be redrawn.
pub async fn apply(controller: &mut FileController, command: BrowseCommand, ui: &Ui) -> bool {
    match command {
        BrowseCommand::Next => controller.next_page(),
        BrowseCommand::Prev => controller.prev_page(),
        BrowseCommand::Page(page) => {
            let moved = controller.go_to_page(page);
            if !moved {
                ui.eprintln(format!(
                    "Page {} does not exist, there are {} pages.",
                    page,
                    controller.view().total_pages
                ));
            }
            moved
        }
        BrowseCommand::Size(size) => match controller.set_items_per_page(size) {
            Ok(()) => true,
            Err(e) => {
                ui.eprintln(e.user_message());
                false
            }
        },
        BrowseCommand::Refresh => {
            let _ = controller.refresh().await;
            true
        }
        BrowseCommand::Get(name) => {
            if let Ok(path) = controller.download(&name, Path::new(".")).await {
                ui.success(format!("Saved to {}", path.display()));
            }
            false
        }
        BrowseCommand::Remove(name) => controller.delete(&name, &TerminalConfirm).await.is_ok(),
        BrowseCommand::CopyUrl(name) => {
            let _ = controller.copy_url(&name, &Osc52Clipboard);
            false
        }
        BrowseCommand::Open(name) => {
            let url = controller.preview_url(&name);
            if open::that(&url).is_err() {
                ui.println(url);
            }
            false
        }
        BrowseCommand::Help => {
            ui.println(HELP);
            false
        }
        BrowseCommand::Quit => false,
    }
}

fn render(ui: &Ui, controller: &FileController) {
    ui.println(format_page(&controller.view()));
}
