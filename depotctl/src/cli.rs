use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depotctl")]
#[command(about = "Upload, list, download and delete files on a depot server")]
#[command(version)]
pub struct Cli {
    /// Server URL, overrides the config file and DEPOT__SERVER
    #[arg(long, env = "DEPOT_SERVER")]
    pub server: Option<String>,

    /// Use this API key instead of the stored one. Nothing is persisted.
    #[arg(long, env = "DEPOT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Explicit config file (toml or yaml)
    #[arg(long, env = "DEPOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the issued API key
    #[command(name = "auth:login")]
    AuthLogin(AuthLoginCommand),

    /// Forget the stored API key
    #[command(name = "auth:logout")]
    AuthLogout,

    /// Show whether an API key is stored and accepted by the server
    #[command(name = "auth:status")]
    AuthStatus,

    /// List stored files, one page at a time
    #[command(name = "file:list")]
    FileList(FileListCommand),

    /// Upload a local file
    #[command(name = "file:upload")]
    FileUpload(FileUploadCommand),

    /// Download a stored file
    #[command(name = "file:download")]
    FileDownload(FileDownloadCommand),

    /// Delete a stored file
    #[command(name = "file:delete")]
    FileDelete(FileDeleteCommand),

    /// Open the public URL of a stored file
    #[command(name = "file:preview")]
    FilePreview(FilePreviewCommand),

    /// Copy the public URL of a stored file to the clipboard
    #[command(name = "file:copy-url")]
    FileCopyUrl(FileNameCommand),

    /// Interactive file browser
    #[command(name = "browse")]
    Browse,

    /// Show shell completion script.
    #[command(name = "completion")]
    Completion(CompletionCommand),
}

#[derive(Debug, Parser)]
pub struct AuthLoginCommand {
    /// Prompted for when omitted
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Prompted for when omitted
    #[arg(long, env = "DEPOT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Parser)]
pub struct FileListCommand {
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Defaults to `items_per_page` from the settings
    #[arg(long)]
    pub per_page: Option<usize>,
}

#[derive(Debug, Parser)]
pub struct FileUploadCommand {
    pub path: PathBuf,
}

#[derive(Debug, Parser)]
pub struct FileDownloadCommand {
    /// Stored name of the file
    pub name: String,

    /// Target directory, defaults to the current one
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct FileDeleteCommand {
    /// Stored name of the file
    pub name: String,

    /// Do not ask for confirmation
    #[arg(long, short = 'y', default_value = "false")]
    pub yes: bool,
}

#[derive(Debug, Parser)]
pub struct FilePreviewCommand {
    /// Stored name of the file
    pub name: String,

    /// Only print the URL
    #[arg(long, default_value = "false")]
    pub no_browser: bool,
}

#[derive(Debug, Parser)]
pub struct FileNameCommand {
    /// Stored name of the file
    pub name: String,
}

#[derive(Debug, Parser)]
pub struct CompletionCommand {
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn print_completions<G: clap_complete::Generator>(gen: G, cmd: &mut clap::Command) {
    clap_complete::generate(gen, cmd, cmd.get_name().to_string(), &mut std::io::stdout());
}
