use clap::{CommandFactory, Parser};
use depot_core::settings::ClientSettings;
use depotctl::cli::{print_completions, Cli, Commands};
use depotctl::commands;
use depotctl::context::AppContext;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // stderr only, stdout carries command output
    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Running command {:?} ...", &cli.command);

    if let Commands::Completion(cmd) = &cli.command {
        let mut cli_cmd = Cli::command();
        print_completions(cmd.shell, &mut cli_cmd);
        return Ok(());
    }

    let mut settings = ClientSettings::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        settings.server = server.clone();
    }
    settings.validate()?;

    let app_context = AppContext::new(settings).with_api_key(cli.api_key.clone());

    let result = match &cli.command {
        Commands::AuthLogin(cmd) => commands::auth::auth_login(&app_context, cmd).await,
        Commands::AuthLogout => commands::auth::auth_logout(&app_context).await,
        Commands::AuthStatus => commands::auth::auth_status(&app_context).await,
        Commands::FileList(cmd) => commands::files::list_files(&app_context, cmd).await,
        Commands::FileUpload(cmd) => commands::files::upload_file(&app_context, cmd).await,
        Commands::FileDownload(cmd) => commands::files::download_file(&app_context, cmd).await,
        Commands::FileDelete(cmd) => commands::files::delete_file(&app_context, cmd).await,
        Commands::FilePreview(cmd) => commands::files::preview_file(&app_context, cmd).await,
        Commands::FileCopyUrl(cmd) => commands::files::copy_file_url(&app_context, cmd).await,
        Commands::Browse => commands::browse::browse(&app_context).await,
        Commands::Completion(_) => Ok(()),
    };

    app_context.ui().clear();

    result
}
