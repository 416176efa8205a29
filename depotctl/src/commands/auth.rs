use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use secrecy::SecretString;

use crate::cli::AuthLoginCommand;
use crate::context::AppContext;
use crate::utils::terminal::{prompt_password, prompt_text};

pub async fn auth_login(app_context: &AppContext, cmd: &AuthLoginCommand) -> Result<()> {
    let ui = app_context.ui();
    let username = match &cmd.username {
        Some(username) => username.clone(),
        None => prompt_text("Username").await?,
    };
    let password = match &cmd.password {
        Some(password) => password.clone(),
        None => prompt_password("Password").await?,
    };

    let (mut controller, mut feedback) = app_context.controller()?;
    ui.new_status_line(format!(
        "Logging in to {} as {} ...",
        app_context.settings().server,
        username.yellow()
    ));

    let password = SecretString::from(password);
    if controller.login(&username, &password).await.is_err() {
        let message = controller
            .login_message()
            .unwrap_or("Login failed.")
            .to_string();
        bail!(message);
    }

    if app_context.uses_api_key_override() {
        ui.success("Logged in. The key was not stored because --api-key is set.");
    } else {
        ui.success("Logged in, API key stored.");
    }
    // the key is kept even when the first listing fails
    feedback.render(ui)?;
    ui.println(format!(
        "{} files available.",
        controller.registry().snapshot().len()
    ));
    Ok(())
}

pub async fn auth_logout(app_context: &AppContext) -> Result<()> {
    let (mut controller, _) = app_context.controller()?;
    controller.logout();
    app_context.ui().success("Logged out, stored API key removed.");
    Ok(())
}

pub async fn auth_status(app_context: &AppContext) -> Result<()> {
    let ui = app_context.ui();
    let (mut controller, _) = app_context.controller()?;

    if !controller.session().is_authenticated() {
        ui.println(format!(
            "{} Run {} first.",
            "Not logged in.".yellow(),
            "depotctl auth:login".cyan()
        ));
        return Ok(());
    }

    ui.new_status_line(format!(
        "Checking API key against {} ...",
        app_context.settings().server
    ));
    match controller.refresh().await {
        Ok(_) => {
            ui.success(format!(
                "Authenticated against {}",
                app_context.settings().server
            ));
            ui.println(format!(
                "{} files available.",
                controller.registry().snapshot().len()
            ));
            Ok(())
        }
        Err(e) if e.is_auth_error() => {
            bail!("The API key was rejected by the server. Run depotctl auth:login again.")
        }
        Err(e) => Err(e.into()),
    }
}
