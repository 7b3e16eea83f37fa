use crate::cmd::progress;
use crate::config::{Config, ConfigLoader, truncate_chars};
use crate::error::Result;
use crate::xapi::XapiClient;
use crate::xapi::auth::{AccessToken, acquire_token};
use crate::xapi::users::{UpdateOutcome, UserUpdate, update_user};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Settings file (JSON with a "3CXSettings" section, or TOML with a [3CXSettings] table).
    /// Defaults to ./appsettings.json, then the user config directory
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Load the configuration and run the whole batch
pub async fn run(args: UpdateArgs) -> Result<()> {
    println!(
        "{} Starting application at {}",
        "→".cyan(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let loader = ConfigLoader::new(args.config);
    let (path, settings) = loader.load_settings()?;

    println!("Reading configuration from {}:", path.display());
    println!(
        "  [FQDN_3CX]        : [{}]",
        settings.fqdn.as_deref().unwrap_or("")
    );
    println!(
        "  [ApiClientID_3CX] : [{}]",
        settings.client_id.as_deref().unwrap_or("")
    );
    println!(
        "  [Enable2FA3CX]    : [{}]",
        settings.enable_2fa.as_deref().unwrap_or("")
    );

    let config = Config::from_settings(settings)?;
    println!(
        "{} Change value Enable2FA3CX to: {}",
        "→".cyan(),
        config.require_2fa.to_string().bold()
    );

    execute(&config).await
}

/// Authenticate once, then update every configured user in order.
///
/// An authentication failure is returned before any user is touched. Per-user
/// failures are printed and skipped; the result is `Ok` however many failed.
pub async fn execute(config: &Config) -> Result<()> {
    let client = XapiClient::new(&config.base_address)?;

    let spinner = progress::create_spinner("Authenticating...");
    let token = match acquire_token(&client, &config.client_id, &config.client_secret, &spinner).await {
        Ok(token) => {
            progress::finish_spinner_success(
                &spinner,
                &format!("Authenticated as client {}...", truncate_chars(&config.client_id, 8)),
            );
            token
        }
        Err(e) => {
            progress::finish_spinner_error(&spinner, "Authentication failed");
            return Err(e);
        }
    };

    update_all(&client, &token, config).await;
    Ok(())
}

async fn update_all(client: &XapiClient, token: &AccessToken, config: &Config) {
    println!("{} Starting updates", "→".cyan());

    let bar = progress::create_progress_bar(config.user_ids.len() as u64, "Updating users");

    for &user_id in &config.user_ids {
        let outcome = update_user(client, token, UserUpdate::new(user_id, config.require_2fa)).await;
        progress::print_line(&bar, &describe(&outcome));
        bar.inc(1);
    }

    progress::finish(&bar);
}

fn describe(outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::Updated {
            user_id,
            status,
            body,
        } => format!(
            "{} Response for User ID {}: {}, {}",
            "✓".green(),
            user_id,
            status,
            body
        ),
        UpdateOutcome::Failed {
            user_id,
            status: Some(status),
            message,
        } => format!(
            "{} Request failed for User ID {} ({}): {}",
            "✗".red(),
            user_id,
            status,
            message
        ),
        UpdateOutcome::Failed {
            user_id,
            status: None,
            message,
        } => format!(
            "{} Request failed for User ID {}: {}",
            "✗".red(),
            user_id,
            message
        ),
    }
}
