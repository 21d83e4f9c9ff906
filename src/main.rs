use std::process::ExitCode;

use clap::Parser;
use closet_sync::adapter::inbound::cli::command::Cli;
use closet_sync::adapter::inbound::cli::run;
use closet_sync::infrastructure::config::settings::Settings;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let out = cli.output();

    let settings = match Settings::from_env() {
        Ok(settings) => Some(settings),
        Err(e) if cli.needs_settings() => {
            out.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::FAILURE;
        }
        Err(_) => None,
    };

    let mut logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default()
        .with_verbosity(cli.verbose);
    if cli.quiet {
        logging.level = "warn".into();
    }
    let _log_guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            out.error(&format!("Failed to initialize logging: {e}"));
            return ExitCode::FAILURE;
        }
    };

    out.header(env!("CARGO_PKG_VERSION"));
    let settings = settings.unwrap_or_default();

    match run(&cli, &settings, &out).await {
        Ok(true) => {
            info!("closet-sync finished");
            ExitCode::SUCCESS
        }
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Command failed");
            out.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
