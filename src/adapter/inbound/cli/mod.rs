//! CLI module graph and command dispatch.

pub mod command;
pub mod fixtures;
pub mod health;
pub mod load;
pub mod output;
pub mod schema;
pub mod setup;
pub mod sync;

use command::{Cli, Commands};
use output::Output;

use crate::error::Result;
use crate::infrastructure::config::settings::Settings;

impl Cli {
    /// Output mode selected by the global flags.
    #[must_use]
    pub fn output(&self) -> Output {
        Output::new(self.json, self.quiet)
    }

    /// Whether the command can run without loading settings.
    #[must_use]
    pub fn needs_settings(&self) -> bool {
        !matches!(self.command, Commands::Setup(_))
    }
}

/// Run the parsed command. `Ok(false)` means the command ran and reported a
/// failure; errors mean it could not run at all.
pub async fn run(cli: &Cli, settings: &Settings, out: &Output) -> Result<bool> {
    match &cli.command {
        Commands::Setup(args) => setup::execute(args, out),
        Commands::Schema => schema::execute(settings, out),
        Commands::Load(args) => load::execute(settings, args, out),
        Commands::Check => load::check(settings, out),
        Commands::Fixtures(args) => fixtures::execute(settings, args, out),
        Commands::Sync(args) => sync::execute(settings, args, out).await,
        Commands::Health => sync::health(settings, out).await,
        Commands::Schedule => sync::schedule(settings, out).await,
    }
}
