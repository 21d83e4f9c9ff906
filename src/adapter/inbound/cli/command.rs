//! Command-line interface definitions.
//!
//! Subcommands cover the warehouse life cycle: writing a `.env` template,
//! applying the schema, generating and loading fixtures, and running the
//! platform syncs once or on a schedule.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sync Square, Instagram and Facebook data into a SQLite warehouse
#[derive(Parser, Debug)]
#[command(name = "closet-sync")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented .env template
    Setup(SetupArgs),

    /// Create the warehouse tables and indexes (idempotent)
    Schema,

    /// Load CSV fixtures into the warehouse
    Load(LoadArgs),

    /// Run the post-load integrity checks
    Check,

    /// Generate synthetic CSV fixtures
    Fixtures(FixturesArgs),

    /// Run a synchronization once
    Sync(SyncArgs),

    /// Check database and API connectivity
    Health,

    /// Run syncs and health checks on a schedule until Ctrl-C
    Schedule,
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Where to write the template
    #[arg(long, default_value = ".env")]
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Directory holding one <table>.csv per table [default: DATA_DIR]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Print business insights after loading
    #[arg(long)]
    pub insights: bool,
}

#[derive(Args, Debug)]
pub struct FixturesArgs {
    /// Output directory [default: DATA_DIR]
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Random seed; the same seed always produces the same files
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Which synchronization to run
    #[arg(value_enum)]
    pub mode: SyncMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SyncMode {
    /// Every Square resource, social posts, then analytics
    Full,
    /// Recent Square orders and social posts
    Quick,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn load_accepts_data_dir_and_insights() {
        let cli = parse(&["closet-sync", "load", "--data-dir", "fixtures", "--insights"]);
        match cli.command {
            Commands::Load(args) => {
                assert_eq!(args.data_dir, Some(PathBuf::from("fixtures")));
                assert!(args.insights);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_defaults_leave_data_dir_to_settings() {
        let cli = parse(&["closet-sync", "load"]);
        assert!(matches!(
            cli.command,
            Commands::Load(LoadArgs {
                data_dir: None,
                insights: false
            })
        ));
    }

    #[test]
    fn sync_requires_a_mode() {
        assert!(Cli::try_parse_from(["closet-sync", "sync"]).is_err());
        assert!(Cli::try_parse_from(["closet-sync", "sync", "partial"]).is_err());
        let cli = parse(&["closet-sync", "sync", "quick"]);
        assert!(matches!(
            cli.command,
            Commands::Sync(SyncArgs {
                mode: SyncMode::Quick
            })
        ));
    }

    #[test]
    fn fixtures_seed_defaults_to_42() {
        match parse(&["closet-sync", "fixtures"]).command {
            Commands::Fixtures(args) => {
                assert_eq!(args.seed, 42);
                assert_eq!(args.out, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = parse(&["closet-sync", "health", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn setup_writes_dot_env_by_default() {
        match parse(&["closet-sync", "setup"]).command {
            Commands::Setup(args) => assert_eq!(args.path, PathBuf::from(".env")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
