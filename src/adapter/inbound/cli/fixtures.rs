//! `closet-sync fixtures`: generate synthetic CSV fixtures.

use super::command::FixturesArgs;
use super::output::Output;
use crate::application::fixture::{generate, FixtureConfig};
use crate::error::Result;
use crate::infrastructure::config::settings::Settings;

pub fn execute(settings: &Settings, args: &FixturesArgs, out: &Output) -> Result<bool> {
    let out_dir = args.out.clone().unwrap_or_else(|| settings.sync.data_dir.clone());
    let config = FixtureConfig {
        seed: args.seed,
        ..FixtureConfig::default()
    };

    out.section("Fixtures");
    let summary = generate(&config, &out_dir)?;
    for table in &summary.tables {
        out.field(table.table, format!("{} rows", table.rows));
    }
    out.data("fixtures", &summary);
    out.success(&format!(
        "Wrote {} files to {} (seed {})",
        summary.tables.len(),
        out_dir.display(),
        config.seed
    ));
    Ok(true)
}
