//! `closet-sync setup`: write the `.env` template.

use super::command::SetupArgs;
use super::output::Output;
use crate::error::Result;
use crate::infrastructure::config::settings::write_env_template;

pub fn execute(args: &SetupArgs, out: &Output) -> Result<bool> {
    write_env_template(&args.path)?;
    out.success(&format!("Wrote configuration template to {}", args.path.display()));
    out.note("Fill in your API credentials, then run `closet-sync schema`.");
    Ok(true)
}
