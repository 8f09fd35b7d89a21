use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use simscity_seq::SequencingConfig;

pub fn run_config(matches: &ArgMatches) -> Result<()> {
    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;
    let output = Path::new(output);

    SequencingConfig::default()
        .to_file(output)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!("Wrote default config to {}", output.display());

    Ok(())
}
