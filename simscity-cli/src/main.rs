mod config;
mod drug;
mod io;
mod seq;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "simscity";
    pub const DEFAULT_LOG_FILTER: &str = "info";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Simulate drug responses and single-cell sequencing noise on top of latent and expression data.")
        .subcommand_required(true)
        .subcommand(seq::cli::create_seq_cli())
        .subcommand(drug::cli::create_drug_cli())
        .subcommand(config::cli::create_config_cli())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(consts::DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // SEQUENCING NOISE
        //
        Some((seq::cli::SEQ_CMD, matches)) => {
            seq::handlers::run_seq(matches)?;
        }

        //
        // DRUG RESPONSE
        //
        Some((drug::cli::DRUG_CMD, matches)) => {
            drug::handlers::run_drug(matches)?;
        }

        //
        // DEFAULT CONFIG
        //
        Some((config::cli::CONFIG_CMD, matches)) => {
            config::handlers::run_config(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
