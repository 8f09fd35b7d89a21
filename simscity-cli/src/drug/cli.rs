use clap::{Arg, Command, arg, value_parser};

pub const DRUG_CMD: &str = "drug";
pub const DEFAULT_OUT: &str = "simscity_drug";

pub fn create_drug_cli() -> Command {
    Command::new(DRUG_CMD)
        .about("Simulate a drug screen: project latent states and compute dose-response curves.")
        .arg(
            arg!(--latent <LATENT>)
                .required(true)
                .help("Path to an f64 .npy array of shape (n_samples, n_latent)"),
        )
        .arg(
            arg!(--conditions <CONDITIONS>)
                .required(false)
                .value_parser(value_parser!(usize))
                .default_value("8")
                .help("Number of dose conditions"),
        )
        .arg(
            arg!(--sparsity <SPARSITY>)
                .required(false)
                .value_parser(value_parser!(f64))
                .default_value("0.5")
                .help("Probability that a latent program affects the response"),
        )
        .arg(
            arg!(--scale <SCALE>)
                .required(false)
                .value_parser(value_parser!(f64))
                .default_value("1.0")
                .help("Magnitude of the projection weights"),
        )
        .arg(
            Arg::new("dose-scale")
                .long("dose-scale")
                .required(false)
                .value_parser(value_parser!(f64))
                .default_value("1.0")
                .help("Effect magnitude of the dose grid"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .default_value(DEFAULT_OUT)
                .help("Output directory"),
        )
        .arg(
            arg!(--seed <SEED>)
                .required(false)
                .value_parser(value_parser!(u64))
                .help("Random seed"),
        )
}
