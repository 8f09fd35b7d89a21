use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const SEQ_CMD: &str = "seq";
pub const DEFAULT_OUT: &str = "simscity_seq";

pub fn create_seq_cli() -> Command {
    Command::new(SEQ_CMD)
        .about("Simulate library sizes, fragmentation, UMI sampling and PCR over an expression array.")
        .arg(
            arg!(--input <INPUT>)
                .required(true)
                .help("Path to a non-negative f64 .npy array of shape (..., n_genes)"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("Path to a TOML sequencing config (defaults are used when omitted)"),
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
                .help("Random seed, overrides the seed in the config"),
        )
        .arg(
            Arg::new("sparse")
                .long("sparse")
                .action(ArgAction::SetTrue)
                .help("Write counts as sparse Matrix Market files instead of .npy"),
        )
}
