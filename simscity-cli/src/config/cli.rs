use clap::{Command, arg};

pub const CONFIG_CMD: &str = "config";
pub const DEFAULT_OUT: &str = "simscity.toml";

pub fn create_config_cli() -> Command {
    Command::new(CONFIG_CMD)
        .about("Write a sequencing config with every default filled in.")
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .default_value(DEFAULT_OUT)
                .help("Where to write the TOML file"),
        )
}
