use std::fs::{File, create_dir_all};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use ndarray::ArrayD;
use serde::Serialize;
use tracing::info;

use simscity_core::seeded_rng;
use simscity_seq::{SequencingConfig, SequencingOutput, simulate_sequencing};

use crate::io::{read_array, write_array, write_counts};

#[derive(Serialize)]
struct SeqSummary {
    input_shape: Vec<usize>,
    n_features: usize,
    sparse: bool,
    seed: Option<u64>,
    total_umis: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_reads: Option<u64>,
    mean_library_size: f64,
    files: Vec<String>,
}

pub fn run_seq(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to an expression array is required.")?;

    let output = matches
        .get_one::<String>("output")
        .context("An output directory is required.")?;

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SequencingConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => SequencingConfig::default(),
    };

    // command line flags win over the config file
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if matches.get_flag("sparse") {
        config.sparse = true;
    }

    let raw: ArrayD<f64> = read_array(Path::new(input))?;
    info!("Loaded expression array of shape {:?}", raw.shape());

    let mut rng = seeded_rng(config.seed);
    let simulated = simulate_sequencing(&raw, &config, &mut rng)?;

    let output = Path::new(output);
    create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let files = write_outputs(&simulated, output)?;

    let summary = SeqSummary {
        input_shape: raw.shape().to_vec(),
        n_features: simulated.fragments_per_gene.sum(),
        sparse: config.sparse,
        seed: config.seed,
        total_umis: simulated.umis.total(),
        total_reads: simulated.reads.as_ref().map(|reads| reads.total()),
        mean_library_size: simulated.library_sizes.mapv(|s| s as f64).mean().unwrap_or(0.0),
        files,
    };

    let summary_path = output.join("summary.json");
    serde_json::to_writer_pretty(File::create(&summary_path)?, &summary)?;

    info!("Wrote simulation to {}", output.display());

    Ok(())
}

fn write_outputs(simulated: &SequencingOutput, output: &Path) -> Result<Vec<String>> {
    let mut written = Vec::new();

    let path = output.join("library_sizes.npy");
    write_array(&simulated.library_sizes, &path)?;
    written.push(path);

    // npy has no usize element type
    let path = output.join("fragments_per_gene.npy");
    write_array(&simulated.fragments_per_gene.mapv(|k| k as u64), &path)?;
    written.push(path);

    written.push(write_counts(&simulated.umis, output, "umis")?);

    if let Some(reads) = &simulated.reads {
        written.push(write_counts(reads, output, "reads")?);
    }

    Ok(written
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}
