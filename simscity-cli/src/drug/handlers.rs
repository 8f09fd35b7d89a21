use std::fs::create_dir_all;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use ndarray::Array2;
use tracing::info;

use simscity_core::{ScalarOrArray, seeded_rng};
use simscity_drug::{DoseConfig, DrugScreen, SparseGaussianWeighting};

use crate::io::{read_array, write_array};

pub fn run_drug(matches: &ArgMatches) -> Result<()> {
    let latent = matches
        .get_one::<String>("latent")
        .context("A path to a latent array is required.")?;

    let output = matches
        .get_one::<String>("output")
        .context("An output directory is required.")?;

    let config = DoseConfig {
        sparsity: ScalarOrArray::Scalar(*matches.get_one::<f64>("sparsity").context("--sparsity has a default")?),
        scale: ScalarOrArray::Scalar(*matches.get_one::<f64>("scale").context("--scale has a default")?),
        dose_scale: *matches
            .get_one::<f64>("dose-scale")
            .context("--dose-scale has a default")?,
        n_conditions: *matches
            .get_one::<usize>("conditions")
            .context("--conditions has a default")?,
    };
    let seed = matches.get_one::<u64>("seed").copied();

    let latent: Array2<f64> = read_array(Path::new(latent))?;
    info!(
        "Loaded {} samples with {} latent programs",
        latent.nrows(),
        latent.ncols()
    );

    let mut rng = seeded_rng(seed);
    let screen = DrugScreen::new(latent.ncols(), &config, &SparseGaussianWeighting, &mut rng)?;
    let response = screen.response(latent.view())?;

    let output = Path::new(output);
    create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    write_array(&screen.weights, &output.join("weights.npy"))?;
    write_array(&screen.doses, &output.join("doses.npy"))?;
    write_array(&response, &output.join("response.npy"))?;

    info!(
        "Wrote {} x {} responses to {}",
        response.nrows(),
        response.ncols(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::Array1;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    use crate::build_parser;

    #[rstest]
    fn test_run_drug() {
        let dir = tempdir().unwrap();
        let latent = dir.path().join("latent.npy");
        let out = dir.path().join("out");
        write_array(&Array2::from_shape_fn((6, 4), |(i, j)| (i as f64 - j as f64) / 4.0), &latent).unwrap();

        let matches = build_parser()
            .try_get_matches_from([
                "simscity",
                "drug",
                "--latent",
                latent.to_str().unwrap(),
                "--conditions",
                "5",
                "--output",
                out.to_str().unwrap(),
                "--seed",
                "12",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        run_drug(sub).unwrap();

        let weights: Array1<f64> = read_array(&out.join("weights.npy")).unwrap();
        let doses: Array1<f64> = read_array(&out.join("doses.npy")).unwrap();
        let response: Array2<f64> = read_array(&out.join("response.npy")).unwrap();

        assert_eq!(weights.len(), 4);
        assert_eq!(doses.len(), 5);
        assert_eq!(response.dim(), (6, 5));
        assert_eq!(response.iter().all(|&v| v > 0.0 && v < 1.0), true);
    }
}
