use log::info;
use ndarray::{Array1, ArrayBase, ArrayD, Data, Dimension};
use rand::Rng;

use simscity_core::{CountMatrix, Result};

use crate::config::SequencingConfig;
use crate::fragments::fragment_genes;
use crate::library_size::library_size_for_shape;
use crate::pcr::pcr_noise;
use crate::umi::{UmiConfig, cell_shape, umi_counts};

/// Every intermediate of a sequencing simulation.
#[derive(Debug, Clone)]
pub struct SequencingOutput {
    /// Library size of each cell, shaped like the cell axes of the input.
    pub library_sizes: ArrayD<u64>,
    pub fragments_per_gene: Array1<usize>,
    pub umis: CountMatrix,
    /// Amplified counts, present only when PCR is configured.
    pub reads: Option<CountMatrix>,
}

///
/// Run the whole measurement model over `raw_expression`: draw library sizes,
/// fragment genes, sample UMIs and optionally amplify them.
///
/// Random draws happen in that order from `rng`, so a seeded run is
/// reproducible end to end.
///
/// # Arguments
/// - raw_expression: non-negative array of shape `(..., n_genes)`
/// - config: settings for every stage
/// - rng: random source
pub fn simulate_sequencing<S, D, R>(
    raw_expression: &ArrayBase<S, D>,
    config: &SequencingConfig,
    rng: &mut R,
) -> Result<SequencingOutput>
where
    S: Data<Elem = f64>,
    D: Dimension,
    R: Rng + ?Sized,
{
    let shape = raw_expression.shape();
    let cells = cell_shape(shape)?;
    let n_genes = shape[shape.len() - 1];

    info!("Drawing library sizes for {} cells", cells.iter().product::<usize>());
    let library_sizes = library_size_for_shape(&cells, &config.library_size, rng)?;

    let fragments_per_gene = match &config.fragments {
        Some(fragments) => {
            info!("Fragmenting {} genes (lambda = {})", n_genes, fragments.lam);
            fragment_genes(n_genes, fragments.lam, rng)?
        }
        None => Array1::ones(n_genes),
    };

    let umi_config = UmiConfig::default()
        .with_lib_size(library_sizes.clone())
        .with_fragments(fragments_per_gene.clone())
        .with_sparse(config.sparse)
        .with_zero_expression(config.zero_expression);

    info!("Sampling UMIs");
    let umis = umi_counts(raw_expression, &umi_config, rng)?;

    let reads = match &config.pcr {
        Some(pcr) => {
            info!("Amplifying UMIs over {} PCR cycles", pcr.n_cycles);
            Some(pcr_noise(&umis, pcr, rng)?)
        }
        None => None,
    };

    Ok(SequencingOutput {
        library_sizes,
        fragments_per_gene,
        umis,
        reads,
    })
}
