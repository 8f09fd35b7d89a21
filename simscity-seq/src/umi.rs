//! UMI sampling: turning "true" expression into integer molecule counts.

use std::iter;

use log::{debug, warn};
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sprs::CsMat;

use simscity_core::{CountMatrix, Result, ScalarOrArray, SimscityError};

use crate::consts::DEFAULT_FRAGMENTS_PER_GENE;
use crate::library_size::{LibrarySizeParams, library_size_for_shape};
use crate::multinomial::sample_multinomial;

/// What to do with a cell whose expression sums to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroExpressionPolicy {
    /// Fail with [`SimscityError::ZeroExpression`].
    #[default]
    Error,
    /// Emit an all-zero row; the cell's library budget is not spent.
    ZeroFill,
}

/// Library sizes for `umi_counts`: drawn per cell, or given by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LibrarySize {
    Sampled(LibrarySizeParams),
    Fixed(ScalarOrArray<u64>),
}

impl Default for LibrarySize {
    fn default() -> Self {
        LibrarySize::Sampled(LibrarySizeParams::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UmiConfig {
    pub lib_size: LibrarySize,
    pub fragments_per_gene: ScalarOrArray<usize>,
    pub sparse: bool,
    pub zero_expression: ZeroExpressionPolicy,
}

impl Default for UmiConfig {
    fn default() -> Self {
        Self {
            lib_size: LibrarySize::default(),
            fragments_per_gene: ScalarOrArray::Scalar(DEFAULT_FRAGMENTS_PER_GENE),
            sparse: false,
            zero_expression: ZeroExpressionPolicy::default(),
        }
    }
}

impl UmiConfig {
    pub fn with_lib_size(mut self, lib_size: impl Into<ScalarOrArray<u64>>) -> Self {
        self.lib_size = LibrarySize::Fixed(lib_size.into());
        self
    }

    pub fn with_library_params(mut self, params: LibrarySizeParams) -> Self {
        self.lib_size = LibrarySize::Sampled(params);
        self
    }

    pub fn with_fragments(mut self, fragments_per_gene: impl Into<ScalarOrArray<usize>>) -> Self {
        self.fragments_per_gene = fragments_per_gene.into();
        self
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn with_zero_expression(mut self, policy: ZeroExpressionPolicy) -> Self {
        self.zero_expression = policy;
        self
    }
}

///
/// Split an expression shape into its cell axes (everything but the last axis).
///
/// Fails when there is no separate cell axis.
pub fn cell_shape(shape: &[usize]) -> Result<Vec<usize>> {
    match shape.split_last() {
        Some((_, leading)) if !leading.is_empty() => Ok(leading.to_vec()),
        _ => Err(SimscityError::InsufficientDimensions {
            ndim: shape.len(),
            required: 2,
        }),
    }
}

///
/// Generate UMI counts by multinomial sampling of every cell.
///
/// The last axis of `raw_expression` indexes genes, every other axis indexes
/// cells. Each gene is expanded into its fragments (a gene with `k` fragments
/// contributes `k` identical columns), the expanded row is normalized into
/// sampling probabilities, and one multinomial draw of the cell's library size
/// is taken. The output's trailing axis is the total fragment count, not the
/// gene count.
///
/// Cells are sampled independently: one seed per cell is drawn from `rng` in
/// row-major order, so results do not depend on how cells are scheduled.
///
/// # Arguments
/// - raw_expression: non-negative array of shape `(..., n_genes)`, at least 2-D
/// - config: library sizes, fragments per gene, output layout
/// - rng: random source
///
/// # Returns
/// A dense array of shape `(..., n_fragments)`, or a 2-D CSR matrix with all
/// leading axes flattened into rows when `config.sparse` is set.
pub fn umi_counts<S, D, R>(
    raw_expression: &ArrayBase<S, D>,
    config: &UmiConfig,
    rng: &mut R,
) -> Result<CountMatrix>
where
    S: Data<Elem = f64>,
    D: Dimension,
    R: Rng + ?Sized,
{
    let raw = raw_expression.view().into_dyn();
    let cells = cell_shape(raw.shape())?;

    if raw.iter().any(|v| !(*v >= 0.0)) {
        return Err(SimscityError::NegativeExpression);
    }

    if config.sparse && raw.ndim() > 2 {
        warn!("Reshaping output to 2 dimensions for sparse matrix");
    }

    let n_genes = raw.shape()[raw.ndim() - 1];
    let n_cells: usize = cells.iter().product();

    let lib_sizes = match &config.lib_size {
        LibrarySize::Sampled(params) => library_size_for_shape(&cells, params, rng)?,
        LibrarySize::Fixed(sizes) => sizes.broadcast_to(&cells)?,
    };
    let lib_sizes: Vec<u64> = lib_sizes.iter().copied().collect();

    let fragments = config.fragments_per_gene.broadcast_1d(n_genes)?;
    if fragments.iter().any(|&k| k == 0) {
        return Err(SimscityError::InvalidParameter(
            "fragments_per_gene must be at least 1".to_string(),
        ));
    }

    // gene index of every fragment column
    let fragment_gene: Vec<usize> = fragments
        .iter()
        .enumerate()
        .flat_map(|(gene, &k)| iter::repeat(gene).take(k))
        .collect();
    let n_features = fragment_gene.len();

    let raw = raw.as_standard_layout();
    let raw = raw.view().into_shape((n_cells, n_genes))?;

    let totals: Vec<f64> = raw
        .outer_iter()
        .map(|row| row.iter().zip(fragments.iter()).map(|(&x, &k)| x * k as f64).sum::<f64>())
        .collect();

    if let Some(cell) = totals.iter().position(|t| !t.is_finite()) {
        return Err(SimscityError::InvalidParameter(format!(
            "expression of cell {} is not finite",
            cell
        )));
    }

    let zero_cells = totals.iter().filter(|&&t| t <= 0.0).count();
    if zero_cells > 0 {
        match config.zero_expression {
            ZeroExpressionPolicy::Error => {
                let cell = totals.iter().position(|&t| t <= 0.0).unwrap_or_default();
                return Err(SimscityError::ZeroExpression { cell });
            }
            ZeroExpressionPolicy::ZeroFill => {
                warn!("{} cells have zero total expression, emitting empty rows", zero_cells);
            }
        }
    }

    debug!(
        "Sampling UMIs for {} cells over {} genes ({} fragments)",
        n_cells, n_genes, n_features
    );

    let seeds: Vec<u64> = (0..n_cells).map(|_| rng.random()).collect();

    let sample_cell = |cell: usize| -> Result<Vec<u64>> {
        let total = totals[cell];
        if total <= 0.0 {
            return Ok(vec![0; n_features]);
        }
        let row = raw.row(cell);
        let gene_p: Vec<f64> = fragment_gene.iter().map(|&g| row[g] / total).collect();

        let mut cell_rng = StdRng::seed_from_u64(seeds[cell]);
        sample_multinomial(lib_sizes[cell], &gene_p, &mut cell_rng)
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<u64>> = (0..n_cells)
        .into_par_iter()
        .map(|cell| sample_cell(cell))
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<u64>> = (0..n_cells)
        .map(|cell| sample_cell(cell))
        .collect::<Result<_>>()?;

    if config.sparse {
        let mut indptr = Vec::with_capacity(n_cells + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();

        indptr.push(0);
        for row in &rows {
            for (col, &count) in row.iter().enumerate() {
                if count > 0 {
                    indices.push(col);
                    data.push(count);
                }
            }
            indptr.push(indices.len());
        }

        Ok(CountMatrix::Sparse(CsMat::new(
            (n_cells, n_features),
            indptr,
            indices,
            data,
        )))
    } else {
        let mut shape = cells;
        shape.push(n_features);
        let flat: Vec<u64> = rows.concat();

        Ok(CountMatrix::Dense(ArrayD::from_shape_vec(IxDyn(&shape), flat)?))
    }
}
