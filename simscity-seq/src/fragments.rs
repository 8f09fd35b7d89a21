//! Technical fragmentation: how many fragments each gene is split into.

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use simscity_core::{Result, SimscityError};

use crate::consts::DEFAULT_FRAGMENT_LAMBDA;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Mean number of *additional* fragments per gene.
    pub lam: f64,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            lam: DEFAULT_FRAGMENT_LAMBDA,
        }
    }
}

///
/// Draw a fragment count for every gene: `1 + Poisson(lam)`.
///
/// Every gene keeps at least one fragment.
///
/// # Arguments
/// - n_genes: number of genes to fragment
/// - lam: mean number of extra fragments, must be finite and >= 0
/// - rng: random source
pub fn fragment_genes<R: Rng + ?Sized>(n_genes: usize, lam: f64, rng: &mut R) -> Result<Array1<usize>> {
    if !(lam >= 0.0 && lam.is_finite()) {
        return Err(SimscityError::InvalidParameter(format!(
            "lam must be finite and non-negative, got {}",
            lam
        )));
    }

    // Poisson(0) is a point mass at zero, which rand_distr refuses to build
    if lam == 0.0 {
        return Ok(Array1::ones(n_genes));
    }

    let poisson = Poisson::new(lam).map_err(|e| SimscityError::Distribution(e.to_string()))?;

    Ok((0..n_genes)
        .map(|_| 1 + poisson.sample(rng) as usize)
        .collect())
}
