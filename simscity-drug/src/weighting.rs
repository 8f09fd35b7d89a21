//! Sparse weight matrices tying latent programs to outputs.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use simscity_core::{Result, ScalarOrArray, SimscityError};

///
/// Anything that can produce a `(n_latent, n_outputs)` weight matrix.
///
/// `sparsity` is the probability that a latent program is active for an
/// output and `scale` the magnitude of active weights. Both are either one
/// value for every program or one value per program.
pub trait WeightingGenerator {
    fn gen_weighting<R: Rng + ?Sized>(
        &self,
        n_latent: usize,
        n_outputs: usize,
        sparsity: &ScalarOrArray<f64>,
        scale: &ScalarOrArray<f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>>;
}

/// Entry `(i, j)` is `scale[i] * N(0, 1)` with probability `sparsity[i]`, zero otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseGaussianWeighting;

impl WeightingGenerator for SparseGaussianWeighting {
    fn gen_weighting<R: Rng + ?Sized>(
        &self,
        n_latent: usize,
        n_outputs: usize,
        sparsity: &ScalarOrArray<f64>,
        scale: &ScalarOrArray<f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        if !sparsity.all(|&p| (0.0..=1.0).contains(&p)) {
            return Err(SimscityError::InvalidParameter(
                "sparsity must be a probability in [0, 1]".to_string(),
            ));
        }
        if !scale.all(|s| s.is_finite()) {
            return Err(SimscityError::InvalidParameter(
                "scale must be finite".to_string(),
            ));
        }

        let sparsity = sparsity.broadcast_1d(n_latent)?;
        let scale = scale.broadcast_1d(n_latent)?;

        let mut weights = Array2::zeros((n_latent, n_outputs));
        for ((i, _), w) in weights.indexed_iter_mut() {
            if rng.random_bool(sparsity[i]) {
                let z: f64 = StandardNormal.sample(rng);
                *w = scale[i] * z;
            }
        }

        Ok(weights)
    }
}
