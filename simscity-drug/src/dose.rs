//! Dose-response model.
//!
//! Latent states are projected onto a single drug-susceptibility axis. Each
//! sample's score is shifted by every dose threshold and squashed through a
//! logistic function, giving one dose-response curve per sample.

use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use simscity_core::{Result, ScalarOrArray, SimscityError};

use crate::consts::{
    DEFAULT_DOSE_SCALE, DEFAULT_N_CONDITIONS, DEFAULT_SPARSITY, DEFAULT_WEIGHT_SCALE, DOSE_RANGE,
};
use crate::weighting::WeightingGenerator;

///
/// Project latent programs onto one drug-effect axis.
///
/// Asks `generator` for a single output column and flattens it.
///
/// # Arguments
/// - n_latent: number of latent programs
/// - sparsity: probability a program is active, scalar or per program
/// - scale: magnitude of active weights, scalar or per program
/// - generator: source of the weight matrix
/// - rng: random source
pub fn projection<G, R>(
    n_latent: usize,
    sparsity: &ScalarOrArray<f64>,
    scale: &ScalarOrArray<f64>,
    generator: &G,
    rng: &mut R,
) -> Result<Array1<f64>>
where
    G: WeightingGenerator,
    R: Rng + ?Sized,
{
    let weights = generator.gen_weighting(n_latent, 1, sparsity, scale, rng)?;

    if weights.nrows() != n_latent {
        return Err(SimscityError::DimensionMismatch {
            expected: n_latent,
            actual: weights.nrows(),
        });
    }
    if weights.ncols() != 1 {
        return Err(SimscityError::DimensionMismatch {
            expected: 1,
            actual: weights.ncols(),
        });
    }

    Ok(weights.index_axis_move(Axis(1), 0))
}

///
/// Dose thresholds: an even grid over `[-3 * scale, 3 * scale]` with
/// independent `N(0, 1 / n_conditions^2)` jitter on every point.
///
/// # Arguments
/// - scale: effect magnitude
/// - n_conditions: number of doses, at least 1
/// - rng: random source
pub fn doses<R: Rng + ?Sized>(scale: f64, n_conditions: usize, rng: &mut R) -> Result<Array1<f64>> {
    if n_conditions == 0 {
        return Err(SimscityError::InvalidParameter(
            "n_conditions must be at least 1".to_string(),
        ));
    }
    if !scale.is_finite() {
        return Err(SimscityError::InvalidParameter(format!(
            "scale must be finite, got {}",
            scale
        )));
    }

    let sd = 1.0 / (n_conditions * n_conditions) as f64;
    let noise = Normal::new(0.0, sd).map_err(|e| SimscityError::Distribution(e.to_string()))?;

    let grid = Array1::linspace(-DOSE_RANGE * scale, DOSE_RANGE * scale, n_conditions);

    Ok(grid.mapv(|d| d + noise.sample(rng)))
}

///
/// Dose-response of every sample at every dose.
///
/// `out[i, j] = sigmoid(latent[i] . weights + doses[j])`
///
/// # Arguments
/// - latent: `(n_samples, n_latent)` latent states
/// - weights: `(n_latent,)` projection from [`projection`]
/// - doses: `(n_conditions,)` thresholds from [`doses`]
///
/// # Returns
/// A `(n_samples, n_conditions)` matrix of responses in `(0, 1)`. Scores far
/// beyond the float range of the logistic saturate to exactly 0 or 1.
pub fn response(
    latent: ArrayView2<f64>,
    weights: ArrayView1<f64>,
    doses: ArrayView1<f64>,
) -> Result<Array2<f64>> {
    if latent.ncols() != weights.len() {
        return Err(SimscityError::DimensionMismatch {
            expected: weights.len(),
            actual: latent.ncols(),
        });
    }

    let scores = latent.dot(&weights);
    debug!(
        "Computing response for {} samples over {} doses",
        scores.len(),
        doses.len()
    );

    Ok(Array2::from_shape_fn((scores.len(), doses.len()), |(i, j)| {
        sigmoid(scores[i] + doses[j])
    }))
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DoseConfig {
    /// Probability that a latent program affects the drug response.
    pub sparsity: ScalarOrArray<f64>,
    /// Magnitude of the projection weights.
    pub scale: ScalarOrArray<f64>,
    /// Doses span `[-DOSE_RANGE * dose_scale, DOSE_RANGE * dose_scale]`.
    pub dose_scale: f64,
    pub n_conditions: usize,
}

impl Default for DoseConfig {
    fn default() -> Self {
        Self {
            sparsity: ScalarOrArray::Scalar(DEFAULT_SPARSITY),
            scale: ScalarOrArray::Scalar(DEFAULT_WEIGHT_SCALE),
            dose_scale: DEFAULT_DOSE_SCALE,
            n_conditions: DEFAULT_N_CONDITIONS,
        }
    }
}

/// A drawn projection together with its dose grid.
#[derive(Debug, Clone)]
pub struct DrugScreen {
    pub weights: Array1<f64>,
    pub doses: Array1<f64>,
}

impl DrugScreen {
    /// Draw the projection first, then the doses.
    pub fn new<G, R>(n_latent: usize, config: &DoseConfig, generator: &G, rng: &mut R) -> Result<Self>
    where
        G: WeightingGenerator,
        R: Rng + ?Sized,
    {
        let weights = projection(n_latent, &config.sparsity, &config.scale, generator, rng)?;
        let doses = doses(config.dose_scale, config.n_conditions, rng)?;

        Ok(Self { weights, doses })
    }

    pub fn n_latent(&self) -> usize {
        self.weights.len()
    }

    pub fn n_conditions(&self) -> usize {
        self.doses.len()
    }

    pub fn response(&self, latent: ArrayView2<f64>) -> Result<Array2<f64>> {
        response(latent, self.weights.view(), self.doses.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::{fixture, rstest};

    use crate::weighting::SparseGaussianWeighting;

    #[fixture]
    fn rng() -> StdRng {
        StdRng::seed_from_u64(21)
    }

    /// Always returns the same matrix, whatever is asked for.
    struct FixedWeighting(Array2<f64>);

    impl WeightingGenerator for FixedWeighting {
        fn gen_weighting<R: Rng + ?Sized>(
            &self,
            _n_latent: usize,
            _n_outputs: usize,
            _sparsity: &ScalarOrArray<f64>,
            _scale: &ScalarOrArray<f64>,
            _rng: &mut R,
        ) -> Result<Array2<f64>> {
            Ok(self.0.clone())
        }
    }

    #[rstest]
    fn test_projection_flattens_single_column(mut rng: StdRng) {
        let generator = FixedWeighting(array![[0.5], [0.0], [-1.0]]);
        let weights = projection(3, &0.5.into(), &1.0.into(), &generator, &mut rng).unwrap();
        assert_eq!(weights, array![0.5, 0.0, -1.0]);
    }

    #[rstest]
    fn test_projection_rejects_wrong_shape(mut rng: StdRng) {
        let generator = FixedWeighting(array![[0.5, 1.0], [0.0, 1.0]]);
        let result = projection(2, &0.5.into(), &1.0.into(), &generator, &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::DimensionMismatch { expected: 1, actual: 2 })), true);
    }

    #[rstest]
    fn test_projection_with_default_generator(mut rng: StdRng) {
        let weights = projection(50, &0.2.into(), &2.0.into(), &SparseGaussianWeighting, &mut rng).unwrap();
        assert_eq!(weights.len(), 50);

        let active = weights.iter().filter(|&&w| w != 0.0).count();
        assert!(active > 0 && active < 50, "{} active programs", active);
    }

    #[rstest]
    fn test_doses_cover_symmetric_range(mut rng: StdRng) {
        let doses = doses(1.0, 3, &mut rng).unwrap();
        let expected = [-3.0, 0.0, 3.0];

        assert_eq!(doses.len(), 3);
        for (d, e) in doses.iter().zip(expected) {
            // jitter sd is 1/9
            assert!((d - e).abs() < 0.5, "dose {} expected near {}", d, e);
        }
    }

    #[rstest]
    fn test_doses_scale_with_effect(mut rng: StdRng) {
        let doses = doses(10.0, 100, &mut rng).unwrap();
        assert!((doses[0] + 30.0).abs() < 0.01);
        assert!((doses[99] - 30.0).abs() < 0.01);
    }

    #[rstest]
    fn test_single_condition(mut rng: StdRng) {
        let doses = doses(2.0, 1, &mut rng).unwrap();
        assert_eq!(doses.len(), 1);
    }

    #[rstest]
    #[case(1.0, 0)]
    #[case(f64::NAN, 3)]
    fn test_invalid_doses(mut rng: StdRng, #[case] scale: f64, #[case] n_conditions: usize) {
        let result = doses(scale, n_conditions, &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::InvalidParameter(_))), true);
    }

    #[rstest]
    fn test_response_values() {
        let latent = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let weights = array![2.0, -2.0];
        let doses = array![-2.0, 0.0, 2.0];

        let out = response(latent.view(), weights.view(), doses.view()).unwrap();

        assert_eq!(out.dim(), (3, 3));
        // score 2 + dose -2 and score 0 + dose 0 both land on the midpoint
        assert_eq!(out[[0, 0]], 0.5);
        assert_eq!(out[[2, 1]], 0.5);
        assert!((out[[1, 0]] - 1.0 / (1.0 + 4.0f64.exp())).abs() < 1e-12);
        assert_eq!(out.iter().all(|&v| v > 0.0 && v < 1.0), true);
    }

    #[rstest]
    fn test_response_increases_with_dose_and_score() {
        let latent = array![[-1.0], [0.0], [1.0]];
        let weights = array![1.5];
        let doses = array![-3.0, -1.0, 0.5, 3.0];

        let out = response(latent.view(), weights.view(), doses.view()).unwrap();

        for row in out.rows() {
            assert_eq!(row.windows(2).into_iter().all(|w| w[0] < w[1]), true);
        }
        for col in out.columns() {
            assert_eq!(col.windows(2).into_iter().all(|w| w[0] < w[1]), true);
        }
    }

    #[rstest]
    fn test_response_is_stable_for_large_scores() {
        let latent = array![[-1000.0], [1000.0]];
        let out = response(latent.view(), array![1.0].view(), array![0.0].view()).unwrap();
        assert_eq!(out.iter().all(|v| v.is_finite()), true);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 0]], 1.0);
    }

    #[rstest]
    fn test_response_rejects_mismatched_weights() {
        let latent = array![[1.0, 2.0, 3.0]];
        let result = response(latent.view(), array![1.0, 2.0].view(), array![0.0].view());
        assert_eq!(matches!(result, Err(SimscityError::DimensionMismatch { expected: 2, actual: 3 })), true);
    }

    #[rstest]
    fn test_drug_screen(mut rng: StdRng) {
        let config = DoseConfig {
            n_conditions: 5,
            ..Default::default()
        };
        let screen = DrugScreen::new(4, &config, &SparseGaussianWeighting, &mut rng).unwrap();
        assert_eq!(screen.n_latent(), 4);
        assert_eq!(screen.n_conditions(), 5);

        let latent = Array2::from_elem((7, 4), 0.25);
        let out = screen.response(latent.view()).unwrap();
        assert_eq!(out.dim(), (7, 5));
    }
}
