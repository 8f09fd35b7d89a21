//! PCR amplification noise.
//!
//! Every molecule has a per-feature affinity for PCR. In each cycle every
//! existing molecule is duplicated independently with that probability, so a
//! count `d` grows by `Binomial(d, beta)` per cycle.

use log::debug;
use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

use simscity_core::{CountStore, Result, ScalarOrArray, SimscityError};

use crate::consts::{DEFAULT_PCR_BETA, DEFAULT_PCR_CYCLES};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PcrConfig {
    /// Amplification efficiency, constant or one per feature.
    pub betas: ScalarOrArray<f64>,
    pub n_cycles: u32,
}

impl Default for PcrConfig {
    fn default() -> Self {
        Self {
            betas: ScalarOrArray::Scalar(DEFAULT_PCR_BETA),
            n_cycles: DEFAULT_PCR_CYCLES,
        }
    }
}

impl PcrConfig {
    pub fn new(betas: impl Into<ScalarOrArray<f64>>, n_cycles: u32) -> Self {
        Self {
            betas: betas.into(),
            n_cycles,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.betas.all(|&b| b >= 0.0) {
            return Err(SimscityError::NegativePcrEfficiency);
        }
        if !self.betas.all(|&b| b <= 1.0) {
            return Err(SimscityError::InvalidParameter(
                "pcr_betas must be at most 1".to_string(),
            ));
        }
        Ok(())
    }
}

///
/// Amplify a copy of `read_counts`, leaving the input untouched.
///
/// Fails with [`SimscityError::CountOverflow`] when a count no longer fits in
/// a `u64`.
///
/// # Arguments
/// - read_counts: dense or sparse counts of shape `(n_samples, n_features)`
/// - config: per-feature efficiency and number of cycles
/// - rng: random source
pub fn pcr_noise<C, R>(read_counts: &C, config: &PcrConfig, rng: &mut R) -> Result<C>
where
    C: CountStore + Clone,
    R: Rng + ?Sized,
{
    config.validate()?;

    let mut amplified = read_counts.clone();
    amplify(&mut amplified, config, rng)?;

    Ok(amplified)
}

///
/// Amplify `read_counts` in place.
///
/// Only populated entries are touched, so a sparse matrix keeps its exact
/// sparsity pattern and no entry ever shrinks. On overflow `read_counts` is
/// left as it was.
pub fn pcr_noise_in_place<C, R>(read_counts: &mut C, config: &PcrConfig, rng: &mut R) -> Result<()>
where
    C: CountStore + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;
    amplify(read_counts, config, rng)
}

fn amplify<C, R>(read_counts: &mut C, config: &PcrConfig, rng: &mut R) -> Result<()>
where
    C: CountStore + ?Sized,
    R: Rng + ?Sized,
{
    let feature_betas = config.betas.broadcast_1d(read_counts.n_features())?;

    let betas: Vec<f64> = read_counts
        .populated_columns()
        .into_iter()
        .map(|col| feature_betas[col])
        .collect();
    let mut values = read_counts.populated_values();

    debug!(
        "Running {} PCR cycles over {} populated entries",
        config.n_cycles,
        values.len()
    );

    for cycle in 1..=config.n_cycles {
        for (d, &beta) in values.iter_mut().zip(&betas) {
            *d = d
                .checked_add(duplicated(*d, beta, rng)?)
                .ok_or(SimscityError::CountOverflow { cycle })?;
        }
    }

    read_counts.write_populated(&values)
}

/// Number of the `n` molecules that get copied this cycle.
fn duplicated<R: Rng + ?Sized>(n: u64, beta: f64, rng: &mut R) -> Result<u64> {
    if n == 0 || beta <= 0.0 {
        return Ok(0);
    }
    if beta >= 1.0 {
        return Ok(n);
    }
    let binomial = Binomial::new(n, beta).map_err(|e| SimscityError::Distribution(e.to_string()))?;
    Ok(binomial.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{ArrayD, array};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::{fixture, rstest};
    use simscity_core::CountMatrix;
    use sprs::CsMat;

    #[fixture]
    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[fixture]
    fn dense() -> ArrayD<u64> {
        array![[0, 4, 1], [7, 0, 2], [3, 3, 0]].into_dyn()
    }

    #[fixture]
    fn sparse() -> CsMat<u64> {
        // same values as `dense`
        CsMat::new(
            (3, 3),
            vec![0, 2, 4, 6],
            vec![1, 2, 0, 2, 0, 1],
            vec![4, 1, 7, 2, 3, 3],
        )
    }

    #[rstest]
    fn test_zero_efficiency_is_a_no_op(mut rng: StdRng) {
        let counts = array![[2u64]].into_dyn();
        let out = pcr_noise(&counts, &PcrConfig::new(vec![0.0], 5), &mut rng).unwrap();
        assert_eq!(out, array![[2u64]].into_dyn());
    }

    #[rstest]
    fn test_zero_cycles_is_a_no_op(dense: ArrayD<u64>, mut rng: StdRng) {
        let out = pcr_noise(&dense, &PcrConfig::new(0.9, 0), &mut rng).unwrap();
        assert_eq!(out, dense);
    }

    #[rstest]
    fn test_full_efficiency_doubles_every_cycle(dense: ArrayD<u64>, mut rng: StdRng) {
        let out = pcr_noise(&dense, &PcrConfig::new(1.0, 3), &mut rng).unwrap();
        assert_eq!(out, dense.mapv(|v| v * 8));
    }

    #[rstest]
    #[case(0.1, 1)]
    #[case(0.5, 4)]
    #[case(0.9, 8)]
    fn test_amplification_is_monotone(
        dense: ArrayD<u64>,
        mut rng: StdRng,
        #[case] beta: f64,
        #[case] n_cycles: u32,
    ) {
        let out = pcr_noise(&dense, &PcrConfig::new(beta, n_cycles), &mut rng).unwrap();
        let max_gain = 1u64 << n_cycles;

        for (&before, &after) in dense.iter().zip(out.iter()) {
            assert!(after >= before);
            assert!(after <= before * max_gain);
        }
    }

    #[rstest]
    fn test_per_feature_betas(dense: ArrayD<u64>, mut rng: StdRng) {
        // only the middle feature amplifies
        let out = pcr_noise(&dense, &PcrConfig::new(vec![0.0, 1.0, 0.0], 2), &mut rng).unwrap();
        assert_eq!(out, array![[0u64, 16, 1], [7, 0, 2], [3, 12, 0]].into_dyn());
    }

    #[rstest]
    fn test_copy_leaves_input_untouched(dense: ArrayD<u64>, mut rng: StdRng) {
        let before = dense.clone();
        let _ = pcr_noise(&dense, &PcrConfig::new(1.0, 2), &mut rng).unwrap();
        assert_eq!(dense, before);
    }

    #[rstest]
    fn test_in_place_mutates(dense: ArrayD<u64>, mut rng: StdRng) {
        let mut counts = dense.clone();
        pcr_noise_in_place(&mut counts, &PcrConfig::new(1.0, 1), &mut rng).unwrap();
        assert_eq!(counts, dense.mapv(|v| v * 2));
    }

    #[rstest]
    fn test_sparse_pattern_is_preserved(sparse: CsMat<u64>, mut rng: StdRng) {
        let out = pcr_noise(&sparse, &PcrConfig::new(0.7, 6), &mut rng).unwrap();

        let positions = |m: &CsMat<u64>| -> Vec<(usize, usize)> {
            m.triplets().into_iter().map(|(r, c, _)| (r, c)).collect()
        };
        assert_eq!(positions(&out), positions(&sparse));
        assert_eq!(out.nnz(), sparse.nnz());
        for (&before, &after) in sparse.data().iter().zip(out.data()) {
            assert!(after >= before);
        }
    }

    #[rstest]
    fn test_sparse_uses_column_betas(sparse: CsMat<u64>, mut rng: StdRng) {
        let out = pcr_noise(&sparse, &PcrConfig::new(vec![1.0, 0.0, 0.0], 1), &mut rng).unwrap();
        // only column 0 entries (7 and 3) double
        assert_eq!(out.data(), &[4, 1, 14, 2, 6, 3]);
    }

    #[rstest]
    fn test_dense_and_sparse_agree_when_deterministic(dense: ArrayD<u64>, sparse: CsMat<u64>, mut rng: StdRng) {
        let config = PcrConfig::new(vec![1.0, 0.0, 1.0], 2);
        let dense_out = CountMatrix::from(pcr_noise(&dense, &config, &mut rng).unwrap());
        let sparse_out = CountMatrix::from(pcr_noise(&sparse, &config, &mut rng).unwrap());
        assert_eq!(dense_out.triplets(), sparse_out.triplets());
    }

    #[rstest]
    fn test_count_matrix_dispatch(sparse: CsMat<u64>, mut rng: StdRng) {
        let counts = CountMatrix::from(sparse);
        let out = pcr_noise(&counts, &PcrConfig::new(0.5, 3), &mut rng).unwrap();
        assert_eq!(out.is_sparse(), true);
        assert_eq!(out.nnz(), counts.nnz());
    }

    #[rstest]
    fn test_overflow_is_an_error(mut rng: StdRng) {
        // 1000 * 2^54 still fits, the 55th doubling does not
        let counts = array![[1000u64]].into_dyn();
        let result = pcr_noise(&counts, &PcrConfig::new(1.0, 60), &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::CountOverflow { cycle: 55 })), true);

        let fits = pcr_noise(&counts, &PcrConfig::new(1.0, 54), &mut rng).unwrap();
        assert_eq!(fits, array![[1000u64 << 54]].into_dyn());
    }

    #[rstest]
    fn test_in_place_overflow_keeps_input(mut rng: StdRng) {
        let mut counts = CountMatrix::from(array![[3u64, u64::MAX / 2 + 1]].into_dyn());
        let before = counts.to_dense();
        let result = pcr_noise_in_place(&mut counts, &PcrConfig::new(1.0, 1), &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::CountOverflow { cycle: 1 })), true);
        assert_eq!(counts.to_dense(), before);
    }

    #[rstest]
    fn test_negative_beta_is_rejected(dense: ArrayD<u64>, mut rng: StdRng) {
        let result = pcr_noise(&dense, &PcrConfig::new(vec![0.5, -0.1, 0.5], 2), &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::NegativePcrEfficiency)), true);
    }

    #[rstest]
    fn test_beta_above_one_is_rejected(dense: ArrayD<u64>, mut rng: StdRng) {
        let result = pcr_noise(&dense, &PcrConfig::new(1.5, 2), &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::InvalidParameter(_))), true);
    }

    #[rstest]
    fn test_betas_must_match_features(dense: ArrayD<u64>, mut rng: StdRng) {
        let result = pcr_noise(&dense, &PcrConfig::new(vec![0.5, 0.5], 2), &mut rng);
        assert_eq!(matches!(result, Err(SimscityError::Broadcast { .. })), true);
    }
}
