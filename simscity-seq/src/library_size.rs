//! Per-cell library sizes drawn from a truncated log-normal.

use ndarray::{Array1, ArrayD, IxDyn};
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use simscity_core::{Result, SimscityError};

use crate::consts::{
    DEFAULT_LIBRARY_LOC, DEFAULT_LIBRARY_LOWER_BOUND, DEFAULT_LIBRARY_SCALE,
    DEFAULT_LIBRARY_UPPER_BOUND,
};

/// Parameters of the log-space library-size distribution.
///
/// Bounds are in units of `scale`, relative to `loc`: the log library size is
/// truncated to `[loc + lower_bound * scale, loc + upper_bound * scale]`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySizeParams {
    pub loc: f64,
    pub scale: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for LibrarySizeParams {
    fn default() -> Self {
        Self {
            loc: DEFAULT_LIBRARY_LOC,
            scale: DEFAULT_LIBRARY_SCALE,
            lower_bound: DEFAULT_LIBRARY_LOWER_BOUND,
            upper_bound: DEFAULT_LIBRARY_UPPER_BOUND,
        }
    }
}

impl LibrarySizeParams {
    pub fn new(loc: f64, scale: f64) -> Self {
        Self {
            loc,
            scale,
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    /// Smallest and largest library size this distribution can produce.
    pub fn size_bounds(&self) -> (u64, u64) {
        let lo = (self.loc + self.lower_bound * self.scale).exp();
        let hi = (self.loc + self.upper_bound * self.scale).exp();
        (lo as u64, hi as u64)
    }
}

///
/// Normal distribution truncated to `[loc + a * scale, loc + b * scale]`.
///
/// Sampled by inverting the standard normal CDF over the truncated mass. When
/// the interval lies entirely above the mean it is reflected into the lower
/// tail, where the quantile function keeps its precision. Any other interval
/// is sampled as given.
///
#[derive(Debug, Clone)]
pub struct TruncatedNormal {
    loc: f64,
    scale: f64,
    // standardized bounds, possibly reflected
    a: f64,
    b: f64,
    reflected: bool,
    cdf_a: f64,
    cdf_b: f64,
    standard: Normal,
}

impl TruncatedNormal {
    pub fn new(loc: f64, scale: f64, a: f64, b: f64) -> Result<Self> {
        if !loc.is_finite() {
            return Err(SimscityError::InvalidParameter(format!(
                "loc must be finite, got {}",
                loc
            )));
        }
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(SimscityError::InvalidParameter(format!(
                "scale must be positive and finite, got {}",
                scale
            )));
        }
        if a.is_nan() || b.is_nan() || a >= b {
            return Err(SimscityError::InvalidParameter(format!(
                "truncation interval [{}, {}] is empty",
                a, b
            )));
        }

        let standard =
            Normal::new(0.0, 1.0).map_err(|e| SimscityError::Distribution(e.to_string()))?;

        // work in the lower tail when the interval sits above the mean
        let reflected = a > 0.0;
        let (a, b) = if reflected { (-b, -a) } else { (a, b) };

        Ok(Self {
            loc,
            scale,
            a,
            b,
            reflected,
            cdf_a: standard.cdf(a),
            cdf_b: standard.cdf(b),
            standard,
        })
    }
}

impl Distribution<f64> for TruncatedNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = self.cdf_a + (self.cdf_b - self.cdf_a) * rng.random::<f64>();
        let z = if u <= 0.0 {
            self.a
        } else {
            self.standard.inverse_cdf(u)
        };
        let z = z.clamp(self.a, self.b);
        let z = if self.reflected { -z } else { z };
        self.loc + self.scale * z
    }
}

///
/// Draw library sizes (total molecules per cell).
///
/// Samples the truncated normal in log space, exponentiates and truncates to
/// integers.
///
/// # Arguments
/// - n_cells: number of library sizes to generate
/// - params: log-space distribution parameters
/// - rng: random source
pub fn library_size<R: Rng + ?Sized>(
    n_cells: usize,
    params: &LibrarySizeParams,
    rng: &mut R,
) -> Result<Array1<u64>> {
    let sizes = library_size_for_shape(&[n_cells], params, rng)?;
    Ok(sizes.into_dimensionality()?)
}

/// Same as [`library_size`], one draw per element of `shape` (row-major).
pub fn library_size_for_shape<R: Rng + ?Sized>(
    shape: &[usize],
    params: &LibrarySizeParams,
    rng: &mut R,
) -> Result<ArrayD<u64>> {
    let dist = TruncatedNormal::new(params.loc, params.scale, params.lower_bound, params.upper_bound)?;
    let n: usize = shape.iter().product();

    let sizes: Vec<u64> = (0..n).map(|_| dist.sample(rng).exp() as u64).collect();

    Ok(ArrayD::from_shape_vec(IxDyn(shape), sizes)?)
}
