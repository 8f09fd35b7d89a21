use rand::Rng;
use rand_distr::{Binomial, Distribution};

use simscity_core::{Result, SimscityError};

///
/// Draw one multinomial sample of size `n` over `pvals`.
///
/// Uses the conditional binomial decomposition: category `j` receives
/// `Binomial(remaining_n, p_j / remaining_p)`. Whatever is left after the loop
/// goes to the last category with positive probability, so the sample always
/// sums to exactly `n` and zero-probability categories always stay at zero.
///
/// # Arguments
/// - n: number of trials
/// - pvals: category probabilities, non-negative and summing to (about) one
/// - rng: random source
pub fn sample_multinomial<R: Rng + ?Sized>(n: u64, pvals: &[f64], rng: &mut R) -> Result<Vec<u64>> {
    let mut counts = vec![0u64; pvals.len()];

    if pvals.iter().any(|p| !(*p >= 0.0)) {
        return Err(SimscityError::InvalidParameter(
            "multinomial probabilities must be non-negative".to_string(),
        ));
    }

    let last = match pvals.iter().rposition(|&p| p > 0.0) {
        Some(last) => last,
        None if n == 0 => return Ok(counts),
        None => {
            return Err(SimscityError::InvalidParameter(
                "multinomial probabilities are all zero".to_string(),
            ));
        }
    };

    let mut remaining_n = n;
    let mut remaining_p = 1.0;

    for (j, &p) in pvals[..last].iter().enumerate() {
        if remaining_n == 0 {
            break;
        }
        if p > 0.0 && remaining_p > 0.0 {
            let conditional = (p / remaining_p).clamp(0.0, 1.0);
            let drawn = if conditional >= 1.0 {
                remaining_n
            } else {
                Binomial::new(remaining_n, conditional)
                    .map_err(|e| SimscityError::Distribution(e.to_string()))?
                    .sample(rng)
            };
            counts[j] = drawn;
            remaining_n -= drawn;
        }
        remaining_p -= p;
    }

    counts[last] += remaining_n;

    Ok(counts)
}
