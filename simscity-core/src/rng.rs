use rand::SeedableRng;
use rand::rngs::StdRng;

///
/// Build the generator that callers thread through every sampling entry point.
///
/// # Arguments
/// - seed: fixed seed for reproducible runs, `None` pulls from OS entropy
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}
