pub const DEFAULT_LIBRARY_LOC: f64 = 7.5;
pub const DEFAULT_LIBRARY_SCALE: f64 = 0.5;
pub const DEFAULT_LIBRARY_LOWER_BOUND: f64 = -1.0;
pub const DEFAULT_LIBRARY_UPPER_BOUND: f64 = f64::INFINITY;

pub const DEFAULT_FRAGMENT_LAMBDA: f64 = 1.0;
pub const DEFAULT_FRAGMENTS_PER_GENE: usize = 1;

pub const DEFAULT_PCR_BETA: f64 = 0.5;
pub const DEFAULT_PCR_CYCLES: u32 = 10;
