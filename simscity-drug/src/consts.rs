pub const DEFAULT_SPARSITY: f64 = 0.5;
pub const DEFAULT_WEIGHT_SCALE: f64 = 1.0;
pub const DEFAULT_DOSE_SCALE: f64 = 1.0;
pub const DEFAULT_N_CONDITIONS: usize = 8;

/// Doses span `[-DOSE_RANGE * scale, DOSE_RANGE * scale]`.
pub const DOSE_RANGE: f64 = 3.0;
