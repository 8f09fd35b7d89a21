use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimscityError {
    #[error("raw_expression must be non-negative")]
    NegativeExpression,

    #[error("Input must have at least {required} dimensions, got {ndim}")]
    InsufficientDimensions { ndim: usize, required: usize },

    #[error("pcr_betas must be non-negative")]
    NegativePcrEfficiency,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Cell {cell} has zero total expression; its sampling probabilities are undefined")]
    ZeroExpression { cell: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Can't broadcast array of shape {from:?} to shape {to:?}")]
    Broadcast { from: Vec<usize>, to: Vec<usize> },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error("Counts overflowed u64 during PCR cycle {cycle}")]
    CountOverflow { cycle: u32 },

    #[error("Distribution error: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, SimscityError>;
