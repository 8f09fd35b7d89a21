//! # simscity-core
//!
//! Shared building blocks for the simscity measurement-noise simulator:
//!
//! - [`errors`] - the error type returned by every simulation crate
//! - [`params`] - scalar-or-array parameters with numpy-style broadcasting
//! - [`counts`] - dense/sparse integer count containers behind the [`CountStore`] trait
//! - [`rng`] - seeded generator construction
//!
pub mod counts;
pub mod errors;
pub mod params;
pub mod rng;

// re-exports
pub use counts::{CountMatrix, CountStore};
pub use errors::{Result, SimscityError};
pub use params::ScalarOrArray;
pub use rng::seeded_rng;
