//! # simscity-drug
//!
//! Drug perturbation model for simscity. A sparse projection maps latent
//! cell states onto a drug-susceptibility score, and a logistic curve over a
//! grid of dose thresholds turns that score into per-condition responses.
//!
//! ```rust
//! use ndarray::Array2;
//! use simscity_core::seeded_rng;
//! use simscity_drug::{DoseConfig, DrugScreen, SparseGaussianWeighting};
//!
//! let mut rng = seeded_rng(Some(0));
//! let screen = DrugScreen::new(8, &DoseConfig::default(), &SparseGaussianWeighting, &mut rng).unwrap();
//!
//! let latent = Array2::<f64>::zeros((4, 8));
//! let response = screen.response(latent.view()).unwrap();
//! assert_eq!(response.dim(), (4, screen.n_conditions()));
//! ```
pub mod consts;
pub mod dose;
pub mod weighting;

// re-exports
pub use dose::{DoseConfig, DrugScreen, doses, projection, response};
pub use weighting::{SparseGaussianWeighting, WeightingGenerator};
