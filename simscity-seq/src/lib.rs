//! # simscity-seq
//!
//! Simulates the measurement noise of single-cell sequencing on top of "true"
//! expression values.
//!
//! The model runs in four stages:
//!
//! 1. [`library_size`] - total molecules captured per cell (truncated log-normal)
//! 2. [`fragments`] - how many fragments each gene is split into
//! 3. [`umi`] - multinomial sampling of UMIs given expression and library size
//! 4. [`pcr`] - stochastic duplication of molecules over PCR cycles
//!
//! [`pipeline::simulate_sequencing`] chains them, driven by a
//! [`config::SequencingConfig`] that can be read from TOML.
//!
//! ## Example
//! ```rust
//! use ndarray::array;
//! use simscity_core::seeded_rng;
//! use simscity_seq::{UmiConfig, umi_counts};
//!
//! let expression = array![[1.0, 2.0, 0.0], [0.5, 0.5, 0.5]];
//! let mut rng = seeded_rng(Some(1));
//!
//! let umis = umi_counts(&expression, &UmiConfig::default().with_lib_size(100u64), &mut rng).unwrap();
//! assert_eq!(umis.row_sums(), vec![100, 100]);
//! ```
pub mod config;
pub mod consts;
pub mod fragments;
pub mod library_size;
pub mod multinomial;
pub mod pcr;
pub mod pipeline;
pub mod umi;

// re-exports
pub use config::{ConfigError, SequencingConfig};
pub use fragments::{FragmentConfig, fragment_genes};
pub use library_size::{LibrarySizeParams, TruncatedNormal, library_size, library_size_for_shape};
pub use multinomial::sample_multinomial;
pub use pcr::{PcrConfig, pcr_noise, pcr_noise_in_place};
pub use pipeline::{SequencingOutput, simulate_sequencing};
pub use umi::{LibrarySize, UmiConfig, ZeroExpressionPolicy, cell_shape, umi_counts};
