//! Dense and sparse integer count containers.
//!
//! Sampling and amplification code is written against [`CountStore`], which only
//! knows about *populated* entries: every cell of a dense array, or the explicitly
//! stored values of a sparse matrix. Implicit zeros of a sparse matrix are never
//! visited, so algorithms written on top of it can not grow the sparsity pattern.

use ndarray::{ArrayD, IxDyn};
use sprs::CsMat;

use crate::errors::{Result, SimscityError};

pub trait CountStore {
    /// Length of the trailing feature axis.
    fn n_features(&self) -> usize;

    /// Feature (column) index of every populated entry, in storage order.
    fn populated_columns(&self) -> Vec<usize>;

    /// Value of every populated entry, in the same order as `populated_columns`.
    fn populated_values(&self) -> Vec<u64>;

    /// Overwrite the populated entries, in the order given by `populated_values`.
    fn write_populated(&mut self, values: &[u64]) -> Result<()>;

    /// `(row, column, value)` for every non-zero entry, rows being all leading
    /// axes flattened in row-major order.
    fn triplets(&self) -> Vec<(usize, usize, u64)>;
}

fn check_populated_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SimscityError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

impl CountStore for ArrayD<u64> {
    fn n_features(&self) -> usize {
        self.shape().last().copied().unwrap_or(1)
    }

    fn populated_columns(&self) -> Vec<usize> {
        let n_features = self.n_features().max(1);
        (0..self.len()).map(|i| i % n_features).collect()
    }

    fn populated_values(&self) -> Vec<u64> {
        self.iter().copied().collect()
    }

    fn write_populated(&mut self, values: &[u64]) -> Result<()> {
        check_populated_len(self.len(), values.len())?;
        for (slot, &value) in self.iter_mut().zip(values) {
            *slot = value;
        }
        Ok(())
    }

    fn triplets(&self) -> Vec<(usize, usize, u64)> {
        let n_features = self.n_features().max(1);
        self.iter()
            .enumerate()
            .filter(|(_, v)| **v > 0)
            .map(|(i, &v)| (i / n_features, i % n_features, v))
            .collect()
    }
}

impl CountStore for CsMat<u64> {
    fn n_features(&self) -> usize {
        self.cols()
    }

    fn populated_columns(&self) -> Vec<usize> {
        if self.is_csr() {
            self.indices().to_vec()
        } else {
            self.outer_iterator()
                .enumerate()
                .flat_map(|(col, lane)| std::iter::repeat(col).take(lane.nnz()))
                .collect()
        }
    }

    fn populated_values(&self) -> Vec<u64> {
        self.data().to_vec()
    }

    fn write_populated(&mut self, values: &[u64]) -> Result<()> {
        check_populated_len(self.nnz(), values.len())?;
        self.data_mut().copy_from_slice(values);
        Ok(())
    }

    fn triplets(&self) -> Vec<(usize, usize, u64)> {
        let csr = self.is_csr();
        let mut triplets = Vec::with_capacity(self.nnz());
        for (outer, lane) in self.outer_iterator().enumerate() {
            for (inner, &value) in lane.iter() {
                if value == 0 {
                    continue;
                }
                let (row, col) = if csr { (outer, inner) } else { (inner, outer) };
                triplets.push((row, col, value));
            }
        }
        triplets.sort_unstable_by_key(|&(r, c, _)| (r, c));
        triplets
    }
}

///
/// Integer count matrix produced by the UMI and PCR engines.
///
/// Dense matrices keep the caller's leading (cell) axes; sparse matrices are
/// always 2-D compressed-row, with every leading axis flattened into rows.
///
#[derive(Debug, Clone)]
pub enum CountMatrix {
    Dense(ArrayD<u64>),
    Sparse(CsMat<u64>),
}

impl CountMatrix {
    pub fn is_sparse(&self) -> bool {
        matches!(self, CountMatrix::Sparse(_))
    }

    pub fn shape(&self) -> Vec<usize> {
        match self {
            CountMatrix::Dense(counts) => counts.shape().to_vec(),
            CountMatrix::Sparse(counts) => vec![counts.rows(), counts.cols()],
        }
    }

    /// Number of rows once every leading axis is flattened.
    pub fn n_rows(&self) -> usize {
        match self {
            CountMatrix::Dense(counts) => {
                let shape = counts.shape();
                match shape.split_last() {
                    Some((_, leading)) => leading.iter().product(),
                    None => 1,
                }
            }
            CountMatrix::Sparse(counts) => counts.rows(),
        }
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        match self {
            CountMatrix::Dense(counts) => counts.iter().filter(|&&v| v > 0).count(),
            CountMatrix::Sparse(counts) => counts.data().iter().filter(|&&v| v > 0).count(),
        }
    }

    /// Total count per flattened row, saturating at `u64::MAX`.
    pub fn row_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.n_rows()];
        for (row, _, value) in self.triplets() {
            sums[row] = sums[row].saturating_add(value);
        }
        sums
    }

    /// Sum of every count, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.row_sums().into_iter().fold(0, u64::saturating_add)
    }

    pub fn as_sparse(&self) -> Option<&CsMat<u64>> {
        match self {
            CountMatrix::Dense(_) => None,
            CountMatrix::Sparse(counts) => Some(counts),
        }
    }

    /// Materialize as a dense array. Sparse matrices come back 2-D.
    pub fn to_dense(&self) -> ArrayD<u64> {
        match self {
            CountMatrix::Dense(counts) => counts.clone(),
            CountMatrix::Sparse(counts) => {
                let mut dense = ArrayD::zeros(IxDyn(&[counts.rows(), counts.cols()]));
                for (row, col, value) in counts.triplets() {
                    dense[[row, col].as_slice()] = value;
                }
                dense
            }
        }
    }
}

impl CountStore for CountMatrix {
    fn n_features(&self) -> usize {
        match self {
            CountMatrix::Dense(counts) => counts.n_features(),
            CountMatrix::Sparse(counts) => counts.n_features(),
        }
    }

    fn populated_columns(&self) -> Vec<usize> {
        match self {
            CountMatrix::Dense(counts) => counts.populated_columns(),
            CountMatrix::Sparse(counts) => counts.populated_columns(),
        }
    }

    fn populated_values(&self) -> Vec<u64> {
        match self {
            CountMatrix::Dense(counts) => counts.populated_values(),
            CountMatrix::Sparse(counts) => counts.populated_values(),
        }
    }

    fn write_populated(&mut self, values: &[u64]) -> Result<()> {
        match self {
            CountMatrix::Dense(counts) => counts.write_populated(values),
            CountMatrix::Sparse(counts) => counts.write_populated(values),
        }
    }

    fn triplets(&self) -> Vec<(usize, usize, u64)> {
        match self {
            CountMatrix::Dense(counts) => counts.triplets(),
            CountMatrix::Sparse(counts) => counts.triplets(),
        }
    }
}

impl From<ArrayD<u64>> for CountMatrix {
    fn from(counts: ArrayD<u64>) -> Self {
        CountMatrix::Dense(counts)
    }
}

impl From<CsMat<u64>> for CountMatrix {
    fn from(counts: CsMat<u64>) -> Self {
        CountMatrix::Sparse(counts)
    }
}
