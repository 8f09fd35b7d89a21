use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use ndarray::{ArrayBase, Data, Dimension};
use ndarray_npy::{ReadableElement, WritableElement, read_npy, write_npy};

use simscity_core::{CountMatrix, CountStore};

pub fn read_array<A, D>(path: &Path) -> Result<ndarray::Array<A, D>>
where
    A: ReadableElement,
    D: Dimension,
{
    read_npy(path).with_context(|| format!("Failed to read .npy array from {}", path.display()))
}

pub fn write_array<A, S, D>(array: &ArrayBase<S, D>, path: &Path) -> Result<()>
where
    A: WritableElement,
    S: Data<Elem = A>,
    D: Dimension,
{
    write_npy(path, array).with_context(|| format!("Failed to write .npy array to {}", path.display()))
}

/// Write counts as a gzipped Matrix Market coordinate file.
///
/// Leading axes are flattened into rows. Entries are written sorted by
/// `(row, col)` and 1-indexed, so scipy and friends read them directly.
pub fn write_matrix_market<C: CountStore + ?Sized>(
    counts: &C,
    n_rows: usize,
    path: &Path,
) -> Result<()> {
    let mut triplets = counts.triplets();
    triplets.sort_by_key(|&(r, c, _)| (r, c));

    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));

    writeln!(writer, "%%MatrixMarket matrix coordinate integer general")?;
    writeln!(writer, "{} {} {}", n_rows, counts.n_features(), triplets.len())?;

    for (row, col, value) in triplets {
        writeln!(writer, "{} {} {}", row + 1, col + 1, value)?;
    }

    writer.flush()?;
    Ok(())
}

///
/// Write a count matrix into `dir` under `name`.
///
/// Dense counts become `{name}.npy` with the full leading shape, sparse
/// counts become `{name}_matrix.mtx.gz`.
///
/// # Returns
/// The path that was written.
pub fn write_counts(counts: &CountMatrix, dir: &Path, name: &str) -> Result<PathBuf> {
    match counts {
        CountMatrix::Dense(dense) => {
            let path = dir.join(format!("{}.npy", name));
            write_array(dense, &path)?;
            Ok(path)
        }
        CountMatrix::Sparse(_) => {
            let path = dir.join(format!("{}_matrix.mtx.gz", name));
            write_matrix_market(counts, counts.n_rows(), &path)?;
            Ok(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Read;

    use flate2::read::GzDecoder;
    use ndarray::{ArrayD, array};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use simscity_core::seeded_rng;
    use simscity_seq::{UmiConfig, umi_counts};
    use tempfile::tempdir;

    #[fixture]
    fn dense_counts() -> CountMatrix {
        CountMatrix::from(array![[0u64, 3, 0], [1, 0, 2]].into_dyn())
    }

    #[fixture]
    fn sparse_counts() -> CountMatrix {
        // each cell expresses a single gene
        let expression = array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let config = UmiConfig::default().with_lib_size(5u64).with_sparse(true);
        umi_counts(&expression, &config, &mut seeded_rng(Some(0))).unwrap()
    }

    fn read_gz(path: &Path) -> String {
        let mut content = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[rstest]
    fn test_matrix_market_layout(dense_counts: CountMatrix) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counts.mtx.gz");

        write_matrix_market(&dense_counts, 2, &path).unwrap();

        let content = read_gz(&path);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "%%MatrixMarket matrix coordinate integer general",
                "2 3 3",
                "1 2 3",
                "2 1 1",
                "2 3 2",
            ]
        );
    }

    #[rstest]
    fn test_sparse_counts_go_to_matrix_market(sparse_counts: CountMatrix) {
        let dir = tempdir().unwrap();
        let path = write_counts(&sparse_counts, dir.path(), "umis").unwrap();

        assert_eq!(path.file_name().unwrap(), "umis_matrix.mtx.gz");
        let content = read_gz(&path);
        let lines: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(lines, vec!["2 3 2", "1 1 5", "2 3 5"]);
    }

    #[rstest]
    fn test_dense_counts_round_trip_through_npy(dense_counts: CountMatrix) {
        let dir = tempdir().unwrap();
        let path = write_counts(&dense_counts, dir.path(), "umis").unwrap();

        assert_eq!(path.file_name().unwrap(), "umis.npy");
        let loaded: ArrayD<u64> = read_array(&path).unwrap();
        assert_eq!(loaded, dense_counts.to_dense());
    }

    #[rstest]
    fn test_missing_npy_has_context() {
        let result: Result<ArrayD<f64>> = read_array(Path::new("does/not/exist.npy"));
        let message = format!("{:#}", result.unwrap_err());
        assert_eq!(message.contains("does/not/exist.npy"), true);
    }
}
