//! Dataset helpers.
//!
//! `Dataset` pairs a design matrix X with its labels Y and validates that they describe
//! the same examples. Minibatches are contiguous row slices; the last batch is shorter
//! when the row count is not a multiple of the batch size.

use crate::{Error, Matrix, Result};

/// A supervised dataset: features (X) and targets (Y).
///
/// - `x` is `(len, features)`
/// - `y` is `(len, target_dim)`, either a single label column or one-hot rows
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Matrix,
    y: Matrix,
}

impl Dataset {
    pub fn new(x: Matrix, y: Matrix) -> Result<Self> {
        if x.rows() != y.rows() {
            return Err(Error::ShapeMismatch(format!(
                "x has {} rows but y has {}",
                x.rows(),
                y.rows()
            )));
        }
        Ok(Self { x, y })
    }

    #[inline]
    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.x.rows()
    }

    #[inline]
    /// Always false: a `Matrix` has at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn features(&self) -> usize {
        self.x.cols()
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.y.cols()
    }

    #[inline]
    pub fn x(&self) -> &Matrix {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &Matrix {
        &self.y
    }

    /// Examples `start..end` as a new dataset.
    pub fn slice(&self, start: usize, end: usize) -> Result<Dataset> {
        Ok(Dataset {
            x: self.x.slice_rows(start, end)?,
            y: self.y.slice_rows(start, end)?,
        })
    }

    /// Examples at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Result<Dataset> {
        Ok(Dataset {
            x: self.x.select_rows(indices)?,
            y: self.y.select_rows(indices)?,
        })
    }

    /// The first `n` examples (or all of them if there are fewer).
    pub fn head(&self, n: usize) -> Result<Dataset> {
        self.slice(0, n.min(self.len()))
    }

    /// Partition into ordered, non-overlapping minibatches of `batch_size` examples.
    pub fn batches(&self, batch_size: usize) -> Result<Vec<Dataset>> {
        batch_ranges(self.len(), batch_size)?
            .into_iter()
            .map(|(start, end)| self.slice(start, end))
            .collect()
    }
}

/// Split the rows of `m` into ordered, non-overlapping batches of `batch_size` rows.
///
/// Yields `ceil(rows / batch_size)` batches; all but the last have exactly `batch_size` rows.
pub fn create_batches(m: &Matrix, batch_size: usize) -> Result<Vec<Matrix>> {
    batch_ranges(m.rows(), batch_size)?
        .into_iter()
        .map(|(start, end)| m.slice_rows(start, end))
        .collect()
}

fn batch_ranges(len: usize, batch_size: usize) -> Result<Vec<(usize, usize)>> {
    if batch_size == 0 {
        return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
    }
    Ok((0..len)
        .step_by(batch_size)
        .map(|start| (start, (start + batch_size).min(len)))
        .collect())
}

/// One-hot encode a single column of integer labels into `classes` columns.
pub fn one_hot(labels: &Matrix, classes: usize) -> Result<Matrix> {
    if labels.cols() != 1 {
        return Err(Error::ShapeMismatch(format!(
            "one_hot expects a single label column, got {} columns",
            labels.cols()
        )));
    }

    let mut encoded = Vec::with_capacity(labels.rows());
    for r in 0..labels.rows() {
        let label = labels.get(r, 0);
        if !(label >= 0.0 && label.fract() == 0.0 && (label as usize) < classes) {
            return Err(Error::InvalidData(format!(
                "label {label} at row {r} is not a class index in 0..{classes}"
            )));
        }
        let mut row = vec![0.0; classes];
        row[label as usize] = 1.0;
        encoded.push(row);
    }
    Matrix::from_rows(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> Matrix {
        Matrix::from_flat(values.to_vec(), 1).unwrap()
    }

    #[test]
    fn dataset_validates_row_counts() {
        let x = Matrix::zeros(4, 2).unwrap();
        assert!(Dataset::new(x.clone(), Matrix::zeros(4, 1).unwrap()).is_ok());
        assert!(matches!(
            Dataset::new(x, Matrix::zeros(3, 1).unwrap()),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn create_batches_counts_and_sizes() {
        let m = column(&(0..10).map(f64::from).collect::<Vec<_>>());
        for batch_size in [1, 3, 4, 5, 10, 25] {
            let batches = create_batches(&m, batch_size).unwrap();
            assert_eq!(batches.len(), 10_usize.div_ceil(batch_size));

            let (last, full) = batches.split_last().unwrap();
            assert!(full.iter().all(|b| b.rows() == batch_size));
            assert!(last.rows() <= batch_size && last.rows() >= 1);

            let rebuilt: Vec<f64> = batches
                .iter()
                .flat_map(|b| b.as_slice().to_vec())
                .collect();
            assert_eq!(rebuilt, m.as_slice());
        }
    }

    #[test]
    fn create_batches_rejects_zero_batch_size() {
        let m = column(&[1.0, 2.0]);
        assert!(matches!(
            create_batches(&m, 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn dataset_batches_keep_x_and_y_aligned() {
        let x = Matrix::from_rows(&[
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 3.0],
            vec![1.0, 4.0],
        ])
        .unwrap();
        let y = column(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let data = Dataset::new(x, y).unwrap();

        let batches = data.batches(2).unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 1);
        for batch in &batches {
            for r in 0..batch.len() {
                assert_eq!(batch.x().get(r, 1), batch.y().get(r, 0));
            }
        }
    }

    #[test]
    fn one_hot_round_trip() {
        let encoded = one_hot(&column(&[3.0]), 10).unwrap();
        assert_eq!(encoded.shape(), (1, 10));
        for c in 0..10 {
            assert_eq!(encoded.get(0, c), if c == 3 { 1.0 } else { 0.0 });
        }
        assert_eq!(encoded.argmax_rows().get(0, 0), 3.0);
    }

    #[test]
    fn one_hot_rejects_out_of_range_labels() {
        assert!(matches!(
            one_hot(&column(&[10.0]), 10),
            Err(Error::InvalidData(_))
        ));
        assert!(one_hot(&column(&[1.5]), 10).is_err());
        assert!(one_hot(&column(&[-1.0]), 10).is_err());
    }
}
