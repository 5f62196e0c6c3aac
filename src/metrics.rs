//! Metrics.
//!
//! Metrics are evaluation helpers (they do not participate in backprop). They compare
//! label columns, e.g. the output of [`crate::Model::classify`] against the true labels.

use crate::{Error, Matrix, Result};

/// Percentage of rows where `y_pred` equals `y`, truncated to an integer.
///
/// Both inputs must be single label columns with the same number of rows.
pub fn accuracy(y: &Matrix, y_pred: &Matrix) -> Result<u32> {
    let correct = correct_count(y, y_pred)?;
    Ok((correct * 100 / y.rows()) as u32)
}

/// Number of rows where `y_pred` equals `y`.
pub fn correct_count(y: &Matrix, y_pred: &Matrix) -> Result<usize> {
    if y.cols() != 1 || y_pred.cols() != 1 {
        return Err(Error::ShapeMismatch(format!(
            "accuracy expects single label columns, got {} and {} columns",
            y.cols(),
            y_pred.cols()
        )));
    }
    if y.rows() != y_pred.rows() {
        return Err(Error::ShapeMismatch(format!(
            "labels have {} rows but predictions have {}",
            y.rows(),
            y_pred.rows()
        )));
    }

    Ok(y
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .filter(|(a, b)| a == b)
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> Matrix {
        Matrix::from_flat(values.to_vec(), 1).unwrap()
    }

    #[test]
    fn accuracy_reports_truncated_percentage() {
        let y = column(&[0.0, 1.0, 1.0, 0.0]);
        let y_pred = column(&[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(accuracy(&y, &y_pred).unwrap(), 75);

        // 2 of 3 correct: 66.6..% truncates to 66.
        let y = column(&[3.0, 7.0, 1.0]);
        let y_pred = column(&[3.0, 7.0, 2.0]);
        assert_eq!(accuracy(&y, &y_pred).unwrap(), 66);
        assert_eq!(accuracy(&y, &y).unwrap(), 100);
    }

    #[test]
    fn accuracy_requires_matching_label_columns() {
        let y = column(&[0.0, 1.0]);
        assert!(matches!(
            accuracy(&y, &column(&[0.0])),
            Err(Error::ShapeMismatch(_))
        ));

        let two_cols = Matrix::zeros(2, 2).unwrap();
        assert!(matches!(
            accuracy(&y, &two_cols),
            Err(Error::ShapeMismatch(_))
        ));
    }
}
