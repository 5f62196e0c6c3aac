//! Dense row-major `f64` matrix.
//!
//! `Matrix` is a value type: every operation allocates and returns a new matrix, and no
//! operation aliases its inputs with its output. The one exception is
//! [`Matrix::fill_random`], which fills an existing matrix in place.
//!
//! Shapes are validated at construction and at every binary operation. Mismatches are
//! reported as [`Error::ShapeMismatch`]; nothing is broadcast.

use std::fmt;

use rand::Rng;

use crate::activation;
use crate::matmul::gemm_f64;
use crate::{Error, Result};

/// A rectangular `rows x cols` table of `f64`, with `rows >= 1` and `cols >= 1`.
///
/// Stored as a contiguous buffer with row-major layout:
/// - `data.len() == rows * cols`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build a `rows x cols` matrix with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidShape(format!(
                "matrix must be at least 1x1, got {rows}x{cols}"
            )));
        }
        Ok(Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        })
    }

    /// Build a `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, 0.0)
    }

    /// Build a matrix with the same shape as `other`, every cell set to `value`.
    pub fn filled_like(other: &Matrix, value: f64) -> Self {
        Self {
            rows: other.rows,
            cols: other.cols,
            data: vec![value; other.data.len()],
        }
    }

    /// Build a matrix from a flat row-major buffer with `cols` columns.
    pub fn from_flat(data: Vec<f64>, cols: usize) -> Result<Self> {
        if cols == 0 {
            return Err(Error::InvalidShape("cols must be > 0".to_owned()));
        }
        if data.is_empty() {
            return Err(Error::InvalidShape("data must not be empty".to_owned()));
        }
        if data.len() % cols != 0 {
            return Err(Error::InvalidShape(format!(
                "data length {} is not divisible by cols {cols}",
                data.len()
            )));
        }

        Ok(Self {
            rows: data.len() / cols,
            cols,
            data,
        })
    }

    /// Build a matrix from per-row vectors.
    ///
    /// Every row must have the same, non-zero length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::InvalidShape("rows must not be empty".to_owned()));
        }

        let cols = rows[0].len();
        if cols == 0 {
            return Err(Error::InvalidShape("cols must be > 0".to_owned()));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the cell at (`row`, `col`).
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) is outside a {}x{} matrix",
            self.rows,
            self.cols
        );
        self.data[row * self.cols + col]
    }

    /// Returns the `idx`-th row.
    ///
    /// Panics if `idx >= rows`.
    #[inline]
    pub fn row(&self, idx: usize) -> &[f64] {
        assert!(
            idx < self.rows,
            "row {idx} is outside a matrix with {} rows",
            self.rows
        );
        let start = idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Row-major view of all cells.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    fn ensure_same_shape(&self, other: &Matrix, op: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch(format!(
                "{op} requires identical shapes, got {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    fn zip_with(&self, other: &Matrix, op: &str, f: impl Fn(f64, f64) -> f64) -> Result<Matrix> {
        self.ensure_same_shape(other, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Matrix product `self · other`.
    ///
    /// Requires `self.cols() == other.rows()`; the result is `self.rows() x other.cols()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::ShapeMismatch(format!(
                "matmul inner dimensions differ: {}x{} · {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut out = vec![0.0; m * n];
        gemm_f64(
            m,
            n,
            k,
            &self.data,
            k,
            1,
            &other.data,
            n,
            1,
            &mut out,
            n,
            1,
        );
        Ok(Matrix {
            rows: m,
            cols: n,
            data: out,
        })
    }

    /// `selfᵗ · other`, without materializing the transpose.
    ///
    /// Requires `self.rows() == other.rows()`; the result is `self.cols() x other.cols()`.
    pub fn t_matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.rows != other.rows {
            return Err(Error::ShapeMismatch(format!(
                "t_matmul inner dimensions differ: ({}x{})ᵗ · {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let (m, k, n) = (self.cols, self.rows, other.cols);
        let mut out = vec![0.0; m * n];
        gemm_f64(
            m,
            n,
            k,
            &self.data,
            1,
            self.cols,
            &other.data,
            n,
            1,
            &mut out,
            n,
            1,
        );
        Ok(Matrix {
            rows: m,
            cols: n,
            data: out,
        })
    }

    /// `self · otherᵗ`, without materializing the transpose.
    ///
    /// Requires `self.cols() == other.cols()`; the result is `self.rows() x other.rows()`.
    pub fn matmul_t(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.cols {
            return Err(Error::ShapeMismatch(format!(
                "matmul_t inner dimensions differ: {}x{} · ({}x{})ᵗ",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let (m, k, n) = (self.rows, self.cols, other.rows);
        let mut out = vec![0.0; m * n];
        gemm_f64(
            m,
            n,
            k,
            &self.data,
            k,
            1,
            &other.data,
            1,
            other.cols,
            &mut out,
            n,
            1,
        );
        Ok(Matrix {
            rows: m,
            cols: n,
            data: out,
        })
    }

    /// Every cell multiplied by `k`.
    pub fn scale(&self, k: f64) -> Matrix {
        self.map(|x| k * x)
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "hadamard", |a, b| a * b)
    }

    pub fn square(&self) -> Matrix {
        self.map(|x| x * x)
    }

    /// `1 - x` for every cell.
    pub fn one_minus(&self) -> Matrix {
        self.map(|x| 1.0 - x)
    }

    /// Total of all cells.
    pub fn sum(&self) -> f64 {
        let mut total = 0.0;
        for &x in &self.data {
            total += x;
        }
        total
    }

    /// Arithmetic mean of a single-column matrix.
    pub fn mean(&self) -> Result<f64> {
        if self.cols != 1 {
            return Err(Error::ShapeMismatch(format!(
                "mean is defined for single-column matrices, got {} columns",
                self.cols
            )));
        }
        Ok(self.sum() / self.rows as f64)
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for r in 0..self.rows {
            for c in 0..self.cols {
                data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Cell-wise logistic function `1 / (1 + e^-x)`.
    pub fn sigmoid(&self) -> Matrix {
        self.map(activation::sigmoid)
    }

    /// Row-wise softmax: every row of the result is a probability distribution.
    pub fn softmax(&self) -> Matrix {
        let mut out = Matrix::filled_like(self, 0.0);
        for (row, out_row) in self
            .data
            .chunks_exact(self.cols)
            .zip(out.data.chunks_exact_mut(self.cols))
        {
            activation::softmax_row(row, out_row);
        }
        out
    }

    /// Cell-wise rounding to the nearest integer, ties away from zero.
    pub fn round(&self) -> Matrix {
        self.map(f64::round)
    }

    /// Cell-wise natural logarithm.
    ///
    /// Fails with [`Error::Domain`] if any cell is not a finite positive number.
    pub fn ln(&self) -> Result<Matrix> {
        if let Some(pos) = self.data.iter().position(|&x| !(x > 0.0 && x.is_finite())) {
            return Err(Error::Domain(format!(
                "ln of {} at cell ({}, {})",
                self.data[pos],
                pos / self.cols,
                pos % self.cols
            )));
        }
        Ok(self.map(f64::ln))
    }

    /// Overwrite every cell with a sample drawn uniformly from `[0, 1)`.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for x in &mut self.data {
            *x = rng.gen::<f64>();
        }
    }

    /// Copy of rows `start..end`.
    ///
    /// The range must be non-empty and lie within the matrix.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<Matrix> {
        if start >= end || end > self.rows {
            return Err(Error::IndexOutOfRange(format!(
                "row range {start}..{end} is not a non-empty range within {} rows",
                self.rows
            )));
        }
        Ok(Matrix {
            rows: end - start,
            cols: self.cols,
            data: self.data[start * self.cols..end * self.cols].to_vec(),
        })
    }

    /// Copy of the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Matrix> {
        if indices.is_empty() {
            return Err(Error::InvalidShape(
                "select_rows requires at least one index".to_owned(),
            ));
        }

        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &idx in indices {
            if idx >= self.rows {
                return Err(Error::IndexOutOfRange(format!(
                    "row {idx} is outside a matrix with {} rows",
                    self.rows
                )));
            }
            data.extend_from_slice(self.row(idx));
        }

        Ok(Matrix {
            rows: indices.len(),
            cols: self.cols,
            data,
        })
    }

    /// Single-column matrix holding, per row, the index of the largest cell.
    ///
    /// Ties go to the first occurrence.
    pub fn argmax_rows(&self) -> Matrix {
        let data = self
            .data
            .chunks_exact(self.cols)
            .map(|row| {
                let mut best = 0;
                for (i, &v) in row.iter().enumerate().skip(1) {
                    if v > row[best] {
                        best = i;
                    }
                }
                best as f64
            })
            .collect();
        Matrix {
            rows: self.rows,
            cols: 1,
            data,
        }
    }

    /// Render the shape and the top-left `max_rows x max_cols` block.
    pub fn preview(&self, max_rows: usize, max_cols: usize) -> String {
        let mut out = format!("({},{})\n", self.rows, self.cols);
        for r in 0..self.rows.min(max_rows) {
            let cells: Vec<String> = self.row(r)[..self.cols.min(max_cols)]
                .iter()
                .map(|x| x.to_string())
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview(self.rows, self.cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn m(rows: &[&[f64]]) -> Matrix {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(&rows).unwrap()
    }

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, scale: f64) -> Matrix {
        let data = (0..rows * cols)
            .map(|_| rng.gen_range(-scale..scale))
            .collect();
        Matrix::from_flat(data, cols).unwrap()
    }

    #[test]
    fn construction_rejects_empty_and_ragged_shapes() {
        assert!(matches!(Matrix::zeros(0, 3), Err(Error::InvalidShape(_))));
        assert!(matches!(Matrix::zeros(3, 0), Err(Error::InvalidShape(_))));
        assert!(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::from_flat(vec![1.0, 2.0, 3.0], 2).is_err());

        let z = Matrix::filled(2, 3, 1.5).unwrap();
        assert_eq!(z.shape(), (2, 3));
        assert!(z.as_slice().iter().all(|&x| x == 1.5));
    }

    #[test]
    fn matmul_matches_hand_computed_product() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let b = m(&[&[1.0, 0.0, 2.0], &[0.0, 1.0, 3.0]]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(
            c,
            m(&[&[1.0, 2.0, 8.0], &[3.0, 4.0, 18.0], &[5.0, 6.0, 28.0]])
        );
    }

    #[test]
    fn matmul_shape_is_outer_dimensions() {
        let mut rng = StdRng::seed_from_u64(7);
        for (r, k, c) in [(1, 1, 1), (3, 4, 2), (5, 1, 6), (2, 7, 1)] {
            let a = random_matrix(&mut rng, r, k, 1.0);
            let b = random_matrix(&mut rng, k, c, 1.0);
            assert_eq!(a.matmul(&b).unwrap().shape(), (r, c));
        }
    }

    #[test]
    fn matmul_rejects_inner_dimension_mismatch() {
        let a = Matrix::zeros(2, 3).unwrap();
        let b = Matrix::zeros(2, 3).unwrap();
        assert!(matches!(a.matmul(&b), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn strided_products_match_explicit_transpose() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = random_matrix(&mut rng, 5, 3, 2.0);
        let b = random_matrix(&mut rng, 5, 4, 2.0);
        let c = random_matrix(&mut rng, 2, 3, 2.0);

        assert_eq!(
            a.t_matmul(&b).unwrap(),
            a.transpose().matmul(&b).unwrap()
        );
        assert_eq!(
            a.matmul_t(&c).unwrap(),
            a.matmul(&c.transpose()).unwrap()
        );
        assert!(a.t_matmul(&c).is_err());
        assert!(a.matmul_t(&b).is_err());
    }

    #[test]
    fn transpose_is_an_involution() {
        let mut rng = StdRng::seed_from_u64(11);
        for (r, c) in [(1, 1), (1, 5), (4, 1), (3, 7)] {
            let a = random_matrix(&mut rng, r, c, 10.0);
            let t = a.transpose();
            assert_eq!(t.shape(), (c, r));
            assert_eq!(t.transpose(), a);
        }
        let a = m(&[&[1.0, 2.0, 3.0]]);
        assert_eq!(a.transpose(), m(&[&[1.0], &[2.0], &[3.0]]));
    }

    #[test]
    fn elementwise_ops_require_identical_shapes() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[5.0, 6.0], &[7.0, 8.0]]);
        assert_eq!(a.add(&b).unwrap(), m(&[&[6.0, 8.0], &[10.0, 12.0]]));
        assert_eq!(b.sub(&a).unwrap(), m(&[&[4.0, 4.0], &[4.0, 4.0]]));
        assert_eq!(a.hadamard(&b).unwrap(), m(&[&[5.0, 12.0], &[21.0, 32.0]]));
        assert_eq!(a.square(), m(&[&[1.0, 4.0], &[9.0, 16.0]]));
        assert_eq!(a.scale(0.5), m(&[&[0.5, 1.0], &[1.5, 2.0]]));
        assert_eq!(a.one_minus(), m(&[&[0.0, -1.0], &[-2.0, -3.0]]));

        let row = m(&[&[1.0, 2.0]]);
        assert!(matches!(a.add(&row), Err(Error::ShapeMismatch(_))));
        assert!(matches!(a.sub(&row), Err(Error::ShapeMismatch(_))));
        assert!(matches!(a.hadamard(&row), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn reductions() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        assert_eq!(a.sum(), 10.0);
        assert!(matches!(a.mean(), Err(Error::ShapeMismatch(_))));

        let col = m(&[&[1.0], &[2.0], &[6.0]]);
        assert_eq!(col.mean().unwrap(), 3.0);
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(5);
        for scale in [1.0, 50.0, 800.0] {
            let a = random_matrix(&mut rng, 6, 4, scale);
            let s = a.softmax();
            for r in 0..s.rows() {
                let total: f64 = s.row(r).iter().sum();
                assert!((total - 1.0).abs() < 1e-9, "row {r} sums to {total}");
                assert!(s.row(r).iter().all(|x| x.is_finite()));
            }
        }
    }

    #[test]
    fn sigmoid_stays_strictly_inside_unit_interval() {
        let mut rng = StdRng::seed_from_u64(9);
        let a = random_matrix(&mut rng, 10, 10, 30.0);
        for &y in a.sigmoid().as_slice() {
            assert!(y > 0.0 && y < 1.0, "sigmoid produced {y}");
        }
    }

    #[test]
    fn round_ties_away_from_zero_and_is_idempotent() {
        let a = m(&[&[0.5, 1.5, 2.5, -0.5, -1.5, 0.49]]);
        let r = a.round();
        assert_eq!(r, m(&[&[1.0, 2.0, 3.0, -1.0, -2.0, 0.0]]));
        assert_eq!(r.round(), r);

        let mut rng = StdRng::seed_from_u64(13);
        let b = random_matrix(&mut rng, 4, 4, 5.0);
        assert_eq!(b.round().round(), b.round());
    }

    #[test]
    fn ln_rejects_non_positive_cells() {
        let ok = m(&[&[1.0, std::f64::consts::E]]).ln().unwrap();
        assert_eq!(ok.get(0, 0), 0.0);
        assert!((ok.get(0, 1) - 1.0).abs() < 1e-12);

        assert!(matches!(m(&[&[1.0, 0.0]]).ln(), Err(Error::Domain(_))));
        assert!(matches!(m(&[&[-2.0]]).ln(), Err(Error::Domain(_))));
        assert!(matches!(m(&[&[f64::NAN]]).ln(), Err(Error::Domain(_))));
    }

    #[test]
    fn fill_random_is_seeded_and_in_unit_interval() {
        let mut a = Matrix::zeros(8, 8).unwrap();
        let mut b = Matrix::zeros(8, 8).unwrap();
        a.fill_random(&mut StdRng::seed_from_u64(42));
        b.fill_random(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.as_slice().iter().all(|&x| (0.0..1.0).contains(&x)));
        assert!(a.sum() > 0.0);
    }

    #[test]
    fn slice_rows_respects_bounds() {
        let a = m(&[&[1.0], &[2.0], &[3.0]]);
        assert_eq!(a.slice_rows(1, 3).unwrap(), m(&[&[2.0], &[3.0]]));
        assert!(matches!(a.slice_rows(2, 4), Err(Error::IndexOutOfRange(_))));
        assert!(matches!(a.slice_rows(2, 2), Err(Error::IndexOutOfRange(_))));

        assert_eq!(a.select_rows(&[2, 0]).unwrap(), m(&[&[3.0], &[1.0]]));
        assert!(matches!(a.select_rows(&[3]), Err(Error::IndexOutOfRange(_))));
    }

    #[test]
    fn argmax_picks_first_maximum() {
        let a = m(&[&[0.1, 0.7, 0.2], &[0.4, 0.4, 0.2], &[0.0, 0.0, 1.0]]);
        assert_eq!(a.argmax_rows(), m(&[&[1.0], &[0.0], &[2.0]]));
    }

    #[test]
    fn display_prints_shape_and_cells() {
        let a = m(&[&[1.0, 2.5], &[3.0, 4.0]]);
        assert_eq!(a.to_string(), "(2,2)\n1 2.5\n3 4\n");
        assert_eq!(a.preview(1, 1), "(2,2)\n1\n");
    }
}
