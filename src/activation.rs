//! Activation functions.
//!
//! Scalar kernels behind `Matrix::sigmoid` and `Matrix::softmax`. The hidden layer of
//! `TwoLayerNet` caches its *post-activation* output, so the sigmoid derivative is
//! expressed in terms of that output.

#[inline]
pub(crate) fn sigmoid(x: f64) -> f64 {
    // Overflow-free form of 1 / (1 + e^-x).
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Derivative of the sigmoid expressed via its output `y = sigmoid(x)`.
#[inline]
pub(crate) fn sigmoid_grad_from_output(y: f64) -> f64 {
    y * (1.0 - y)
}

/// Softmax over one row, written into `out`.
///
/// The row max is subtracted before exponentiating; the result is the same distribution
/// but large scores no longer overflow to `inf`.
#[inline]
pub(crate) fn softmax_row(row: &[f64], out: &mut [f64]) {
    debug_assert_eq!(row.len(), out.len());
    debug_assert!(!row.is_empty());

    let mut max_x = row[0];
    for &x in row.iter().skip(1) {
        if x > max_x {
            max_x = x;
        }
    }

    let mut total = 0.0_f64;
    for (o, &x) in out.iter_mut().zip(row) {
        *o = (x - max_x).exp();
        total += *o;
    }
    for o in out.iter_mut() {
        *o /= total;
    }
}
