//! Small GEMM wrapper used by `Matrix::matmul` and friends.
//!
//! This module provides a single abstraction over matrix multiplication:
//! - default: a simple, safe triple-loop implementation that accumulates each output cell
//!   left-to-right over the inner dimension
//! - optional: a faster blocked backend via the `matrixmultiply` feature (results agree
//!   within rounding, not bit-for-bit)
//!
//! Strides let callers multiply by a transposed operand without materializing it.

#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn gemm_f64(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    rsa: usize,
    csa: usize,
    b: &[f64],
    rsb: usize,
    csb: usize,
    c: &mut [f64],
    rsc: usize,
    csc: usize,
) {
    debug_assert!(m > 0 && n > 0 && k > 0);
    debug_assert!(rsa > 0 || m <= 1);
    debug_assert!(csa > 0 || k <= 1);
    debug_assert!(rsb > 0 || k <= 1);
    debug_assert!(csb > 0 || n <= 1);
    debug_assert!(rsc > 0 || m <= 1);
    debug_assert!(csc > 0 || n <= 1);

    // Shapes are validated by `Matrix`; this stays minimal and inlineable.

    #[cfg(feature = "matrixmultiply")]
    {
        // Overwrite semantics: beta = 0.
        unsafe {
            matrixmultiply::dgemm(
                m,
                k,
                n,
                1.0,
                a.as_ptr(),
                rsa as isize,
                csa as isize,
                b.as_ptr(),
                rsb as isize,
                csb as isize,
                0.0,
                c.as_mut_ptr(),
                rsc as isize,
                csc as isize,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0_f64;
            let a0 = i * rsa;
            let b0 = j * csb;

            for p in 0..k {
                acc += a[a0 + p * csa] * b[p * rsb + b0];
            }

            c[i * rsc + j * csc] = acc;
        }
    }
}
