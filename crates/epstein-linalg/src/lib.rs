//! Dense real linear-algebra primitives for the Epstein zeta kernel.
//!
//! This crate exposes exactly the operations the Epstein driver needs on
//! small (`d <= 10`) real matrices and vectors: dot products, matrix times
//! integer vector, transpose, LU-based inversion with partial pivoting, an
//! infinity norm, and two tolerance-based equality checks. It is not a
//! general-purpose linear-algebra library; nothing here is exposed beyond
//! what the driver consumes.
//!
//! All matrices are row-major `&[f64]` buffers of length `d * d`; all
//! vectors are `&[f64]` (or `&[i64]` for integer lattice coordinates) of
//! length `d`. Callers own every buffer; nothing here retains references
//! or allocates beyond call-scoped scratch space.

#![forbid(unsafe_code)]

use std::fmt;

/// A pivot in the LU decomposition had magnitude below `2^-52`.
///
/// `invert` is specified against invertible input matrices only (the
/// caller's contract); this error exists so the Epstein driver can assert
/// on it in debug builds rather than silently propagating garbage, per the
/// crate's "domain errors are undefined behaviour by contract" policy.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SingularMatrixError;

impl fmt::Display for SingularMatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matrix is singular to working precision (pivot below 2^-52)")
    }
}

impl std::error::Error for SingularMatrixError {}

/// Dot product `sum_i u[i] * v[i]` of two length-`d` real vectors.
#[must_use]
pub fn dot(d: usize, u: &[f64], v: &[f64]) -> f64 {
    debug_assert!(u.len() >= d && v.len() >= d, "dot: vector shorter than d");
    (0..d).map(|i| u[i] * v[i]).sum()
}

/// Matrix-vector product `out = M . v` for an integer-valued vector `v`.
///
/// `m` is row-major `d x d`; `v_int` and `out` are length `d`.
pub fn matvec_i(d: usize, m: &[f64], v_int: &[i64], out: &mut [f64]) {
    debug_assert!(m.len() >= d * d);
    debug_assert!(v_int.len() >= d && out.len() >= d);
    for (i, out_i) in out.iter_mut().enumerate().take(d) {
        let row = &m[i * d..i * d + d];
        *out_i = row
            .iter()
            .zip(v_int.iter())
            .map(|(&m_ij, &v_j)| m_ij * v_j as f64)
            .sum();
    }
}

/// Transpose a row-major `d x d` matrix in place.
pub fn transpose_inplace(d: usize, m: &mut [f64]) {
    debug_assert!(m.len() >= d * d);
    for i in 0..d {
        for j in (i + 1)..d {
            m.swap(i * d + j, j * d + i);
        }
    }
}

/// Invert a row-major `d x d` matrix via LU decomposition with partial
/// pivoting.
///
/// `m` is overwritten with its LU decomposition (combined `L`/`U` storage,
/// unit diagonal on `L` implicit); `piv` (length `d`) records the row
/// permutation; `inv` (length `d * d`) receives the inverse, computed by
/// back-solving `M x = e_j` for each standard basis column `e_j`.
///
/// # Errors
///
/// Returns [`SingularMatrixError`] if any pivot's magnitude falls below
/// `2^-52`. Per this crate's contract, callers are required to supply an
/// invertible `m`; this check exists for debug-time verification, not as a
/// recoverable path callers are expected to branch on in release builds.
pub fn invert(
    d: usize,
    m: &mut [f64],
    piv: &mut [usize],
    inv: &mut [f64],
) -> Result<(), SingularMatrixError> {
    debug_assert!(m.len() >= d * d && piv.len() >= d && inv.len() >= d * d);

    for (i, p) in piv.iter_mut().enumerate().take(d) {
        *p = i;
    }

    for k in 0..d {
        let (mut max_row, mut max_val) = (k, m[k * d + k].abs());
        for i in (k + 1)..d {
            let v = m[i * d + k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }
        if max_val < 2f64.powi(-52) {
            return Err(SingularMatrixError);
        }
        if max_row != k {
            for col in 0..d {
                m.swap(k * d + col, max_row * d + col);
            }
            piv.swap(k, max_row);
        }

        let pivot = m[k * d + k];
        for i in (k + 1)..d {
            let factor = m[i * d + k] / pivot;
            m[i * d + k] = factor;
            for col in (k + 1)..d {
                m[i * d + col] -= factor * m[k * d + col];
            }
        }
    }

    let mut rhs = vec![0.0_f64; d];
    let mut sol = vec![0.0_f64; d];
    for col in 0..d {
        for (row, rhs_row) in rhs.iter_mut().enumerate().take(d) {
            *rhs_row = if piv[row] == col { 1.0 } else { 0.0 };
        }

        for i in 0..d {
            let mut s = rhs[i];
            for j in 0..i {
                s -= m[i * d + j] * sol[j];
            }
            sol[i] = s;
        }
        for i in (0..d).rev() {
            let mut s = sol[i];
            for j in (i + 1)..d {
                s -= m[i * d + j] * sol[j];
            }
            sol[i] = s / m[i * d + i];
        }

        for (row, sol_row) in sol.iter().enumerate().take(d) {
            inv[row * d + col] = *sol_row;
        }
    }

    Ok(())
}

/// Componentwise equality of two length-`d` vectors within `2^-32`.
#[must_use]
pub fn vec_eq(d: usize, u: &[f64], v: &[f64]) -> bool {
    const TOL: f64 = 2.328_306_436_538_696_3e-10; // 2^-32
    (0..d).all(|i| (u[i] - v[i]).abs() < TOL)
}

/// True if every component of a length-`d` vector has magnitude below
/// `2^-32`.
#[must_use]
pub fn vec_is_zero(d: usize, v: &[f64]) -> bool {
    const TOL: f64 = 2.328_306_436_538_696_3e-10; // 2^-32
    v.iter().take(d).all(|&x| x.abs() < TOL)
}

/// Infinity norm of a row-major `d x d` matrix: the maximum absolute row
/// sum.
#[must_use]
pub fn inf_norm(d: usize, m: &[f64]) -> f64 {
    debug_assert!(m.len() >= d * d);
    (0..d)
        .map(|i| m[i * d..i * d + d].iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0_f64, f64::max)
}
