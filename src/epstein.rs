//! The Epstein driver: the nine-step algorithm that combines the
//! linear-algebra, incomplete-gamma, and Crandall-summand components into
//! the two public entry points `zeta` and `zeta_reg`.

use epstein_linalg::{dot, matvec_i, vec_eq, vec_is_zero};

use crate::complex::Complex64;
use crate::crandall::{assign_z_arg_bound, factorial, g, g_reg};
use crate::gamma::gamma;
use crate::kahan::KahanSum;
use crate::types::{EXPONENT_TOL, ExponentClass, LatticeFrame, TruncationBox, classify_exponent};

/// The asymptotic cut-over base radius, `G_BOUND + 1/2` with `G_BOUND =
/// 3.2`.
const TRUNCATION_BASE: f64 = 3.7;

/// Evaluate the Epstein zeta function `Z_{Lambda,nu}(x;y)`.
///
/// `a` is the row-major `d * d` generator matrix of the lattice, `x` and
/// `y` are length-`d` shift vectors.
///
/// # Panics
///
/// Panics if `a` is singular. `d == 0` or mismatched slice lengths are
/// caller-side domain errors checked only by `debug_assert!` in debug
/// builds.
#[must_use]
pub fn zeta(nu: f64, d: usize, a: &[f64], x: &[f64], y: &[f64]) -> Complex64 {
    evaluate(nu, d, a, x, y, false)
}

/// Evaluate the regularised Epstein zeta function
/// `Z^reg_{Lambda,nu}(x;y)`, which removes the singularity at `y = 0`.
///
/// # Panics
///
/// As [`zeta`].
#[must_use]
pub fn zeta_reg(nu: f64, d: usize, a: &[f64], x: &[f64], y: &[f64]) -> Complex64 {
    evaluate(nu, d, a, x, y, true)
}

fn evaluate(nu: f64, d: usize, a: &[f64], x: &[f64], y: &[f64], regularised: bool) -> Complex64 {
    debug_assert!(d >= 1, "zeta/zeta_reg: d must be at least 1");
    debug_assert!(
        a.len() >= d * d && x.len() >= d && y.len() >= d,
        "zeta/zeta_reg: input slice shorter than d"
    );

    // Steps 1-2: scale to unit covolume.
    let frame = LatticeFrame::new(d, a);
    let ms = frame.ms;
    let x_prime: Vec<f64> = x.iter().take(d).map(|&v| v * ms).collect();
    let y_prime: Vec<f64> = y.iter().take(d).map(|&v| v / ms).collect();

    // Step 3: fundamental-cell projections.
    let x_tilde = project_into_fundamental_cell(d, &frame.a_scaled, &frame.b_scaled, &x_prime);
    let y_tilde = project_into_fundamental_cell(d, &frame.b_scaled, &frame.a_scaled, &y_prime);
    let y_moved = !vec_eq(d, &y_prime, &y_tilde);

    // Step 5: special-case gate.
    if let ExponentClass::TrivialZero = classify_exponent(nu, d) {
        return if nu.abs() < EXPONENT_TOL && vec_is_zero(d, &x_tilde) {
            let phase = -2.0 * std::f64::consts::PI * dot(d, &x_prime, &y_tilde);
            -Complex64::cis(phase)
        } else {
            Complex64::zero()
        };
    }
    if !regularised
        && (nu - d as f64).abs() < EXPONENT_TOL
        && dot(d, &y_tilde, &y_tilde) < 1e-64
    {
        return Complex64::nan();
    }

    // Step 4: truncation radii.
    let (c_real, c_rec) = truncation_radii(d, &frame);

    // Step 6: generic branch.
    let bound = assign_z_arg_bound(nu);
    let bound_rec = assign_z_arg_bound(d as f64 - nu);
    let s = d as f64 - nu;

    let x_shift: Vec<f64> = x_prime
        .iter()
        .zip(x_tilde.iter())
        .map(|(&xp, &xt)| xp - xt)
        .collect();
    let mut xfactor =
        Complex64::cis(-2.0 * std::f64::consts::PI * dot(d, &x_shift, &y_prime));

    let mut s1_value = real_space_sum(d, nu, bound, &frame, &x_tilde, &y_tilde, &c_real);
    let mut s2_value = reciprocal_space_sum(d, s, bound_rec, &frame, &x_tilde, &y_tilde, &c_rec);

    if regularised {
        if y_moved {
            let phase_tilde = -2.0 * std::f64::consts::PI * dot(d, &x_prime, &y_tilde);
            let phase_prime = -2.0 * std::f64::consts::PI * dot(d, &x_prime, &y_prime);
            let g_tilde = g(d, s, &y_tilde, 1.0, bound_rec);
            let g_prime = g(d, s, &y_prime, 1.0, bound_rec);
            let corrective = Complex64::cis(phase_tilde).scale(g_tilde)
                - Complex64::cis(phase_prime).scale(g_prime);
            s2_value += corrective;
        }
        let rot = Complex64::cis(2.0 * std::f64::consts::PI * dot(d, &x_prime, &y_prime));
        let c_term = Complex64::from_real(g_reg(d, s, &y_prime, 1.0));
        s2_value = s2_value * rot + c_term;
        s1_value = s1_value * rot * xfactor;
        xfactor = Complex64::one();
    } else {
        let phase = -2.0 * std::f64::consts::PI * dot(d, &x_tilde, &y_tilde);
        let c_term = Complex64::cis(phase).scale(g(d, s, &y_tilde, 1.0, bound_rec));
        s2_value += c_term;
    }

    // Step 7: combine.
    let prefactor =
        Complex64::from_real(std::f64::consts::PI.powf(nu / 2.0) / gamma(nu / 2.0));
    let mut res = xfactor * prefactor * (s1_value + s2_value);

    // Step 8: log correction at resonance (regularised only).
    if regularised {
        if let ExponentClass::Resonance { k } = classify_exponent(nu, d) {
            res = res + log_correction(d, k, y, ms, frame.volume);
        }
    }

    // Step 9: undo the scaling.
    res.scale(ms.powf(nu))
}

/// The integer-lattice coordinates of `v` under `dual` (row-major `d x d`,
/// satisfying `generator^T . dual = I`), computed row-by-row with `dot`
/// rather than a general matrix-vector routine, since `epstein-linalg`
/// exposes only the integer-vector form of matrix-vector multiplication;
/// only the operations this driver actually needs are exposed there.
fn lattice_coordinates(d: usize, dual: &[f64], v: &[f64]) -> Vec<f64> {
    (0..d).map(|i| dot(d, &dual[i * d..i * d + d], v)).collect()
}

/// Re-embed lattice coordinates `coords` via `generator^T . coords`.
fn embed(d: usize, generator: &[f64], coords: &[f64]) -> Vec<f64> {
    (0..d)
        .map(|j| (0..d).map(|i| coords[i] * generator[i * d + j]).sum())
        .collect()
}

/// Project `v` into the fundamental cell `(-1/2, 1/2]^d` of the lattice
/// generated by `generator`, whose dual basis is `dual`.
fn project_into_fundamental_cell(
    d: usize,
    generator: &[f64],
    dual: &[f64],
    v: &[f64],
) -> Vec<f64> {
    let coords = lattice_coordinates(d, dual, v);
    let frac: Vec<f64> = coords.iter().map(|&c| c - c.round()).collect();
    embed(d, generator, &frac)
}

fn truncation_radii(d: usize, frame: &LatticeFrame) -> (Vec<i64>, Vec<i64>) {
    if frame.diagonal {
        let c_real = (0..d)
            .map(|i| (TRUNCATION_BASE / frame.a_scaled[i * d + i].abs()).floor() as i64)
            .collect();
        let c_rec = (0..d)
            .map(|i| (TRUNCATION_BASE * frame.a_scaled[i * d + i].abs()).floor() as i64)
            .collect();
        (c_real, c_rec)
    } else {
        let c_real = vec![(TRUNCATION_BASE * frame.b_scaled_inf_norm()).floor() as i64; d];
        let c_rec = vec![(TRUNCATION_BASE * frame.a_scaled_inf_norm()).floor() as i64; d];
        (c_real, c_rec)
    }
}

fn real_space_sum(
    d: usize,
    nu: f64,
    bound: f64,
    frame: &LatticeFrame,
    x_tilde: &[f64],
    y_tilde: &[f64],
    radii: &[i64],
) -> Complex64 {
    let truncation = TruncationBox::new(radii.to_vec());
    let mut sum = KahanSum::new();
    let mut lattice_point = vec![0.0_f64; d];
    let mut offset = vec![0.0_f64; d];

    let mut it = truncation.iter();
    loop {
        let n = it.current();
        matvec_i(d, &frame.a_scaled, n, &mut lattice_point);
        let phase = -2.0 * std::f64::consts::PI * dot(d, &lattice_point, y_tilde);
        for i in 0..d {
            offset[i] = lattice_point[i] - x_tilde[i];
        }
        let value = g(d, nu, &offset, 1.0, bound);
        sum.add(Complex64::cis(phase).scale(value));
        if !it.advance() {
            break;
        }
    }
    sum.finish()
}

fn reciprocal_space_sum(
    d: usize,
    s: f64,
    bound_rec: f64,
    frame: &LatticeFrame,
    x_tilde: &[f64],
    y_tilde: &[f64],
    radii: &[i64],
) -> Complex64 {
    let truncation = TruncationBox::new(radii.to_vec());
    let mut sum = KahanSum::new();
    let mut reciprocal_point = vec![0.0_f64; d];

    let mut it = truncation.iter();
    loop {
        let n = it.current();
        if n.iter().all(|&v| v == 0) {
            if !it.advance() {
                break;
            }
            continue;
        }
        matvec_i(d, &frame.b_scaled, n, &mut reciprocal_point);
        for i in 0..d {
            reciprocal_point[i] += y_tilde[i];
        }
        let phase = -2.0 * std::f64::consts::PI * dot(d, &reciprocal_point, x_tilde);
        let value = g(d, s, &reciprocal_point, 1.0, bound_rec);
        sum.add(Complex64::cis(phase).scale(value));
        if !it.advance() {
            break;
        }
    }
    sum.finish()
}

/// The logarithmic correction for the regularised variant at a resonance
/// point `nu = d + 2k`.
fn log_correction(d: usize, k: u32, y: &[f64], ms: f64, volume: f64) -> Complex64 {
    let half_d = d as f64 / 2.0;
    let log_ms2 = (ms * ms).ln();
    let term = if k == 0 {
        std::f64::consts::PI.powf(half_d) * log_ms2 / (gamma(half_d) * volume)
    } else {
        let kf = f64::from(k);
        let y_sq: f64 = y.iter().take(d).map(|v| v * v).sum();
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        -sign / factorial(k) * std::f64::consts::PI.powf(2.0 * kf + half_d) * y_sq.powf(kf)
            * log_ms2
            / (gamma(kf + half_d) * volume)
    };
    Complex64::from_real(term)
}
