//! The lattice/shift/exponent value types shared by the Epstein driver.
//!
//! Every type here is created on call entry, used for the duration of one
//! `zeta`/`zeta_reg` call, and dropped on return (Data Model §3: "no
//! persistent allocations, no cycles").

use epstein_linalg::{inf_norm, invert, transpose_inplace};

/// The derived lattice quantities computed once per call from the caller's
/// generator matrix `A`: the unit-covolume rescaling `ms`, the rescaled
/// generator `A_scaled`, its reciprocal generator `B_scaled`, the original
/// volume `V = |det A|`, and whether `A` is diagonal.
#[derive(Debug, Clone)]
pub struct LatticeFrame {
    d: usize,
    /// `ms = V^{-1/d}`, `V = |det A|`.
    pub ms: f64,
    /// Row-major `d x d`: `ms * A`. Satisfies `|det a_scaled| = 1`.
    pub a_scaled: Vec<f64>,
    /// Row-major `d x d`: the reciprocal generator of the scaled lattice,
    /// `(a_scaled^{-1})^T`, satisfying `a_scaled^T . b_scaled = I`.
    pub b_scaled: Vec<f64>,
    /// `V = |det A|` of the original (unscaled) generator.
    pub volume: f64,
    /// True if the caller's `A` is diagonal, letting the driver pick
    /// per-axis truncation radii directly from the diagonal entries
    /// instead of from the infinity norms of `a_scaled`/`b_scaled`.
    pub diagonal: bool,
}

impl LatticeFrame {
    /// Build the derived lattice quantities from a caller-owned row-major
    /// `d x d` generator matrix `A`.
    ///
    /// # Panics
    ///
    /// Panics if `A` is not invertible. A singular `A` is a caller-side
    /// domain error under this crate's contract; this constructor is the
    /// one place that contract is enforced eagerly, since every later step
    /// of the driver assumes `a_scaled`/`b_scaled` are well defined.
    #[must_use]
    pub fn new(d: usize, a: &[f64]) -> Self {
        debug_assert!(a.len() >= d * d, "LatticeFrame::new: A shorter than d*d");

        let mut lu = a.to_vec();
        let mut piv = vec![0_usize; d];
        let mut a_inv = vec![0.0_f64; d * d];
        invert(d, &mut lu, &mut piv, &mut a_inv).expect("A must be invertible (caller contract)");

        let volume = (0..d).map(|i| lu[i * d + i]).product::<f64>().abs();
        let ms = volume.powf(-1.0 / (d as f64));

        let a_scaled: Vec<f64> = a.iter().map(|&v| v * ms).collect();

        let mut b_scaled = a_inv;
        transpose_inplace(d, &mut b_scaled);
        for v in &mut b_scaled {
            *v /= ms;
        }

        let diagonal = is_diagonal(d, a);

        Self {
            d,
            ms,
            a_scaled,
            b_scaled,
            volume,
            diagonal,
        }
    }

    /// The infinity norm (max absolute row sum) of `a_scaled`.
    #[must_use]
    pub fn a_scaled_inf_norm(&self) -> f64 {
        inf_norm(self.d, &self.a_scaled)
    }

    /// The infinity norm (max absolute row sum) of `b_scaled`.
    #[must_use]
    pub fn b_scaled_inf_norm(&self) -> f64 {
        inf_norm(self.d, &self.b_scaled)
    }
}

fn is_diagonal(d: usize, a: &[f64]) -> bool {
    const TOL: f64 = 2.328_306_436_538_696_3e-10; // 2^-32, matching epstein_linalg's vec_eq/vec_is_zero tolerance.
    for i in 0..d {
        for j in 0..d {
            if i != j && a[i * d + j].abs() >= TOL {
                return false;
            }
        }
    }
    true
}

/// The tolerance used for every "is this an integer / is this zero" check
/// in the exponent classification below, `2^-30`. Shared with the driver's
/// special-case gate, which performs the same near-integer and pole
/// checks against the same tolerance.
pub(crate) const EXPONENT_TOL: f64 = 9.313_225_746_154_785_2e-10; // 2^-30

/// The four-way classification of `nu` (relative to dimension `d`) that
/// gates the driver's special cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExponentClass {
    /// `nu` is a non-positive even integer: the sum vanishes identically
    /// (or degenerates to a single term at `nu = 0`).
    TrivialZero,
    /// `nu - d` is a non-negative even integer `2k`: the regularised
    /// self-term's Fourier transform acquires a logarithmic branch.
    Resonance {
        /// `k = (nu - d) / 2 >= 0`.
        k: u32,
    },
    /// Neither of the above.
    Generic,
}

/// Classify `nu` against dimension `d`.
///
/// The trivial-zero predicate is the explicit guard `nu < 1 && |nu/2 -
/// round(nu/2)| < 2^-30`, rather than the looser "non-positive even
/// integer" framing: the two agree everywhere except at `nu` itself being
/// a very large negative even integer where rounding could disagree in
/// the last bit, and the explicit guard is what the reference behaviour
/// is pinned to.
#[must_use]
pub fn classify_exponent(nu: f64, d: usize) -> ExponentClass {
    if nu < 1.0 && (nu / 2.0 - (nu / 2.0).round()).abs() < EXPONENT_TOL {
        return ExponentClass::TrivialZero;
    }

    let diff = nu - d as f64;
    if diff >= -EXPONENT_TOL {
        let half = diff / 2.0;
        if (half - half.round()).abs() < EXPONENT_TOL {
            let k = half.round().max(0.0);
            return ExponentClass::Resonance { k: k as u32 };
        }
    }

    ExponentClass::Generic
}

/// Per-axis non-negative integer truncation radii for the real-space or
/// reciprocal-space lattice box.
#[derive(Debug, Clone)]
pub struct TruncationBox {
    radii: Vec<i64>,
}

impl TruncationBox {
    /// Build a truncation box from its per-axis radii (already computed
    /// by the driver from `G_BOUND`, the scaling, and diagonality).
    #[must_use]
    pub fn new(radii: Vec<i64>) -> Self {
        Self { radii }
    }

    /// The per-axis radii.
    #[must_use]
    pub fn radii(&self) -> &[i64] {
        &self.radii
    }

    /// An odometer iterator over every integer point `n` with `|n_i| <=
    /// radii[i]` for every axis `i`, least-significant axis varying
    /// fastest (required for deterministic summation order).
    #[must_use]
    pub fn iter(&self) -> BoxIter {
        BoxIter::new(&self.radii)
    }
}

/// An explicit odometer over a [`TruncationBox`]'s integer points, built to
/// mutate its counter vector in place rather than recomputing each
/// coordinate from a flat index, preserving exact ordering while avoiding
/// a division per step.
///
/// Usage is a `current`/`advance` pair rather than [`Iterator`], since the
/// natural borrow (`&[i64]` into `self`) cannot be expressed through that
/// trait without either cloning every step or unsafe code:
///
/// ```ignore
/// let mut it = BoxIter::new(&radii);
/// loop {
///     use_point(it.current());
///     if !it.advance() { break; }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BoxIter {
    radii: Vec<i64>,
    counters: Vec<i64>,
    exhausted: bool,
}

impl BoxIter {
    fn new(radii: &[i64]) -> Self {
        let counters: Vec<i64> = radii.iter().map(|&r| -r).collect();
        Self {
            radii: radii.to_vec(),
            counters,
            exhausted: radii.is_empty(),
        }
    }

    /// The current integer point.
    #[must_use]
    pub fn current(&self) -> &[i64] {
        &self.counters
    }

    /// Advance to the next point in odometer order. Returns `false` once
    /// the point just returned by [`Self::current`] was the last one in
    /// the box.
    pub fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        for i in 0..self.counters.len() {
            if self.counters[i] < self.radii[i] {
                self.counters[i] += 1;
                return true;
            }
            self.counters[i] = -self.radii[i];
        }
        self.exhausted = true;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{BoxIter, ExponentClass, LatticeFrame, TruncationBox, classify_exponent};

    #[test]
    fn lattice_frame_identity_is_self_dual() {
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let frame = LatticeFrame::new(3, &identity);
        assert!((frame.ms - 1.0).abs() < 1e-12);
        assert!((frame.volume - 1.0).abs() < 1e-12);
        assert!(frame.diagonal);
        for (scaled, original) in frame.a_scaled.iter().zip(identity.iter()) {
            assert!((scaled - original).abs() < 1e-12);
        }
        for (b, original) in frame.b_scaled.iter().zip(identity.iter()) {
            assert!((b - original).abs() < 1e-12);
        }
    }

    #[test]
    fn lattice_frame_rescales_to_unit_covolume() {
        let a = [2.0, 0.0, 0.0, 0.0, 8.0, 0.0, 0.0, 0.0, 1.0];
        let frame = LatticeFrame::new(3, &a);
        let det_scaled: f64 =
            frame.a_scaled[0] * frame.a_scaled[4] * frame.a_scaled[8];
        assert!((det_scaled.abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn lattice_frame_detects_non_diagonal() {
        let a = [1.0, 0.5, 0.0, 1.0];
        let frame = LatticeFrame::new(2, &a);
        assert!(!frame.diagonal);
    }

    #[test]
    fn classify_exponent_trivial_zero() {
        for nu in [0.0, -2.0, -4.0, -100.0] {
            assert_eq!(classify_exponent(nu, 3), ExponentClass::TrivialZero);
        }
    }

    #[test]
    fn classify_exponent_resonance() {
        assert_eq!(
            classify_exponent(3.0, 3),
            ExponentClass::Resonance { k: 0 }
        );
        assert_eq!(
            classify_exponent(5.0, 3),
            ExponentClass::Resonance { k: 1 }
        );
    }

    #[test]
    fn classify_exponent_generic() {
        assert_eq!(classify_exponent(1.0, 3), ExponentClass::Generic);
        assert_eq!(classify_exponent(2.5, 3), ExponentClass::Generic);
    }

    #[test]
    fn box_iter_visits_every_point_in_odometer_order() {
        let radii = vec![1_i64, 1];
        let truncation = TruncationBox::new(radii);
        let mut points = Vec::new();
        let mut it = truncation.iter();
        loop {
            points.push(it.current().to_vec());
            if !it.advance() {
                break;
            }
        }
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], vec![-1, -1]);
        assert_eq!(points[1], vec![0, -1]);
        assert_eq!(points[2], vec![1, -1]);
        assert_eq!(points[3], vec![-1, 0]);
        assert_eq!(points.last().cloned().unwrap_or_default(), vec![1, 1]);
    }

    #[test]
    fn box_iter_handles_zero_radius() {
        let truncation = TruncationBox::new(vec![0, 0, 0]);
        let mut it = truncation.iter();
        assert_eq!(it.current(), &[0, 0, 0]);
        assert!(!it.advance());
    }

    #[test]
    fn box_iter_dyn_check() {
        let it = BoxIter::new(&[2]);
        assert_eq!(it.current(), &[-2]);
    }
}
