//! Compensated (Kahan) summation, shared by the real-space and
//! reciprocal-space lattice sums.
//!
//! Series routines that inline a `sum` / `compensation` pair by hand are
//! easy to get subtly wrong under refactoring; here that pattern is
//! lifted into a small reusable value type with `add` and `finish`
//! operations, unit-tested in isolation, since the Epstein driver needs
//! the identical compensated accumulation twice per call (once for each
//! of the two complex lattice sums) and cancellation between them is the
//! dominant error source near `nu ~ d`.

use crate::complex::Complex64;

/// A Kahan (compensated) summation accumulator over [`Complex64`] values.
///
/// Each of `re` and `im` carries its own running compensation term, since
/// the two parts accumulate independent rounding error.
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: Complex64,
    comp: Complex64,
}

impl KahanSum {
    /// A fresh accumulator at `0 + 0i`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sum: Complex64::zero(),
            comp: Complex64::zero(),
        }
    }

    /// Add one term to the running sum.
    pub fn add(&mut self, term: Complex64) {
        let y_re = term.re - self.comp.re;
        let t_re = self.sum.re + y_re;
        self.comp.re = (t_re - self.sum.re) - y_re;
        self.sum.re = t_re;

        let y_im = term.im - self.comp.im;
        let t_im = self.sum.im + y_im;
        self.comp.im = (t_im - self.sum.im) - y_im;
        self.sum.im = t_im;
    }

    /// The accumulated total.
    #[must_use]
    pub fn finish(self) -> Complex64 {
        self.sum
    }
}

#[cfg(test)]
mod tests {
    use super::KahanSum;
    use crate::complex::Complex64;

    #[test]
    #[allow(clippy::float_cmp, reason = "an accumulator with no terms added is exactly zero")]
    fn empty_sum_is_zero() {
        assert_eq!(KahanSum::new().finish(), Complex64::zero());
    }

    #[test]
    fn recovers_precision_lost_to_naive_summation() {
        // 1.0 + 1e16 - 1e16 loses the 1.0 under naive f64 summation in the
        // wrong order; Kahan summation recovers it regardless of order.
        let mut kahan = KahanSum::new();
        kahan.add(Complex64::from_real(1e16));
        kahan.add(Complex64::from_real(1.0));
        kahan.add(Complex64::from_real(-1e16));
        let total = kahan.finish();
        assert!((total.re - 1.0).abs() < 1e-9);
    }

    #[test]
    fn accumulates_real_and_imaginary_independently() {
        let mut kahan = KahanSum::new();
        for _ in 0..1000 {
            kahan.add(Complex64::new(0.001, -0.002));
        }
        let total = kahan.finish();
        assert!((total.re - 1.0).abs() < 1e-9);
        assert!((total.im + 2.0).abs() < 1e-9);
    }
}
