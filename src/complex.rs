//! Minimal complex-number arithmetic.
//!
//! The driver never needs anything beyond addition, multiplication, and
//! `exp` of a purely imaginary argument, so a full complex-number crate
//! would be dead weight here (Design Notes, §9: "plain `(re, im)` pairs
//! with `exp` and multiplication are sufficient").

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A double-precision complex number, stored as a `(re, im)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex64 {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex64 {
    /// Build a complex number from its real and imaginary parts.
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// The additive identity `0 + 0i`.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// The multiplicative identity `1 + 0i`.
    #[must_use]
    pub const fn one() -> Self {
        Self::new(1.0, 0.0)
    }

    /// `NaN + NaN*i`, returned for the exposed-pole case.
    #[must_use]
    pub const fn nan() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    /// `e^{i*theta}` via `cos`/`sin`.
    #[must_use]
    pub fn cis(theta: f64) -> Self {
        Self::new(theta.cos(), theta.sin())
    }

    /// Embed a real number as a complex number.
    #[must_use]
    pub const fn from_real(re: f64) -> Self {
        Self::new(re, 0.0)
    }

    /// Scale by a real number.
    #[must_use]
    pub fn scale(self, s: f64) -> Self {
        Self::new(self.re * s, self.im * s)
    }
}

impl Add for Complex64 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl AddAssign for Complex64 {
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Complex64 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Neg for Complex64 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl Mul for Complex64 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}
