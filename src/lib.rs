#![forbid(unsafe_code)]
//! Epstein zeta evaluation core.
//!
//! Evaluates the Epstein zeta function and its regularised variant over a
//! real lattice `Lambda = A*Z^d` of dimension `d` (up to 10) for a real
//! exponent `nu` in `(-10, 10)`, via the Crandall decomposition: a
//! symmetric real-space/reciprocal-space lattice sum built on the upper
//! incomplete gamma function, with Kahan-compensated accumulation
//! targeting relative accuracy of `1e-13`.
//!
//! # Usage
//!
//! ```
//! use epstein_zeta::zeta;
//!
//! // Madelung constant of the simple cubic lattice.
//! let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
//! let zero = [0.0, 0.0, 0.0];
//! let half_shift = [0.5, 0.5, 0.5];
//! let madelung = zeta(1.0, 3, &identity, &zero, &half_shift);
//! assert!((madelung.re - (-1.747_564_594_633_182_2)).abs() < 1e-9);
//! ```
//!
//! The real-space/reciprocal-space split, the incomplete-gamma region
//! dispatch, and the logarithmic self-term regularisation are each
//! implemented in their own module, leaves-first:
//!
//! - [`complex`] / [`kahan`]: the plain complex pair type and compensated
//!   summation shared by everything above them.
//! - [`gamma`] / [`incomplete_gamma`]: the ordinary and incomplete gamma
//!   functions.
//! - [`crandall`]: the per-lattice-point summand `g`/`g_reg`.
//! - [`types`]: the lattice/shift/exponent value types.
//! - [`epstein`]: the driver exposing [`zeta`] and [`zeta_reg`].

pub mod complex;
pub mod crandall;
pub mod epstein;
pub mod gamma;
pub mod incomplete_gamma;
pub mod kahan;
pub mod types;

pub use complex::Complex64;
pub use epstein::{zeta, zeta_reg};
