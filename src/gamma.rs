//! The ordinary Gamma function `Gamma(x)`, needed for the `Gamma(nu/2)` and
//! `Gamma(s/2)` prefactors used throughout the Crandall summand and the
//! driver's closing factor.
//!
//! Uses the Lanczos approximation with `g = 7` and the standard
//! nine-coefficient table attributed to Lanczos (1964), specialised here to
//! `f64` since the public interface fixes the numeric type.
//!
//! Reference: Lanczos, C. "A Precision Approximation of the Gamma
//! Function" (1964); DLMF §5.10 <https://dlmf.nist.gov/5.10>.

const LANCZOS_G: f64 = 7.0;

const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// `Gamma(x)` for real `x`, `NaN` at the poles (non-positive integers).
#[must_use]
pub fn gamma(x: f64) -> f64 {
    if x <= 0.0 && x.fract() == 0.0 {
        return f64::NAN;
    }

    if x < 0.5 {
        // Reflection formula: Gamma(x)Gamma(1-x) = pi / sin(pi x).
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut acc = LANCZOS_COEFFICIENTS[0];
        for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
            acc += c / (x + i as f64);
        }
        let t = x + LANCZOS_G + 0.5;
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * acc
    }
}

/// `ln(Gamma(x))` for `x > 0`, computed directly from the Lanczos series to
/// avoid overflow in `Gamma(x)` itself for large `x`.
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    debug_assert!(x > 0.0, "ln_gamma requires a positive argument");
    if x < 0.5 {
        return (std::f64::consts::PI / (std::f64::consts::PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS_COEFFICIENTS[0];
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}
