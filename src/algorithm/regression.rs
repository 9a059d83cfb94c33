//! Quadratic least-squares fit
//!
//! Fits `m = a·t² + b·t + c` over (temperature, mortality) pairs. The normal
//! equations are built on centred temperatures to keep the system well
//! conditioned, solved by Gaussian elimination with partial pivoting, and the
//! coefficients are shifted back to raw temperatures.

use rustc_hash::FxHashSet;
use thiserror::Error;

/// Distinct integer temperatures needed to determine three coefficients
pub const MIN_BUCKETS: usize = 3;

/// Pivots smaller than this (relative to the matrix scale) are treated as zero
const PIVOT_EPSILON: f64 = 1e-12;

/// Why a curve could not be fitted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {MIN_BUCKETS} distinct temperature buckets, got {0}")]
    NotEnoughBuckets(usize),
    #[error("normal equations are singular")]
    Singular,
    #[error("non-finite value in fit {0}")]
    NonFinite(&'static str),
}

/// Result of a quadratic fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Coefficient of determination over the fitted pairs
    pub r_squared: f64,
    pub observations: usize,
    /// Distinct integer-rounded temperatures among the pairs
    pub buckets: usize,
}

impl QuadraticFit {
    /// Evaluate the curve at a temperature
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        (self.a * t + self.b) * t + self.c
    }
}

/// Fit a quadratic to `(temperature, mortality)` pairs
pub fn fit_quadratic(pairs: &[(f64, f64)]) -> Result<QuadraticFit, FitError> {
    if pairs.iter().any(|(t, m)| !t.is_finite() || !m.is_finite()) {
        return Err(FitError::NonFinite("input"));
    }
    let buckets = pairs
        .iter()
        .map(|(t, _)| t.round() as i64)
        .collect::<FxHashSet<_>>()
        .len();
    if buckets < MIN_BUCKETS {
        return Err(FitError::NotEnoughBuckets(buckets));
    }

    let n = pairs.len() as f64;
    let mean_t = pairs.iter().map(|(t, _)| t).sum::<f64>() / n;

    // Sums of powers of the centred temperature, and their products with m
    let mut s = [0.0_f64; 5];
    let mut sy = [0.0_f64; 3];
    for (t, m) in pairs {
        let x = t - mean_t;
        let mut p = 1.0;
        for (k, sk) in s.iter_mut().enumerate() {
            *sk += p;
            if k < 3 {
                sy[k] += p * m;
            }
            p *= x;
        }
    }

    // Unknowns ordered (c, b, a) for the centred polynomial
    let matrix = [
        [s[0], s[1], s[2]],
        [s[1], s[2], s[3]],
        [s[2], s[3], s[4]],
    ];
    let [c0, b0, a0] = solve3(matrix, sy)?;

    let a = a0;
    let b = b0 - 2.0 * a0 * mean_t;
    let c = a0 * mean_t * mean_t - b0 * mean_t + c0;
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return Err(FitError::NonFinite("coefficients"));
    }

    let mut fit = QuadraticFit {
        a,
        b,
        c,
        r_squared: 0.0,
        observations: pairs.len(),
        buckets,
    };
    fit.r_squared = r_squared(pairs, &fit);
    Ok(fit)
}

fn r_squared(pairs: &[(f64, f64)], fit: &QuadraticFit) -> f64 {
    let mean_m = pairs.iter().map(|(_, m)| m).sum::<f64>() / pairs.len() as f64;
    let (ss_res, ss_tot) = pairs.iter().fold((0.0, 0.0), |(res, tot), (t, m)| {
        let residual = m - fit.evaluate(*t);
        (res + residual * residual, tot + (m - mean_m) * (m - mean_m))
    });
    if ss_tot == 0.0 {
        return 1.0;
    }
    1.0 - ss_res / ss_tot
}

/// Solve a 3x3 linear system with partial pivoting
fn solve3(mut m: [[f64; 3]; 3], mut rhs: [f64; 3]) -> Result<[f64; 3], FitError> {
    let scale = m
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(f64::MIN_POSITIVE);

    for col in 0..3 {
        let pivot = (col..3)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() <= PIVOT_EPSILON * scale {
            return Err(FitError::Singular);
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..3 {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| m[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / m[row][row];
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("solution"));
    }
    Ok(x)
}
