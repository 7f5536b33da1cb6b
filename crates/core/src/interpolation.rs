//! Monotone cubic Hermite interpolation
//!
//! Knot slopes follow Fritsch & Carlson (1980) as used by PCHIP: the weighted
//! harmonic mean of neighbouring secants, zero where the data turns. The
//! interpolant passes through every knot, has a continuous first derivative
//! everywhere, and never overshoots the data between knots.
//!
//! Outside the knot range the interpolant continues as a straight line with
//! the end slope, so value and first derivative stay continuous at the ends
//! and evaluation far from the data cannot blow up like a cubic would.
//!
//! Evaluation is generic over [`num_traits::Float`] so dual-number and other
//! automatic-differentiation scalars can flow through unchanged.
//!
//! # References
//! - Fritsch, F.N. & Carlson, R.E. (1980). "Monotone Piecewise Cubic
//!   Interpolation", SIAM J. Numer. Anal. 17(2), 238-246
//! - Moler, C. (2004). "Numerical Computing with MATLAB", §3.4 (pchip)

use crate::error::AtmosphereError;
use num_traits::{Float, NumCast};
use serde::{Deserialize, Serialize};

/// C¹ piecewise-cubic interpolant over strictly increasing knots
///
/// Serialized as its `(x, y)` knot pairs; deserializing refits the slopes
/// through [`HermiteInterpolant::new`], so invalid knot data is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct HermiteInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// dy/dx at each knot
    slopes: Vec<f64>,
}

impl HermiteInterpolant {
    /// Fit the interpolant to `(xs, ys)`
    ///
    /// # Errors
    /// Returns an error if the slices differ in length, hold fewer than two
    /// points, contain non-finite values, or `xs` is not strictly increasing.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, AtmosphereError> {
        if xs.len() != ys.len() {
            return Err(AtmosphereError::InvalidInterpolationData(format!(
                "{} abscissae but {} ordinates",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(AtmosphereError::InvalidInterpolationData(
                "need at least two points".to_string(),
            ));
        }
        if let Some(i) = xs.iter().chain(ys).position(|v| !v.is_finite()) {
            return Err(AtmosphereError::InvalidInterpolationData(format!(
                "value {i} is not finite"
            )));
        }
        if let Some(i) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(AtmosphereError::InvalidInterpolationData(format!(
                "abscissae not strictly increasing at index {}",
                i + 1
            )));
        }

        let slopes = pchip_slopes(xs, ys);
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes,
        })
    }

    /// Knot abscissae
    pub fn knots(&self) -> &[f64] {
        &self.xs
    }

    /// Knot ordinates
    pub fn values(&self) -> &[f64] {
        &self.ys
    }

    /// Knot slopes dy/dx
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    /// Interval index for `x`, clamped to the first/last interval.
    /// NaN lands in interval 0 and propagates through the arithmetic.
    #[inline]
    fn interval(&self, x: f64) -> usize {
        self.xs
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(self.xs.len() - 2)
    }

    /// Evaluate at `x`
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.eval_generic(x)
    }

    /// Evaluate with any floating scalar type
    ///
    /// Only the interval lookup reads the plain value of `x`; every
    /// arithmetic step is performed in `T`, so derivative-carrying types see
    /// the exact local polynomial.
    pub fn eval_generic<T: Float>(&self, x: T) -> T {
        let n = self.xs.len();
        let raw = x.to_f64().unwrap_or(f64::NAN);

        if raw < self.xs[0] {
            return lift::<T>(self.ys[0]) + lift::<T>(self.slopes[0]) * (x - lift(self.xs[0]));
        }
        if raw > self.xs[n - 1] {
            return lift::<T>(self.ys[n - 1])
                + lift::<T>(self.slopes[n - 1]) * (x - lift(self.xs[n - 1]));
        }

        let i = self.interval(raw);
        let width = self.xs[i + 1] - self.xs[i];
        let t = (x - lift(self.xs[i])) / lift(width);
        normalized_hermite(
            t,
            lift(self.ys[i]),
            lift(self.ys[i + 1] - self.ys[i]),
            lift(self.slopes[i] * width),
            lift(self.slopes[i + 1] * width),
        )
    }

    /// First derivative dy/dx at `x`
    pub fn derivative(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x < self.xs[0] {
            return self.slopes[0];
        }
        if x > self.xs[n - 1] {
            return self.slopes[n - 1];
        }

        let i = self.interval(x);
        let width = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / width;
        let (c1, c2, c3) = hermite_coefficients(
            self.ys[i + 1] - self.ys[i],
            self.slopes[i] * width,
            self.slopes[i + 1] * width,
        );
        (c1 + t * (2.0 * c2 + 3.0 * c3 * t)) / width
    }
}

impl TryFrom<Vec<(f64, f64)>> for HermiteInterpolant {
    type Error = AtmosphereError;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
        Self::new(&xs, &ys)
    }
}

impl From<HermiteInterpolant> for Vec<(f64, f64)> {
    fn from(interp: HermiteInterpolant) -> Self {
        interp.xs.into_iter().zip(interp.ys).collect()
    }
}

#[inline]
fn lift<T: Float>(value: f64) -> T {
    <T as NumCast>::from(value).unwrap_or_else(T::nan)
}

/// Power-basis coefficients `(c1, c2, c3)` of the cubic on `t ∈ [0, 1]` with
/// `p(1) - p(0) = dy`, `p'(0) = k0`, `p'(1) = k1`, slopes already scaled by
/// the interval width
#[inline]
fn hermite_coefficients<T: Float>(dy: T, k0: T, k1: T) -> (T, T, T) {
    // Deviations of the imposed end slopes from the secant
    let a = k0 - dy;
    let b = dy - k1;
    (dy + a, b - (a + a), a - b)
}

/// `p(t) = y0 + c1 t + c2 t² + c3 t³`
#[inline]
fn normalized_hermite<T: Float>(t: T, y0: T, dy: T, k0: T, k1: T) -> T {
    let (c1, c2, c3) = hermite_coefficients(dy, k0, k1);
    y0 + t * (c1 + t * (c2 + t * c3))
}

/// Fritsch-Carlson knot slopes with the three-point end condition
fn pchip_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let widths: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let secants: Vec<f64> = ys
        .windows(2)
        .zip(&widths)
        .map(|(w, h)| (w[1] - w[0]) / h)
        .collect();

    if n == 2 {
        return vec![secants[0]; 2];
    }

    let mut slopes = vec![0.0; n];
    for k in 1..n - 1 {
        let (d0, d1) = (secants[k - 1], secants[k]);
        if d0 * d1 <= 0.0 {
            continue;
        }
        let (h0, h1) = (widths[k - 1], widths[k]);
        let w0 = 2.0 * h1 + h0;
        let w1 = h1 + 2.0 * h0;
        slopes[k] = (w0 + w1) / (w0 / d0 + w1 / d1);
    }

    slopes[0] = end_slope(widths[0], widths[1], secants[0], secants[1]);
    slopes[n - 1] = end_slope(widths[n - 2], widths[n - 3], secants[n - 2], secants[n - 3]);
    slopes
}

/// One-sided three-point slope at an end knot, limited to keep monotonicity
fn end_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let slope = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if slope.signum() != d0.signum() || d0 == 0.0 {
        0.0
    } else if d0.signum() != d1.signum() && slope.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        slope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_knots() {
        let xs = [0.0, 1.0, 3.0, 4.0, 7.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys) {
            assert_relative_eq!(interp.eval(*x), y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reproduces_linear_data_exactly() {
        let xs = [-5e9, -1e6, -5e3, 0.0, 5e3, 10e3];
        let ys: Vec<f64> = xs.iter().map(|x| 288.15 - 0.0065 * x).collect();
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        for x in [-1e10, -3e9, -2e3, 1234.5, 9e3, 1e5] {
            assert_relative_eq!(interp.eval(x), 288.15 - 0.0065 * x, max_relative = 1e-10);
            assert_relative_eq!(interp.derivative(x), -0.0065, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_no_overshoot_on_step_like_data() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 0.0, 1.0, 1.0, 1.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        let mut x = 0.0;
        while x <= 4.0 {
            let y = interp.eval(x);
            assert!((-1e-12..=1.0 + 1e-12).contains(&y), "overshoot {y} at {x}");
            x += 0.01;
        }
        // Flat neighbours force zero slope at the turn
        assert_eq!(interp.slopes()[1], 0.0);
        assert_eq!(interp.slopes()[3], 0.0);
    }

    #[test]
    fn test_derivative_continuous_at_knots() {
        let xs = [0.0, 1.0, 3.0, 4.0, 7.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        let eps = 1e-7;
        for &x in &xs {
            let left = interp.derivative(x - eps);
            let right = interp.derivative(x + eps);
            assert!((left - right).abs() < 1e-5, "slope jump at {x}: {left} vs {right}");
        }
    }

    #[test]
    fn test_analytic_derivative_matches_finite_difference() {
        let xs = [0.0, 1.0, 3.0, 4.0, 7.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        let eps = 1e-6;
        for x in [0.3, 1.7, 2.5, 3.9, 5.5, -2.0, 9.0] {
            let fd = (interp.eval(x + eps) - interp.eval(x - eps)) / (2.0 * eps);
            assert_relative_eq!(interp.derivative(x), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_linear_extrapolation_uses_end_slopes() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 4.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        let s0 = interp.slopes()[0];
        let s2 = interp.slopes()[2];
        assert_relative_eq!(interp.eval(-10.0), -10.0 * s0, epsilon = 1e-12);
        assert_relative_eq!(interp.eval(12.0), 4.0 + 10.0 * s2, epsilon = 1e-12);
    }

    #[test]
    fn test_two_points_is_a_line() {
        let interp = HermiteInterpolant::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_relative_eq!(interp.eval(1.0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(interp.eval(4.0), 9.0, epsilon = 1e-12);
        assert_relative_eq!(interp.derivative(0.5), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_generic_evaluation_matches_f64() {
        let xs = [0.0, 1.0, 3.0, 4.0, 7.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        for x in [0.5_f32, 2.0, 6.5] {
            let single = interp.eval_generic(x);
            assert_relative_eq!(<f64 as From<f32>>::from(single), interp.eval(<f64 as From<f32>>::from(x)), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_nan_propagates() {
        let interp = HermiteInterpolant::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!(interp.eval(f64::NAN).is_nan());
        assert!(interp.derivative(f64::NAN).is_nan());
    }

    #[test]
    fn test_derivative_at_interval_ends_matches_knot_slopes() {
        let xs = [0.0, 1.0, 3.0, 4.0, 7.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let interp = HermiteInterpolant::new(&xs, &ys).unwrap();
        for (x, slope) in xs.iter().zip(interp.slopes()) {
            assert_relative_eq!(interp.derivative(*x), *slope, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_deserialize_refits_slopes() {
        let interp = HermiteInterpolant::new(&[0.0, 1.0, 3.0], &[2.0, 3.0, 5.0]).unwrap();
        let json = serde_json::to_string(&interp).unwrap();
        assert_eq!(json, "[[0.0,2.0],[1.0,3.0],[3.0,5.0]]");
        let restored: HermiteInterpolant = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, interp);
    }

    #[test]
    fn test_deserialize_rejects_invalid_knots() {
        for json in [
            "[[0.0,1.0]]",
            "[]",
            "[[1.0,1.0],[0.0,2.0]]",
            "[[0.0,1.0],[0.0,2.0]]",
        ] {
            let err = serde_json::from_str::<HermiteInterpolant>(json).unwrap_err();
            assert!(
                err.to_string().contains("Invalid interpolation data"),
                "{json}: {err}"
            );
        }
        // The pre-fitted layout with caller-supplied slopes is not accepted
        let raw = r#"{"xs":[0.0],"ys":[1.0],"slopes":[0.0]}"#;
        assert!(serde_json::from_str::<HermiteInterpolant>(raw).is_err());
    }

    #[test]
    fn test_rejects_invalid_data() {
        assert!(HermiteInterpolant::new(&[0.0], &[1.0]).is_err());
        assert!(HermiteInterpolant::new(&[0.0, 1.0], &[1.0]).is_err());
        assert!(HermiteInterpolant::new(&[0.0, 0.0], &[1.0, 2.0]).is_err());
        assert!(HermiteInterpolant::new(&[1.0, 0.0], &[1.0, 2.0]).is_err());
        assert!(HermiteInterpolant::new(&[0.0, 1.0], &[1.0, f64::NAN]).is_err());
    }
}
