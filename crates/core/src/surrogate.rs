//! Differentiable surrogate of the piecewise ISA model
//!
//! The piecewise model is sampled at every knot and two C¹ interpolants are
//! fitted: altitude → temperature and altitude → ln(pressure). Pressure is
//! interpolated in log-space because it spans hundreds of orders of magnitude
//! over the knot range; exponentiating the interpolant bounds the relative
//! error and keeps pressure strictly positive wherever `exp` does not
//! underflow.

use crate::constants::{GAS_CONSTANT_AIR, HEAT_CAPACITY_RATIO};
use crate::error::AtmosphereError;
use crate::interpolation::HermiteInterpolant;
use crate::knots::KnotSet;
use crate::piecewise::IsaModel;
use num_traits::{Float, NumCast};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smooth temperature and log-pressure interpolants over a knot set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentiableAtmosphere {
    temperature: HermiteInterpolant,
    log_pressure: HermiteInterpolant,
}

impl DifferentiableAtmosphere {
    /// Sample `isa` at every knot and fit both interpolants
    ///
    /// # Errors
    /// Returns an error if a sample is not finite (for instance a pressure
    /// that overflowed at an extreme knot) or the knots are unusable.
    pub fn fit(isa: &IsaModel, knots: &KnotSet) -> Result<Self, AtmosphereError> {
        let altitudes = knots.altitudes();
        let temperatures: Vec<f64> = altitudes.iter().map(|&h| isa.temperature(h)).collect();
        let log_pressures: Vec<f64> = altitudes.iter().map(|&h| isa.pressure(h).ln()).collect();

        let temperature = HermiteInterpolant::new(altitudes, &temperatures)?;
        let log_pressure = HermiteInterpolant::new(altitudes, &log_pressures)?;

        debug!(
            "Fitted surrogate on {} knots: T in [{:.2}, {:.2}] K, ln P in [{:.2}, {:.2}]",
            altitudes.len(),
            min(&temperatures),
            max(&temperatures),
            min(&log_pressures),
            max(&log_pressures)
        );

        Ok(Self {
            temperature,
            log_pressure,
        })
    }

    /// Temperature interpolant
    pub fn temperature_interpolant(&self) -> &HermiteInterpolant {
        &self.temperature
    }

    /// Log-pressure interpolant
    pub fn log_pressure_interpolant(&self) -> &HermiteInterpolant {
        &self.log_pressure
    }

    /// Smooth temperature (K)
    #[inline]
    pub fn temperature(&self, altitude: f64) -> f64 {
        self.temperature.eval(altitude)
    }

    /// Smooth pressure (Pa)
    #[inline]
    pub fn pressure(&self, altitude: f64) -> f64 {
        self.log_pressure.eval(altitude).exp()
    }

    /// Smooth ln(pressure / 1 Pa)
    #[inline]
    pub fn log_pressure(&self, altitude: f64) -> f64 {
        self.log_pressure.eval(altitude)
    }

    /// Smooth density (kg/m³)
    #[inline]
    pub fn density(&self, altitude: f64) -> f64 {
        self.density_generic(altitude)
    }

    /// Smooth speed of sound (m/s)
    #[inline]
    pub fn speed_of_sound(&self, altitude: f64) -> f64 {
        self.speed_of_sound_generic(altitude)
    }

    /// `dT/dh` (K/m)
    #[inline]
    pub fn temperature_gradient(&self, altitude: f64) -> f64 {
        self.temperature.derivative(altitude)
    }

    /// `dP/dh` (Pa/m), from `P × d(ln P)/dh`
    #[inline]
    pub fn pressure_gradient(&self, altitude: f64) -> f64 {
        self.pressure(altitude) * self.log_pressure.derivative(altitude)
    }

    /// Temperature for any floating scalar type (autodiff-friendly)
    pub fn temperature_generic<T: Float>(&self, altitude: T) -> T {
        self.temperature.eval_generic(altitude)
    }

    /// Pressure for any floating scalar type (autodiff-friendly)
    pub fn pressure_generic<T: Float>(&self, altitude: T) -> T {
        self.log_pressure.eval_generic(altitude).exp()
    }

    /// Density for any floating scalar type (autodiff-friendly)
    pub fn density_generic<T: Float>(&self, altitude: T) -> T {
        self.pressure_generic(altitude) / (gas_constant::<T>() * self.temperature_generic(altitude))
    }

    /// Speed of sound for any floating scalar type (autodiff-friendly)
    pub fn speed_of_sound_generic<T: Float>(&self, altitude: T) -> T {
        let gamma_r = <T as NumCast>::from(HEAT_CAPACITY_RATIO).unwrap_or_else(T::nan)
            * gas_constant::<T>();
        (gamma_r * self.temperature_generic(altitude)).sqrt()
    }
}

#[inline]
fn gas_constant<T: Float>() -> T {
    <T as NumCast>::from(GAS_CONSTANT_AIR).unwrap_or_else(T::nan)
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
