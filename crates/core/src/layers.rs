//! Barometric formula and layer base-pressure construction
//!
//! Each layer's base pressure is obtained by integrating the layer below it up
//! to the new base altitude. The recurrence is strictly sequential: layer `i`
//! needs the finished base pressure of layer `i - 1`.
//!
//! # References
//! - U.S. Standard Atmosphere (1976), NOAA-S/T 76-1562
//! - ICAO Standard Atmosphere (1993), Doc 7488/3

use crate::constants::{
    EXPONENT_CLIP, GAS_CONSTANT_AIR, GRAVITY, SEA_LEVEL_PRESSURE, TEMPERATURE_FLOOR,
};
use crate::table::LayerTable;
use crate::units::{Kelvin, KelvinPerMeter};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One atmospheric layer in SI units with its derived base pressure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereLayer {
    /// Geopotential base altitude (m)
    pub base_altitude: f64,
    /// Temperature lapse rate (K/m)
    pub lapse_rate: f64,
    /// Temperature at the base altitude (K)
    pub base_temperature: f64,
    /// Pressure at the base altitude (Pa)
    pub base_pressure: f64,
}

impl AtmosphereLayer {
    /// Linear temperature profile of this layer, unclamped
    #[inline]
    pub fn temperature_at(&self, altitude: f64) -> f64 {
        (altitude - self.base_altitude) * self.lapse_rate + self.base_temperature
    }

    /// Barometric pressure of this layer at `altitude`
    #[inline]
    pub fn pressure_at(&self, altitude: f64) -> f64 {
        barometric_formula(
            self.base_pressure,
            self.base_temperature,
            self.lapse_rate,
            altitude,
            self.base_altitude,
        )
    }
}

/// Barometric formula for a layer with a linear temperature profile
///
/// `T = T_b + L_b × (h - h_b)`, floored at 1 K
///
/// - `L_b ≠ 0`: `P = P_b × (T / T_b)^(-g / (R × L_b))`
/// - `L_b = 0`: `P = P_b × exp(clip(-g × (h - h_b) / (R × T_b), -500, 500))`
///
/// # Arguments
/// * `base_pressure` - Pressure at the layer base (Pa)
/// * `base_temperature` - Temperature at the layer base (K)
/// * `lapse_rate` - Temperature lapse rate (K/m)
/// * `altitude` - Evaluation altitude (m)
/// * `base_altitude` - Layer base altitude (m)
///
/// # Returns
/// Pressure (Pa). NaN altitudes yield NaN.
#[inline]
pub fn barometric_formula(
    base_pressure: f64,
    base_temperature: f64,
    lapse_rate: f64,
    altitude: f64,
    base_altitude: f64,
) -> f64 {
    let temperature = base_temperature + lapse_rate * (altitude - base_altitude);
    // Written as a comparison so NaN passes through instead of becoming the floor
    let temperature = if temperature < TEMPERATURE_FLOOR {
        TEMPERATURE_FLOOR
    } else {
        temperature
    };

    if lapse_rate == 0.0 {
        let exponent = -GRAVITY * (altitude - base_altitude) / (GAS_CONSTANT_AIR * base_temperature);
        base_pressure * exponent.clamp(-EXPONENT_CLIP, EXPONENT_CLIP).exp()
    } else {
        base_pressure
            * (temperature / base_temperature).powf(-GRAVITY / (GAS_CONSTANT_AIR * lapse_rate))
    }
}

/// Convert a validated table to SI layers and derive every base pressure
///
/// The first layer is anchored at 101325 Pa; each later layer takes the
/// pressure of the layer below evaluated at its own base altitude.
pub fn build_layers(table: &LayerTable) -> Vec<AtmosphereLayer> {
    let mut layers: Vec<AtmosphereLayer> = Vec::with_capacity(table.len());

    for row in table.rows() {
        let lapse_rate: KelvinPerMeter = row.lapse_rate.into();
        let base_temperature: Kelvin = row.base_temperature.into();

        let base_pressure = match layers.last() {
            Some(below) => below.pressure_at(row.base_altitude),
            None => SEA_LEVEL_PRESSURE,
        };

        debug!(
            "Layer {} at {} m: T_b = {}, L_b = {} K/m, P_b = {:.6e} Pa",
            layers.len(),
            row.base_altitude,
            base_temperature,
            *lapse_rate,
            base_pressure
        );

        layers.push(AtmosphereLayer {
            base_altitude: row.base_altitude,
            lapse_rate: *lapse_rate,
            base_temperature: *base_temperature,
            base_pressure,
        });
    }

    layers
}
