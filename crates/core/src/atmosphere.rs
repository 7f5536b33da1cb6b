//! Immutable atmosphere context
//!
//! An [`Atmosphere`] owns the completed layer table, the knot set and both
//! surrogate interpolants. It is built once, never mutated, and is `Send +
//! Sync`, so one instance can serve any number of threads without locking.
//!
//! # Usage
//! ```
//! use isa_atmo_core::Atmosphere;
//!
//! let atmo = Atmosphere::standard().unwrap();
//! assert!((atmo.temperature_isa(0.0) - 288.15).abs() < 1e-9);
//! assert!((atmo.pressure_isa(0.0) - 101_325.0).abs() < 1e-6);
//!
//! let smooth = atmo.pressure_differentiable_batch(&[0.0, 11_000.0, 2e9]);
//! assert!(smooth.iter().all(|p| p.is_finite()));
//! ```

use crate::config::{AtmosphereConfig, KnotConfig};
use crate::error::AtmosphereError;
use crate::knots::KnotSet;
use crate::layers::AtmosphereLayer;
use crate::piecewise::IsaModel;
use crate::surrogate::DifferentiableAtmosphere;
use crate::table::LayerTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::info;

/// Which evaluator answers a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// Layer-by-layer closed form; derivative jumps at layer boundaries
    Piecewise,
    /// Knot-based C¹ surrogate
    Differentiable,
}

/// Which atmospheric property a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    /// Pressure (Pa)
    Pressure,
    /// Temperature (K)
    Temperature,
    /// Density (kg/m³)
    Density,
    /// Speed of sound (m/s)
    SpeedOfSound,
}

/// Layer table, knots and surrogate built from one configuration
///
/// Serializable for snapshots but not deserializable: the surrogate must be
/// fitted to this exact table and knot set, so an atmosphere is only ever
/// rebuilt through [`Atmosphere::from_config`] or [`Atmosphere::from_table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atmosphere {
    isa: IsaModel,
    knots: KnotSet,
    surrogate: DifferentiableAtmosphere,
}

static SHARED: OnceLock<Result<Atmosphere, AtmosphereError>> = OnceLock::new();

impl Atmosphere {
    /// Build from the embedded ISA table and the standard knot layout
    ///
    /// # Errors
    /// Only fails if the embedded resources are malformed.
    pub fn standard() -> Result<Self, AtmosphereError> {
        Self::from_config(&AtmosphereConfig::default())
    }

    /// Process-wide standard atmosphere, built on first use
    ///
    /// # Errors
    /// Returns the construction error (on every call) if the standard
    /// atmosphere could not be built.
    pub fn shared() -> Result<&'static Atmosphere, AtmosphereError> {
        SHARED.get_or_init(Self::standard).as_ref().map_err(Clone::clone)
    }

    /// Build from a full configuration
    ///
    /// # Errors
    /// Returns error if the layer table cannot be loaded or the knot
    /// settings are invalid.
    pub fn from_config(config: &AtmosphereConfig) -> Result<Self, AtmosphereError> {
        let table = config.layers.load()?;
        Self::from_table(&table, &config.knots)
    }

    /// Build from an already validated table
    ///
    /// # Errors
    /// Returns error if the knot settings are invalid or the piecewise model
    /// produces a non-finite sample at a knot.
    pub fn from_table(table: &LayerTable, knots: &KnotConfig) -> Result<Self, AtmosphereError> {
        let isa = IsaModel::new(table);
        let knots = KnotSet::generate(knots, isa.base_altitudes())?;
        let surrogate = DifferentiableAtmosphere::fit(&isa, &knots)?;

        info!(
            "Atmosphere ready: {} layers, {} knots from {:.3e} m to {:.3e} m",
            isa.layers().len(),
            knots.len(),
            knots.lowest(),
            knots.highest()
        );

        Ok(Self {
            isa,
            knots,
            surrogate,
        })
    }

    /// Completed layers in ascending altitude order
    pub fn layers(&self) -> &[AtmosphereLayer] {
        self.isa.layers()
    }

    /// Knot set the surrogate was fitted on
    pub fn knots(&self) -> &KnotSet {
        &self.knots
    }

    /// Piecewise evaluator
    pub fn isa(&self) -> &IsaModel {
        &self.isa
    }

    /// Differentiable surrogate
    pub fn surrogate(&self) -> &DifferentiableAtmosphere {
        &self.surrogate
    }

    // ========================================================================
    // SCALAR QUERIES
    // ========================================================================

    /// ISA pressure (Pa)
    #[inline]
    pub fn pressure_isa(&self, altitude: f64) -> f64 {
        self.isa.pressure(altitude)
    }

    /// ISA temperature (K)
    #[inline]
    pub fn temperature_isa(&self, altitude: f64) -> f64 {
        self.isa.temperature(altitude)
    }

    /// Smooth pressure (Pa)
    #[inline]
    pub fn pressure_differentiable(&self, altitude: f64) -> f64 {
        self.surrogate.pressure(altitude)
    }

    /// Smooth temperature (K)
    #[inline]
    pub fn temperature_differentiable(&self, altitude: f64) -> f64 {
        self.surrogate.temperature(altitude)
    }

    /// `dT/dh` of the smooth model (K/m), defined at every altitude
    #[inline]
    pub fn temperature_gradient(&self, altitude: f64) -> f64 {
        self.surrogate.temperature_gradient(altitude)
    }

    /// `dP/dh` of the smooth model (Pa/m), defined at every altitude
    #[inline]
    pub fn pressure_gradient(&self, altitude: f64) -> f64 {
        self.surrogate.pressure_gradient(altitude)
    }

    /// Evaluate any quantity with either model
    pub fn evaluate(&self, model: Model, quantity: Quantity, altitude: f64) -> f64 {
        match (model, quantity) {
            (Model::Piecewise, Quantity::Pressure) => self.isa.pressure(altitude),
            (Model::Piecewise, Quantity::Temperature) => self.isa.temperature(altitude),
            (Model::Piecewise, Quantity::Density) => self.isa.density(altitude),
            (Model::Piecewise, Quantity::SpeedOfSound) => self.isa.speed_of_sound(altitude),
            (Model::Differentiable, Quantity::Pressure) => self.surrogate.pressure(altitude),
            (Model::Differentiable, Quantity::Temperature) => self.surrogate.temperature(altitude),
            (Model::Differentiable, Quantity::Density) => self.surrogate.density(altitude),
            (Model::Differentiable, Quantity::SpeedOfSound) => {
                self.surrogate.speed_of_sound(altitude)
            }
        }
    }

    // ========================================================================
    // BATCH QUERIES
    // ========================================================================
    // Elements are independent, so batches are split across the rayon pool.
    // Output order always matches input order.

    /// Evaluate any quantity with either model over a batch of altitudes
    pub fn evaluate_batch(&self, model: Model, quantity: Quantity, altitudes: &[f64]) -> Vec<f64> {
        altitudes
            .par_iter()
            .map(|&h| self.evaluate(model, quantity, h))
            .collect()
    }

    /// Batch evaluation into a caller-owned buffer of the same length
    ///
    /// # Panics
    /// Panics if `out.len() != altitudes.len()`.
    pub fn evaluate_into(&self, model: Model, quantity: Quantity, altitudes: &[f64], out: &mut [f64]) {
        assert_eq!(
            altitudes.len(),
            out.len(),
            "output buffer length must match altitude count"
        );
        out.par_iter_mut()
            .zip(altitudes.par_iter())
            .for_each(|(slot, &h)| *slot = self.evaluate(model, quantity, h));
    }

    /// ISA pressure (Pa) for each altitude
    pub fn pressure_isa_batch(&self, altitudes: &[f64]) -> Vec<f64> {
        self.evaluate_batch(Model::Piecewise, Quantity::Pressure, altitudes)
    }

    /// ISA temperature (K) for each altitude
    pub fn temperature_isa_batch(&self, altitudes: &[f64]) -> Vec<f64> {
        self.evaluate_batch(Model::Piecewise, Quantity::Temperature, altitudes)
    }

    /// Smooth pressure (Pa) for each altitude
    pub fn pressure_differentiable_batch(&self, altitudes: &[f64]) -> Vec<f64> {
        self.evaluate_batch(Model::Differentiable, Quantity::Pressure, altitudes)
    }

    /// Smooth temperature (K) for each altitude
    pub fn temperature_differentiable_batch(&self, altitudes: &[f64]) -> Vec<f64> {
        self.evaluate_batch(Model::Differentiable, Quantity::Temperature, altitudes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerSource;
    use approx::assert_relative_eq;

    #[test]
    fn test_context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Atmosphere>();
    }

    #[test]
    fn test_shared_instance_is_reused() {
        let a = Atmosphere::shared().unwrap();
        let b = Atmosphere::shared().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.layers().len(), 8);
    }

    #[test]
    fn test_batch_matches_scalar_in_order() {
        let atmo = Atmosphere::standard().unwrap();
        let altitudes: Vec<f64> = (0..500).map(|i| -20_000.0 + 400.0 * f64::from(i)).collect();
        let batch = atmo.pressure_isa_batch(&altitudes);
        for (h, p) in altitudes.iter().zip(&batch) {
            assert_eq!(*p, atmo.pressure_isa(*h));
        }
        let smooth = atmo.temperature_differentiable_batch(&altitudes);
        for (h, t) in altitudes.iter().zip(&smooth) {
            assert_eq!(*t, atmo.temperature_differentiable(*h));
        }
    }

    #[test]
    fn test_evaluate_into_fills_buffer() {
        let atmo = Atmosphere::standard().unwrap();
        let altitudes = [0.0, 11_000.0, 50_000.0];
        let mut out = [0.0; 3];
        atmo.evaluate_into(Model::Piecewise, Quantity::Temperature, &altitudes, &mut out);
        assert_eq!(out.to_vec(), atmo.temperature_isa_batch(&altitudes));
    }

    #[test]
    #[should_panic(expected = "output buffer length")]
    fn test_evaluate_into_rejects_mismatched_buffer() {
        let atmo = Atmosphere::standard().unwrap();
        let mut out = [0.0; 2];
        atmo.evaluate_into(Model::Piecewise, Quantity::Pressure, &[0.0], &mut out);
    }

    #[test]
    fn test_evaluate_dispatch() {
        let atmo = Atmosphere::standard().unwrap();
        let h = 5_000.0;
        assert_eq!(atmo.evaluate(Model::Piecewise, Quantity::Pressure, h), atmo.pressure_isa(h));
        assert_eq!(
            atmo.evaluate(Model::Differentiable, Quantity::Temperature, h),
            atmo.temperature_differentiable(h)
        );
        assert_relative_eq!(
            atmo.evaluate(Model::Piecewise, Quantity::Density, 0.0),
            1.225,
            max_relative = 1e-3
        );
        assert_relative_eq!(
            atmo.evaluate(Model::Differentiable, Quantity::SpeedOfSound, 0.0),
            340.29,
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_gradients_defined_at_layer_boundaries() {
        let atmo = Atmosphere::standard().unwrap();
        for layer in atmo.layers() {
            let h = layer.base_altitude;
            let dt = atmo.temperature_gradient(h);
            let dp = atmo.pressure_gradient(h);
            assert!(dt.is_finite() && dt.abs() < 0.02, "dT/dh = {dt} at {h} m");
            assert!(dp.is_finite() && dp <= 0.0, "dP/dh = {dp} at {h} m");
        }
    }

    #[test]
    fn test_independent_configurations_coexist() {
        let isothermal = AtmosphereConfig {
            layers: LayerSource::Csv(
                "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n0,0,0\n".into(),
            ),
            knots: KnotConfig::default(),
        };
        let flat = Atmosphere::from_config(&isothermal).unwrap();
        let standard = Atmosphere::standard().unwrap();

        assert_eq!(flat.layers().len(), 1);
        assert_relative_eq!(flat.temperature_isa(30_000.0), 273.15, epsilon = 1e-9);
        assert_relative_eq!(flat.temperature_differentiable(30_000.0), 273.15, epsilon = 1e-9);
        assert!(standard.temperature_isa(30_000.0) < 273.15);
    }

    #[test]
    fn test_table_from_json_builds_same_atmosphere() {
        let standard = Atmosphere::standard().unwrap();
        let json = serde_json::to_string(standard.isa().table()).unwrap();
        let table: LayerTable = serde_json::from_str(&json).unwrap();
        let rebuilt = Atmosphere::from_table(&table, &KnotConfig::default()).unwrap();
        assert_eq!(rebuilt.knots(), standard.knots());
        for h in [-3_000.0, 11_000.0, 60_000.0, 90_000.0] {
            assert_relative_eq!(
                rebuilt.pressure_isa(h),
                standard.pressure_isa(h),
                max_relative = 1e-12
            );
            assert_relative_eq!(
                rebuilt.temperature_differentiable(h),
                standard.temperature_differentiable(h),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_bad_knot_config_fails_construction() {
        let mut config = AtmosphereConfig::default();
        config.knots.upper_extension.count = 0;
        assert!(matches!(
            Atmosphere::from_config(&config),
            Err(AtmosphereError::InvalidKnotConfig(_))
        ));
    }
}
