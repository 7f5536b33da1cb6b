//! Piecewise ISA evaluator
//!
//! Selects the governing layer for an altitude and applies the closed-form
//! temperature and pressure of that layer. Altitudes at or below the lowest
//! base use the first layer; altitudes above the highest base use the last
//! layer. Neither case is an error.
//!
//! Values are continuous across layer boundaries; first derivatives are not.

use crate::constants::{GAS_CONSTANT_AIR, HEAT_CAPACITY_RATIO};
use crate::error::AtmosphereError;
use crate::layers::{build_layers, AtmosphereLayer};
use crate::table::LayerTable;
use serde::{Deserialize, Serialize};

/// Completed, immutable layer table with its piecewise evaluator
///
/// Serialized as the source [`LayerTable`]; deserializing validates the rows
/// and reruns the base-pressure recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayerTable", into = "LayerTable")]
pub struct IsaModel {
    table: LayerTable,
    layers: Vec<AtmosphereLayer>,
    /// Base altitudes duplicated contiguously for the binary search
    base_altitudes: Vec<f64>,
}

impl IsaModel {
    /// Build the model from a validated table
    pub fn new(table: &LayerTable) -> Self {
        let layers = build_layers(table);
        let base_altitudes = layers.iter().map(|layer| layer.base_altitude).collect();
        Self {
            table: table.clone(),
            layers,
            base_altitudes,
        }
    }

    /// Model built from the embedded standard table
    ///
    /// # Errors
    /// Only fails if the embedded resource is malformed.
    pub fn standard() -> Result<Self, AtmosphereError> {
        Ok(Self::new(&LayerTable::standard()?))
    }

    /// Layers in ascending altitude order
    pub fn layers(&self) -> &[AtmosphereLayer] {
        &self.layers
    }

    /// Validated table the model was built from
    pub fn table(&self) -> &LayerTable {
        &self.table
    }

    /// Layer base altitudes in ascending order (m)
    pub fn base_altitudes(&self) -> &[f64] {
        &self.base_altitudes
    }

    /// Base altitude of the highest layer (m)
    pub fn top_altitude(&self) -> f64 {
        self.base_altitudes[self.base_altitudes.len() - 1]
    }

    /// Index of the layer governing `altitude`
    ///
    /// Largest `i` with `base_altitude[i] < altitude`, or 0 when the altitude
    /// is at or below the first base. An altitude exactly on a boundary
    /// therefore belongs to the layer below it. NaN selects layer 0.
    #[inline]
    pub fn layer_index(&self, altitude: f64) -> usize {
        self.base_altitudes
            .partition_point(|&base| base < altitude)
            .saturating_sub(1)
    }

    /// Layer governing `altitude`
    #[inline]
    pub fn layer_at(&self, altitude: f64) -> &AtmosphereLayer {
        &self.layers[self.layer_index(altitude)]
    }

    /// ISA temperature (K) at a geopotential altitude (m)
    #[inline]
    pub fn temperature(&self, altitude: f64) -> f64 {
        self.layer_at(altitude).temperature_at(altitude)
    }

    /// ISA pressure (Pa) at a geopotential altitude (m)
    #[inline]
    pub fn pressure(&self, altitude: f64) -> f64 {
        self.layer_at(altitude).pressure_at(altitude)
    }

    /// Air density (kg/m³) from the ideal gas law
    #[inline]
    pub fn density(&self, altitude: f64) -> f64 {
        let layer = self.layer_at(altitude);
        layer.pressure_at(altitude) / (GAS_CONSTANT_AIR * layer.temperature_at(altitude))
    }

    /// Speed of sound (m/s)
    #[inline]
    pub fn speed_of_sound(&self, altitude: f64) -> f64 {
        (HEAT_CAPACITY_RATIO * GAS_CONSTANT_AIR * self.temperature(altitude)).sqrt()
    }
}

impl From<LayerTable> for IsaModel {
    fn from(table: LayerTable) -> Self {
        Self::new(&table)
    }
}

impl From<IsaModel> for LayerTable {
    fn from(model: IsaModel) -> Self {
        model.table
    }
}
