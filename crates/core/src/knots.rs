//! Knot altitudes for the differentiable surrogate
//!
//! The knot set combines hand-picked breakpoints around the ISA layers, the
//! layer bases themselves and two geometric extensions. The surrogate then
//! matches the piecewise model at every slope change and stays anchored to it
//! arbitrarily far above and below the physically defined region, with knot
//! density falling off with distance.

use crate::config::{GeometricExtension, KnotConfig};
use crate::error::AtmosphereError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sorted, duplicate-free knot altitudes (m)
///
/// Serialized as the plain altitude list; deserialized lists must be finite
/// and strictly increasing with at least two knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct KnotSet {
    altitudes: Vec<f64>,
}

impl KnotSet {
    /// Generate knots from the configuration and the layer base altitudes
    ///
    /// Every layer base becomes a knot, so the surrogate reproduces the
    /// piecewise model exactly where its slope changes. The upper extension
    /// is offset from the highest base, the lower extension from 0 m.
    ///
    /// # Errors
    /// Returns an error if there are no layer bases, a breakpoint or base is
    /// not finite, or an extension cannot be sampled geometrically.
    pub fn generate(config: &KnotConfig, layer_bases: &[f64]) -> Result<Self, AtmosphereError> {
        let Some(&top_altitude) = layer_bases.last() else {
            return Err(AtmosphereError::InvalidKnotConfig(
                "no layer bases to anchor the knots".to_string(),
            ));
        };
        if let Some(bad) = layer_bases.iter().find(|h| !h.is_finite()) {
            return Err(AtmosphereError::InvalidKnotConfig(format!(
                "layer base {bad} is not finite"
            )));
        }
        if let Some(bad) = config.breakpoints.iter().find(|h| !h.is_finite()) {
            return Err(AtmosphereError::InvalidKnotConfig(format!(
                "breakpoint {bad} is not finite"
            )));
        }

        let upper = geomspace(&config.upper_extension)?;
        let lower = geomspace(&config.lower_extension)?;

        let mut altitudes: Vec<f64> = config
            .breakpoints
            .iter()
            .chain(layer_bases)
            .copied()
            .chain(upper.iter().map(|offset| top_altitude + offset))
            .chain(lower.iter().map(|offset| -offset))
            .collect();

        altitudes.sort_by(f64::total_cmp);
        altitudes.dedup();

        let knots = Self::from_altitudes(altitudes)?;
        debug!(
            "Generated {} knots spanning {:.3e} m to {:.3e} m",
            knots.len(),
            knots.lowest(),
            knots.highest()
        );
        Ok(knots)
    }

    /// Wrap an explicit knot list
    ///
    /// # Errors
    /// Returns an error unless there are at least two knots, all finite and
    /// strictly increasing.
    pub fn from_altitudes(altitudes: Vec<f64>) -> Result<Self, AtmosphereError> {
        if altitudes.len() < 2 {
            return Err(AtmosphereError::InvalidKnotConfig(
                "fewer than two distinct knots".to_string(),
            ));
        }
        if let Some(bad) = altitudes.iter().find(|h| !h.is_finite()) {
            return Err(AtmosphereError::InvalidKnotConfig(format!(
                "knot {bad} is not finite"
            )));
        }
        if let Some(i) = altitudes.windows(2).position(|w| w[1] <= w[0]) {
            return Err(AtmosphereError::InvalidKnotConfig(format!(
                "knots not strictly increasing at index {}",
                i + 1
            )));
        }
        Ok(Self { altitudes })
    }

    /// Knot altitudes in ascending order
    pub fn altitudes(&self) -> &[f64] {
        &self.altitudes
    }

    /// Number of knots
    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    /// Always false for a generated set
    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }

    /// Lowest knot (m)
    pub fn lowest(&self) -> f64 {
        self.altitudes[0]
    }

    /// Highest knot (m)
    pub fn highest(&self) -> f64 {
        self.altitudes[self.altitudes.len() - 1]
    }
}

impl TryFrom<Vec<f64>> for KnotSet {
    type Error = AtmosphereError;

    fn try_from(altitudes: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_altitudes(altitudes)
    }
}

impl From<KnotSet> for Vec<f64> {
    fn from(knots: KnotSet) -> Self {
        knots.altitudes
    }
}

/// `count` points spaced evenly in log-space from `first_offset` to
/// `last_offset`, both endpoints included
///
/// # Errors
/// Returns an error unless `0 < first_offset`, both offsets are finite, and
/// `count >= 1`. A single point requires equal offsets.
pub fn geomspace(extension: &GeometricExtension) -> Result<Vec<f64>, AtmosphereError> {
    let GeometricExtension {
        first_offset,
        last_offset,
        count,
    } = *extension;

    if !(first_offset.is_finite() && last_offset.is_finite()) {
        return Err(AtmosphereError::InvalidKnotConfig(format!(
            "extension offsets {first_offset} and {last_offset} must be finite"
        )));
    }
    if first_offset <= 0.0 || last_offset <= 0.0 {
        return Err(AtmosphereError::InvalidKnotConfig(format!(
            "extension offsets {first_offset} and {last_offset} must be positive"
        )));
    }
    match count {
        0 => Err(AtmosphereError::InvalidKnotConfig(
            "extension needs at least one point".to_string(),
        )),
        1 if first_offset != last_offset => Err(AtmosphereError::InvalidKnotConfig(format!(
            "a single-point extension cannot span {first_offset} to {last_offset}"
        ))),
        1 => Ok(vec![first_offset]),
        _ => {
            let log_first = first_offset.ln();
            let step = (last_offset.ln() - log_first) / (count - 1) as f64;
            let mut points: Vec<f64> = (0..count)
                .map(|i| (log_first + step * i as f64).exp())
                .collect();
            // Pin the endpoints so they do not pick up exp/ln rounding
            points[0] = first_offset;
            points[count - 1] = last_offset;
            Ok(points)
        }
    }
}
