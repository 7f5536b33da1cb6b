//! Atmosphere construction settings
//!
//! `AtmosphereConfig::default()` reproduces the standard model: the embedded
//! ISA table and the standard knot layout. Configurations round-trip through
//! JSON so alternative tables or knot layouts can be kept next to a caller's
//! own settings.

use crate::error::AtmosphereError;
use crate::table::LayerTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Breakpoints that straddle every ISA layer boundary between 0 and 87 km (m)
pub const STANDARD_BREAKPOINTS: [f64; 16] = [
    0.0, 5e3, 10e3, 13e3, 18e3, 22e3, 30e3, 34e3, 45e3, 49e3, 53e3, 69e3, 73e3, 77e3, 83e3, 87e3,
];

/// Geometric sampling of offsets away from an anchor altitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricExtension {
    /// Offset of the nearest point (m), must be positive
    pub first_offset: f64,
    /// Offset of the farthest point (m)
    pub last_offset: f64,
    /// Number of points, endpoints included
    pub count: usize,
}

/// Knot generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnotConfig {
    /// Explicit knot altitudes (m)
    pub breakpoints: Vec<f64>,
    /// Offsets above the highest layer base
    pub upper_extension: GeometricExtension,
    /// Offsets below 0 m
    pub lower_extension: GeometricExtension,
}

impl Default for KnotConfig {
    /// 16 breakpoints, 11 points from 5 km to 2,000,000 km above the top layer,
    /// 11 points from 5 km to 5,000,000 km below sea level
    fn default() -> Self {
        Self {
            breakpoints: STANDARD_BREAKPOINTS.to_vec(),
            upper_extension: GeometricExtension {
                first_offset: 5e3,
                last_offset: 2e9,
                count: 11,
            },
            lower_extension: GeometricExtension {
                first_offset: 5e3,
                last_offset: 5e9,
                count: 11,
            },
        }
    }
}

/// Where the layer table comes from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum LayerSource {
    /// Embedded standard ISA table
    #[default]
    Standard,
    /// CSV text supplied inline
    Csv(String),
    /// CSV file read once at construction
    File(PathBuf),
}

impl LayerSource {
    /// Load and validate the table this source points at
    ///
    /// # Errors
    /// Returns error if the table cannot be read or is malformed.
    pub fn load(&self) -> Result<LayerTable, AtmosphereError> {
        match self {
            LayerSource::Standard => LayerTable::standard(),
            LayerSource::Csv(text) => LayerTable::from_csv_str(text),
            LayerSource::File(path) => LayerTable::load(path),
        }
    }
}

/// Complete construction settings for an [`Atmosphere`](crate::Atmosphere)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    /// Layer table source
    pub layers: LayerSource,
    /// Knot generator settings
    pub knots: KnotConfig,
}

impl AtmosphereConfig {
    /// Parse a configuration from JSON
    ///
    /// # Errors
    /// Returns error if the document is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self, AtmosphereError> {
        serde_json::from_str(json).map_err(|e| AtmosphereError::ParseFailed(e.to_string()))
    }

    /// Serialize the configuration to pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, AtmosphereError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AtmosphereError::SerializeFailed(e.to_string()))
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AtmosphereError> {
        let contents =
            fs::read_to_string(path).map_err(|e| AtmosphereError::LoadFailed(e.to_string()))?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_knot_config() {
        let config = KnotConfig::default();
        assert_eq!(config.breakpoints.len(), 16);
        assert_eq!(config.breakpoints[15], 87e3);
        assert_eq!(config.upper_extension.count, 11);
        assert_eq!(config.lower_extension.last_offset, 5e9);
    }

    #[test]
    fn test_json_round_trip() {
        let config = AtmosphereConfig {
            layers: LayerSource::Csv("Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n0,-6.5,15\n".into()),
            knots: KnotConfig::default(),
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(AtmosphereConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            AtmosphereConfig::from_json_str("{ not json"),
            Err(AtmosphereError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_layer_sources_load() {
        assert_eq!(LayerSource::Standard.load().unwrap().len(), 8);
        let inline = LayerSource::Csv(
            "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n0,0,0\n".into(),
        );
        assert_eq!(inline.load().unwrap().len(), 1);
        assert!(LayerSource::File("/nonexistent/table.csv".into())
            .load()
            .is_err());
    }
}
