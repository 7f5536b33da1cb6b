//! Construction-time errors
//!
//! Every error in this crate is a configuration fault raised while building an
//! [`Atmosphere`](crate::Atmosphere). Evaluation itself never fails: extreme
//! altitudes are handled by clamping and NaN simply propagates.

use std::fmt;

/// Errors that can occur while loading a layer table or building a model
#[derive(Debug, Clone, PartialEq)]
pub enum AtmosphereError {
    /// Failed to read a table or configuration file
    LoadFailed(String),
    /// Failed to parse a JSON configuration document
    ParseFailed(String),
    /// Failed to serialize a configuration document
    SerializeFailed(String),
    /// A required column is absent from the table header
    MissingColumn(&'static str),
    /// A table cell could not be parsed as a number
    MalformedValue {
        /// 1-based line number in the source text
        line: usize,
        /// Column header the cell belongs to
        column: &'static str,
        /// Raw cell contents
        value: String,
    },
    /// The table has a header but no data rows
    EmptyTable,
    /// A table cell parsed but is NaN or infinite
    NonFiniteValue {
        /// Zero-based layer index
        layer: usize,
        /// Column header the value belongs to
        column: &'static str,
    },
    /// Layer base altitudes are not strictly increasing
    NonMonotonicAltitude {
        /// Zero-based index of the offending layer
        layer: usize,
        /// Base altitude of the previous layer (m)
        previous: f64,
        /// Base altitude of the offending layer (m)
        current: f64,
    },
    /// A base temperature is at or below absolute zero after conversion
    NonPhysicalTemperature {
        /// Zero-based layer index
        layer: usize,
        /// Converted base temperature (K)
        kelvin: f64,
    },
    /// Knot generator settings cannot produce a valid knot set
    InvalidKnotConfig(String),
    /// Interpolation data is too short, unsorted, or mismatched
    InvalidInterpolationData(String),
}

impl fmt::Display for AtmosphereError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtmosphereError::LoadFailed(msg) => write!(f, "Failed to load: {msg}"),
            AtmosphereError::ParseFailed(msg) => write!(f, "Failed to parse: {msg}"),
            AtmosphereError::SerializeFailed(msg) => write!(f, "Failed to serialize: {msg}"),
            AtmosphereError::MissingColumn(column) => {
                write!(f, "Layer table is missing column '{column}'")
            }
            AtmosphereError::MalformedValue {
                line,
                column,
                value,
            } => write!(
                f,
                "Line {line}: column '{column}' holds '{value}', expected a number"
            ),
            AtmosphereError::EmptyTable => write!(f, "Layer table has no data rows"),
            AtmosphereError::NonFiniteValue { layer, column } => {
                write!(f, "Layer {layer}: column '{column}' is not finite")
            }
            AtmosphereError::NonMonotonicAltitude {
                layer,
                previous,
                current,
            } => write!(
                f,
                "Layer {layer}: base altitude {current} m does not exceed previous base altitude {previous} m"
            ),
            AtmosphereError::NonPhysicalTemperature { layer, kelvin } => {
                write!(f, "Layer {layer}: base temperature {kelvin} K is not above absolute zero")
            }
            AtmosphereError::InvalidKnotConfig(msg) => write!(f, "Invalid knot configuration: {msg}"),
            AtmosphereError::InvalidInterpolationData(msg) => {
                write!(f, "Invalid interpolation data: {msg}")
            }
        }
    }
}

impl std::error::Error for AtmosphereError {}
