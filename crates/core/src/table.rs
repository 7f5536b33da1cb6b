//! Raw layer table loading and validation
//!
//! The table is a small CSV document with one row per layer. Columns are
//! located by header name, so extra columns such as a layer label are ignored.
//! The standard ISA table ships embedded in the crate.
//!
//! # Required columns
//! - `Base Altitude [m]`: geopotential base altitude of the layer
//! - `Lapse Rate [K/km]`: temperature gradient inside the layer
//! - `Base Temperature [C]`: temperature at the layer base

use crate::error::AtmosphereError;
use crate::units::{Celsius, KelvinPerKilometer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Header of the base altitude column
pub const BASE_ALTITUDE_COLUMN: &str = "Base Altitude [m]";
/// Header of the lapse rate column
pub const LAPSE_RATE_COLUMN: &str = "Lapse Rate [K/km]";
/// Header of the base temperature column
pub const BASE_TEMPERATURE_COLUMN: &str = "Base Temperature [C]";

/// Standard ISA layer table, 0 m to the mesopause
pub const STANDARD_TABLE_CSV: &str = include_str!("../data/isa_table.csv");

/// One row of the layer table, in the units the table is published in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerRow {
    /// Base altitude (m)
    pub base_altitude: f64,
    /// Lapse rate (K/km)
    pub lapse_rate: KelvinPerKilometer,
    /// Base temperature (°C)
    pub base_temperature: Celsius,
}

/// Validated, ordered layer rows
///
/// Invariants enforced at construction:
/// - at least one row
/// - every value finite
/// - base altitudes strictly increasing
/// - every base temperature above absolute zero
///
/// Serialized as its list of rows. Deserialized rows pass through
/// [`LayerTable::from_rows`], so the invariants hold for every table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LayerRow>", into = "Vec<LayerRow>")]
pub struct LayerTable {
    rows: Vec<LayerRow>,
}

impl LayerTable {
    /// Build a table from rows, checking every invariant
    ///
    /// # Errors
    /// Returns an error if the rows are empty, contain non-finite values,
    /// are not strictly increasing in altitude, or hold a temperature at or
    /// below absolute zero.
    pub fn from_rows(rows: Vec<LayerRow>) -> Result<Self, AtmosphereError> {
        if rows.is_empty() {
            return Err(AtmosphereError::EmptyTable);
        }

        for (layer, row) in rows.iter().enumerate() {
            let columns = [
                (BASE_ALTITUDE_COLUMN, row.base_altitude),
                (LAPSE_RATE_COLUMN, *row.lapse_rate),
                (BASE_TEMPERATURE_COLUMN, *row.base_temperature),
            ];
            for (column, value) in columns {
                if !value.is_finite() {
                    return Err(AtmosphereError::NonFiniteValue { layer, column });
                }
            }

            let kelvin = row.base_temperature.to_kelvin();
            if !kelvin.is_physical() {
                return Err(AtmosphereError::NonPhysicalTemperature {
                    layer,
                    kelvin: *kelvin,
                });
            }

            if layer > 0 {
                let previous = rows[layer - 1].base_altitude;
                if row.base_altitude <= previous {
                    return Err(AtmosphereError::NonMonotonicAltitude {
                        layer,
                        previous,
                        current: row.base_altitude,
                    });
                }
            }
        }

        Ok(Self { rows })
    }

    /// The embedded standard ISA table
    ///
    /// # Errors
    /// Only fails if the embedded resource is malformed.
    pub fn standard() -> Result<Self, AtmosphereError> {
        Self::from_csv_str(STANDARD_TABLE_CSV)
    }

    /// Parse a table from CSV text
    ///
    /// The first non-blank line is the header. Blank lines are skipped.
    ///
    /// # Errors
    /// Returns an error if a required column is missing, a cell is not a
    /// number, or the parsed rows violate a table invariant.
    pub fn from_csv_str(text: &str) -> Result<Self, AtmosphereError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let header: Vec<&str> = match lines.next() {
            Some((_, line)) => line.split(',').map(str::trim).collect(),
            None => return Err(AtmosphereError::MissingColumn(BASE_ALTITUDE_COLUMN)),
        };

        let column_index = |name: &'static str| {
            header
                .iter()
                .position(|h| *h == name)
                .ok_or(AtmosphereError::MissingColumn(name))
        };
        let altitude_idx = column_index(BASE_ALTITUDE_COLUMN)?;
        let lapse_idx = column_index(LAPSE_RATE_COLUMN)?;
        let temperature_idx = column_index(BASE_TEMPERATURE_COLUMN)?;

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            let cell = |idx: usize, column: &'static str| -> Result<f64, AtmosphereError> {
                let raw = cells.get(idx).copied().unwrap_or("");
                raw.parse::<f64>()
                    .map_err(|_| AtmosphereError::MalformedValue {
                        line: line_no,
                        column,
                        value: raw.to_string(),
                    })
            };

            rows.push(LayerRow {
                base_altitude: cell(altitude_idx, BASE_ALTITUDE_COLUMN)?,
                lapse_rate: KelvinPerKilometer::new(cell(lapse_idx, LAPSE_RATE_COLUMN)?),
                base_temperature: Celsius::new(cell(temperature_idx, BASE_TEMPERATURE_COLUMN)?),
            });
        }

        debug!("Parsed layer table with {} rows", rows.len());
        Self::from_rows(rows)
    }

    /// Load a table from a CSV file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or its contents are invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AtmosphereError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| AtmosphereError::LoadFailed(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_csv_str(&contents)
    }

    /// Rows in ascending altitude order
    pub fn rows(&self) -> &[LayerRow] {
        &self.rows
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a validated table; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<LayerRow>> for LayerTable {
    type Error = AtmosphereError;

    fn try_from(rows: Vec<LayerRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<LayerTable> for Vec<LayerRow> {
    fn from(table: LayerTable) -> Self {
        table.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_table_parses() {
        let table = LayerTable::standard().unwrap();
        assert_eq!(table.len(), 8);

        let first = table.rows()[0];
        assert_eq!(first.base_altitude, 0.0);
        assert_eq!(*first.lapse_rate, -6.5);
        assert_eq!(*first.base_temperature, 15.0);

        let last = table.rows()[7];
        assert_eq!(last.base_altitude, 84852.0);
        assert_eq!(*last.lapse_rate, 0.0);
    }

    #[test]
    fn test_columns_found_by_name_in_any_order() {
        let csv = "Base Temperature [C],Note,Lapse Rate [K/km],Base Altitude [m]\n\
                   15,ground,-6.5,0\n\
                   -56.5,tropopause,0,11000\n";
        let table = LayerTable::from_csv_str(csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].base_altitude, 11000.0);
        assert_eq!(*table.rows()[1].base_temperature, -56.5);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let csv = "\nBase Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n\n0,-6.5,15\n\n";
        let table = LayerTable::from_csv_str(csv).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let csv = "Base Altitude [m],Base Temperature [C]\n0,15\n";
        assert_eq!(
            LayerTable::from_csv_str(csv),
            Err(AtmosphereError::MissingColumn(LAPSE_RATE_COLUMN))
        );
    }

    #[test]
    fn test_empty_document_is_rejected() {
        assert!(matches!(
            LayerTable::from_csv_str("   \n"),
            Err(AtmosphereError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let csv = "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n";
        assert_eq!(LayerTable::from_csv_str(csv), Err(AtmosphereError::EmptyTable));
    }

    #[test]
    fn test_malformed_cell_reports_line() {
        let csv = "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n\
                   0,-6.5,15\n\
                   11000,flat,-56.5\n";
        match LayerTable::from_csv_str(csv) {
            Err(AtmosphereError::MalformedValue {
                line,
                column,
                value,
            }) => {
                assert_eq!(line, 3);
                assert_eq!(column, LAPSE_RATE_COLUMN);
                assert_eq!(value, "flat");
            }
            other => panic!("expected MalformedValue, got {other:?}"),
        }
    }

    #[test]
    fn test_short_row_is_malformed() {
        let csv = "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n0,-6.5\n";
        assert!(matches!(
            LayerTable::from_csv_str(csv),
            Err(AtmosphereError::MalformedValue { .. })
        ));
    }

    #[test]
    fn test_non_monotonic_altitude_is_rejected() {
        let csv = "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n\
                   0,-6.5,15\n\
                   0,0,-56.5\n";
        assert!(matches!(
            LayerTable::from_csv_str(csv),
            Err(AtmosphereError::NonMonotonicAltitude { layer: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_value_is_rejected() {
        let csv = "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n0,inf,15\n";
        assert_eq!(
            LayerTable::from_csv_str(csv),
            Err(AtmosphereError::NonFiniteValue {
                layer: 0,
                column: LAPSE_RATE_COLUMN
            })
        );
    }

    #[test]
    fn test_temperature_below_absolute_zero_is_rejected() {
        let csv = "Base Altitude [m],Lapse Rate [K/km],Base Temperature [C]\n0,-6.5,-300\n";
        assert!(matches!(
            LayerTable::from_csv_str(csv),
            Err(AtmosphereError::NonPhysicalTemperature { layer: 0, .. })
        ));
    }

    #[test]
    fn test_deserialized_table_is_validated() {
        let table = LayerTable::standard().unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let restored: LayerTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), table.len());
        for (a, b) in restored.rows().iter().zip(table.rows()) {
            assert_relative_eq!(*a.base_temperature, *b.base_temperature, max_relative = 1e-15);
        }

        let rejected = [
            "[]",
            r#"{"rows":[]}"#,
            r#"[{"base_altitude":0.0,"lapse_rate":-6.5,"base_temperature":-500.0}]"#,
        ];
        for json in rejected {
            assert!(
                serde_json::from_str::<LayerTable>(json).is_err(),
                "accepted {json}"
            );
        }

        let unsorted = r#"[{"base_altitude":10.0,"lapse_rate":-6.5,"base_temperature":15.0},
                           {"base_altitude":0.0,"lapse_rate":0.0,"base_temperature":-56.5}]"#;
        let err = serde_json::from_str::<LayerTable>(unsorted).unwrap_err();
        assert!(err.to_string().contains("does not exceed previous base altitude"), "{err}");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = LayerTable::load("/nonexistent/isa_table.csv").unwrap_err();
        assert!(matches!(err, AtmosphereError::LoadFailed(_)));
    }
}
