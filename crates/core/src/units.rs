//! Unit newtypes for the quantities read from the layer table
//!
//! The table stores temperatures in Celsius and lapse rates per kilometre while
//! every formula works in Kelvin and per metre. Wrapping the raw columns keeps
//! the conversion in one place.
//!
//! ```
//! use isa_atmo_core::units::{Celsius, Kelvin, KelvinPerKilometer};
//!
//! let kelvin: Kelvin = Celsius::new(15.0).into();
//! assert!((*kelvin - 288.15).abs() < 1e-12);
//!
//! let lapse = KelvinPerKilometer::new(-6.5).to_per_meter();
//! assert!((*lapse + 0.0065).abs() < 1e-15);
//! ```

use crate::constants::{CELSIUS_TO_KELVIN, METERS_PER_KILOMETER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Celsius {
    /// Wrap a raw Celsius value. Physical validity is checked after conversion.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }

    /// Convert to Kelvin
    #[inline]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + CELSIUS_TO_KELVIN)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

/// Absolute temperature in Kelvin
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

impl Kelvin {
    /// Wrap a raw Kelvin value
    #[inline]
    pub const fn new(value: f64) -> Self {
        Kelvin(value)
    }

    /// True when the value lies strictly above absolute zero
    #[inline]
    pub fn is_physical(self) -> bool {
        self.0 > 0.0
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl Deref for Kelvin {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} K", self.0)
    }
}

// ============================================================================
// LAPSE RATE
// ============================================================================

/// Temperature lapse rate in K/km, as published in ISA tables
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KelvinPerKilometer(f64);

impl KelvinPerKilometer {
    /// Wrap a raw K/km value
    #[inline]
    pub const fn new(value: f64) -> Self {
        KelvinPerKilometer(value)
    }

    /// Convert to K/m
    #[inline]
    pub fn to_per_meter(self) -> KelvinPerMeter {
        KelvinPerMeter(self.0 / METERS_PER_KILOMETER)
    }
}

impl Deref for KelvinPerKilometer {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

/// Temperature lapse rate in K/m, the unit every formula uses
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KelvinPerMeter(f64);

impl KelvinPerMeter {
    /// Wrap a raw K/m value
    #[inline]
    pub const fn new(value: f64) -> Self {
        KelvinPerMeter(value)
    }
}

impl From<KelvinPerKilometer> for KelvinPerMeter {
    fn from(rate: KelvinPerKilometer) -> KelvinPerMeter {
        rate.to_per_meter()
    }
}

impl Deref for KelvinPerMeter {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}
