//! ISA Atmosphere Core Library
//!
//! International Standard Atmosphere model with two evaluators over one layer
//! table:
//! - a piecewise closed-form model (exact ISA, derivative jumps at layer
//!   boundaries)
//! - a differentiable surrogate (C¹ everywhere, exact at every knot, finite
//!   far outside the physically defined region)
//!
//! ## Building an atmosphere
//!
//! The layer table is completed once (base pressures chained up from 101325 Pa
//! at 0 m), knots are generated, and both surrogate interpolants are fitted.
//! The resulting [`Atmosphere`] is immutable and can be shared across threads;
//! [`Atmosphere::shared`] hands out a process-wide standard instance.

pub mod atmosphere;
pub mod config;
pub mod constants;
pub mod error;
pub mod interpolation;
pub mod knots;
pub mod layers;
pub mod piecewise;
pub mod surrogate;
pub mod table;
pub mod units;

// Re-export the main entry points
pub use atmosphere::{Atmosphere, Model, Quantity};
pub use config::{AtmosphereConfig, GeometricExtension, KnotConfig, LayerSource};
pub use error::AtmosphereError;

// Re-export model types
pub use interpolation::HermiteInterpolant;
pub use knots::KnotSet;
pub use layers::{barometric_formula, AtmosphereLayer};
pub use piecewise::IsaModel;
pub use surrogate::DifferentiableAtmosphere;
pub use table::{LayerRow, LayerTable};
pub use units::{Celsius, Kelvin, KelvinPerKilometer, KelvinPerMeter};
