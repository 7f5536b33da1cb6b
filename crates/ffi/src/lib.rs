//! C ABI for the ISA atmosphere
//!
//! Instances are created with `isa_atmo_new` / `isa_atmo_new_from_csv`, queried
//! with the `isa_atmo_evaluate*` family, and released with `isa_atmo_destroy`.
//! Every fallible call returns an `IsaAtmoErrorCode`; the message for the last
//! failure on the calling thread is available from `isa_atmo_get_last_error`.

mod error;
mod helpers;
mod instance;
mod queries;

pub use error::IsaAtmoErrorCode;
pub use helpers::{isa_atmo_get_last_error, isa_atmo_get_last_error_code};
pub use instance::{isa_atmo_destroy, isa_atmo_new, isa_atmo_new_from_csv, IsaAtmoInstance};
pub use queries::{
    isa_atmo_evaluate, isa_atmo_evaluate_batch, isa_atmo_pressure_differentiable,
    isa_atmo_pressure_isa, isa_atmo_temperature_differentiable, isa_atmo_temperature_isa,
    IsaAtmoModel, IsaAtmoQuantity,
};
