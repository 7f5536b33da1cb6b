use isa_atmo_core::{Model, Quantity};

use crate::error::{DefaultIsaAtmoError, IsaAtmoErrorCode};
use crate::helpers::{instance_from_ptr, track_error, track_result};
use crate::instance::IsaAtmoInstance;

/// Which evaluator answers a query.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaAtmoModel {
    /// Closed-form layer model; derivative jumps at layer boundaries.
    Piecewise = 0,
    /// Smooth surrogate; continuous first derivative everywhere.
    Differentiable = 1,
}

/// Which atmospheric property a query returns.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaAtmoQuantity {
    /// Pressure (Pa).
    Pressure = 0,
    /// Temperature (K).
    Temperature = 1,
    /// Density (kg/m³).
    Density = 2,
    /// Speed of sound (m/s).
    SpeedOfSound = 3,
}

impl From<IsaAtmoModel> for Model {
    fn from(model: IsaAtmoModel) -> Self {
        match model {
            IsaAtmoModel::Piecewise => Model::Piecewise,
            IsaAtmoModel::Differentiable => Model::Differentiable,
        }
    }
}

impl From<IsaAtmoQuantity> for Quantity {
    fn from(quantity: IsaAtmoQuantity) -> Self {
        match quantity {
            IsaAtmoQuantity::Pressure => Quantity::Pressure,
            IsaAtmoQuantity::Temperature => Quantity::Temperature,
            IsaAtmoQuantity::Density => Quantity::Density,
            IsaAtmoQuantity::SpeedOfSound => Quantity::SpeedOfSound,
        }
    }
}

/// Evaluate one quantity at one altitude (m, geopotential).
///
/// Extreme altitudes are not an error: the result is finite. A NaN altitude
/// yields NaN.
///
/// Returns
/// - `IsaAtmoErrorCode::Ok` (0) on success with the value in `out_value`
/// - `IsaAtmoErrorCode::NullPointer` if `ptr` or `out_value` is null
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `isa_atmo_new` or null.
/// - `out_value` must be a valid pointer to a writable `double` or null.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_evaluate(
    ptr: *const IsaAtmoInstance,
    model: IsaAtmoModel,
    quantity: IsaAtmoQuantity,
    altitude: f64,
    out_value: *mut f64,
) -> IsaAtmoErrorCode {
    if out_value.is_null() {
        return track_error(&DefaultIsaAtmoError::null_pointer("out_value"));
    }

    let instance = match track_result(unsafe { instance_from_ptr(ptr) }) {
        Ok(instance) => instance,
        Err(code) => return code,
    };

    let value = instance
        .atmosphere
        .evaluate(model.into(), quantity.into(), altitude);
    unsafe {
        *out_value = value;
    }
    IsaAtmoErrorCode::Ok
}

/// Evaluate one quantity over `len` altitudes, writing `len` results.
///
/// Elements are evaluated in parallel; `out_values[i]` always corresponds to
/// `altitudes[i]`. A zero `len` is a successful no-op, and both arrays may be
/// null in that case.
///
/// Returns
/// - `IsaAtmoErrorCode::Ok` (0) on success
/// - `IsaAtmoErrorCode::NullPointer` if `ptr` is null, or an array is null with `len > 0`
/// - `IsaAtmoErrorCode::InvalidParameter` if the two arrays overlap
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `isa_atmo_new` or null.
/// - `altitudes` must point to `len` readable doubles.
/// - `out_values` must point to `len` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_evaluate_batch(
    ptr: *const IsaAtmoInstance,
    model: IsaAtmoModel,
    quantity: IsaAtmoQuantity,
    altitudes: *const f64,
    len: usize,
    out_values: *mut f64,
) -> IsaAtmoErrorCode {
    let instance = match track_result(unsafe { instance_from_ptr(ptr) }) {
        Ok(instance) => instance,
        Err(code) => return code,
    };
    if len == 0 {
        return IsaAtmoErrorCode::Ok;
    }
    if altitudes.is_null() {
        return track_error(&DefaultIsaAtmoError::null_pointer("altitudes"));
    }
    if out_values.is_null() {
        return track_error(&DefaultIsaAtmoError::null_pointer("out_values"));
    }

    let input_range = altitudes as usize..altitudes.wrapping_add(len) as usize;
    let output_range = out_values as usize..out_values.wrapping_add(len) as usize;
    if input_range.start < output_range.end && output_range.start < input_range.end {
        return track_error(&DefaultIsaAtmoError::invalid_parameter(
            "Parameters 'altitudes' and 'out_values' must not overlap".to_string(),
        ));
    }

    // SAFETY: caller guarantees both arrays hold `len` elements; overlap rejected above
    let (input, output) = unsafe {
        (
            std::slice::from_raw_parts(altitudes, len),
            std::slice::from_raw_parts_mut(out_values, len),
        )
    };
    instance
        .atmosphere
        .evaluate_into(model.into(), quantity.into(), input, output);
    IsaAtmoErrorCode::Ok
}

/// ISA pressure (Pa) at `altitude`. See `isa_atmo_evaluate`.
///
/// # Safety
/// Same contract as `isa_atmo_evaluate`.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_pressure_isa(
    ptr: *const IsaAtmoInstance,
    altitude: f64,
    out_value: *mut f64,
) -> IsaAtmoErrorCode {
    unsafe {
        isa_atmo_evaluate(
            ptr,
            IsaAtmoModel::Piecewise,
            IsaAtmoQuantity::Pressure,
            altitude,
            out_value,
        )
    }
}

/// ISA temperature (K) at `altitude`. See `isa_atmo_evaluate`.
///
/// # Safety
/// Same contract as `isa_atmo_evaluate`.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_temperature_isa(
    ptr: *const IsaAtmoInstance,
    altitude: f64,
    out_value: *mut f64,
) -> IsaAtmoErrorCode {
    unsafe {
        isa_atmo_evaluate(
            ptr,
            IsaAtmoModel::Piecewise,
            IsaAtmoQuantity::Temperature,
            altitude,
            out_value,
        )
    }
}

/// Smooth pressure (Pa) at `altitude`. See `isa_atmo_evaluate`.
///
/// # Safety
/// Same contract as `isa_atmo_evaluate`.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_pressure_differentiable(
    ptr: *const IsaAtmoInstance,
    altitude: f64,
    out_value: *mut f64,
) -> IsaAtmoErrorCode {
    unsafe {
        isa_atmo_evaluate(
            ptr,
            IsaAtmoModel::Differentiable,
            IsaAtmoQuantity::Pressure,
            altitude,
            out_value,
        )
    }
}

/// Smooth temperature (K) at `altitude`. See `isa_atmo_evaluate`.
///
/// # Safety
/// Same contract as `isa_atmo_evaluate`.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_temperature_differentiable(
    ptr: *const IsaAtmoInstance,
    altitude: f64,
    out_value: *mut f64,
) -> IsaAtmoErrorCode {
    unsafe {
        isa_atmo_evaluate(
            ptr,
            IsaAtmoModel::Differentiable,
            IsaAtmoQuantity::Temperature,
            altitude,
            out_value,
        )
    }
}
