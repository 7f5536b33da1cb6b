use isa_atmo_core::{Atmosphere, AtmosphereConfig, LayerSource};
use std::ptr;

use crate::error::{DefaultIsaAtmoError, IsaAtmoErrorCode};
use crate::helpers::{track_error, track_result};

/// An immutable, fully built atmosphere.
///
/// # Thread Safety
/// The instance is never mutated after construction, so every query function
/// may be called concurrently from any number of threads without locking.
///
/// # Usage (C++)
/// ```cpp
/// IsaAtmoInstance* atmo = nullptr;
/// if (isa_atmo_new(&atmo) != IsaAtmoErrorCode::Ok) {
///     return;
/// }
/// double p = 0.0;
/// isa_atmo_evaluate(atmo, IsaAtmoModel::Differentiable, IsaAtmoQuantity::Pressure, 11000.0, &p);
/// isa_atmo_destroy(atmo);
/// ```
pub struct IsaAtmoInstance {
    pub(crate) atmosphere: Atmosphere,
}

impl IsaAtmoInstance {
    /// Builds an instance from a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns `IsaAtmoErrorCode::InvalidConfiguration` if the table or knot settings are rejected.
    pub(crate) fn new(config: &AtmosphereConfig) -> Result<Box<Self>, DefaultIsaAtmoError> {
        let atmosphere = Atmosphere::from_config(config)?;
        Ok(Box::new(Self { atmosphere }))
    }

    /// Builds an instance from CSV bytes supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns `IsaAtmoErrorCode::InvalidParameter` if the bytes are not UTF-8, or
    /// `IsaAtmoErrorCode::InvalidConfiguration` if the table is rejected.
    pub(crate) fn from_csv_bytes(bytes: &[u8]) -> Result<Box<Self>, DefaultIsaAtmoError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            DefaultIsaAtmoError::invalid_parameter(format!("Layer table is not valid UTF-8: {e}"))
        })?;
        Self::new(&AtmosphereConfig {
            layers: LayerSource::Csv(text.to_owned()),
            ..AtmosphereConfig::default()
        })
    }
}

/// Write the outcome of a constructor into `out_instance`.
///
/// # Safety
/// `out_instance` must be non-null and writable.
unsafe fn publish(
    result: Result<Box<IsaAtmoInstance>, DefaultIsaAtmoError>,
    out_instance: *mut *mut IsaAtmoInstance,
) -> IsaAtmoErrorCode {
    match track_result(result) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            IsaAtmoErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Create the standard ISA atmosphere and return it via out-parameter.
///
/// - Returns `IsaAtmoErrorCode::Ok` (0) on success with a valid instance in `out_instance`
/// - Returns non-zero error code on failure with `out_instance` set to null
///
/// Returns
/// - `IsaAtmoErrorCode::Ok` (0): success
/// - `IsaAtmoErrorCode::NullPointer`: `out_instance` is null
/// - `IsaAtmoErrorCode::InvalidConfiguration`: the embedded table could not be built
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call `isa_atmo_destroy`
///   exactly once to avoid memory leaks.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_new(out_instance: *mut *mut IsaAtmoInstance) -> IsaAtmoErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultIsaAtmoError::null_pointer("out_instance"));
    }

    unsafe { publish(IsaAtmoInstance::new(&AtmosphereConfig::default()), out_instance) }
}

/// Create an atmosphere from a caller-supplied CSV layer table.
///
/// The table needs the columns `Base Altitude [m]`, `Lapse Rate [K/km]` and
/// `Base Temperature [C]`; other columns are ignored. The standard knot layout
/// is used. The text is copied, so the caller may free it after this call.
///
/// Returns
/// - `IsaAtmoErrorCode::Ok` (0): success, `out_instance` contains valid pointer
/// - `IsaAtmoErrorCode::NullPointer`: `csv` or `out_instance` is null
/// - `IsaAtmoErrorCode::InvalidParameter`: the text is not UTF-8
/// - `IsaAtmoErrorCode::InvalidConfiguration`: the table is missing columns or malformed
///
/// Error Details
/// - Call `isa_atmo_get_last_error()` to retrieve human-readable error description
///
/// # Safety
///
/// - `csv` must point to `csv_len` readable bytes.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call `isa_atmo_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_new_from_csv(
    csv: *const u8,
    csv_len: usize,
    out_instance: *mut *mut IsaAtmoInstance,
) -> IsaAtmoErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultIsaAtmoError::null_pointer("out_instance"));
    }
    if csv.is_null() {
        unsafe {
            *out_instance = ptr::null_mut();
        }
        return track_error(&DefaultIsaAtmoError::null_pointer("csv"));
    }

    // SAFETY: caller guarantees `csv` points to `csv_len` readable bytes
    let bytes = unsafe { std::slice::from_raw_parts(csv, csv_len) };
    unsafe { publish(IsaAtmoInstance::from_csv_bytes(bytes), out_instance) }
}

/// Destroys an instance previously created by `isa_atmo_new` or `isa_atmo_new_from_csv`.
///
/// Behavior:
/// - If `ptr` is null, this function is a no-op.
/// - Otherwise ownership is reclaimed with `Box::from_raw` and the instance is dropped.
///
/// # Safety
/// - The pointer MUST have been created by `isa_atmo_new` or `isa_atmo_new_from_csv`.
/// - The pointer MUST NOT have been freed already.
/// - After calling this function, the caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn isa_atmo_destroy(ptr: *mut IsaAtmoInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: The pointer was created by `Box::into_raw` in a constructor above
    // and has not been freed. Recreating the Box drops the instance.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
