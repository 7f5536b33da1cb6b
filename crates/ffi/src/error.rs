use isa_atmo_core::AtmosphereError;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait IsaAtmoError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> IsaAtmoErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `IsaAtmoError` for common FFI error scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultIsaAtmoError {
    code: IsaAtmoErrorCode,
    msg: String,
}

impl DefaultIsaAtmoError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: IsaAtmoErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an atmosphere that could not be constructed.
    pub fn invalid_configuration(error: &AtmosphereError) -> Self {
        Self {
            code: IsaAtmoErrorCode::InvalidConfiguration,
            msg: format!("Atmosphere construction failed: {error}"),
        }
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: IsaAtmoErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl IsaAtmoError for DefaultIsaAtmoError {
    fn code(&self) -> IsaAtmoErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<AtmosphereError> for DefaultIsaAtmoError {
    fn from(error: AtmosphereError) -> Self {
        Self::invalid_configuration(&error)
    }
}

/// FFI error codes returned by atmosphere functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaAtmoErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Layer table or knot settings were rejected while building the atmosphere.
    InvalidConfiguration = 2,

    /// Invalid parameter passed to function.
    InvalidParameter = 3,
}

impl From<DefaultIsaAtmoError> for IsaAtmoErrorCode {
    fn from(error: DefaultIsaAtmoError) -> Self {
        error.code
    }
}
