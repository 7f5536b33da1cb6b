use crate::error::{DefaultIsaAtmoError, IsaAtmoError, IsaAtmoErrorCode};
use crate::instance::IsaAtmoInstance;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Most recent failure on this thread.
///
/// The message is kept as a `CString` so the pointer handed out by
/// `isa_atmo_get_last_error` stays valid until the slot is overwritten.
struct LastFailure {
    message: Option<CString>,
    code: IsaAtmoErrorCode,
}

impl LastFailure {
    const fn none() -> Self {
        Self {
            message: None,
            code: IsaAtmoErrorCode::Ok,
        }
    }

    fn record(&mut self, error: &impl IsaAtmoError) {
        // Layer tables come from the caller, so a rejected cell may carry NUL bytes
        let text = error.msg().replace('\0', "\\0");
        self.message = CString::new(text).ok();
        self.code = error.code();
    }
}

thread_local! {
    static LAST_FAILURE: RefCell<LastFailure> = const { RefCell::new(LastFailure::none()) };
}

/// Track an error by recording it for this thread and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl IsaAtmoError) -> IsaAtmoErrorCode {
    tracing::debug!("FFI call failed: {}", error.msg());
    LAST_FAILURE.with_borrow_mut(|slot| slot.record(error));
    error.code()
}

/// Clear the error state on success, record it on failure.
pub(crate) fn track_result<T>(result: Result<T, DefaultIsaAtmoError>) -> Result<T, IsaAtmoErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Forget the failure recorded for this thread.
pub(crate) fn clear_last_error() {
    LAST_FAILURE.with_borrow_mut(|slot| *slot = LastFailure::none());
}

/// Borrow the instance behind `ptr`, rejecting null.
///
/// # Safety
/// A non-null `ptr` must come from `isa_atmo_new`/`isa_atmo_new_from_csv` and
/// not have been destroyed.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const IsaAtmoInstance,
) -> Result<&'a IsaAtmoInstance, DefaultIsaAtmoError> {
    // SAFETY: caller guarantees a non-null pointer is a live instance
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultIsaAtmoError::null_pointer("ptr"))
}

/// Message describing the most recent failure on the calling thread.
///
/// Returns null when the last call on this thread succeeded or nothing has
/// failed yet. Messages from table construction name the offending line,
/// column or layer. NUL bytes copied from caller data appear as `\0`.
///
/// # Lifetime
/// The pointer stays valid until the next call on this thread that records
/// or clears a failure. **DO NOT FREE THIS POINTER.**
///
/// Example:
/// ```cpp
/// IsaAtmoInstance* atmo = nullptr;
/// if (isa_atmo_new_from_csv(text, len, &atmo) != IsaAtmoErrorCode::Ok) {
///     const char* error = isa_atmo_get_last_error();
///     if (error) {
///         printf("Layer table rejected: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn isa_atmo_get_last_error() -> *const c_char {
    LAST_FAILURE.with_borrow(|slot| slot.message.as_ref().map_or(ptr::null(), |m| m.as_ptr()))
}

/// Code of the most recent failure on the calling thread, or
/// `IsaAtmoErrorCode::Ok` (0) if the last call succeeded.
#[no_mangle]
pub extern "C" fn isa_atmo_get_last_error_code() -> IsaAtmoErrorCode {
    LAST_FAILURE.with_borrow(|slot| slot.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isa_atmo_core::AtmosphereError;
    use std::ffi::CStr;

    fn last_message() -> String {
        let ptr = isa_atmo_get_last_error();
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn test_last_error_round_trip() {
        let code = track_error(&DefaultIsaAtmoError::null_pointer("out_value"));
        assert_eq!(code, IsaAtmoErrorCode::NullPointer);
        assert_eq!(isa_atmo_get_last_error_code(), IsaAtmoErrorCode::NullPointer);
        assert_eq!(last_message(), "Parameter 'out_value' cannot be null");

        clear_last_error();
        assert!(isa_atmo_get_last_error().is_null());
        assert_eq!(isa_atmo_get_last_error_code(), IsaAtmoErrorCode::Ok);
    }

    #[test]
    fn test_success_clears_previous_failure() {
        track_error(&DefaultIsaAtmoError::from(AtmosphereError::EmptyTable));
        assert_eq!(track_result(Ok::<_, DefaultIsaAtmoError>(7)), Ok(7));
        assert!(isa_atmo_get_last_error().is_null());
        assert_eq!(isa_atmo_get_last_error_code(), IsaAtmoErrorCode::Ok);
    }

    #[test]
    fn test_nul_in_rejected_cell_keeps_message() {
        let error = DefaultIsaAtmoError::from(AtmosphereError::MalformedValue {
            line: 2,
            column: "Base Temperature [C]",
            value: "1\u{0}5".to_string(),
        });
        assert_eq!(track_error(&error), IsaAtmoErrorCode::InvalidConfiguration);

        let message = last_message();
        assert!(message.contains("Line 2"), "{message}");
        assert!(message.contains("1\\05"), "{message}");
    }

    #[test]
    fn test_failures_are_per_thread() {
        track_error(&DefaultIsaAtmoError::null_pointer("csv"));
        let other = std::thread::spawn(|| isa_atmo_get_last_error_code()).join().unwrap();
        assert_eq!(other, IsaAtmoErrorCode::Ok);
        assert_eq!(isa_atmo_get_last_error_code(), IsaAtmoErrorCode::NullPointer);
    }
}
