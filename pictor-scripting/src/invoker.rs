//! safe_call - fallback-with-logging for declaration-time script calls
//!
//! Session build calls into script code for titles, controls, surface
//! availability, and restraints. None of those calls may take the rest
//! of the session down with them, so they all go through [`safe_call`]:
//! a panic is caught, logged with the script's origin and the failing
//! operation, and replaced with a caller-supplied default.
//!
//! `run` never goes through here. An invocation failure is the outcome
//! of an explicit user action and propagates as a `Result` instead.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

/// Call into script code, substituting `default` if the call panics.
///
/// A successful result is returned unchanged, including empty or falsy
/// values; callers must not reinterpret those as failure.
pub fn safe_call<T>(origin: &Path, operation: &str, default: T, call: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => value,
        Err(payload) => {
            tracing::error!(
                script = %origin.display(),
                operation,
                panic = panic_message(payload.as_ref()),
                "Script call failed"
            );
            default
        }
    }
}

/// Extract a printable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_call_returns_result_on_success() {
        let result = safe_call(Path::new("unit.so"), "title", 0, || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_safe_call_preserves_empty_results() {
        // Empty is a valid result, not a failure signal
        let result = safe_call(Path::new("unit.so"), "title", "fallback".to_string(), || {
            String::new()
        });
        assert_eq!(result, "");
    }

    #[test]
    fn test_safe_call_substitutes_default_on_panic() {
        let result = safe_call(Path::new("unit.so"), "controls", 7, || {
            panic!("script blew up")
        });
        assert_eq!(result, 7);
    }

    #[test]
    fn test_safe_call_catches_string_panics() {
        let result: Option<i32> = safe_call(Path::new("unit.so"), "restraints", None, || {
            panic!("dynamic {}", "message")
        });
        assert_eq!(result, None);
    }

    #[test]
    fn test_panic_message_downcasts() {
        let static_payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(static_payload.as_ref()), "static message");

        let string_payload: Box<dyn Any + Send> = Box::new("owned message".to_string());
        assert_eq!(panic_message(string_payload.as_ref()), "owned message");

        let other_payload: Box<dyn Any + Send> = Box::new(17u32);
        assert_eq!(panic_message(other_payload.as_ref()), "<non-string panic payload>");
    }
}
