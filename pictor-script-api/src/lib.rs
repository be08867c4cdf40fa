//! pictor-script-api - Script API for the pictor processing host
//!
//! This crate provides the traits and types needed to write scripts for
//! pictor. Scripts are native Rust dynamic libraries that declare UI
//! controls per surface and run against the processing pipeline when the
//! user selects and invokes them.
//!
//! # Example
//!
//! ```ignore
//! use pictor_script_api::{
//!     Processed, Script, ScriptContext, ScriptError, Surface, export_scripts,
//! };
//! use serde_json::Value;
//!
//! #[derive(Default)]
//! pub struct Upscale;
//!
//! impl Script for Upscale {
//!     fn title(&self) -> String {
//!         "Upscale".to_string()
//!     }
//!
//!     fn run(
//!         &mut self,
//!         ctx: &mut ScriptContext,
//!         args: &[Value],
//!     ) -> Result<Option<Processed>, ScriptError> {
//!         let factor = args
//!             .first()
//!             .and_then(Value::as_u64)
//!             .ok_or_else(|| ScriptError::invalid_argument("missing scale factor"))?;
//!         // ... drive the pipeline through `ctx` ...
//!         let _ = (ctx, factor);
//!         Ok(None)
//!     }
//! }
//!
//! export_scripts!(Upscale);
//! ```

pub mod context;
pub mod control;
pub mod error;
pub mod types;

pub use context::{ProgressCounter, ScriptContext};
pub use control::Control;
pub use error::ScriptError;
pub use types::{Processed, Restraints, Surface};

use serde_json::Value;

/// Current script API version. Script units must match this exactly;
/// the handshake happens before any script type is instantiated.
pub const API_VERSION: u32 = 1;

/// The core script trait - implement this to create a pictor script.
///
/// Only `title` and `run` are required. Everything else defaults to
/// "no controls, no restraints, offered on every surface".
pub trait Script: Send {
    /// Display name shown in the script selector.
    fn title(&self) -> String;

    /// Declare this script's UI controls for the given surface.
    ///
    /// Return `None` (the default) or an empty vector to contribute no
    /// argument slots; the script can still be selected and run.
    /// Controls are appended to the surface's shared argument vector in
    /// the order returned here, and `run` receives their values in the
    /// same order.
    fn controls(&self, _surface: Surface) -> Option<Vec<Box<dyn Control>>> {
        None
    }

    /// Constraints to impose on other UI state while this script is
    /// selected, e.g. restricting the available sampling methods:
    /// `{"methods": ["Euler", "DDIM"]}`.
    fn restraints(&self) -> Restraints {
        Restraints::new()
    }

    /// Whether this script should be offered on the given surface.
    fn available_on(&self, _surface: Surface) -> bool {
        true
    }

    /// Run the script against the processing pipeline.
    ///
    /// Receives the shared context plus exactly the values of the
    /// controls declared by [`controls`](Script::controls). Errors
    /// propagate to the invocation caller; the host never absorbs them.
    fn run(
        &mut self,
        ctx: &mut ScriptContext,
        args: &[Value],
    ) -> Result<Option<Processed>, ScriptError>;

    /// Informational description, shown on hover where the toolkit
    /// supports it.
    fn description(&self) -> String {
        String::new()
    }
}

/// Export script types for dynamic loading.
///
/// One unit may export several script types; each becomes its own entry
/// in the host registry, all sharing the unit's origin path.
///
/// # Usage
///
/// ```ignore
/// pictor_script_api::export_scripts!(Upscale, Outpaint);
/// ```
///
/// # Generated Functions
///
/// - `_pictor_script_api_version()`: Returns the API version
/// - `_pictor_script_count()`: Returns how many script types the unit exports
/// - `_pictor_script_create(index)`: Creates an instance of the index-th type,
///   returned as a thinned `Box<Box<dyn Script>>`; null if out of range
/// - `_pictor_script_destroy(ptr)`: Destroys an instance created above
#[macro_export]
macro_rules! export_scripts {
    ($($script:ty),+ $(,)?) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _pictor_script_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _pictor_script_count() -> usize {
            [$(stringify!($script)),+].len()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _pictor_script_create(index: usize) -> *mut ::std::ffi::c_void {
            let factories: &[fn() -> Box<dyn $crate::Script>] = &[
                $(|| Box::new(<$script>::default()) as Box<dyn $crate::Script>),+
            ];
            match factories.get(index) {
                Some(factory) => {
                    let script: Box<Box<dyn $crate::Script>> = Box::new(factory());
                    Box::into_raw(script) as *mut ::std::ffi::c_void
                }
                None => ::std::ptr::null_mut(),
            }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _pictor_script_destroy(ptr: *mut ::std::ffi::c_void) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr as *mut Box<dyn $crate::Script>));
                }
            }
        }
    };
}
