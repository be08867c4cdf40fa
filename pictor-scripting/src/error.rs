//! Script host error types

use thiserror::Error;

/// Errors from loading one script unit.
///
/// Discovery treats any of these as "this file contributes nothing":
/// the error is logged and the scan continues with the next file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to load the unit as a dynamic library
    #[error("Failed to load script library: {0}")]
    Library(#[from] libloading::Error),

    /// API version mismatch between the host and the unit
    #[error("API version mismatch: host expects {expected}, unit has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// The unit does not follow the expected format
    #[error("Malformed script unit: {0}")]
    Malformed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from dispatching an invocation to a script.
///
/// Everything except `Script` indicates a host bug: the argument vector
/// handed to the dispatcher does not match the layout the session was
/// built with. `Script` carries a failure from the script's own `run`
/// and must be surfaced to the user by the invocation caller.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The selector slot is missing or does not hold an integer
    #[error("Selector slot is missing or not an integer")]
    MalformedSelector,

    /// The selector resolves outside the retained script list
    #[error("Selector index {index} out of range for {count} scripts")]
    SelectorOutOfRange { index: i64, count: usize },

    /// The selected script's argument range exceeds the argument vector
    #[error("Argument range {start}..{end} out of bounds for {len} arguments")]
    ArgumentsOutOfRange {
        start: usize,
        end: usize,
        len: usize,
    },

    /// The layout references a script the session does not hold
    #[error("Layout references script {script} but session holds {count}")]
    LayoutMismatch { script: usize, count: usize },

    /// The script's `run` failed
    #[error(transparent)]
    Script(#[from] pictor_script_api::ScriptError),
}
