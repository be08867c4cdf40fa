//! Shared script types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A UI surface the host can build a script session for.
///
/// Scripts may declare different controls per surface, or opt out of a
/// surface entirely via [`Script::available_on`](crate::Script::available_on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// The generation surface (prompt-to-image).
    Generation,
    /// The editing surface (image-to-image).
    Editing,
}

impl Surface {
    /// Stable name, used in element-id prefixes and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Generation => "generation",
            Surface::Editing => "editing",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint hints a script imposes on other UI state while it is
/// selected, e.g. `{"methods": ["Euler", "DDIM"]}`.
///
/// The host serializes this mapping as-is; it does not interpret or
/// validate the keys.
pub type Restraints = BTreeMap<String, Vec<String>>;

/// Output of a script run, as produced by the processing pipeline.
///
/// Opaque to the host: the pipeline that invoked the session consumes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Processed {
    /// Pipeline-defined result payload.
    pub output: serde_json::Value,
}

impl Processed {
    /// Wrap a pipeline result payload.
    pub fn new(output: serde_json::Value) -> Self {
        Self { output }
    }
}
