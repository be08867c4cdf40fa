//! Dispatcher - routes an assembled argument vector to the selected script

use pictor_script_api::{Processed, ScriptContext};
use serde_json::Value;

use crate::error::DispatchError;
use crate::session::{ScriptSession, SessionLayout};

/// Resolves the selector, slices out the selected script's arguments,
/// and invokes it.
///
/// Holds the layout the session was built with, by value; script
/// instances themselves carry no range state.
pub struct Dispatcher {
    layout: SessionLayout,
}

impl Dispatcher {
    /// Create a dispatcher for one session's layout.
    pub fn new(layout: SessionLayout) -> Self {
        Self { layout }
    }

    /// The layout this dispatcher slices with.
    pub fn layout(&self) -> &SessionLayout {
        &self.layout
    }

    /// Invoke the script selected by `args[0]`.
    ///
    /// A selector of `0` means "no script": nothing runs and `Ok(None)`
    /// comes back, so processing continues without a script side effect.
    /// Any other value must resolve to a retained script; failing that
    /// is a host desynchronization bug reported as a typed error, never
    /// silently folded to "no selection".
    ///
    /// `run` failures propagate unmodified - the invocation caller owns
    /// surfacing them to the user. On success the pipeline's shared
    /// progress counter is cleared, exactly once.
    pub fn dispatch(
        &self,
        session: &mut ScriptSession,
        ctx: &mut ScriptContext,
        args: &[Value],
    ) -> Result<Option<Processed>, DispatchError> {
        let selector = args
            .first()
            .and_then(Value::as_i64)
            .ok_or(DispatchError::MalformedSelector)?;

        if selector == 0 {
            return Ok(None);
        }

        let count = self.layout.slots().len();
        let Some(slot) = self.layout.slot(selector).copied() else {
            tracing::error!(selector, count, "Selector out of range at dispatch");
            return Err(DispatchError::SelectorOutOfRange {
                index: selector,
                count,
            });
        };

        let slice = args
            .get(slot.start..slot.end)
            .ok_or_else(|| {
                tracing::error!(
                    start = slot.start,
                    end = slot.end,
                    len = args.len(),
                    "Argument vector shorter than layout"
                );
                DispatchError::ArgumentsOutOfRange {
                    start: slot.start,
                    end: slot.end,
                    len: args.len(),
                }
            })?;

        let script_count = session.scripts().len();
        let Some(instance) = session.instance_mut(slot.script) else {
            tracing::error!(
                script = slot.script,
                count = script_count,
                "Layout does not match session"
            );
            return Err(DispatchError::LayoutMismatch {
                script: slot.script,
                count: script_count,
            });
        };

        let processed = instance.run(ctx, slice)?;
        ctx.clear_progress();
        Ok(processed)
    }
}
