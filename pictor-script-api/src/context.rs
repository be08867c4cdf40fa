//! ScriptContext - the processing-pipeline state handed to a running script

use serde_json::Value;
use std::sync::Arc;

use crate::types::Surface;

/// Shared progress counter owned by the surrounding pipeline.
///
/// The host clears it after a script run completes; it never reads it.
/// Concurrent access, if any, is the pipeline's concern.
pub trait ProgressCounter: Send + Sync {
    /// Reset the counter to its idle state.
    fn clear(&self);
}

/// The pipeline state passed into [`Script::run`](crate::Script::run).
///
/// The scripting host treats the request parameters as opaque: it hands
/// the context to the selected script unmodified. The progress counter
/// is the one field the host itself touches, clearing it once after a
/// successful run.
pub struct ScriptContext {
    surface: Surface,
    /// Pipeline request parameters, opaque to the host.
    params: Value,
    progress: Option<Arc<dyn ProgressCounter>>,
}

impl ScriptContext {
    /// Create a context for one invocation on the given surface.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            params: Value::Null,
            progress: None,
        }
    }

    /// Attach the pipeline's request parameters.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Attach the pipeline's shared progress counter.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCounter>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The surface this invocation came from.
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// The pipeline request parameters.
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Mutable access to the request parameters, for scripts that
    /// rewrite the request before the pipeline consumes it.
    pub fn params_mut(&mut self) -> &mut Value {
        &mut self.params
    }

    /// Clear the shared progress counter, if one is attached.
    pub fn clear_progress(&self) {
        if let Some(progress) = &self.progress {
            progress.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProgress {
        clears: AtomicUsize,
    }

    impl ProgressCounter for CountingProgress {
        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_context_defaults() {
        let ctx = ScriptContext::new(Surface::Generation);
        assert_eq!(ctx.surface(), Surface::Generation);
        assert!(ctx.params().is_null());
    }

    #[test]
    fn test_clear_progress_without_counter_is_noop() {
        let ctx = ScriptContext::new(Surface::Editing);
        ctx.clear_progress();
    }

    #[test]
    fn test_clear_progress_forwards_to_counter() {
        let progress = Arc::new(CountingProgress {
            clears: AtomicUsize::new(0),
        });
        let ctx = ScriptContext::new(Surface::Generation).with_progress(progress.clone());

        ctx.clear_progress();
        ctx.clear_progress();
        assert_eq!(progress.clears.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_params_mutation() {
        let mut ctx = ScriptContext::new(Surface::Generation)
            .with_params(serde_json::json!({"steps": 20}));
        *ctx.params_mut() = serde_json::json!({"steps": 30});
        assert_eq!(ctx.params()["steps"], 30);
    }
}
