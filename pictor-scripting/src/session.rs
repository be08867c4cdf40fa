//! ScriptSession - per-surface script instances and argument-slot layout
//!
//! A session is built once per surface from the shared registry. Build
//! instantiates every applicable script, asks each for its controls,
//! and packs them into one flat argument vector:
//!
//! ```text
//! [selector] [script 0 controls..] [script 1 controls..] ... [restraints]
//! ```
//!
//! The resulting [`SessionLayout`] records each script's half-open slot
//! range. It is computed once, never mutated, and shared with both the
//! control toolkit (for visibility updates) and the dispatcher (for
//! argument slicing).

use std::path::{Path, PathBuf};

use pictor_script_api::{Control, Restraints, Script, Surface};
use serde_json::Value;

use crate::invoker::safe_call;
use crate::registry::ScriptRegistry;

/// Builds the two controls the host itself contributes to a surface.
///
/// Everything else the toolkit renders comes from the scripts; the host
/// only needs a selector dropdown and a hidden text slot for the
/// restraint payload.
pub trait ControlFactory {
    /// Build the selector. `choices[0]` is always `"None"` and is the
    /// initial selection.
    fn selector(&self, choices: Vec<String>) -> Box<dyn Control>;

    /// Build the hidden trailing control carrying `value`.
    fn hidden_text(&self, value: &str) -> Box<dyn Control>;
}

/// One script's half-open range in the shared argument vector.
///
/// `end - start` is the number of controls the script contributed;
/// zero-control scripts have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSlot {
    /// Index of the owning script within the session.
    pub script: usize,
    /// First argument position belonging to the script.
    pub start: usize,
    /// One past the last argument position belonging to the script.
    pub end: usize,
}

/// The computed-once slot layout of one surface's argument vector.
///
/// Slots are contiguous, non-overlapping, in discovery order, and sit
/// between the leading selector and the trailing restraint slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    slots: Vec<ArgSlot>,
    len: usize,
}

impl SessionLayout {
    /// Position of the selector in the argument vector.
    pub const SELECTOR: usize = 0;

    /// Per-script slots, in session order.
    pub fn slots(&self) -> &[ArgSlot] {
        &self.slots
    }

    /// Total length of the argument vector, selector and restraint
    /// slot included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// A built layout always holds at least the selector and the
    /// restraint slot.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of the trailing restraint slot.
    pub fn restraint_slot(&self) -> usize {
        self.len - 1
    }

    /// Resolve a 1-based selector value to its slot.
    ///
    /// `0` and anything out of range mean "nothing selected".
    pub fn slot(&self, selector: i64) -> Option<&ArgSlot> {
        if selector < 1 {
            return None;
        }
        self.slots.get(selector as usize - 1)
    }
}

/// A live script instance retained by a session.
pub struct ScriptInstance {
    script: Box<dyn Script>,
    origin: PathBuf,
    title: String,
}

impl ScriptInstance {
    /// Path of the unit this instance came from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Display title, already resolved through the fallback policy.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Run the script against the pipeline with its argument slice.
    pub fn run(
        &mut self,
        ctx: &mut pictor_script_api::ScriptContext,
        args: &[Value],
    ) -> Result<Option<pictor_script_api::Processed>, pictor_script_api::ScriptError> {
        self.script.run(ctx, args)
    }
}

/// The controls and layout produced by a session build, handed to the
/// control toolkit.
pub struct BuiltSurface {
    /// All controls in argument-vector order: selector first, then each
    /// script's controls, then the restraint slot. Script controls are
    /// tagged with their unit's file name and start hidden.
    pub controls: Vec<Box<dyn Control>>,
    /// The slot layout matching `controls`.
    pub layout: SessionLayout,
}

/// Output of the selection rule, applied by the toolkit before repaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUpdate {
    /// Visibility per control position, covering every control except
    /// the trailing restraint slot. Position 0 (the selector) is always
    /// visible.
    pub visible: Vec<bool>,
    /// New JSON payload for the trailing restraint slot.
    pub restraints_json: String,
}

/// Per-surface script instances, in registry discovery order.
pub struct ScriptSession {
    surface: Surface,
    scripts: Vec<ScriptInstance>,
}

impl ScriptSession {
    /// Build a session for one surface.
    ///
    /// Scripts that declare themselves unavailable on the surface are
    /// dropped; the rest are retained in discovery order, which stays
    /// the session's ordering for its whole lifetime. Declaration-time
    /// failures (title, controls, availability) are absorbed per script
    /// via [`safe_call`]: a failing script still occupies its selector
    /// choice, with a fallback title and zero argument slots.
    pub fn build(
        registry: &ScriptRegistry,
        surface: Surface,
        toolkit: &dyn ControlFactory,
    ) -> (Self, BuiltSurface) {
        let mut scripts = Vec::new();
        for descriptor in registry.iter() {
            let script = descriptor.instantiate();
            let available = safe_call(descriptor.origin(), "available_on", true, || {
                script.available_on(surface)
            });
            if !available {
                continue;
            }

            let title = safe_call(descriptor.origin(), "title", None, || Some(script.title()))
                .unwrap_or_else(|| format!("{} [error]", descriptor.origin().display()));

            scripts.push(ScriptInstance {
                script,
                origin: descriptor.origin().to_path_buf(),
                title,
            });
        }

        let choices = std::iter::once("None".to_string())
            .chain(scripts.iter().map(|s| s.title.clone()))
            .collect();
        let mut controls: Vec<Box<dyn Control>> = vec![toolkit.selector(choices)];

        let mut slots = Vec::with_capacity(scripts.len());
        for (index, instance) in scripts.iter().enumerate() {
            let start = controls.len();
            let declared = safe_call(&instance.origin, "controls", None, || {
                instance.script.controls(surface)
            });
            if let Some(declared) = declared {
                let label = origin_label(&instance.origin);
                for mut control in declared {
                    control.set_origin_label(&label);
                    control.set_visible(false);
                    controls.push(control);
                }
            }
            slots.push(ArgSlot {
                script: index,
                start,
                end: controls.len(),
            });
        }

        // Nothing is selected yet, so the payload starts empty.
        controls.push(toolkit.hidden_text("{}"));

        let layout = SessionLayout {
            slots,
            len: controls.len(),
        };

        (
            Self { surface, scripts },
            BuiltSurface { controls, layout },
        )
    }

    /// The selection rule: recompute control visibility and the
    /// restraint payload for a new selector value.
    ///
    /// `selector` is 1-based; `0` or anything out of range selects
    /// nothing, hiding every script control. The toolkit applies the
    /// returned update before repainting.
    pub fn select(&self, layout: &SessionLayout, selector: i64) -> SelectionUpdate {
        let slot = layout.slot(selector);

        let visible = (0..layout.len() - 1)
            .map(|position| {
                position == SessionLayout::SELECTOR
                    || slot.is_some_and(|s| s.start <= position && position < s.end)
            })
            .collect();

        let restraints_json = match slot.and_then(|s| self.scripts.get(s.script)) {
            Some(instance) => {
                let restraints = safe_call(&instance.origin, "restraints", Restraints::new(), || {
                    instance.script.restraints()
                });
                serde_json::to_string(&restraints).unwrap_or_else(|_| "{}".to_string())
            }
            None => "{}".to_string(),
        };

        SelectionUpdate {
            visible,
            restraints_json,
        }
    }

    /// The surface this session was built for.
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Retained instances, in discovery order.
    pub fn scripts(&self) -> &[ScriptInstance] {
        &self.scripts
    }

    pub(crate) fn instance_mut(&mut self, index: usize) -> Option<&mut ScriptInstance> {
        self.scripts.get_mut(index)
    }
}

/// Label script controls with the file name of their unit.
fn origin_label(origin: &Path) -> String {
    origin
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| origin.display().to_string())
}
