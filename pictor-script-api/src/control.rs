//! Control - the capability surface the host needs from toolkit widgets
//!
//! The graphical toolkit owns rendering, layout, and change events. The
//! scripting host only needs three things from a control: a visibility
//! flag, a current value, and an origin label for diagnostics. Anything
//! a toolkit widget can do beyond that is invisible to the host.

use serde_json::Value;

/// A toolkit control as seen by the scripting host.
///
/// Scripts create controls with whatever toolkit the host embeds and
/// return them from [`Script::controls`](crate::Script::controls); the
/// host tags and hides them during session build and addresses them only
/// by position afterwards.
pub trait Control {
    /// Whether the control is currently shown.
    fn visible(&self) -> bool;

    /// Show or hide the control.
    fn set_visible(&mut self, visible: bool);

    /// The control's current value.
    fn value(&self) -> Value;

    /// Replace the control's value.
    fn set_value(&mut self, value: Value);

    /// Label identifying which script unit contributed this control.
    fn origin_label(&self) -> Option<&str>;

    /// Tag the control with its contributing script unit.
    fn set_origin_label(&mut self, label: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_trait_is_object_safe() {
        fn _takes_boxed_control(_: Box<dyn Control>) {}
    }
}
