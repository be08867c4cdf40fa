//! pictor-scripting: Script host for the pictor processing pipeline
//!
//! This crate discovers script units at startup, builds per-surface
//! sessions from them, and routes invocations to the selected script:
//!
//! - [`ScriptRegistry`]: discovery and the process-wide descriptor list
//! - [`UnitLoader`] / [`DylibLoader`]: the boundary turning a file into scripts
//! - [`ScriptSession`]: per-surface instances, argument-slot layout, and
//!   the selection rule driving control visibility
//! - [`Dispatcher`]: argument slicing and invocation at run time
//! - [`safe_call`]: fallback-with-logging for declaration-time script calls
//!
//! # Argument vector
//!
//! Each surface shares one flat argument vector with the control
//! toolkit. Its layout is fixed at session build and never reordered:
//!
//! ```text
//! [selector] [script 0 controls..] [script 1 controls..] ... [restraints]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pictor_script_api::{ScriptContext, Surface};
//! use pictor_scripting::{Dispatcher, DylibLoader, ScriptRegistry, ScriptSession};
//!
//! let registry = ScriptRegistry::discover("scripts".as_ref(), &DylibLoader);
//! let (mut session, built) =
//!     ScriptSession::build(&registry, Surface::Generation, &toolkit);
//! let dispatcher = Dispatcher::new(built.layout);
//!
//! // On selector change, before repaint:
//! let update = session.select(dispatcher.layout(), selected_index);
//!
//! // On invocation:
//! let mut ctx = ScriptContext::new(Surface::Generation);
//! let processed = dispatcher.dispatch(&mut session, &mut ctx, &args)?;
//! ```

pub mod dispatch;
pub mod error;
pub mod invoker;
pub mod loader;
pub mod registry;
pub mod session;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, LoadError};
pub use invoker::safe_call;
pub use loader::{DylibLoader, UnitLoader};
pub use registry::{ScriptDescriptor, ScriptFactory, ScriptRegistry};
pub use session::{
    ArgSlot, BuiltSurface, ControlFactory, ScriptInstance, ScriptSession, SelectionUpdate,
    SessionLayout,
};
