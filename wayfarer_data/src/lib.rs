//! Shared data model for the Wayfarer command interpreter.

pub mod defs;
pub mod intent;
pub mod validate;
pub mod verb;

pub use defs::*;
pub use intent::*;
pub use validate::{ValidationError, validate_commands};
pub use verb::{IntentKind, UnknownVerb, Verb};
