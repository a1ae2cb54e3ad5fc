#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Wayfarer **
//! Command interpreter for a wilderness survival game: turns free-form player
//! text into scored intents, and asks before acting on anything uncertain.

pub const WAYFARER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core pipeline
pub mod infer;
pub mod matching;
pub mod normalize;
pub mod parser;
pub mod pending;
pub mod policy;
pub mod quantity;
pub mod registry;
pub mod resolve;

// Host support
pub mod data_paths;
pub mod loader;
pub mod repl;
pub mod style;

// Re-exports for convenience
pub use loader::{load_command_table, load_context, load_registry};
pub use normalize::{normalize, tokenize};
pub use parser::{Parser, intent_to_command_string};
pub use pending::AnswerOutcome;
pub use registry::{Registry, RegistryError};
pub use repl::run_repl;
pub use wayfarer_data::{
    ClarifyQuestion, CommandDef, Intent, IntentKind, MissingField, MovementScale, ParseContext, PendingIntent,
    Quantity, QuantityUnit, TravelCondition, Verb,
};
