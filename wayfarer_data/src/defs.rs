use serde::{Deserialize, Serialize};

use crate::Verb;

/// Definition of one command: its verb, alias phrases and argument bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDef {
    pub verb: Verb,
    /// Alternative phrases; each may span several words ("pick up").
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub min_args: usize,
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    /// Hint for hosts that the command should be confirmed before running.
    #[serde(default)]
    pub risky: bool,
}

fn default_max_args() -> usize {
    1
}

impl CommandDef {
    pub fn new(verb: Verb, aliases: &[&str], min_args: usize, max_args: usize) -> Self {
        Self {
            verb,
            aliases: aliases.iter().map(|alias| (*alias).to_string()).collect(),
            min_args,
            max_args,
            risky: false,
        }
    }

    #[must_use]
    pub fn risky(mut self) -> Self {
        self.risky = true;
        self
    }
}

/// Wrapper for a TOML command table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTableDef {
    #[serde(default)]
    pub commands: Vec<CommandDef>,
}

/// Snapshot of the game state the parser resolves references against.
///
/// Supplied fresh by the host for every parse call; the parser never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseContext {
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default)]
    pub nearby: Vec<String>,
    #[serde(default)]
    pub directions: Vec<String>,
    #[serde(default)]
    pub last_entity: Option<String>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_inventory<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.inventory = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_nearby<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.nearby = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_directions<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.directions = dirs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_last_entity(mut self, entity: impl Into<String>) -> Self {
        self.last_entity = Some(entity.into());
        self
    }
}
