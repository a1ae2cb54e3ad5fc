use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every command the interpreter can produce.
///
/// The set is closed: hosts dispatch on the variant itself rather than on a
/// handler string, and a command table can only re-alias or re-bound verbs
/// that exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Go,
    Take,
    Drop,
    Use,
    Inspect,
    Craft,
    Eat,
    Drink,
    Sleep,
    Rest,
    Inventory,
    Look,
    BuildFire,
    Help,
}

/// Broad category of a parsed intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Changes the game state (move, take, craft...).
    Command,
    /// Only reports on the game state (inventory, look).
    Query,
    Help,
    #[default]
    Unknown,
}

impl Verb {
    pub const ALL: [Verb; 14] = [
        Verb::Go,
        Verb::Take,
        Verb::Drop,
        Verb::Use,
        Verb::Inspect,
        Verb::Craft,
        Verb::Eat,
        Verb::Drink,
        Verb::Sleep,
        Verb::Rest,
        Verb::Inventory,
        Verb::Look,
        Verb::BuildFire,
        Verb::Help,
    ];

    /// Canonical name, as written in command tables and canonical command strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Go => "go",
            Verb::Take => "take",
            Verb::Drop => "drop",
            Verb::Use => "use",
            Verb::Inspect => "inspect",
            Verb::Craft => "craft",
            Verb::Eat => "eat",
            Verb::Drink => "drink",
            Verb::Sleep => "sleep",
            Verb::Rest => "rest",
            Verb::Inventory => "inventory",
            Verb::Look => "look",
            Verb::BuildFire => "build_fire",
            Verb::Help => "help",
        }
    }

    pub fn kind(self) -> IntentKind {
        match self {
            Verb::Inventory | Verb::Look => IntentKind::Query,
            Verb::Help => IntentKind::Help,
            _ => IntentKind::Command,
        }
    }

    /// Verbs whose arguments are resolved against nearby and carried entities.
    pub fn takes_target(self) -> bool {
        matches!(
            self,
            Verb::Take | Verb::Drop | Verb::Use | Verb::Inspect | Verb::Craft | Verb::Eat | Verb::Drink
        )
    }

    /// Verbs that can offer live-context choices when their target is missing.
    pub fn needs_interactive_target(self) -> bool {
        matches!(self, Verb::Take | Verb::Drop | Verb::Use | Verb::Inspect)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVerb(pub String);

impl fmt::Display for UnknownVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown verb '{}'", self.0)
    }
}

impl std::error::Error for UnknownVerb {}

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == wanted)
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}
