use serde::{Deserialize, Serialize};

use crate::{IntentKind, Verb};

/// Unit attached to a parsed [`Quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    Count,
    Hours,
    Minutes,
    All,
    Some,
}

/// A numeric (or symbolic) amount pulled out of the input.
///
/// `count` is -1 for "all" and 0 for "some".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub raw: String,
    pub count: i64,
    pub unit: QuantityUnit,
}

impl Quantity {
    pub const ALL: i64 = -1;
    pub const SOME: i64 = 0;

    pub fn is_all(&self) -> bool {
        self.unit == QuantityUnit::All
    }
}

/// Open-ended stopping condition for travel ("until dark").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelCondition {
    #[default]
    None,
    Dark,
    Tired,
}

impl TravelCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelCondition::None => "none",
            TravelCondition::Dark => "dark",
            TravelCondition::Tired => "tired",
        }
    }
}

/// How far or how long a movement command should go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementScale {
    #[serde(default)]
    pub distance_meters: Option<u32>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub tiles: Option<u32>,
    #[serde(default)]
    pub condition: TravelCondition,
}

impl MovementScale {
    pub fn is_empty(&self) -> bool {
        self.distance_meters.is_none()
            && self.duration_minutes.is_none()
            && self.tiles.is_none()
            && self.condition == TravelCondition::None
    }
}

/// The kind of answer a clarification is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    /// A compass or context direction.
    Direction,
    /// A distance, duration, tile count or stopping condition.
    Extent,
    /// One of the offered options.
    Choice,
    /// Free text naming the thing to act on.
    Target,
}

impl MissingField {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingField::Direction => "direction",
            MissingField::Extent => "extent",
            MissingField::Choice => "choice",
            MissingField::Target => "target",
        }
    }
}

/// A question the host should put to the player before acting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClarifyQuestion {
    pub prompt: String,
    /// Ranked candidate intents; empty for a plain informational prompt.
    #[serde(default)]
    pub options: Vec<Intent>,
    /// Fields the answer is expected to supply, in asking order.
    #[serde(default)]
    pub missing: Vec<MissingField>,
}

impl ClarifyQuestion {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: Vec::new(),
            missing: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<Intent>) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn expecting(mut self, missing: Vec<MissingField>) -> Self {
        self.missing = missing;
        self
    }
}

/// The structured result of interpreting one line of player input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub raw: String,
    pub normalized: String,
    pub kind: IntentKind,
    pub verb: Option<Verb>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub movement: Option<MovementScale>,
    pub confidence: f64,
    #[serde(default)]
    pub clarify: Option<ClarifyQuestion>,
    /// Set by the host once the player has confirmed a risky action.
    #[serde(default)]
    pub risk_confirmed: bool,
}

impl Intent {
    /// An intent that could not be mapped to any verb.
    pub fn unresolved(raw: &str, normalized: &str) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: normalized.to_string(),
            ..Self::default()
        }
    }

    /// A bare intent for `verb` carrying `args`, used for clarification options.
    pub fn for_verb(verb: Verb, args: Vec<String>, confidence: f64) -> Self {
        let mut normalized = verb.as_str().replace('_', " ");
        for arg in &args {
            normalized.push(' ');
            normalized.push_str(arg);
        }
        Self {
            raw: normalized.clone(),
            normalized,
            kind: verb.kind(),
            verb: Some(verb),
            args,
            confidence,
            ..Self::default()
        }
    }

    /// True when the intent names a verb and needs nothing more from the player.
    pub fn is_resolved(&self) -> bool {
        self.verb.is_some() && self.clarify.is_none()
    }

    pub fn needs_clarification(&self) -> bool {
        self.clarify.is_some()
    }

    #[must_use]
    pub fn confirm_risk(mut self) -> Self {
        self.risk_confirmed = true;
        self
    }
}

/// Bookkeeping a host keeps between a clarification and the player's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingIntent {
    pub kind: IntentKind,
    pub verb: Verb,
    #[serde(default)]
    pub filled_args: Vec<String>,
    pub missing: Vec<MissingField>,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<Intent>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub movement: Option<MovementScale>,
    /// How many answers were rejected so far.
    #[serde(default)]
    pub attempts: u32,
}

impl PendingIntent {
    /// Capture the unfinished parts of a clarified intent.
    ///
    /// Returns `None` for intents that are not tied to a verb or whose
    /// clarification does not wait on any specific field.
    pub fn from_intent(intent: &Intent) -> Option<Self> {
        let verb = intent.verb?;
        let clarify = intent.clarify.as_ref()?;
        if clarify.missing.is_empty() {
            return None;
        }
        Some(Self {
            kind: intent.kind,
            verb,
            filled_args: intent.args.clone(),
            missing: clarify.missing.clone(),
            prompt: clarify.prompt.clone(),
            options: clarify.options.clone(),
            quantity: intent.quantity.clone(),
            movement: intent.movement.clone(),
            attempts: 0,
        })
    }

    /// The field the next answer should fill.
    pub fn next_missing(&self) -> Option<MissingField> {
        self.missing.first().copied()
    }
}
