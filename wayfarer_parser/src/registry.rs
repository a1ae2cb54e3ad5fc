//! Command registry and phrase matching
//!
//! Every registered command expands into phrase entries: its canonical name
//! plus each alias, each phrase tokenized on its own. Player input is matched
//! against the start of the token stream exactly, by alias prefix, or with a
//! few typos, and the candidates are ranked deterministically.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::{debug, trace, warn};
use thiserror::Error;
use variantly::Variantly;
use wayfarer_data::{CommandDef, CommandTableDef, Verb, validate_commands};

use crate::matching::{edit_distance, edit_limit};
use crate::normalize::{normalize, tokenize};
use crate::policy::{MATCH_FLOOR, MAX_OPTIONS};

pub const CANONICAL_SCORE: f64 = 1.0;
pub const ALIAS_SCORE: f64 = 0.97;
pub const ALIAS_PREFIX_SCORE: f64 = 0.9;
const FUZZY_BASE: f64 = 0.72;
const FUZZY_STEP: f64 = 0.08;
const FUZZY_IN_INPUT_BONUS: f64 = 0.04;
const FUZZY_ALIAS_BONUS: f64 = 0.03;

/// Built-in command table: verb, aliases, min args, max args.
const DEFAULT_COMMANDS: &[(Verb, &[&str], usize, usize)] = &[
    (Verb::Go, &["walk", "head", "travel", "move", "hike", "run"], 0, 1),
    (Verb::Take, &["pick up", "pickup", "grab", "get", "collect", "gather"], 1, 2),
    (Verb::Drop, &["discard", "put down", "toss", "throw away"], 1, 2),
    (Verb::Use, &["apply", "activate", "operate"], 1, 3),
    (Verb::Inspect, &["examine", "x", "study"], 1, 1),
    (Verb::Craft, &["make", "build", "assemble"], 1, 3),
    (Verb::Eat, &["consume", "devour"], 0, 1),
    (Verb::Drink, &["sip"], 0, 1),
    (Verb::Sleep, &["nap", "doze"], 0, 0),
    (Verb::Rest, &["wait", "relax"], 0, 0),
    (Verb::Inventory, &["inv", "bag", "pack", "items"], 0, 0),
    (Verb::Look, &["l", "survey", "look around"], 0, 0),
    (
        Verb::BuildFire,
        &[
            "make fire",
            "light fire",
            "start fire",
            "campfire",
            "build a fire",
            "make a fire",
            "start a fire",
            "light a fire",
        ],
        0,
        0,
    ),
    (Verb::Help, &["h", "commands"], 0, 0),
];

/// Errors raised when a command table cannot be applied.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("command table failed validation:\n{0}")]
    Invalid(String),
}

/// One matchable phrase belonging to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseEntry {
    pub verb: Verb,
    /// Normalized phrase text ("pick up").
    pub text: String,
    pub tokens: Vec<String>,
    /// True for the verb's own name, false for aliases.
    pub canonical: bool,
}

/// How a phrase matched the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Variantly)]
pub enum MatchKind {
    Exact,
    Prefix,
    Fuzzy,
}

/// A scored command candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMatch {
    pub verb: Verb,
    pub score: f64,
    /// Input tokens covered by the phrase.
    pub consumed: usize,
    pub phrase: String,
    pub kind: MatchKind,
}

/// Best command candidate plus ranked runners-up (one per verb).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchOutcome {
    pub best: Option<CommandMatch>,
    pub alternates: Vec<CommandMatch>,
}

/// Registered commands and their flattened phrase list.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    defs: BTreeMap<Verb, CommandDef>,
    phrases: Vec<PhraseEntry>,
}

impl Registry {
    /// A registry with no commands at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in survival command set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for (verb, aliases, min, max) in DEFAULT_COMMANDS {
            registry.register(CommandDef::new(*verb, aliases, *min, *max));
        }
        registry
    }

    /// Register a command, replacing any previous definition of the same verb.
    pub fn register(&mut self, mut def: CommandDef) {
        def.aliases = def
            .aliases
            .iter()
            .filter_map(|alias| {
                let normalized = normalize(alias);
                if normalized.is_empty() {
                    warn!("dropping alias '{alias}' for '{}': nothing left after normalizing", def.verb);
                    None
                } else {
                    Some(normalized)
                }
            })
            .collect();
        if let Some(previous) = self.defs.insert(def.verb, def) {
            debug!("command '{}' re-registered, previous definition replaced", previous.verb);
        }
        self.rebuild_phrases();
    }

    /// Validate a command table and register every command in it.
    ///
    /// # Errors
    /// Returns `RegistryError::Invalid` listing every problem when the table
    /// fails validation; the registry is left untouched in that case.
    pub fn apply_table(&mut self, table: &CommandTableDef) -> Result<(), RegistryError> {
        let errors = validate_commands(table);
        if !errors.is_empty() {
            let details = errors
                .into_iter()
                .map(|err| format!("- {err}"))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(RegistryError::Invalid(details));
        }
        for def in &table.commands {
            self.register(def.clone());
        }
        debug!("{} commands applied from table", table.commands.len());
        Ok(())
    }

    pub fn get(&self, verb: Verb) -> Option<&CommandDef> {
        self.defs.get(&verb)
    }

    pub fn is_registered(&self, verb: Verb) -> bool {
        self.defs.contains_key(&verb)
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDef> {
        self.defs.values()
    }

    pub fn phrases(&self) -> &[PhraseEntry] {
        &self.phrases
    }

    fn rebuild_phrases(&mut self) {
        self.phrases.clear();
        for def in self.defs.values() {
            let canonical = normalize(def.verb.as_str());
            self.phrases.push(PhraseEntry {
                verb: def.verb,
                tokens: tokenize(&canonical),
                text: canonical.clone(),
                canonical: true,
            });
            for alias in &def.aliases {
                let duplicate = self.phrases.iter().any(|p| p.verb == def.verb && &p.text == alias);
                if duplicate {
                    continue;
                }
                self.phrases.push(PhraseEntry {
                    verb: def.verb,
                    tokens: tokenize(alias),
                    text: alias.clone(),
                    canonical: false,
                });
            }
        }
        trace!("registry rebuilt with {} phrases", self.phrases.len());
    }

    /// Match the start of `tokens` against every phrase.
    ///
    /// `normalized` is the whole normalized input, used for the fuzzy
    /// "phrase appears somewhere" bonus. A best score under the match floor
    /// counts as no match.
    pub fn match_command(&self, tokens: &[String], normalized: &str) -> MatchOutcome {
        let Some(first) = tokens.first() else {
            return MatchOutcome::default();
        };

        let mut per_verb: BTreeMap<Verb, CommandMatch> = BTreeMap::new();
        for entry in &self.phrases {
            let Some(candidate) = score_phrase(entry, tokens, first, normalized) else {
                continue;
            };
            match per_verb.get(&entry.verb) {
                Some(existing) if compare_matches(&candidate, existing) != Ordering::Less => {},
                _ => {
                    per_verb.insert(entry.verb, candidate);
                },
            }
        }

        let mut ranked: Vec<CommandMatch> = per_verb
            .into_values()
            .filter(|candidate| candidate.score >= MATCH_FLOOR)
            .collect();
        ranked.sort_by(compare_matches);

        let mut ranked = ranked.into_iter();
        let best = ranked.next();
        let alternates = ranked.take(MAX_OPTIONS).collect();
        if let Some(best) = &best {
            debug!(
                "matched '{}' via {:?} phrase '{}' (score {:.2}, {} token(s))",
                best.verb, best.kind, best.phrase, best.score, best.consumed
            );
        }
        MatchOutcome { best, alternates }
    }
}

fn score_phrase(entry: &PhraseEntry, tokens: &[String], first: &str, normalized: &str) -> Option<CommandMatch> {
    let k = entry.tokens.len();
    let build = |score: f64, consumed: usize, kind: MatchKind| CommandMatch {
        verb: entry.verb,
        score,
        consumed,
        phrase: entry.text.clone(),
        kind,
    };

    if tokens.len() >= k && tokens[..k] == entry.tokens[..] {
        let score = if entry.canonical { CANONICAL_SCORE } else { ALIAS_SCORE };
        return Some(build(score, k, MatchKind::Exact));
    }

    if !entry.canonical && k == 1 && entry.text.len() >= 2 && first.starts_with(entry.text.as_str()) {
        return Some(build(ALIAS_PREFIX_SCORE, 1, MatchKind::Prefix));
    }

    if tokens.len() < k {
        return None;
    }
    let limit = edit_limit(entry.text.chars().count());
    if limit == 0 {
        return None;
    }
    let joined = tokens[..k].join(" ");
    let distance = edit_distance(&joined, &entry.text);
    if distance > limit {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mut score = FUZZY_BASE - FUZZY_STEP * distance as f64;
    if normalized.contains(entry.text.as_str()) {
        score += FUZZY_IN_INPUT_BONUS;
    }
    if !entry.canonical {
        score += FUZZY_ALIAS_BONUS;
    }
    Some(build(score, k, MatchKind::Fuzzy))
}

/// Score descending, tokens consumed descending, canonical name ascending.
fn compare_matches(a: &CommandMatch, b: &CommandMatch) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.consumed.cmp(&a.consumed))
        .then_with(|| a.verb.as_str().cmp(b.verb.as_str()))
}
