//! Free-text inference
//!
//! Fallback heuristics for input that no registered phrase starts with.
//! Rules run in order over the normalized words and the first one that fires
//! decides the verb; the words it leaves over go through the same argument
//! resolution as a registry match.

use lazy_static::lazy_static;
use log::debug;
use wayfarer_data::{ParseContext, Verb};

use crate::normalize::words;
use crate::resolve::{direction_word, known_directions};

/// A verb guessed from free text.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub verb: Verb,
    pub score: f64,
    /// Words left for argument resolution.
    pub rest: Vec<String>,
    /// Name of the rule that fired, for logging.
    pub rule: &'static str,
}

/// A set of phrases that all imply the same verb.
struct PhraseRule {
    name: &'static str,
    verb: Verb,
    score: f64,
    phrases: Vec<Vec<String>>,
}

impl PhraseRule {
    fn new(name: &'static str, verb: Verb, score: f64, phrases: &[&str]) -> Self {
        Self {
            name,
            verb,
            score,
            phrases: phrases.iter().map(|p| words(p)).collect(),
        }
    }
}

const MOTION_WORDS: &[&str] = &["go", "walk", "head", "travel", "move"];
const MOTION_FILLERS: &[&str] = &["to", "toward", "towards", "the"];
const BARE_VERBS: &[(&str, Verb, f64)] = &[
    ("eat", Verb::Eat, 0.78),
    ("drink", Verb::Drink, 0.78),
    ("sleep", Verb::Sleep, 0.8),
    ("rest", Verb::Rest, 0.8),
];
const GO_SCORE: f64 = 0.86;

lazy_static! {
    static ref LEADING_RULES: Vec<PhraseRule> = vec![
        PhraseRule::new(
            "help",
            Verb::Help,
            0.8,
            &["what can i do", "how do i play", "i need help", "help me"],
        ),
        PhraseRule::new(
            "inventory",
            Verb::Inventory,
            0.92,
            &[
                "check my bag",
                "check my inventory",
                "check my pack",
                "what do i have",
                "what am i carrying",
                "what's in my bag",
                "whats in my bag",
            ],
        ),
        PhraseRule::new(
            "fire",
            Verb::BuildFire,
            0.84,
            &[
                "i need a fire",
                "need a fire",
                "build fire",
                "build a fire",
                "make a fire",
                "start a fire",
                "light a fire",
                "get a fire going",
            ],
        ),
        PhraseRule::new(
            "look",
            Verb::Look,
            0.88,
            &["where am i", "look around", "what is here", "what's here", "whats around", "what do i see"],
        ),
    ];
    static ref TAKE_RULE: PhraseRule = PhraseRule::new("take", Verb::Take, 0.82, &["pick up", "pickup", "grab"]);
}

/// Guess a verb for input the registry could not match.
pub fn infer(tokens: &[String], ctx: &ParseContext) -> Option<Inference> {
    let inference = LEADING_RULES
        .iter()
        .find_map(|rule| apply_phrase_rule(rule, tokens))
        .or_else(|| infer_motion(tokens, ctx))
        .or_else(|| infer_bare_verb(tokens))
        .or_else(|| apply_phrase_rule(&TAKE_RULE, tokens));

    if let Some(found) = &inference {
        debug!("free-text rule '{}' inferred '{}' ({:.2})", found.rule, found.verb, found.score);
    }
    inference
}

fn apply_phrase_rule(rule: &PhraseRule, tokens: &[String]) -> Option<Inference> {
    rule.phrases.iter().find_map(|phrase| {
        find_phrase(tokens, phrase).map(|at| Inference {
            verb: rule.verb,
            score: rule.score,
            rest: tokens[at + phrase.len()..].to_vec(),
            rule: rule.name,
        })
    })
}

/// Index of the first whole-word occurrence of `phrase` in `tokens`.
fn find_phrase(tokens: &[String], phrase: &[String]) -> Option<usize> {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return None;
    }
    tokens.windows(phrase.len()).position(|window| window == phrase)
}

/// "i want to walk north 2km" -> go, with "north 2km" left over.
fn infer_motion(tokens: &[String], ctx: &ParseContext) -> Option<Inference> {
    let known = known_directions(ctx);
    let is_direction = |word: &str| direction_word(word).is_some() || known.iter().any(|d| d == word);

    for (at, word) in tokens.iter().enumerate() {
        if !MOTION_WORDS.contains(&word.as_str()) {
            continue;
        }
        let mut next = at + 1;
        while tokens.get(next).is_some_and(|t| MOTION_FILLERS.contains(&t.as_str())) {
            next += 1;
        }
        if tokens.get(next).is_some_and(|t| is_direction(t)) {
            return Some(Inference {
                verb: Verb::Go,
                score: GO_SCORE,
                rest: tokens[next..].to_vec(),
                rule: "motion",
            });
        }
    }
    None
}

fn infer_bare_verb(tokens: &[String]) -> Option<Inference> {
    BARE_VERBS.iter().find_map(|(word, verb, score)| {
        tokens.iter().position(|t| t == word).map(|at| Inference {
            verb: *verb,
            score: *score,
            rest: tokens[at + 1..].to_vec(),
            rule: "bare verb",
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer_text(text: &str) -> Option<Inference> {
        infer(&words(text), &ParseContext::new())
    }

    #[test]
    fn bag_phrases_mean_inventory() {
        let found = infer_text("I need to check my bag").unwrap();
        assert_eq!(found.verb, Verb::Inventory);
        assert!((found.score - 0.92).abs() < 1e-9);
        assert!(found.rest.is_empty());
        assert_eq!(infer_text("what's in my bag?").unwrap().verb, Verb::Inventory);
    }

    #[test]
    fn fire_and_look_phrases() {
        assert_eq!(infer_text("i need a fire").unwrap().verb, Verb::BuildFire);
        assert_eq!(infer_text("where am i").unwrap().verb, Verb::Look);
    }

    #[test]
    fn motion_word_before_direction_means_go() {
        let found = infer_text("i want to walk to the north for 2 hours").unwrap();
        assert_eq!(found.verb, Verb::Go);
        assert_eq!(found.rest, words("north for 2 hours"));
    }

    #[test]
    fn motion_accepts_context_directions() {
        let ctx = ParseContext::new().with_directions(["upstream"]);
        let found = infer(&words("lets head upstream"), &ctx).unwrap();
        assert_eq!(found.verb, Verb::Go);
        assert_eq!(found.rest, words("upstream"));
    }

    #[test]
    fn bare_verbs_must_be_whole_words() {
        assert_eq!(infer_text("i really should sleep").unwrap().verb, Verb::Sleep);
        assert!(infer_text("sleepy berries everywhere").is_none());
    }

    #[test]
    fn take_phrase_leaves_target_words() {
        let found = infer_text("could you pick up the stick").unwrap();
        assert_eq!(found.verb, Verb::Take);
        assert_eq!(found.rest, words("the stick"));
    }

    #[test]
    fn nothing_fires_for_nonsense() {
        assert!(infer_text("purple monkey dishwasher").is_none());
    }
}
