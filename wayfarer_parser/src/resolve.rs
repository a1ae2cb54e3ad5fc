//! Argument resolution
//!
//! Turns the tokens left after the verb (quantities and movement already
//! stripped) into argument strings, using the parse context for pronouns,
//! directions and entity names. Resolution stops at the first question it
//! has to ask.

use log::{debug, trace};
use wayfarer_data::{ClarifyQuestion, Intent, MissingField, ParseContext, Verb};

use crate::matching::{Scored, is_close_call, rank_names};
use crate::normalize::normalize;
use crate::policy::{
    AMBIGUOUS_CONFIDENCE, DIRECTION_PROMPT, LITERAL_PENALTY, POOL_BOOST, PRONOUN_CONFIDENCE, TIE_FLOOR,
    TWO_WORD_WIN, dedup_normalized, pronoun_prompt, which_one_prompt,
};

pub const PRONOUNS: &[&str] = &["it", "that", "them", "this", "those"];
/// Skipped wherever they appear in the argument list.
const ARTICLES: &[&str] = &["the", "a", "an"];
pub const DEFAULT_DIRECTIONS: &[&str] = &["north", "south", "east", "west"];

/// Arguments produced for one command, or the question that interrupted them.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub args: Vec<String>,
    /// Lowest resolution score reached, less literal penalties.
    pub score: f64,
    /// A question to ask and the confidence to report alongside it.
    pub clarify: Option<(ClarifyQuestion, f64)>,
}

/// Outcome of matching a word against a set of names.
#[derive(Debug, Clone, PartialEq)]
pub enum NameMatch {
    Found { name: String, score: f64, consumed: usize },
    Ambiguous(Vec<Scored<String>>),
    NoMatch,
}

/// Map a short or long direction word to its long form.
pub fn direction_word(token: &str) -> Option<&'static str> {
    let long = match token {
        "n" | "north" => "north",
        "s" | "south" => "south",
        "e" | "east" => "east",
        "w" | "west" => "west",
        "ne" | "northeast" => "northeast",
        "nw" | "northwest" => "northwest",
        "se" | "southeast" => "southeast",
        "sw" | "southwest" => "southwest",
        "u" | "up" => "up",
        "d" | "down" => "down",
        _ => return None,
    };
    Some(long)
}

/// The direction vocabulary for a context, falling back to the compass.
pub fn known_directions(ctx: &ParseContext) -> Vec<String> {
    let known = dedup_normalized(&ctx.directions);
    if known.is_empty() {
        DEFAULT_DIRECTIONS.iter().map(|d| (*d).to_string()).collect()
    } else {
        known
    }
}

/// Resolve one token as a direction.
pub fn resolve_direction(token: &str, ctx: &ParseContext) -> NameMatch {
    if let Some(direction) = direction_word(token) {
        return NameMatch::Found {
            name: direction.to_string(),
            score: 1.0,
            consumed: 1,
        };
    }
    let known = known_directions(ctx);
    let ranked = rank_names(token, known.iter().map(|d| (d.as_str(), 0.0)));
    if is_close_call(&ranked, |second| second > TIE_FLOOR) {
        return NameMatch::Ambiguous(ranked);
    }
    match ranked.into_iter().next() {
        Some(top) => NameMatch::Found {
            name: top.value,
            score: top.score,
            consumed: 1,
        },
        None => NameMatch::NoMatch,
    }
}

/// Nearby and carried entity names, normalized.
#[derive(Debug, Clone, Default)]
pub struct EntityPools {
    nearby: Vec<String>,
    inventory: Vec<String>,
    all: Vec<String>,
}

impl EntityPools {
    pub fn from_context(ctx: &ParseContext) -> Self {
        let nearby = dedup_normalized(&ctx.nearby);
        let inventory = dedup_normalized(&ctx.inventory);
        let mut all = nearby.clone();
        for name in &inventory {
            if !all.contains(name) {
                all.push(name.clone());
            }
        }
        Self { nearby, inventory, all }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    fn boost(&self, name: &str) -> f64 {
        let mut boost = 0.0;
        if self.nearby.iter().any(|n| n == name) {
            boost += POOL_BOOST;
        }
        if self.inventory.iter().any(|n| n == name) {
            boost += POOL_BOOST;
        }
        boost
    }

    /// Rank every known entity against `query`.
    pub fn rank(&self, query: &str) -> Vec<Scored<String>> {
        rank_names(query, self.all.iter().map(|name| (name.as_str(), self.boost(name))))
    }

    /// Match the entity named at `tokens[at]`, trying a two-word name first.
    pub fn resolve_at(&self, tokens: &[String], at: usize) -> NameMatch {
        if self.is_empty() {
            return NameMatch::NoMatch;
        }
        if let Some(next) = tokens.get(at + 1) {
            let joined = format!("{} {}", tokens[at], next);
            let ranked = self.rank(&joined);
            if let Some(top) = ranked.first()
                && top.score > TWO_WORD_WIN
                && !is_close_call(&ranked, |second| second >= TIE_FLOOR)
            {
                trace!("two-word entity '{joined}' matched '{}'", top.value);
                return NameMatch::Found {
                    name: top.value.clone(),
                    score: top.score,
                    consumed: 2,
                };
            }
        }

        let ranked = self.rank(&tokens[at]);
        if is_close_call(&ranked, |second| second >= TIE_FLOOR) {
            return NameMatch::Ambiguous(ranked);
        }
        match ranked.into_iter().next() {
            Some(top) => NameMatch::Found {
                name: top.value,
                score: top.score,
                consumed: 1,
            },
            None => NameMatch::NoMatch,
        }
    }
}

/// Resolve the argument tokens for `verb`.
pub fn resolve_arguments(verb: Verb, tokens: &[String], ctx: &ParseContext) -> Resolution {
    let pools = EntityPools::from_context(ctx);
    let mut args: Vec<String> = Vec::new();
    let mut lowest: f64 = 1.0;
    let mut penalty = 0.0;
    let mut clarify = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();
        if ARTICLES.contains(&token) {
            i += 1;
            continue;
        }
        let position = args.len();

        if PRONOUNS.contains(&token) {
            match ctx.last_entity.as_deref().map(normalize).filter(|e| !e.is_empty()) {
                Some(entity) => {
                    debug!("pronoun '{token}' resolved to '{entity}'");
                    args.push(entity);
                    i += 1;
                    continue;
                },
                None => {
                    let question = ClarifyQuestion::new(pronoun_prompt(token)).expecting(vec![MissingField::Target]);
                    clarify = Some((question, PRONOUN_CONFIDENCE));
                    break;
                },
            }
        }

        if verb == Verb::Go && position == 0 {
            match resolve_direction(token, ctx) {
                NameMatch::Found { name, score, .. } => {
                    lowest = lowest.min(score);
                    args.push(name);
                    i += 1;
                    continue;
                },
                NameMatch::Ambiguous(ranked) => {
                    let options = ranked
                        .iter()
                        .take(2)
                        .map(|dir| Intent::for_verb(Verb::Go, vec![dir.value.clone()], dir.score.min(1.0)))
                        .collect();
                    let question = ClarifyQuestion::new(DIRECTION_PROMPT)
                        .with_options(options)
                        .expecting(vec![MissingField::Choice]);
                    clarify = Some((question, AMBIGUOUS_CONFIDENCE));
                    break;
                },
                NameMatch::NoMatch => {},
            }
        }

        if verb.takes_target() && (position == 0 || verb == Verb::Use) {
            match pools.resolve_at(tokens, i) {
                NameMatch::Found { name, score, consumed } => {
                    lowest = lowest.min(score.min(1.0));
                    args.push(name);
                    i += consumed;
                    continue;
                },
                NameMatch::Ambiguous(ranked) => {
                    clarify = Some((entity_question(verb, &args, &ranked), AMBIGUOUS_CONFIDENCE));
                    break;
                },
                NameMatch::NoMatch => {},
            }
        }

        trace!("passing '{token}' through as a literal argument");
        args.push(token.to_string());
        penalty += LITERAL_PENALTY;
        i += 1;
    }

    Resolution {
        args,
        score: (lowest - penalty).clamp(0.0, 1.0),
        clarify,
    }
}

/// "Which one did you mean: stick or stone?" with one option per candidate.
fn entity_question(verb: Verb, resolved: &[String], ranked: &[Scored<String>]) -> ClarifyQuestion {
    let top: Vec<&Scored<String>> = ranked.iter().take(2).collect();
    let names: Vec<&str> = top.iter().map(|s| s.value.as_str()).collect();
    let options = top
        .iter()
        .map(|candidate| {
            let mut args = resolved.to_vec();
            args.push(candidate.value.clone());
            Intent::for_verb(verb, args, candidate.score.min(1.0))
        })
        .collect();
    ClarifyQuestion::new(which_one_prompt(&names))
        .with_options(options)
        .expecting(vec![MissingField::Choice])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::words;

    #[test]
    fn pronoun_uses_last_entity() {
        let ctx = ParseContext::new().with_inventory(["ferro rod"]).with_last_entity("Ferro Rod");
        let res = resolve_arguments(Verb::Use, &words("it"), &ctx);
        assert_eq!(res.args, vec!["ferro rod"]);
        assert!(res.clarify.is_none());
    }

    #[test]
    fn pronoun_without_referent_asks() {
        let res = resolve_arguments(Verb::Drop, &words("that"), &ParseContext::new());
        let (question, confidence) = res.clarify.unwrap();
        assert_eq!(question.prompt, "What does \"that\" refer to?");
        assert!((confidence - PRONOUN_CONFIDENCE).abs() < 1e-9);
        assert_eq!(question.missing, vec![MissingField::Target]);
    }

    #[test]
    fn prefix_resolves_with_pool_boost() {
        let ctx = ParseContext::new().with_nearby(["stick", "stone"]);
        let res = resolve_arguments(Verb::Take, &words("the stic"), &ctx);
        assert_eq!(res.args, vec!["stick"]);
        assert!(res.clarify.is_none());
        assert!((res.score - 0.98).abs() < 1e-9);
    }

    #[test]
    fn two_word_entity_consumes_both_tokens() {
        let ctx = ParseContext::new().with_inventory(["ferro rod", "tinder"]);
        let res = resolve_arguments(Verb::Use, &words("ferro rod on tinder"), &ctx);
        assert_eq!(res.args, vec!["ferro rod", "on", "tinder"]);
    }

    #[test]
    fn tied_entities_ask_which_one() {
        let ctx = ParseContext::new().with_nearby(["stick", "stone"]);
        let res = resolve_arguments(Verb::Take, &words("st"), &ctx);
        let (question, _) = res.clarify.unwrap();
        assert_eq!(question.prompt, "Which one did you mean: stick or stone?");
        let picks: Vec<_> = question.options.iter().map(|o| o.args.clone()).collect();
        assert_eq!(picks, vec![vec!["stick".to_string()], vec!["stone".to_string()]]);
    }

    #[test]
    fn carried_and_nearby_entity_outranks_single_pool() {
        let ctx = ParseContext::new().with_nearby(["rope", "root"]).with_inventory(["rope"]);
        let res = resolve_arguments(Verb::Inspect, &words("ro"), &ctx);
        assert_eq!(res.args, vec!["rope"]);
        assert!(res.clarify.is_none());
    }

    #[test]
    fn only_first_argument_is_entity_resolved_except_for_use() {
        let ctx = ParseContext::new().with_nearby(["stick"]);
        let take = resolve_arguments(Verb::Take, &words("stone stic"), &ctx);
        assert_eq!(take.args, vec!["stone", "stic"]);
        let use_ = resolve_arguments(Verb::Use, &words("knife stic"), &ctx);
        assert_eq!(use_.args, vec!["knife", "stick"]);
    }

    #[test]
    fn literals_cost_a_little_each() {
        let res = resolve_arguments(Verb::Craft, &words("spear shaft"), &ParseContext::new());
        assert_eq!(res.args, vec!["spear", "shaft"]);
        assert!((res.score - 0.96).abs() < 1e-9);
    }

    #[test]
    fn direction_words_map_directly() {
        let res = resolve_arguments(Verb::Go, &words("ne"), &ParseContext::new());
        assert_eq!(res.args, vec!["northeast"]);
    }

    #[test]
    fn direction_fuzzy_uses_context_vocabulary() {
        let ctx = ParseContext::new().with_directions(["upstream", "downstream"]);
        let res = resolve_arguments(Verb::Go, &words("upstrem"), &ctx);
        assert_eq!(res.args, vec!["upstream"]);
    }

    #[test]
    fn close_directions_ask_which_direction() {
        let ctx = ParseContext::new().with_directions(["northeast", "northwest"]);
        let res = resolve_arguments(Verb::Go, &words("nort"), &ctx);
        let (question, confidence) = res.clarify.unwrap();
        assert_eq!(question.prompt, "Which direction?");
        assert_eq!(question.options.len(), 2);
        assert_eq!(question.options[0].args, vec!["northeast"]);
        assert!(confidence < 0.52);
    }
}
