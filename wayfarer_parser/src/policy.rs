//! Confidence and clarification policy
//!
//! Scores from command matching and argument resolution are blended into a
//! single confidence. Anything below [`ACCEPT_THRESHOLD`] is not acted on:
//! it carries a [`ClarifyQuestion`] instead, and every clarified intent is
//! kept strictly below the threshold.

use wayfarer_data::{ClarifyQuestion, Intent, MissingField, ParseContext, Verb};

use crate::normalize::normalize;

/// Intents at or above this confidence may be executed without asking.
pub const ACCEPT_THRESHOLD: f64 = 0.52;
/// Command and name matches below this are discarded.
pub const MATCH_FLOOR: f64 = 0.5;
pub const COMMAND_WEIGHT: f64 = 0.75;
pub const ARGUMENT_WEIGHT: f64 = 0.25;
/// Cost of each argument passed through without being resolved.
pub const LITERAL_PENALTY: f64 = 0.02;
/// Cost of each argument dropped for exceeding a command's maximum.
pub const TRUNCATION_PENALTY: f64 = 0.03;
/// Added once per context pool (nearby, inventory) that holds a candidate.
pub const POOL_BOOST: f64 = 0.08;
pub const TIE_MARGIN: f64 = 0.05;
/// Runner-up score that makes a close call worth asking about.
pub const TIE_FLOOR: f64 = 0.6;
/// A two-word entity match above this consumes both words.
pub const TWO_WORD_WIN: f64 = 0.9;
pub const MAX_OPTIONS: usize = 4;

pub const PRONOUN_CONFIDENCE: f64 = 0.4;
pub const AMBIGUOUS_CONFIDENCE: f64 = 0.48;
pub const MISSING_CONFIDENCE: f64 = 0.45;
pub const UNMAPPED_CONFIDENCE: f64 = 0.0;
/// Highest confidence any clarified intent may report.
pub const CLARIFY_CEILING: f64 = 0.5;

pub const UNMAPPED_PROMPT: &str = "I couldn't map that to an action. Try \"help\" to see what I understand.";
pub const EXTENT_PROMPT: &str = "How far or how long? (e.g. 500m, 1km, 10min, until dark)";
pub const DIRECTION_PROMPT: &str = "Which direction?";

/// Blend command and argument scores, clamped to [0, 1].
pub fn blend(command_score: f64, argument_score: f64) -> f64 {
    (COMMAND_WEIGHT * command_score + ARGUMENT_WEIGHT * argument_score).clamp(0.0, 1.0)
}

/// Attach a clarification, holding confidence under the acceptance threshold.
pub fn ask(intent: &mut Intent, question: ClarifyQuestion, confidence: f64) {
    intent.confidence = confidence.min(CLARIFY_CEILING).clamp(0.0, 1.0);
    intent.clarify = Some(question);
}

/// Prompt for a bare number that has no unit.
pub fn unit_prompt(number: &str) -> String {
    format!("{number} what: meters, km, tiles, or minutes?")
}

pub fn pronoun_prompt(pronoun: &str) -> String {
    format!("What does \"{pronoun}\" refer to?")
}

/// "Which one did you mean: stick or stone?"
pub fn which_one_prompt(names: &[&str]) -> String {
    format!("Which one did you mean: {}?", names.join(" or "))
}

pub fn needs_args_prompt(verb: Verb, min: usize) -> String {
    format!("{verb} needs at least {min} argument(s)")
}

/// "Take what?"
pub fn target_prompt(verb: Verb) -> String {
    format!("{} what?", capitalize(verb.as_str()))
}

pub fn low_confidence_prompt(canonical: &str) -> String {
    format!("Did you mean \"{canonical}\"?")
}

/// Build one `verb + name` option per name, capped at [`MAX_OPTIONS`].
pub fn single_arg_options<'a>(verb: Verb, names: impl IntoIterator<Item = &'a str>, confidence: f64) -> Vec<Intent> {
    names
        .into_iter()
        .take(MAX_OPTIONS)
        .map(|name| Intent::for_verb(verb, vec![name.to_string()], confidence))
        .collect()
}

/// Ask the player to pick a target for a verb that arrived without one.
///
/// Offers live choices from the context (nearby things for `take`, carried
/// things otherwise) before falling back to a generic prompt.
pub fn missing_target_question(verb: Verb, min_args: usize, ctx: &ParseContext) -> ClarifyQuestion {
    if verb.needs_interactive_target() {
        let pool = if verb == Verb::Take { &ctx.nearby } else { &ctx.inventory };
        let names = dedup_normalized(pool);
        if !names.is_empty() {
            let prompt = target_prompt(verb);
            let options = single_arg_options(verb, names.iter().map(String::as_str), ACCEPT_THRESHOLD);
            let missing = if options.len() > 1 {
                vec![MissingField::Choice]
            } else {
                vec![MissingField::Target]
            };
            return ClarifyQuestion::new(prompt).with_options(options).expecting(missing);
        }
    }
    ClarifyQuestion::new(needs_args_prompt(verb, min_args)).expecting(vec![MissingField::Target])
}

/// Normalize a list of names, dropping empties and repeats but keeping order.
pub fn dedup_normalized(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = normalize(name);
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
