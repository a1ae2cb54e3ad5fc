//! Follow-up answers to a clarification
//!
//! A host that got a clarified intent keeps the [`PendingIntent`] and feeds
//! the player's next line here instead of parsing it as a new command. Each
//! answer fills the first missing field, asks again, or hands back a new
//! question.

use log::debug;
use variantly::Variantly;
use wayfarer_data::{
    ClarifyQuestion, Intent, MissingField, MovementScale, ParseContext, PendingIntent, QuantityUnit, Verb,
};

use crate::matching::{Scored, compare_scored, is_close_call, score_name};
use crate::normalize::{normalize, tokenize};
use crate::policy::{DIRECTION_PROMPT, EXTENT_PROMPT, TIE_FLOOR, blend, target_prompt, unit_prompt, which_one_prompt};
use crate::quantity::{is_extent_unit, parse_quantity_token, scan_movement};
use crate::registry::Registry;
use crate::resolve::{NameMatch, known_directions, resolve_arguments, resolve_direction};

const CANCEL_WORDS: &[&str] = &["cancel", "nevermind", "never mind", "forget it", "abort", "stop"];
const DIRECTION_FILLERS: &[&str] = &["go", "to", "toward", "towards", "the"];
const EXTENT_RETRY_PROMPT: &str = "Give me a distance or a time, like 500m, 2km, 10min or until dark.";

/// What became of a pending intent after one answer.
#[derive(Debug, Clone, PartialEq, Variantly)]
pub enum AnswerOutcome {
    /// Every field is filled; the intent is ready to run.
    Resolved(Intent),
    /// The answer filled a field but another one is still missing.
    AwaitingMore(PendingIntent),
    /// The answer didn't fit the field; ask again, more pointedly.
    Retry(PendingIntent),
    Cancelled,
    /// The answer raised a new question of its own.
    Escalated(PendingIntent),
}

/// How one answer went for the field it was meant to fill.
enum Step {
    Filled(f64),
    Chosen(Intent),
    Retry(String),
    Escalate(ClarifyQuestion),
}

/// True when the whole answer asks to drop the pending intent.
pub fn is_cancel(normalized: &str) -> bool {
    CANCEL_WORDS.contains(&normalized)
}

/// Apply the player's `raw` answer to `pending`.
pub fn answer_pending(registry: &Registry, ctx: &ParseContext, pending: &PendingIntent, raw: &str) -> AnswerOutcome {
    let normalized = normalize(raw);
    if is_cancel(&normalized) {
        debug!("pending '{}' cancelled", pending.verb);
        return AnswerOutcome::Cancelled;
    }
    let tokens = tokenize(&normalized);
    let mut next = pending.clone();

    let Some(field) = pending.next_missing() else {
        return finish(registry, next, 1.0);
    };
    let step = match field {
        MissingField::Direction => answer_direction(&mut next, &tokens, ctx),
        MissingField::Extent => answer_extent(&mut next, &tokens, ctx),
        MissingField::Choice => answer_choice(&next, &normalized),
        MissingField::Target => answer_target(&mut next, &tokens, ctx),
    };

    match step {
        Step::Filled(score) => {
            next.missing.retain(|m| *m != field);
            finish(registry, next, score)
        },
        Step::Chosen(option) => {
            next.missing.retain(|m| *m != MissingField::Choice);
            if let Some(verb) = option.verb {
                next.verb = verb;
                next.kind = verb.kind();
            }
            next.filled_args = option.args;
            if option.movement.is_some() {
                next.movement = option.movement;
            }
            if option.quantity.is_some() {
                next.quantity = option.quantity;
            }
            next.options.clear();
            finish(registry, next, 1.0)
        },
        Step::Retry(prompt) => {
            debug!("answer '{normalized}' rejected for {}", field.as_str());
            next.prompt = prompt;
            next.attempts += 1;
            AnswerOutcome::Retry(next)
        },
        Step::Escalate(question) => {
            let remaining: Vec<MissingField> = next.missing.drain(..).filter(|m| *m != field).collect();
            let mut missing = question.missing;
            for m in remaining {
                if !missing.contains(&m) {
                    missing.push(m);
                }
            }
            next.missing = missing;
            next.prompt = question.prompt;
            next.options = question.options;
            next.attempts = 0;
            AnswerOutcome::Escalated(next)
        },
    }
}

/// Resolve the intent if nothing is missing, otherwise ask for the next field.
fn finish(registry: &Registry, mut next: PendingIntent, score: f64) -> AnswerOutcome {
    // a movement chosen from options may still lack its direction or extent
    if next.verb == Verb::Go && !next.missing.contains(&MissingField::Choice) {
        if next.filled_args.is_empty() && !next.missing.contains(&MissingField::Direction) {
            next.missing.push(MissingField::Direction);
        }
        if next.movement.is_none() && !next.missing.contains(&MissingField::Extent) {
            next.missing.push(MissingField::Extent);
        }
    }

    if let Some(field) = next.next_missing() {
        next.prompt = field_prompt(&next, field);
        next.attempts = 0;
        return AnswerOutcome::AwaitingMore(next);
    }

    let mut args = next.filled_args;
    if let Some(def) = registry.get(next.verb) {
        args.truncate(def.max_args);
    }
    let mut intent = Intent::for_verb(next.verb, args, blend(1.0, score));
    intent.movement = next.movement;
    intent.quantity = next.quantity;
    debug!("pending '{}' resolved as '{}'", next.verb, intent.normalized);
    AnswerOutcome::Resolved(intent)
}

fn field_prompt(pending: &PendingIntent, field: MissingField) -> String {
    match field {
        MissingField::Direction => DIRECTION_PROMPT.to_string(),
        MissingField::Extent => match stored_count(pending) {
            Some(count) => unit_prompt(&count.to_string()),
            None => EXTENT_PROMPT.to_string(),
        },
        MissingField::Target => target_prompt(pending.verb),
        MissingField::Choice => pending.prompt.clone(),
    }
}

/// A bare number from an earlier line that is still waiting for its unit.
fn stored_count(pending: &PendingIntent) -> Option<i64> {
    pending
        .quantity
        .as_ref()
        .filter(|q| q.unit == QuantityUnit::Count)
        .map(|q| q.count)
}

fn take_extent(next: &mut PendingIntent, scale: MovementScale) {
    next.movement = Some(scale);
    if stored_count(next).is_some() {
        next.quantity = None;
    }
    next.missing.retain(|m| *m != MissingField::Extent);
}

fn direction_retry_prompt(ctx: &ParseContext) -> String {
    format!("I need a direction: {}.", known_directions(ctx).join(", "))
}

/// "north", "to the east", or "east for 2 hours" when the extent is missing too.
fn answer_direction(next: &mut PendingIntent, tokens: &[String], ctx: &ParseContext) -> Step {
    let scan = scan_movement(tokens);
    if let Some(scale) = scan.scale.clone() {
        take_extent(next, scale);
    } else if let Some(number) = &scan.ambiguous_number
        && next.missing.contains(&MissingField::Extent)
    {
        next.quantity = parse_quantity_token(number);
    }

    let Some(word) = scan.rest.iter().find(|t| !DIRECTION_FILLERS.contains(&t.as_str())) else {
        return Step::Retry(direction_retry_prompt(ctx));
    };
    match resolve_direction(word, ctx) {
        NameMatch::Found { name, score, .. } => {
            next.filled_args = vec![name];
            Step::Filled(score)
        },
        NameMatch::Ambiguous(ranked) => {
            let options = ranked
                .iter()
                .take(2)
                .map(|dir| {
                    let mut option = Intent::for_verb(Verb::Go, vec![dir.value.clone()], dir.score.min(1.0));
                    option.movement.clone_from(&next.movement);
                    option
                })
                .collect();
            Step::Escalate(
                ClarifyQuestion::new(DIRECTION_PROMPT)
                    .with_options(options)
                    .expecting(vec![MissingField::Choice]),
            )
        },
        NameMatch::NoMatch => Step::Retry(direction_retry_prompt(ctx)),
    }
}

/// "2km", "for 10 minutes", "until dark", or just "meters" after a bare number.
fn answer_extent(next: &mut PendingIntent, tokens: &[String], ctx: &ParseContext) -> Step {
    if let [unit] = tokens
        && is_extent_unit(unit)
    {
        let Some(count) = stored_count(next) else {
            return Step::Retry(EXTENT_RETRY_PROMPT.to_string());
        };
        return match scan_movement(&[count.to_string(), unit.clone()]).scale {
            Some(scale) => {
                take_extent(next, scale);
                Step::Filled(1.0)
            },
            None => Step::Retry(EXTENT_RETRY_PROMPT.to_string()),
        };
    }

    let scan = scan_movement(tokens);
    if let Some(scale) = scan.scale {
        if next.missing.contains(&MissingField::Direction)
            && let Some(word) = scan.rest.iter().find(|t| !DIRECTION_FILLERS.contains(&t.as_str()))
            && let NameMatch::Found { name, .. } = resolve_direction(word, ctx)
        {
            next.filled_args = vec![name];
            next.missing.retain(|m| *m != MissingField::Direction);
        }
        take_extent(next, scale);
        return Step::Filled(1.0);
    }
    if let Some(number) = scan.ambiguous_number {
        next.quantity = parse_quantity_token(&number);
        return Step::Retry(unit_prompt(&number));
    }
    Step::Retry(EXTENT_RETRY_PROMPT.to_string())
}

/// Best of an option's argument text, its full command text and its bare verb.
fn score_option(answer: &str, option: &Intent) -> Option<f64> {
    let label = option.args.join(" ");
    let verb = option.verb.map(Verb::as_str).unwrap_or_default();
    [label.as_str(), option.normalized.as_str(), verb]
        .into_iter()
        .filter(|candidate| !candidate.is_empty())
        .filter_map(|candidate| score_name(answer, candidate))
        .reduce(f64::max)
}

/// How an option is named back to the player: its arguments, or its command text.
pub fn option_label(option: &Intent) -> String {
    if option.args.is_empty() {
        option.normalized.clone()
    } else {
        option.args.join(" ")
    }
}

fn choice_retry_prompt(options: &[Intent]) -> String {
    let labels: Vec<String> = options.iter().map(option_label).collect();
    format!("Pick a number from 1 to {}, or name one of: {}.", options.len(), labels.join(", "))
}

/// "2", "stone", or "craft": a list position or a name from the options.
fn answer_choice(next: &PendingIntent, normalized: &str) -> Step {
    if next.options.is_empty() {
        return Step::Retry(next.prompt.clone());
    }
    if let Ok(index) = normalized.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| next.options.get(i)) {
            Some(option) => Step::Chosen(option.clone()),
            None => Step::Retry(choice_retry_prompt(&next.options)),
        };
    }

    let mut ranked: Vec<Scored<usize>> = next
        .options
        .iter()
        .enumerate()
        .filter_map(|(i, option)| score_option(normalized, option).map(|score| Scored::new(i, score)))
        .collect();
    ranked.sort_by(compare_scored);

    if is_close_call(&ranked, |second| second >= TIE_FLOOR) {
        let tied: Vec<Intent> = ranked.iter().take(2).map(|s| next.options[s.value].clone()).collect();
        let labels: Vec<String> = tied.iter().map(option_label).collect();
        let names: Vec<&str> = labels.iter().map(String::as_str).collect();
        return Step::Escalate(
            ClarifyQuestion::new(which_one_prompt(&names))
                .with_options(tied)
                .expecting(vec![MissingField::Choice]),
        );
    }
    match ranked.first() {
        Some(top) => Step::Chosen(next.options[top.value].clone()),
        None => Step::Retry(choice_retry_prompt(&next.options)),
    }
}

/// Free text naming the target; unknown names are taken as written.
fn answer_target(next: &mut PendingIntent, tokens: &[String], ctx: &ParseContext) -> Step {
    let resolution = resolve_arguments(next.verb, tokens, ctx);
    if let Some((question, _)) = resolution.clarify {
        let options = question
            .options
            .into_iter()
            .map(|option| {
                let mut args = next.filled_args.clone();
                args.extend(option.args);
                Intent::for_verb(option.verb.unwrap_or(next.verb), args, option.confidence)
            })
            .collect();
        return Step::Escalate(
            ClarifyQuestion::new(question.prompt)
                .with_options(options)
                .expecting(question.missing),
        );
    }
    if resolution.args.is_empty() {
        return Step::Retry(format!("{} Name something nearby or in your pack.", target_prompt(next.verb)));
    }
    next.filled_args.extend(resolution.args);
    Step::Filled(resolution.score)
}
