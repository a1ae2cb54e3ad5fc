//! Parser facade
//!
//! Ties the pieces together: normalize, match a command (or infer one),
//! extract quantities or movement, resolve arguments, then score the result
//! and decide whether to ask before acting.

use log::{debug, info};
use wayfarer_data::{ClarifyQuestion, Intent, MissingField, ParseContext, PendingIntent, TravelCondition, Verb};

use crate::infer::infer;
use crate::normalize::{normalize, tokenize};
use crate::pending::{AnswerOutcome, answer_pending};
use crate::policy::{
    ACCEPT_THRESHOLD, DIRECTION_PROMPT, EXTENT_PROMPT, MAX_OPTIONS, MISSING_CONFIDENCE, TRUNCATION_PENALTY,
    UNMAPPED_CONFIDENCE, UNMAPPED_PROMPT, ask, blend, low_confidence_prompt, missing_target_question, unit_prompt,
};
use crate::quantity::{extract_quantity, parse_quantity_token, scan_movement};
use crate::registry::{CommandMatch, Registry};
use crate::resolve::resolve_arguments;

/// The command interpreter.
///
/// Holds only the registry, which is read-only while parsing, so a shared
/// `&Parser` can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Parser {
    registry: Registry,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser loaded with the built-in command set.
    pub fn new() -> Self {
        Self::with_registry(Registry::with_defaults())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    /// Register (or replace) a command definition.
    pub fn register_command(&mut self, def: wayfarer_data::CommandDef) {
        self.registry.register(def);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Interpret one line of player input against `ctx`.
    ///
    /// Never fails: problems surface as a low confidence and a clarification.
    pub fn parse(&self, ctx: &ParseContext, raw: &str) -> Intent {
        let normalized = normalize(raw);
        let tokens = tokenize(&normalized);
        let mut intent = Intent::unresolved(raw, &normalized);

        if tokens.is_empty() {
            ask(&mut intent, ClarifyQuestion::new(UNMAPPED_PROMPT), UNMAPPED_CONFIDENCE);
            return intent;
        }

        let outcome = self.registry.match_command(&tokens, &normalized);
        let inferred = infer(&tokens, ctx).filter(|found| self.registry.is_registered(found.verb));

        // a typo-level command guess yields to a stronger free-text reading
        if let Some(best) = &outcome.best
            && (!best.kind.is_fuzzy() || inferred.as_ref().is_none_or(|found| found.score <= best.score))
        {
            let rest = &tokens[best.consumed..];
            return self.build_intent(ctx, intent, best.verb, best.score, rest, &outcome.alternates);
        }
        if let Some(found) = inferred {
            return self.build_intent(ctx, intent, found.verb, found.score, &found.rest, &[]);
        }

        info!("no command mapped for '{normalized}'");
        ask(&mut intent, ClarifyQuestion::new(UNMAPPED_PROMPT), UNMAPPED_CONFIDENCE);
        intent
    }

    /// Feed the player's answer to an outstanding clarification.
    pub fn answer(&self, ctx: &ParseContext, pending: &PendingIntent, raw: &str) -> AnswerOutcome {
        answer_pending(&self.registry, ctx, pending, raw)
    }

    fn build_intent(
        &self,
        ctx: &ParseContext,
        mut intent: Intent,
        verb: Verb,
        command_score: f64,
        rest: &[String],
        alternates: &[CommandMatch],
    ) -> Intent {
        let Some(def) = self.registry.get(verb) else {
            ask(&mut intent, ClarifyQuestion::new(UNMAPPED_PROMPT), UNMAPPED_CONFIDENCE);
            return intent;
        };
        intent.verb = Some(verb);
        intent.kind = verb.kind();

        let mut unit_missing = None;
        let arg_tokens = if verb == Verb::Go {
            let scan = scan_movement(rest);
            intent.movement = scan.scale;
            if let Some(token) = &scan.out_of_range {
                debug!("extent '{token}' is out of range; asking again");
            }
            if let Some(number) = scan.ambiguous_number {
                // kept as a plain count so an answer of "meters" can complete it
                intent.quantity = parse_quantity_token(&number);
                unit_missing = Some(number);
            }
            scan.rest
        } else {
            let (quantity, rest) = extract_quantity(rest);
            intent.quantity = quantity;
            rest
        };

        let resolution = resolve_arguments(verb, &arg_tokens, ctx);
        intent.args = resolution.args;
        let mut arg_score = resolution.score;
        if intent.args.len() > def.max_args {
            let dropped = intent.args.len() - def.max_args;
            debug!("'{verb}' takes at most {} argument(s); dropping {dropped}", def.max_args);
            intent.args.truncate(def.max_args);
            #[allow(clippy::cast_precision_loss)]
            let penalty = TRUNCATION_PENALTY * dropped as f64;
            arg_score = (arg_score - penalty).max(0.0);
        }
        intent.confidence = blend(command_score, arg_score);

        let target_covered_by_all =
            matches!(verb, Verb::Take | Verb::Drop) && intent.quantity.as_ref().is_some_and(|q| q.is_all());

        if let Some((question, confidence)) = resolution.clarify {
            ask(&mut intent, question, confidence);
        } else if verb == Verb::Go {
            movement_question(&mut intent, unit_missing.as_deref());
        } else if intent.args.len() < def.min_args && !target_covered_by_all {
            let question = missing_target_question(verb, def.min_args, ctx);
            ask(&mut intent, question, MISSING_CONFIDENCE);
        }
        if intent.clarify.is_none() && intent.confidence < ACCEPT_THRESHOLD {
            low_confidence_question(&mut intent, alternates, arg_score);
        }

        carry_extent_into_options(&mut intent);
        debug!(
            "parsed '{}' as {} {:?} (confidence {:.2}{})",
            intent.normalized,
            verb,
            intent.args,
            intent.confidence,
            if intent.clarify.is_some() { ", needs clarification" } else { "" }
        );
        intent
    }
}

/// Ask for whatever a movement command is still missing.
///
/// A unit-less number is asked about first, then the direction, then the extent.
fn movement_question(intent: &mut Intent, unit_missing: Option<&str>) {
    let has_direction = !intent.args.is_empty();
    let has_extent = intent.movement.is_some();

    let (prompt, missing) = if let Some(number) = unit_missing {
        let mut missing = vec![MissingField::Extent];
        if !has_direction {
            missing.push(MissingField::Direction);
        }
        (unit_prompt(number), missing)
    } else if !has_direction {
        let mut missing = vec![MissingField::Direction];
        if !has_extent {
            missing.push(MissingField::Extent);
        }
        (DIRECTION_PROMPT.to_string(), missing)
    } else if !has_extent {
        (EXTENT_PROMPT.to_string(), vec![MissingField::Extent])
    } else {
        return;
    };
    ask(intent, ClarifyQuestion::new(prompt).expecting(missing), MISSING_CONFIDENCE);
}

/// Offer the intent itself and the runner-up commands as choices.
fn low_confidence_question(intent: &mut Intent, alternates: &[CommandMatch], arg_score: f64) {
    let mut best = intent.clone();
    best.clarify = None;
    let canonical = intent_to_command_string(&best);

    let mut options = vec![best];
    for alternate in alternates.iter().take(MAX_OPTIONS - 1) {
        options.push(Intent::for_verb(
            alternate.verb,
            intent.args.clone(),
            blend(alternate.score, arg_score),
        ));
    }
    let question = ClarifyQuestion::new(low_confidence_prompt(&canonical))
        .with_options(options)
        .expecting(vec![MissingField::Choice]);
    let confidence = intent.confidence;
    ask(intent, question, confidence);
}

/// Options for the same verb inherit the quantity and movement already parsed.
fn carry_extent_into_options(intent: &mut Intent) {
    let verb = intent.verb;
    let quantity = intent.quantity.clone();
    let movement = intent.movement.clone();
    if let Some(clarify) = intent.clarify.as_mut() {
        for option in clarify.options.iter_mut().filter(|o| o.verb == verb) {
            if option.quantity.is_none() {
                option.quantity.clone_from(&quantity);
            }
            if option.movement.is_none() {
                option.movement.clone_from(&movement);
            }
        }
    }
}

/// Rebuild a normalized `verb arg1 arg2 ... [quantity]` line from an intent.
///
/// Unresolved intents produce an empty string. Parsing the result again
/// yields the same verb.
pub fn intent_to_command_string(intent: &Intent) -> String {
    let Some(verb) = intent.verb else {
        return String::new();
    };
    let mut parts: Vec<String> = vec![verb.as_str().to_string()];
    parts.extend(intent.args.iter().cloned());
    if let Some(movement) = &intent.movement {
        if let Some(meters) = movement.distance_meters {
            parts.push(format!("{meters}m"));
        } else if let Some(minutes) = movement.duration_minutes {
            parts.push(format!("{minutes}min"));
        } else if let Some(tiles) = movement.tiles {
            parts.push(format!("{tiles} tiles"));
        } else {
            match movement.condition {
                TravelCondition::Dark => parts.push("until dark".to_string()),
                TravelCondition::Tired => parts.push("until exhausted".to_string()),
                TravelCondition::None => {},
            }
        }
    } else if let Some(quantity) = &intent.quantity {
        parts.push(quantity.raw.clone());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_data::{CommandDef, IntentKind, QuantityUnit};

    fn survival_context() -> ParseContext {
        ParseContext::new()
            .with_nearby(["stick", "stone"])
            .with_inventory(["ferro rod", "canteen"])
    }

    #[test]
    fn empty_input_is_unresolved() {
        let intent = Parser::new().parse(&ParseContext::new(), "   ");
        assert_eq!(intent.kind, IntentKind::Unknown);
        assert!(intent.verb.is_none());
        assert_eq!(intent.clarify.unwrap().prompt, UNMAPPED_PROMPT);
    }

    #[test]
    fn unmapped_input_gets_plain_prompt() {
        let intent = Parser::new().parse(&ParseContext::new(), "purple monkey dishwasher");
        assert!(intent.verb.is_none());
        let clarify = intent.clarify.unwrap();
        assert!(clarify.options.is_empty());
        assert!(intent.confidence < ACCEPT_THRESHOLD);
    }

    #[test]
    fn quantity_all_satisfies_missing_target() {
        let intent = Parser::new().parse(&survival_context(), "drop all");
        assert_eq!(intent.verb, Some(Verb::Drop));
        assert!(intent.clarify.is_none());
        assert_eq!(intent.quantity.unwrap().unit, QuantityUnit::All);
    }

    #[test]
    fn extra_arguments_are_truncated_with_penalty() {
        let parser = Parser::new();
        let ctx = survival_context();
        let exact = parser.parse(&ctx, "inspect stick");
        let extra = parser.parse(&ctx, "inspect stick carefully now");
        assert_eq!(extra.args, vec!["stick"]);
        assert!(extra.clarify.is_none());
        assert!(extra.confidence < exact.confidence);
    }

    #[test]
    fn sleep_takes_a_duration_quantity() {
        let intent = Parser::new().parse(&ParseContext::new(), "sleep for 2 hours");
        assert_eq!(intent.verb, Some(Verb::Sleep));
        let quantity = intent.quantity.unwrap();
        assert_eq!((quantity.count, quantity.unit), (2, QuantityUnit::Hours));
        assert!(intent.args.is_empty());
    }

    #[test]
    fn go_alone_asks_direction_then_extent() {
        let intent = Parser::new().parse(&ParseContext::new(), "go");
        let clarify = intent.clarify.unwrap();
        assert_eq!(clarify.prompt, "Which direction?");
        assert_eq!(clarify.missing, vec![MissingField::Direction, MissingField::Extent]);
    }

    #[test]
    fn direction_options_keep_parsed_distance() {
        let ctx = ParseContext::new().with_directions(["northeast", "northwest"]);
        let intent = Parser::new().parse(&ctx, "go nort 300m");
        let clarify = intent.clarify.unwrap();
        assert_eq!(clarify.options.len(), 2);
        for option in &clarify.options {
            assert_eq!(option.movement.as_ref().unwrap().distance_meters, Some(300));
        }
    }

    #[test]
    fn free_text_reading_beats_typo_match() {
        // "what" is one typo away from the "wait" alias
        let intent = Parser::new().parse(&ParseContext::new(), "what's in my bag?");
        assert_eq!(intent.verb, Some(Verb::Inventory));
        assert!(intent.clarify.is_none());
    }

    #[test]
    fn inferred_verb_must_be_registered() {
        let mut registry = Registry::empty();
        registry.register(CommandDef::new(Verb::Look, &[], 0, 0));
        let parser = Parser::with_registry(registry);
        let intent = parser.parse(&ParseContext::new(), "i need to check my bag");
        assert!(intent.verb.is_none());
    }

    #[test]
    fn command_string_formats_arguments_and_extent() {
        let parser = Parser::new();
        let ctx = ParseContext::new();
        assert_eq!(
            intent_to_command_string(&parser.parse(&ctx, "walk east for 2 hours")),
            "go east 120min"
        );
        assert_eq!(
            intent_to_command_string(&parser.parse(&ctx, "head west until dark")),
            "go west until dark"
        );
        assert_eq!(intent_to_command_string(&parser.parse(&ctx, "rest 30min")), "rest 30min");
        assert_eq!(intent_to_command_string(&parser.parse(&ctx, "blorp")), "");
    }

    #[test]
    fn low_confidence_intents_offer_alternatives() {
        let mut registry = Registry::empty();
        registry.register(CommandDef::new(Verb::Craft, &[], 0, 0));
        registry.register(CommandDef::new(Verb::Drink, &[], 0, 0));
        let parser = Parser::with_registry(registry);
        // a three-typo fuzzy match with a pile of dropped words
        let intent = parser.parse(&ParseContext::new(), "crfat a b c d e f g h i j k l m n o p");
        let clarify = intent.clarify.expect("low confidence should ask");
        assert!(clarify.prompt.starts_with("Did you mean \"craft"));
        assert_eq!(clarify.options[0].verb, Some(Verb::Craft));
        assert!(intent.confidence < ACCEPT_THRESHOLD);
    }

    #[test]
    fn weak_complete_movement_still_asks() {
        // direction and extent are both present but the words around them are noise
        let intent = Parser::new().parse(&ParseContext::new(), "trvl nrth 2km a b c d e f g h i j k l");
        assert_eq!(intent.verb, Some(Verb::Go));
        let clarify = intent.clarify.expect("a weak go should ask");
        assert!(clarify.prompt.starts_with("Did you mean \"go"));
        assert_eq!(clarify.options[0].movement.as_ref().unwrap().distance_meters, Some(2000));
        assert!(intent.confidence < ACCEPT_THRESHOLD);
    }

    #[test]
    fn oversized_extent_is_asked_for_again() {
        let intent = Parser::new().parse(&ParseContext::new(), "go north 99999999999km");
        assert_eq!(intent.args, vec!["north"]);
        assert!(intent.movement.is_none());
        assert_eq!(intent.clarify.unwrap().prompt, EXTENT_PROMPT);
    }

    #[test]
    fn fire_phrases_with_articles_build_a_fire() {
        let parser = Parser::new();
        let ctx = ParseContext::new();
        for text in ["build a fire", "make a fire", "start a fire", "light a fire", "i want to build a fire"] {
            let intent = parser.parse(&ctx, text);
            assert_eq!(intent.verb, Some(Verb::BuildFire), "input {text:?}");
            assert!(intent.args.is_empty(), "input {text:?}");
            assert!(intent.clarify.is_none(), "input {text:?}");
        }
    }
}
