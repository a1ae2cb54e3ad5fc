//! Demo host REPL.
//!
//! Plays the host's part of the protocol: keeps the parse context, stores
//! the pending intent between lines, and confirms risky commands. Accepted
//! intents are echoed as canonical command strings rather than executed.

mod input;

use anyhow::{Context, Result};
use log::{debug, info};
use wayfarer_data::{ClarifyQuestion, Intent, ParseContext, PendingIntent, Verb};

use crate::normalize::normalize;
use crate::parser::{Parser, intent_to_command_string};
use crate::pending::AnswerOutcome;
use crate::policy::ACCEPT_THRESHOLD;
use crate::style::ParseStyle;

pub use input::META_COMMANDS;
use input::{InputEvent, InputManager, answer_terms, completion_terms};

/// Control flow signal used by handlers to exit the REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplControl {
    Continue,
    Quit,
}

/// Host state carried from one line to the next.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub ctx: ParseContext,
    pub pending: Option<PendingIntent>,
    /// An accepted risky intent waiting for a yes or no.
    pub confirming: Option<Intent>,
    pub show_json: bool,
    /// Intents accepted so far, in order.
    pub accepted: Vec<Intent>,
}

impl Session {
    pub fn new(ctx: ParseContext) -> Self {
        Self {
            ctx,
            ..Self::default()
        }
    }

    /// Handle one line of input.
    ///
    /// # Errors
    /// - if an intent cannot be serialized for `:json` output
    pub fn handle_line(&mut self, parser: &Parser, line: &str) -> Result<ReplControl> {
        let trimmed = line.trim();
        if let Some(meta) = trimmed.strip_prefix(':') {
            return Ok(self.handle_meta(parser, meta));
        }
        if let Some(intent) = self.confirming.take() {
            self.confirm(parser, intent, trimmed);
            return Ok(ReplControl::Continue);
        }
        if trimmed.is_empty() {
            return Ok(ReplControl::Continue);
        }

        match self.pending.take() {
            Some(pending) => self.handle_answer(parser, &pending, trimmed)?,
            None => self.handle_command(parser, trimmed)?,
        }
        Ok(ReplControl::Continue)
    }

    fn handle_command(&mut self, parser: &Parser, line: &str) -> Result<()> {
        let intent = parser.parse(&self.ctx, line);
        self.print_json(&intent)?;
        match &intent.clarify {
            Some(question) => {
                print_question(question);
                self.pending = PendingIntent::from_intent(&intent);
            },
            None => self.accept(parser, intent),
        }
        Ok(())
    }

    fn handle_answer(&mut self, parser: &Parser, pending: &PendingIntent, line: &str) -> Result<()> {
        match parser.answer(&self.ctx, pending, line) {
            AnswerOutcome::Resolved(intent) => {
                self.print_json(&intent)?;
                self.accept(parser, intent);
            },
            AnswerOutcome::Retry(next) => {
                // a complete new command replaces the question instead of answering it
                let fresh = parser.parse(&self.ctx, line);
                if fresh.clarify.is_none() && fresh.confidence >= ACCEPT_THRESHOLD {
                    debug!("dropping pending '{}' for new command '{}'", next.verb, fresh.normalized);
                    self.print_json(&fresh)?;
                    self.accept(parser, fresh);
                } else {
                    print_pending(&next);
                    self.pending = Some(next);
                }
            },
            AnswerOutcome::AwaitingMore(next) | AnswerOutcome::Escalated(next) => {
                print_pending(&next);
                self.pending = Some(next);
            },
            AnswerOutcome::Cancelled => println!("{}", "Cancelled.".meta_style()),
        }
        Ok(())
    }

    fn accept(&mut self, parser: &Parser, intent: Intent) {
        let risky = intent
            .verb
            .and_then(|verb| parser.registry().get(verb))
            .is_some_and(|def| def.risky);
        if risky && !intent.risk_confirmed {
            let command = intent_to_command_string(&intent);
            println!(
                "{}",
                format!("\"{command}\" could go badly. Are you sure? (yes/no)").question_style()
            );
            self.confirming = Some(intent);
            return;
        }
        self.run(intent);
    }

    fn confirm(&mut self, parser: &Parser, intent: Intent, answer: &str) {
        match normalize(answer).as_str() {
            "y" | "yes" | "sure" | "do it" => self.accept(parser, intent.confirm_risk()),
            _ => println!("{}", "Okay, not doing that.".meta_style()),
        }
    }

    /// Echo an accepted intent and fold its effects into the context.
    fn run(&mut self, intent: Intent) {
        let command = intent_to_command_string(&intent);
        println!(
            "{} {}",
            format!("-> {command}").command_style(),
            format!("({:.2})", intent.confidence).confidence_style()
        );
        info!("accepted '{command}' with confidence {:.2}", intent.confidence);
        apply_to_context(&mut self.ctx, &intent);
        self.accepted.push(intent);
    }

    fn print_json(&self, intent: &Intent) -> Result<()> {
        if self.show_json {
            let json = serde_json::to_string_pretty(intent).context("serializing intent to JSON")?;
            println!("{json}");
        }
        Ok(())
    }

    fn handle_meta(&mut self, parser: &Parser, meta: &str) -> ReplControl {
        let (name, rest) = meta.split_once(char::is_whitespace).unwrap_or((meta, ""));
        let rest = rest.trim();
        match name {
            "help" => print_help(parser),
            "ctx" => self.print_context(),
            "nearby" => self.ctx.nearby = split_list(rest),
            "inv" => self.ctx.inventory = split_list(rest),
            "dirs" => self.ctx.directions = split_list(rest),
            "last" => {
                self.ctx.last_entity = if rest.is_empty() { None } else { Some(rest.to_string()) };
            },
            "json" => {
                self.show_json = !self.show_json;
                let state = if self.show_json { "on" } else { "off" };
                println!("{}", format!("JSON output {state}.").meta_style());
            },
            "quit" | "q" => return ReplControl::Quit,
            other => println!("{}", format!("Unknown meta command ':{other}'. Try :help.").error_style()),
        }
        ReplControl::Continue
    }

    /// Words that would answer whatever is currently being asked.
    pub fn expected_answers(&self) -> Vec<String> {
        if self.confirming.is_some() {
            return vec!["no".to_string(), "yes".to_string()];
        }
        self.pending
            .as_ref()
            .map(|pending| answer_terms(pending, &self.ctx))
            .unwrap_or_default()
    }

    fn print_context(&self) {
        let list = |items: &[String]| {
            if items.is_empty() {
                "(none)".to_string()
            } else {
                items.iter().map(|i| i.entity_style().to_string()).collect::<Vec<_>>().join(", ")
            }
        };
        println!("{} {}", "nearby:".meta_style(), list(&self.ctx.nearby));
        println!("{} {}", "carried:".meta_style(), list(&self.ctx.inventory));
        println!("{} {}", "directions:".meta_style(), list(&self.ctx.directions));
        let last = self.ctx.last_entity.as_deref().unwrap_or("(none)");
        println!("{} {}", "last:".meta_style(), last.entity_style());
        if let Some(pending) = &self.pending {
            println!("{} {} ({})", "pending:".meta_style(), pending.verb, pending.prompt);
        }
    }
}

/// Run the read-eval-print loop until the player quits or input ends.
///
/// # Errors
/// - if an intent cannot be serialized for `:json` output
pub fn run_repl(parser: &Parser, ctx: ParseContext) -> Result<()> {
    let terms = completion_terms(parser.registry().phrases().iter().map(|p| p.text.as_str()));
    let mut input_manager = InputManager::new(terms);
    let mut session = Session::new(ctx);

    loop {
        let marker = if session.pending.is_some() || session.confirming.is_some() {
            "\n?> "
        } else {
            "\n>> "
        };
        let prompt = marker.prompt_style().to_string();
        input_manager.set_answers(session.expected_answers());

        let line = match input_manager.read_line(&prompt) {
            Ok(InputEvent::Line(line)) => line,
            Ok(InputEvent::Eof) => break,
            Ok(InputEvent::Interrupted) => {
                session.pending = None;
                session.confirming = None;
                println!("{}", "Cancelled.".meta_style());
                continue;
            },
            Err(err) => {
                println!("{}", format!("Failed to read input ({err}). Try again.").error_style());
                continue;
            },
        };

        if session.handle_line(parser, &line)? == ReplControl::Quit {
            break;
        }
    }
    info!("REPL finished after {} accepted commands", session.accepted.len());
    Ok(())
}

/// Update nearby, carried and last-referenced entities after an accepted intent.
pub fn apply_to_context(ctx: &mut ParseContext, intent: &Intent) {
    let Some(verb) = intent.verb else {
        return;
    };
    let Some(target) = intent.args.first() else {
        return;
    };
    if !verb.takes_target() {
        return;
    }
    ctx.last_entity = Some(target.clone());
    match verb {
        Verb::Take => move_entity(&mut ctx.nearby, &mut ctx.inventory, target),
        Verb::Drop => move_entity(&mut ctx.inventory, &mut ctx.nearby, target),
        _ => {},
    }
}

fn move_entity(from: &mut Vec<String>, to: &mut Vec<String>, name: &str) {
    if let Some(at) = from.iter().position(|entry| normalize(entry) == name) {
        let entry = from.remove(at);
        to.push(entry);
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_question(question: &ClarifyQuestion) {
    print_prompt(&question.prompt, &question.options);
}

fn print_pending(pending: &PendingIntent) {
    print_prompt(&pending.prompt, &pending.options);
}

/// Prompt text followed by a numbered list of options.
fn print_prompt(prompt: &str, options: &[Intent]) {
    println!("{}", prompt.question_style());
    for (i, option) in options.iter().enumerate() {
        let label = intent_to_command_string(option);
        println!("  {}", format!("{}. {label}", i + 1).option_style());
    }
}

fn print_help(parser: &Parser) {
    println!("{}", "Commands".command_style());
    for def in parser.registry().commands() {
        let aliases = if def.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", def.aliases.join(", "))
        };
        println!("  {}{}", def.verb.as_str().option_style(), aliases);
    }
    println!("{}", "Meta commands".command_style());
    println!("  {}", META_COMMANDS.join(" ").meta_style());
    println!(
        "{}",
        "List arguments are comma separated, e.g. `:nearby stick, flint stone`.".meta_style()
    );
}
