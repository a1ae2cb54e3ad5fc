//! Terminal input for the demo REPL.
//!
//! Uses rustyline when stdin is a terminal and plain line reads otherwise.
//! Tab completion offers command phrases and meta commands, except while a
//! question is open, when it offers the words that would answer it.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use wayfarer_data::{MissingField, ParseContext, PendingIntent};

use crate::normalize::normalize;
use crate::pending::option_label;
use crate::resolve::known_directions;

/// Outcome of reading a line from the REPL input.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

pub const META_COMMANDS: &[&str] = &[":help", ":ctx", ":nearby", ":inv", ":last", ":dirs", ":json", ":quit"];

const EXTENT_ANSWERS: &[&str] = &[
    "meters",
    "km",
    "tiles",
    "minutes",
    "hours",
    "until dark",
    "until exhausted",
];

type ReplEditor = rustyline::Editor<WayfarerHelper, DefaultHistory>;

/// Words tab completion can offer.
#[derive(Debug, Default)]
struct Vocabulary {
    commands: Vec<String>,
    /// Set while a question is open; replaces `commands` until it is answered.
    answers: Vec<String>,
}

impl Vocabulary {
    fn answering(&self) -> bool {
        !self.answers.is_empty()
    }

    fn pool(&self) -> &[String] {
        if self.answering() { &self.answers } else { &self.commands }
    }

    fn complete(&self, prefix: &str) -> Vec<Pair> {
        if prefix.is_empty() && !self.answering() {
            return Vec::new();
        }
        let lower = prefix.to_lowercase();
        self.pool()
            .iter()
            .filter(|term| term.starts_with(&lower))
            .map(|term| Pair {
                display: term.clone(),
                replacement: term.clone(),
            })
            .collect()
    }

    /// The rest of the only answer that starts with `prefix`.
    fn hint(&self, prefix: &str) -> Option<String> {
        if !self.answering() || prefix.is_empty() {
            return None;
        }
        let lower = prefix.to_lowercase();
        let mut matches = self.answers.iter().filter(|answer| answer.starts_with(&lower));
        let only = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        only.get(lower.len()..).filter(|rest| !rest.is_empty()).map(str::to_string)
    }
}

#[derive(Default)]
struct WayfarerHelper {
    vocabulary: Vocabulary,
}

impl Helper for WayfarerHelper {}

impl Completer for WayfarerHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, prefix) = current_prefix(line, pos);
        Ok((start, self.vocabulary.complete(prefix)))
    }
}

impl Hinter for WayfarerHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.vocabulary.hint(current_prefix(line, pos).1)
    }
}

impl Highlighter for WayfarerHelper {}

impl Validator for WayfarerHelper {}

/// Everything typed so far, without leading whitespace, and where it starts.
fn current_prefix(line: &str, pos: usize) -> (usize, &str) {
    let slice = &line[..pos];
    let trimmed = slice.trim_start_matches(char::is_whitespace);
    (pos - trimmed.len(), trimmed)
}

/// Sorted, deduplicated completion terms: command phrases plus meta commands.
pub fn completion_terms<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut terms: Vec<String> = phrases.into_iter().map(str::to_string).collect();
    terms.extend(META_COMMANDS.iter().map(|cmd| (*cmd).to_string()));
    terms.sort_unstable();
    terms.dedup();
    terms
}

/// Words that would answer the field `pending` is waiting on, plus `cancel`.
pub fn answer_terms(pending: &PendingIntent, ctx: &ParseContext) -> Vec<String> {
    let mut terms: Vec<String> = match pending.next_missing() {
        Some(MissingField::Choice) => pending.options.iter().map(option_label).collect(),
        Some(MissingField::Direction) => known_directions(ctx),
        Some(MissingField::Extent) => EXTENT_ANSWERS.iter().map(|a| (*a).to_string()).collect(),
        Some(MissingField::Target) => ctx.nearby.iter().chain(&ctx.inventory).map(|name| normalize(name)).collect(),
        None => Vec::new(),
    };
    terms.push("cancel".to_string());
    terms.sort_unstable();
    terms.dedup();
    terms
}

/// Reads REPL lines through rustyline, or plain stdin when that is unavailable.
///
/// Only command lines go into the history file, not answers to questions.
pub struct InputManager {
    editor: Option<ReplEditor>,
    history: Option<PathBuf>,
    buffer: String,
}

impl InputManager {
    pub fn new(commands: Vec<String>) -> Self {
        let mut manager = Self {
            editor: None,
            history: None,
            buffer: String::new(),
        };
        if !io::stdin().is_terminal() {
            info!("stdin is not a terminal; reading plain lines");
            return manager;
        }
        match ReplEditor::new() {
            Ok(mut editor) => {
                editor.set_helper(Some(WayfarerHelper {
                    vocabulary: Vocabulary {
                        commands,
                        answers: Vec::new(),
                    },
                }));
                manager.history = history_path();
                if let Some(path) = &manager.history {
                    load_history(&mut editor, path);
                }
                manager.editor = Some(editor);
            },
            Err(err) => warn!("line editor unavailable ({err}); reading plain lines"),
        }
        manager
    }

    /// Offer `answers` for completion until the next call; empty restores commands.
    pub fn set_answers(&mut self, answers: Vec<String>) {
        if let Some(helper) = self.editor.as_mut().and_then(ReplEditor::helper_mut) {
            helper.vocabulary.answers = answers;
        }
    }

    /// Read one line. A line editor that fails is dropped for plain stdin.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        let Some(editor) = self.editor.as_mut() else {
            return self.read_plain(prompt);
        };
        match editor.readline(prompt) {
            Ok(line) => {
                let answering = editor.helper().is_some_and(|h| h.vocabulary.answering());
                if !answering && !line.trim().is_empty() {
                    self.remember(&line);
                }
                Ok(InputEvent::Line(line))
            },
            Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
            Err(err) => {
                warn!("line editor failed ({err}); reading plain lines from now on");
                self.editor = None;
                self.read_plain(prompt)
            },
        }
    }

    fn remember(&mut self, line: &str) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if let Err(err) = editor.add_history_entry(line) {
            warn!("failed to record history: {err}");
        }
        if let Some(path) = &self.history
            && let Err(err) = editor.save_history(path)
        {
            warn!("failed to save history to {}: {err}", path.display());
        }
    }

    fn read_plain(&mut self, prompt: &str) -> io::Result<InputEvent> {
        print!("{prompt}");
        io::stdout().flush()?;
        self.buffer.clear();
        if io::stdin().read_line(&mut self.buffer)? == 0 {
            return Ok(InputEvent::Eof);
        }
        Ok(InputEvent::Line(self.buffer.trim_end_matches(['\n', '\r']).to_string()))
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("wayfarer").join("history.txt"))
}

fn load_history(editor: &mut ReplEditor, path: &Path) {
    if let Some(dir) = path.parent()
        && let Err(err) = fs::create_dir_all(dir)
    {
        warn!("failed to create {}: {err}", dir.display());
    }
    match editor.load_history(path) {
        Ok(()) => info!("loaded history from {}", path.display()),
        Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {},
        Err(err) => warn!("failed to load history from {}: {err}", path.display()),
    }
}
