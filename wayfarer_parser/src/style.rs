//! Styling helpers for the demo REPL.
//!
//! [`ParseStyle`] applies ANSI styling via the `colored` crate, implemented
//! for `&str` and `String` so literals and formatted text style the same way.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to REPL output.
pub trait ParseStyle {
    fn prompt_style(&self) -> ColoredString;
    fn command_style(&self) -> ColoredString;
    fn question_style(&self) -> ColoredString;
    fn option_style(&self) -> ColoredString;
    fn confidence_style(&self) -> ColoredString;
    fn entity_style(&self) -> ColoredString;
    fn meta_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl ParseStyle for &str {
    fn prompt_style(&self) -> ColoredString {
        self.truecolor(110, 220, 110)
    }
    fn command_style(&self) -> ColoredString {
        self.bold().truecolor(223, 77, 10)
    }
    fn question_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn option_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn confidence_style(&self) -> ColoredString {
        self.dimmed()
    }
    fn entity_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60).underline()
    }
    fn meta_style(&self) -> ColoredString {
        self.italic().truecolor(75, 180, 255)
    }
    fn error_style(&self) -> ColoredString {
        self.bold().truecolor(200, 50, 50)
    }
}

impl ParseStyle for String {
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn command_style(&self) -> ColoredString {
        self.as_str().command_style()
    }
    fn question_style(&self) -> ColoredString {
        self.as_str().question_style()
    }
    fn option_style(&self) -> ColoredString {
        self.as_str().option_style()
    }
    fn confidence_style(&self) -> ColoredString {
        self.as_str().confidence_style()
    }
    fn entity_style(&self) -> ColoredString {
        self.as_str().entity_style()
    }
    fn meta_style(&self) -> ColoredString {
        self.as_str().meta_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}
