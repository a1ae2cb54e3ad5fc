#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Wayfarer **
//! Interactive shell for trying the command interpreter against a context.

use wayfarer_parser::data_paths::data_path;
use wayfarer_parser::style::ParseStyle;
use wayfarer_parser::{Parser, WAYFARER_VERSION, load_context, load_registry, run_repl};

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading command table and context...");
    let registry = load_registry(&data_path("commands.toml")).context("while loading command table")?;
    let ctx = load_context(&data_path("context.toml")).context("while loading demo context")?;
    info!("{} commands registered.", registry.commands().count());
    let parser = Parser::with_registry(registry);

    println!(
        "{}",
        format!("WAYFARER {WAYFARER_VERSION}: type a command, or :help").bright_yellow().underline()
    );
    println!("{}", "Type :ctx to see what is nearby and carried.".meta_style());

    run_repl(&parser, ctx)
}
