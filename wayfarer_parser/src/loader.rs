//! module `loader`
//!
//! TOML inputs for hosts: a command table that overrides or extends the
//! built-in commands, and a context snapshot for the demo REPL.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::info;
use wayfarer_data::{CommandTableDef, ParseContext};

use crate::registry::Registry;

/// Loads a command table from a TOML file
/// # Errors
/// - on file IO error or TOML parsing error
pub fn load_command_table(toml_path: &Path) -> Result<CommandTableDef> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading command table from '{}'", toml_path.display()))?;
    let table: CommandTableDef =
        toml::from_str(&text).with_context(|| format!("parsing command table from '{}'", toml_path.display()))?;

    info!("{} command entries loaded from '{}'", table.commands.len(), toml_path.display());
    Ok(table)
}

/// Builds a registry from the defaults plus the table at `toml_path`
/// # Errors
/// - on file IO or TOML parsing error
/// - if the table fails validation
pub fn load_registry(toml_path: &Path) -> Result<Registry> {
    let table = load_command_table(toml_path)?;
    let mut registry = Registry::with_defaults();
    registry
        .apply_table(&table)
        .with_context(|| format!("applying command table '{}'", toml_path.display()))?;
    Ok(registry)
}

/// Loads a parse context snapshot from a TOML file
/// # Errors
/// - on file IO error or TOML parsing error
pub fn load_context(toml_path: &Path) -> Result<ParseContext> {
    let text =
        fs::read_to_string(toml_path).with_context(|| format!("reading context from '{}'", toml_path.display()))?;
    let ctx: ParseContext =
        toml::from_str(&text).with_context(|| format!("parsing context from '{}'", toml_path.display()))?;

    info!(
        "context loaded from '{}': {} nearby, {} carried, {} directions",
        toml_path.display(),
        ctx.nearby.len(),
        ctx.inventory.len(),
        ctx.directions.len()
    );
    Ok(ctx)
}
