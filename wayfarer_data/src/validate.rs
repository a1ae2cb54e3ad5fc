use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::*;

/// Validation error for malformed entries in a `CommandTableDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateVerb { verb: Verb },
    InvalidBounds { verb: Verb, min: usize, max: usize },
    EmptyAlias { verb: Verb, alias: String },
    SharedAlias { alias: String, first: Verb, second: Verb },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateVerb { verb } => {
                write!(f, "command '{verb}' is defined more than once")
            },
            ValidationError::InvalidBounds { verb, min, max } => {
                write!(f, "command '{verb}' has min_args {min} greater than max_args {max}")
            },
            ValidationError::EmptyAlias { verb, alias } => {
                write!(f, "command '{verb}' has an alias with no words ('{alias}')")
            },
            ValidationError::SharedAlias { alias, first, second } => {
                write!(f, "alias '{alias}' is claimed by both '{first}' and '{second}'")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a command table before it is handed to a registry.
///
/// ```
/// use wayfarer_data::{CommandDef, CommandTableDef, Verb, validate_commands};
///
/// let table = CommandTableDef {
///     commands: vec![
///         CommandDef::new(Verb::Take, &["grab", "pick up"], 1, 2),
///         CommandDef::new(Verb::Drop, &["discard"], 1, 2),
///     ],
/// };
/// assert!(validate_commands(&table).is_empty());
/// ```
pub fn validate_commands(table: &CommandTableDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut verbs = HashSet::new();
    let mut owners: HashMap<String, Verb> = HashMap::new();

    for def in &table.commands {
        if !verbs.insert(def.verb) {
            errors.push(ValidationError::DuplicateVerb { verb: def.verb });
        }
        if def.min_args > def.max_args {
            errors.push(ValidationError::InvalidBounds {
                verb: def.verb,
                min: def.min_args,
                max: def.max_args,
            });
        }
        for alias in &def.aliases {
            let key = phrase_key(alias);
            if key.is_empty() {
                errors.push(ValidationError::EmptyAlias {
                    verb: def.verb,
                    alias: alias.clone(),
                });
                continue;
            }
            match owners.get(&key) {
                Some(owner) if *owner != def.verb => errors.push(ValidationError::SharedAlias {
                    alias: key,
                    first: *owner,
                    second: def.verb,
                }),
                Some(_) => {},
                None => {
                    owners.insert(key, def.verb);
                },
            }
        }
    }

    errors
}

/// Lower-cased words of a phrase, ignoring anything that is not a letter or digit.
fn phrase_key(alias: &str) -> String {
    alias
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(commands: Vec<CommandDef>) -> CommandTableDef {
        CommandTableDef { commands }
    }

    #[test]
    fn flags_duplicate_verbs() {
        let errors = validate_commands(&table(vec![
            CommandDef::new(Verb::Eat, &[], 0, 1),
            CommandDef::new(Verb::Eat, &["consume"], 0, 1),
        ]));
        assert_eq!(errors, vec![ValidationError::DuplicateVerb { verb: Verb::Eat }]);
    }

    #[test]
    fn flags_inverted_bounds() {
        let errors = validate_commands(&table(vec![CommandDef::new(Verb::Use, &[], 3, 1)]));
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidBounds { verb: Verb::Use, min: 3, max: 1 }]
        ));
    }

    #[test]
    fn flags_aliases_without_words() {
        let errors = validate_commands(&table(vec![CommandDef::new(Verb::Help, &["?"], 0, 0)]));
        assert!(matches!(errors.as_slice(), [ValidationError::EmptyAlias { verb: Verb::Help, .. }]));
    }

    #[test]
    fn flags_alias_shared_between_verbs_after_folding_case_and_spacing() {
        let errors = validate_commands(&table(vec![
            CommandDef::new(Verb::Take, &["Pick  Up"], 1, 2),
            CommandDef::new(Verb::Craft, &["pick-up"], 1, 2),
        ]));
        assert_eq!(
            errors,
            vec![ValidationError::SharedAlias {
                alias: "pick up".into(),
                first: Verb::Take,
                second: Verb::Craft,
            }]
        );
    }

    #[test]
    fn display_names_the_offending_command() {
        let err = ValidationError::InvalidBounds {
            verb: Verb::Craft,
            min: 2,
            max: 1,
        };
        assert_eq!(err.to_string(), "command 'craft' has min_args 2 greater than max_args 1");
    }
}
