//! Quantity and movement extraction
//!
//! Both scans run over the tokens left after the verb is matched, left to
//! right, and strip the first thing they recognize. Everything else is
//! returned untouched for argument resolution.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use wayfarer_data::{MovementScale, Quantity, QuantityUnit, TravelCondition};

lazy_static! {
    static ref INTEGER_WITH_SUFFIX: Regex = Regex::new(r"^(\d+)([a-z]*)$").expect("valid integer regex");
    static ref NUMBER_WITH_SUFFIX: Regex = Regex::new(r"^(\d+(?:\.\d+)?)([a-z]*)$").expect("valid number regex");
}

const DARK_WORDS: &[&str] = &["dark", "night", "nightfall", "dusk", "sunset"];
const TIRED_WORDS: &[&str] = &["exhausted", "tired"];

/// Parse a single token as a quantity.
///
/// Recognizes `all`, `some`, bare non-negative integers and integers with an
/// hour or minute suffix (`2h`, `3hr`, `4hours`, `5m`, `10min`, `15mins`).
pub fn parse_quantity_token(token: &str) -> Option<Quantity> {
    match token {
        "all" => {
            return Some(Quantity {
                raw: token.to_string(),
                count: Quantity::ALL,
                unit: QuantityUnit::All,
            });
        },
        "some" => {
            return Some(Quantity {
                raw: token.to_string(),
                count: Quantity::SOME,
                unit: QuantityUnit::Some,
            });
        },
        _ => {},
    }

    let caps = INTEGER_WITH_SUFFIX.captures(token)?;
    // digits only, so a failed parse can only be an overflow
    let count = caps[1].parse::<i64>().unwrap_or(i64::MAX);
    let unit = match &caps[2] {
        "" => QuantityUnit::Count,
        suffix => duration_unit(suffix)?,
    };
    Some(Quantity {
        raw: token.to_string(),
        count,
        unit,
    })
}

fn duration_unit(word: &str) -> Option<QuantityUnit> {
    match word {
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(QuantityUnit::Hours),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(QuantityUnit::Minutes),
        _ => None,
    }
}

/// Pull the first quantity out of `tokens`.
///
/// A bare count followed by a duration word (`2 hours`) becomes a duration,
/// and a `for` directly before a duration is dropped with it.
pub fn extract_quantity(tokens: &[String]) -> (Option<Quantity>, Vec<String>) {
    let mut rest = Vec::with_capacity(tokens.len());
    let mut found = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if found.is_none()
            && let Some(mut quantity) = parse_quantity_token(token)
        {
            if quantity.unit == QuantityUnit::Count
                && let Some(unit) = tokens.get(i + 1).and_then(|next| duration_unit(next))
            {
                quantity.raw = format!("{} {}", token, tokens[i + 1]);
                quantity.unit = unit;
                i += 1;
            }
            if matches!(quantity.unit, QuantityUnit::Hours | QuantityUnit::Minutes)
                && rest.last().is_some_and(|prev: &String| prev == "for")
            {
                rest.pop();
            }
            found = Some(quantity);
        } else {
            rest.push(token.clone());
        }
        i += 1;
    }

    (found, rest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtentUnit {
    Meters,
    Kilometers,
    Tiles,
    Minutes,
    Hours,
}

/// Map a unit word or suffix to its extent unit.
fn extent_unit(word: &str) -> Option<ExtentUnit> {
    match word {
        "m" | "meter" | "meters" | "metre" | "metres" => Some(ExtentUnit::Meters),
        "km" | "kms" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Some(ExtentUnit::Kilometers),
        "tile" | "tiles" => Some(ExtentUnit::Tiles),
        "min" | "mins" | "minute" | "minutes" => Some(ExtentUnit::Minutes),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(ExtentUnit::Hours),
        _ => None,
    }
}

/// True for a word that could complete a bare number ("meters", "km", ...).
pub fn is_extent_unit(word: &str) -> bool {
    extent_unit(word).is_some()
}

/// `None` when the converted value does not fit a `u32`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn build_scale(value: f64, unit: ExtentUnit) -> Option<MovementScale> {
    let whole = |v: f64| {
        let rounded = v.round().max(0.0);
        (rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
    };
    let mut scale = MovementScale::default();
    match unit {
        ExtentUnit::Meters => scale.distance_meters = Some(whole(value)?),
        ExtentUnit::Kilometers => scale.distance_meters = Some(whole(value * 1000.0)?),
        ExtentUnit::Tiles => scale.tiles = Some(whole(value)?),
        ExtentUnit::Minutes => scale.duration_minutes = Some(whole(value)?),
        ExtentUnit::Hours => scale.duration_minutes = Some(whole(value * 60.0)?),
    }
    Some(scale)
}

fn condition_word(word: &str) -> Option<TravelCondition> {
    if DARK_WORDS.contains(&word) {
        Some(TravelCondition::Dark)
    } else if TIRED_WORDS.contains(&word) {
        Some(TravelCondition::Tired)
    } else {
        None
    }
}

/// Result of scanning for a movement extent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovementScan {
    pub scale: Option<MovementScale>,
    /// A bare number with no unit, when no valid extent was found.
    pub ambiguous_number: Option<String>,
    /// An extent too large to represent; consumed but not used.
    pub out_of_range: Option<String>,
    /// Tokens not consumed by the scan.
    pub rest: Vec<String>,
}

/// Scan tokens for the first distance, duration, tile count or stopping condition.
///
/// ```
/// use wayfarer_parser::quantity::scan_movement;
///
/// let tokens: Vec<String> = ["north", "1.5km"].iter().map(|s| s.to_string()).collect();
/// let scan = scan_movement(&tokens);
/// assert_eq!(scan.scale.unwrap().distance_meters, Some(1500));
/// assert_eq!(scan.rest, vec!["north".to_string()]);
/// ```
pub fn scan_movement(tokens: &[String]) -> MovementScan {
    let mut scan = MovementScan::default();
    let mut bare_number_at: Option<usize> = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if scan.scale.is_some() {
            scan.rest.push(token.clone());
            i += 1;
            continue;
        }

        if token == "until"
            && let Some(condition) = tokens.get(i + 1).and_then(|next| condition_word(next))
        {
            scan.scale = Some(MovementScale {
                condition,
                ..MovementScale::default()
            });
            i += 2;
            continue;
        }

        if let Some(caps) = NUMBER_WITH_SUFFIX.captures(token)
            && let Ok(value) = caps[1].parse::<f64>()
        {
            let suffix = &caps[2];
            let unit = if suffix.is_empty() {
                let unit = tokens.get(i + 1).and_then(|next| extent_unit(next));
                if unit.is_some() {
                    i += 1;
                }
                unit
            } else {
                extent_unit(suffix)
            };
            match unit {
                Some(unit) => {
                    if scan.rest.last().is_some_and(|prev| prev == "for") {
                        scan.rest.pop();
                    }
                    match build_scale(value, unit) {
                        Some(scale) => scan.scale = Some(scale),
                        None => {
                            debug!("dropping out-of-range extent '{token}'");
                            scan.out_of_range.get_or_insert_with(|| token.clone());
                        },
                    }
                    i += 1;
                    continue;
                },
                None if suffix.is_empty() && bare_number_at.is_none() => {
                    bare_number_at = Some(scan.rest.len());
                },
                None => {},
            }
        }

        scan.rest.push(token.clone());
        i += 1;
    }

    if scan.scale.is_none()
        && let Some(at) = bare_number_at
    {
        scan.ambiguous_number = Some(scan.rest.remove(at));
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn quantity_literals_and_counts() {
        let all = parse_quantity_token("all").unwrap();
        assert_eq!((all.count, all.unit), (-1, QuantityUnit::All));
        let some = parse_quantity_token("some").unwrap();
        assert_eq!((some.count, some.unit), (0, QuantityUnit::Some));
        let three = parse_quantity_token("3").unwrap();
        assert_eq!((three.count, three.unit), (3, QuantityUnit::Count));
    }

    #[test]
    fn quantity_duration_suffixes() {
        for (token, unit) in [
            ("2h", QuantityUnit::Hours),
            ("2hr", QuantityUnit::Hours),
            ("2hours", QuantityUnit::Hours),
            ("20m", QuantityUnit::Minutes),
            ("20min", QuantityUnit::Minutes),
            ("20mins", QuantityUnit::Minutes),
        ] {
            assert_eq!(parse_quantity_token(token).unwrap().unit, unit, "token {token}");
        }
        assert!(parse_quantity_token("2x").is_none());
        assert!(parse_quantity_token("-2").is_none());
        assert!(parse_quantity_token("stick").is_none());
    }

    #[test]
    fn extract_quantity_takes_first_match_only() {
        let (quantity, rest) = extract_quantity(&toks("2 berries 3"));
        assert_eq!(quantity.unwrap().count, 2);
        assert_eq!(rest, toks("berries 3"));
    }

    #[test]
    fn extract_quantity_merges_count_and_duration_word() {
        let (quantity, rest) = extract_quantity(&toks("for 2 hours"));
        let quantity = quantity.unwrap();
        assert_eq!(quantity.unit, QuantityUnit::Hours);
        assert_eq!(quantity.raw, "2 hours");
        assert!(rest.is_empty());
    }

    #[test]
    fn movement_distances_normalize_to_meters() {
        assert_eq!(scan_movement(&toks("north 500m")).scale.unwrap().distance_meters, Some(500));
        assert_eq!(scan_movement(&toks("2km")).scale.unwrap().distance_meters, Some(2000));
        assert_eq!(scan_movement(&toks("1.5km")).scale.unwrap().distance_meters, Some(1500));
        assert_eq!(scan_movement(&toks("2 km north")).scale.unwrap().distance_meters, Some(2000));
    }

    #[test]
    fn movement_durations_and_tiles() {
        let scan = scan_movement(&toks("east for 2 hours"));
        assert_eq!(scan.scale.unwrap().duration_minutes, Some(120));
        assert_eq!(scan.rest, toks("east"));
        assert_eq!(scan_movement(&toks("10 minutes")).scale.unwrap().duration_minutes, Some(10));
        assert_eq!(scan_movement(&toks("3 tiles")).scale.unwrap().tiles, Some(3));
    }

    #[test]
    fn movement_conditions() {
        let dark = scan_movement(&toks("west until dark")).scale.unwrap();
        assert_eq!(dark.condition, TravelCondition::Dark);
        assert_eq!(dark.distance_meters, None);
        let tired = scan_movement(&toks("until exhausted")).scale.unwrap();
        assert_eq!(tired.condition, TravelCondition::Tired);
    }

    #[test]
    fn bare_number_is_reported_as_ambiguous() {
        let scan = scan_movement(&toks("5"));
        assert!(scan.scale.is_none());
        assert_eq!(scan.ambiguous_number.as_deref(), Some("5"));
        assert!(scan.rest.is_empty());
    }

    #[test]
    fn overflowing_count_stays_a_count() {
        let quantity = parse_quantity_token("99999999999999999999").unwrap();
        assert_eq!((quantity.count, quantity.unit), (i64::MAX, QuantityUnit::Count));
        let (quantity, rest) = extract_quantity(&toks("99999999999999999999 sticks"));
        assert_eq!(quantity.unwrap().raw, "99999999999999999999");
        assert_eq!(rest, toks("sticks"));
    }

    #[test]
    fn out_of_range_extent_is_dropped() {
        let scan = scan_movement(&toks("north 99999999999km"));
        assert!(scan.scale.is_none());
        assert_eq!(scan.out_of_range.as_deref(), Some("99999999999km"));
        assert_eq!(scan.ambiguous_number, None);
        assert_eq!(scan.rest, toks("north"));
    }

    #[test]
    fn later_valid_extent_wins_over_bare_number() {
        let scan = scan_movement(&toks("5 north 300m"));
        assert_eq!(scan.scale.unwrap().distance_meters, Some(300));
        assert_eq!(scan.ambiguous_number, None);
        assert_eq!(scan.rest, toks("5 north"));
    }
}
