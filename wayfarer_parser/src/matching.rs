//! Scored name matching
//!
//! Entity names, directions and clarification options are all matched the
//! same way: an exact match beats a prefix match, which beats a small number
//! of typos. Callers collect the scored candidates, rank them, and decide
//! whether the top two are too close to call.

use std::cmp::Ordering;

use crate::policy::{MATCH_FLOOR, TIE_MARGIN};

pub const EXACT_SCORE: f64 = 1.0;
pub const PREFIX_SCORE: f64 = 0.9;
/// Typo matches score `TYPO_BASE - TYPO_STEP * distance`.
const TYPO_BASE: f64 = 0.8;
const TYPO_STEP: f64 = 0.1;

/// A candidate value with its match score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub value: T,
    pub score: f64,
}

impl<T> Scored<T> {
    pub fn new(value: T, score: f64) -> Self {
        Self { value, score }
    }
}

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// How many typos a phrase of `len` characters tolerates.
///
/// Very short phrases ("x", "go") only ever match exactly.
pub fn edit_limit(len: usize) -> usize {
    match len {
        0..=2 => 0,
        3..=4 => 1,
        5..=8 => 2,
        _ => 3,
    }
}

/// Score `query` against `candidate`, both already normalized.
///
/// Returns `None` when the two are too far apart to be worth considering.
pub fn score_name(query: &str, candidate: &str) -> Option<f64> {
    if query.is_empty() || candidate.is_empty() {
        return None;
    }
    if query == candidate {
        return Some(EXACT_SCORE);
    }
    if query.len() >= 2 && candidate.starts_with(query) {
        return Some(PREFIX_SCORE);
    }
    let limit = edit_limit(candidate.chars().count());
    if limit == 0 {
        return None;
    }
    let distance = edit_distance(query, candidate);
    if distance > limit {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(TYPO_BASE - TYPO_STEP * distance as f64)
}

/// Score every candidate, apply its boost, drop weak matches and rank the rest.
///
/// Ranking is score descending, then value ascending so results are stable.
pub fn rank_names<'a>(query: &str, candidates: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<Scored<String>> {
    let mut ranked: Vec<Scored<String>> = Vec::new();
    for (candidate, boost) in candidates {
        let Some(score) = score_name(query, candidate) else {
            continue;
        };
        let score = score + boost;
        if score < MATCH_FLOOR {
            continue;
        }
        match ranked.iter_mut().find(|existing| existing.value == candidate) {
            Some(existing) if existing.score < score => existing.score = score,
            Some(_) => {},
            None => ranked.push(Scored::new(candidate.to_string(), score)),
        }
    }
    ranked.sort_by(compare_scored);
    ranked
}

/// Order by score descending, then by value ascending.
pub fn compare_scored<T: Ord>(a: &Scored<T>, b: &Scored<T>) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.value.cmp(&b.value))
}

/// True when the runner-up is within the tie margin of the leader and
/// `second_ok` accepts its score.
pub fn is_close_call<T>(ranked: &[Scored<T>], second_ok: impl Fn(f64) -> bool) -> bool {
    match ranked {
        [best, second, ..] => best.score - second.score <= TIE_MARGIN + 1e-9 && second_ok(second.score),
        _ => false,
    }
}
