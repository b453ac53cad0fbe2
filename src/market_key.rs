//! Predicates over raw market keys and labels.
//!
//! Provider keys pack market type, entity, period, bet type and side into one
//! dash-separated string, e.g. `passing_yards-JOSH_ALLEN_1_NFL-game-ou-over`
//! or `touchdowns-JOSH_ALLEN_1_NFL-game-yn-yes`. These predicates are
//! heuristic by nature: an unrecognized key shape simply fails the check and
//! the caller moves on to the next candidate row.

/// Tokens marking a market as a non-canonical variant of a player stat:
/// home/away/all-team splits, alternate lines, and sub-game periods.
const VARIANT_TOKENS: &[&str] = &[
    "home", "away", "all", "alt", "alternate", "1h", "2h", "h1", "h2", "1q", "2q", "3q", "4q",
    "q1", "q2", "q3", "q4", "firsthalf", "secondhalf", "firstquarter",
];

fn key_tokens(key: &str) -> impl Iterator<Item = String> + '_ {
    key.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
}

/// True when the key encodes a home-only/away-only/all-teams, alternate-line
/// or half/quarter market. Token-exact so `alt` never fires inside a name.
pub fn is_variant_key(key: &str) -> bool {
    key_tokens(key).any(|t| VARIANT_TOKENS.contains(&t.as_str()))
}

/// The `…-yn-yes` convention: a yes/no bet-type token with the affirmative
/// side token somewhere after it.
pub fn is_yes_side_key(key: &str) -> bool {
    let mut seen_yn = false;
    for token in key_tokens(key) {
        if token == "yn" {
            seen_yn = true;
        } else if seen_yn && token == "yes" {
            return true;
        }
    }
    false
}

pub fn mentions_touchdown(text: &str) -> bool {
    let core = alpha_core(text);
    core.contains("touchdown") || key_tokens(text).any(|t| t == "td" || t == "tds")
}

/// Free-text phrasing of the binary anytime-touchdown market, for providers
/// that label instead of key it: "Anytime Touchdown — Yes" and friends.
pub fn is_anytime_yes_label(label: &str) -> bool {
    let core = alpha_core(label);
    if !core.contains("yes") {
        return false;
    }
    core.contains("anytime") || core.contains("anytouchdown") || core.contains("anytouchdowns")
}

/// Lowercased alphabetic core used for every textual comparison in the
/// matcher, so "Pass Yds 245.5" and "passyds" agree on "passyds".
pub fn alpha_core(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
