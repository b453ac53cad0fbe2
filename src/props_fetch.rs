//! Odds provider ingestion: one parameterized read returning event records,
//! normalized into flat [`MarketRow`]s.
//!
//! The provider is loose about shapes: `odds` arrives either as a map keyed
//! by odd id or as a list of records, and `players` either as structured
//! descriptors or bare id strings. Both are accepted here so the core never
//! sees the difference.

use std::collections::{BTreeMap, HashMap};
use std::env;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_client::http_client;
use crate::odds::aggregate_probability;
use crate::state::MarketRow;

const DEFAULT_API_BASE: &str = "https://api.sportsgameodds.com/v2";

#[derive(Debug, Clone)]
pub struct PropsFetchConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub league: String,
}

impl PropsFetchConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("PROPS_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let base_url = env::var("PROPS_API_BASE")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let league = env::var("PROPS_LEAGUE")
            .unwrap_or_else(|_| "NFL".to_string())
            .trim()
            .to_ascii_uppercase();
        Self {
            api_key,
            base_url,
            league,
        }
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

pub fn fetch_market_rows(cfg: &PropsFetchConfig) -> Result<Vec<MarketRow>> {
    let api_key = cfg.api_key.as_ref().context("PROPS_API_KEY missing")?;

    let url = format!("{}/events", cfg.base_url);
    let client = http_client()?;
    let resp = client
        .get(&url)
        .query(&[
            ("leagueID", cfg.league.as_str()),
            ("oddsAvailable", "true"),
        ])
        .header("X-Api-Key", api_key.as_str())
        .send()
        .context("props request failed")?;

    let status = resp.status();
    let body = resp.text().context("failed reading props body")?;
    if !status.is_success() {
        let snippet = body
            .trim()
            .replace('\n', " ")
            .replace('\r', " ")
            .chars()
            .take(220)
            .collect::<String>();
        return Err(anyhow::anyhow!("props http {}: {}", status, snippet));
    }

    parse_events_json(&body)
}

/// Flatten an events payload into market rows. Tolerates `data`/`events`
/// wrappers, a bare top-level array, and `null`.
pub fn parse_events_json(raw: &str) -> Result<Vec<MarketRow>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid events json")?;
    let events = match &root {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => root
            .get("data")
            .or_else(|| root.get("events"))
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };

    let mut rows = Vec::new();
    for event in events {
        let players = collect_players(event.get("players"));
        collect_odds(event.get("odds"), &players, &mut rows);
    }
    Ok(rows)
}

#[derive(Debug, Clone)]
struct PlayerRef {
    name: String,
    position: String,
}

/// Player descriptors arrive as an id-keyed map of records, a list of
/// records, or a list of bare id strings. Bare ids still yield a usable
/// display name.
fn collect_players(value: Option<&Value>) -> HashMap<String, PlayerRef> {
    let mut out = HashMap::new();
    let Some(value) = value else {
        return out;
    };

    match value {
        Value::Object(map) => {
            for (id, record) in map {
                out.insert(id.clone(), player_from_record(id, record));
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(id) => {
                        out.insert(
                            id.clone(),
                            PlayerRef {
                                name: prettify_player_id(id),
                                position: String::new(),
                            },
                        );
                    }
                    Value::Object(_) => {
                        if let Some(id) = pick_string(item, &["playerID", "id"]) {
                            out.insert(id.clone(), player_from_record(&id, item));
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    out
}

fn player_from_record(id: &str, record: &Value) -> PlayerRef {
    let name = pick_string(record, &["name", "fullName"])
        .or_else(|| {
            let first = pick_string(record, &["firstName"])?;
            let last = pick_string(record, &["lastName"])?;
            Some(format!("{first} {last}"))
        })
        .unwrap_or_else(|| prettify_player_id(id));
    let position = pick_string(record, &["position", "pos"]).unwrap_or_default();
    PlayerRef { name, position }
}

/// "JOSH_ALLEN_1_NFL" -> "Josh Allen".
fn prettify_player_id(id: &str) -> String {
    id.split('_')
        .take_while(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|t| {
            let mut chars = t.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_odds(
    value: Option<&Value>,
    players: &HashMap<String, PlayerRef>,
    rows: &mut Vec<MarketRow>,
) {
    let Some(value) = value else {
        return;
    };
    match value {
        Value::Object(map) => {
            for (key, record) in map {
                if let Some(row) = build_market_row(key, record, players) {
                    rows.push(row);
                }
            }
        }
        Value::Array(items) => {
            for record in items {
                let Some(key) = pick_string(record, &["oddID", "oddId", "id"]) else {
                    continue;
                };
                if let Some(row) = build_market_row(&key, record, players) {
                    rows.push(row);
                }
            }
        }
        _ => {}
    }
}

/// One provider odds record -> one MarketRow, or None when the record is not
/// a player proposition we project from (wrong side, no player).
fn build_market_row(
    key: &str,
    record: &Value,
    players: &HashMap<String, PlayerRef>,
) -> Option<MarketRow> {
    let key_parts: Vec<&str> = key.split('-').collect();

    // The side token is only trustworthy from keys that follow the
    // stat-entity-period-bettype-side convention.
    let side_id = pick_string(record, &["sideID", "side"]).or_else(|| {
        (key_parts.len() >= 4)
            .then(|| key_parts.last().map(|s| s.to_string()))
            .flatten()
    });
    // Two-sided markets are ingested on their over/yes side only; the
    // matcher then never has to disambiguate over vs under.
    if let Some(side) = side_id.as_deref() {
        let side = side.trim().to_ascii_lowercase();
        if side != "over" && side != "yes" {
            return None;
        }
    }

    let player_id = pick_string(record, &["playerID", "statEntityID"])
        .or_else(|| key_parts.get(1).map(|s| s.to_string()))?;
    // Team-level entities ("home"/"away"/"all") are not players; a real
    // player id carries the LEAGUE-suffixed underscore shape.
    let player = match players.get(&player_id) {
        Some(p) => p.clone(),
        None if player_id.contains('_') => PlayerRef {
            name: prettify_player_id(&player_id),
            position: String::new(),
        },
        None => return None,
    };

    let stat_id = pick_string(record, &["statID", "statId"]);
    let market_name = pick_string(record, &["marketName", "market"]);

    let line = pick_f64(record, &["bookOverUnder", "fairOverUnder", "overUnder", "line"])
        .or_else(|| market_name.as_deref().and_then(trailing_number))
        .unwrap_or(0.0);

    let market_label = market_name.unwrap_or_else(|| {
        let stat = stat_id
            .clone()
            .or_else(|| key_parts.first().map(|s| s.to_string()))
            .unwrap_or_default();
        let pretty = stat.replace('_', " ");
        if line != 0.0 {
            format!("{pretty} {line}")
        } else {
            pretty
        }
    });

    let book_odds = collect_book_odds(record);
    let raw: Vec<&String> = book_odds.values().collect();
    let avg_prob = aggregate_probability(&raw);

    Some(MarketRow {
        player_id,
        player_name: player.name,
        position: player.position,
        market_label,
        market_key: key.to_string(),
        line,
        book_odds,
        avg_prob,
        stat_id,
        side_id,
    })
}

/// Per-book odds sit under `byBookmaker` as records or bare scalars; a lone
/// consensus figure may also ride on `bookOdds`/`odds` at the record root.
fn collect_book_odds(record: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    if let Some(Value::Object(books)) = record.get("byBookmaker") {
        for (book, entry) in books {
            let raw = match entry {
                Value::Object(_) => pick_string(entry, &["odds", "bookOdds", "price"]),
                other => value_to_text(other),
            };
            if let Some(raw) = raw {
                out.insert(book.clone(), raw);
            }
        }
    }

    if out.is_empty()
        && let Some(raw) = pick_string(record, &["bookOdds", "odds", "fairOdds"])
    {
        out.insert("consensus".to_string(), raw);
    }

    out
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(found) = value.get(key)
            && let Some(text) = value_to_text(found)
        {
            return Some(text);
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        let Some(found) = value.get(key) else {
            continue;
        };
        match found {
            Value::Number(n) => return n.as_f64(),
            Value::String(s) => {
                if let Ok(parsed) = s.trim().parse::<f64>() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(t.to_string()) }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// "Passing Yards 245.5" -> 245.5.
fn trailing_number(label: &str) -> Option<f64> {
    label.split_whitespace().last()?.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prettify_strips_numeric_and_league_suffix() {
        assert_eq!(prettify_player_id("JOSH_ALLEN_1_NFL"), "Josh Allen");
        assert_eq!(prettify_player_id("SAQUON_BARKLEY_1_NFL"), "Saquon Barkley");
    }

    #[test]
    fn trailing_number_parses_appended_line() {
        assert_eq!(trailing_number("Passing Yards 245.5"), Some(245.5));
        assert_eq!(trailing_number("Anytime Touchdown"), None);
    }

    #[test]
    fn under_and_no_sides_are_dropped() {
        let players = HashMap::new();
        let record = json!({"playerID": "A_1_NFL", "sideID": "under"});
        assert!(build_market_row("passing_yards-A_1_NFL-game-ou-under", &record, &players).is_none());
        let record = json!({"playerID": "A_1_NFL", "sideID": "no"});
        assert!(build_market_row("touchdowns-A_1_NFL-game-yn-no", &record, &players).is_none());
    }

    #[test]
    fn team_entity_rows_are_dropped() {
        let players = HashMap::new();
        let record = json!({"statEntityID": "home", "sideID": "over"});
        assert!(build_market_row("touchdowns-home-game-ou-over", &record, &players).is_none());
    }

    #[test]
    fn row_is_built_from_map_shaped_record() {
        let mut players = HashMap::new();
        players.insert(
            "JOSH_ALLEN_1_NFL".to_string(),
            PlayerRef {
                name: "Josh Allen".to_string(),
                position: "QB".to_string(),
            },
        );
        let record = json!({
            "statID": "passing_yards",
            "playerID": "JOSH_ALLEN_1_NFL",
            "sideID": "over",
            "marketName": "Passing Yards 245.5",
            "bookOverUnder": 245.5,
            "byBookmaker": {
                "draftkings": {"odds": "-115"},
                "fanduel": {"odds": "-110"}
            }
        });
        let row = build_market_row(
            "passing_yards-JOSH_ALLEN_1_NFL-game-ou-over",
            &record,
            &players,
        )
        .expect("row");
        assert_eq!(row.player_name, "Josh Allen");
        assert_eq!(row.position, "QB");
        assert_eq!(row.line, 245.5);
        assert_eq!(row.book_odds.len(), 2);
        let expected = (115.0 / 215.0 + 110.0 / 210.0) / 2.0;
        assert!((row.avg_prob - expected).abs() < 1e-12);
    }

    #[test]
    fn unknown_player_with_id_shape_still_builds() {
        let players = HashMap::new();
        let record = json!({"sideID": "over", "marketName": "Rushing Yards 58.5"});
        let row = build_market_row(
            "rushing_yards-JAMES_COOK_1_NFL-game-ou-over",
            &record,
            &players,
        )
        .expect("row");
        assert_eq!(row.player_name, "James Cook");
        assert_eq!(row.line, 58.5);
        // No parsable odds: neutral consensus.
        assert_eq!(row.avg_prob, 0.5);
    }

    #[test]
    fn null_payload_is_empty() {
        assert!(parse_events_json("null").unwrap().is_empty());
        assert!(parse_events_json("").unwrap().is_empty());
    }
}
