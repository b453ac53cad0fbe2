use std::fs;
use std::path::PathBuf;

use propboard::markets::{self, StatKind};
use propboard::props_fetch::parse_events_json;
use propboard::salary_fetch::parse_salaries_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_map_shaped_odds_with_structured_players() {
    let raw = read_fixture("props_events.json");
    let rows = parse_events_json(&raw).expect("fixture should parse");

    // under/no sides and the team-level home row are dropped at ingestion.
    assert_eq!(rows.len(), 3);

    let allen = rows
        .iter()
        .find(|r| r.market_key == "passing_yards-JOSH_ALLEN_1_NFL-game-ou-over")
        .expect("allen over row");
    assert_eq!(allen.player_name, "Josh Allen");
    assert_eq!(allen.position, "QB");
    assert_eq!(allen.line, 245.5);
    assert_eq!(allen.book_odds.len(), 3);
    // The N/A book is excluded from the mean of the two live prices.
    let expected = (115.0 / 215.0 + 110.0 / 210.0) / 2.0;
    assert!((allen.avg_prob - expected).abs() < 1e-9);

    let cook = rows
        .iter()
        .find(|r| r.market_key == "touchdowns-JAMES_COOK_1_NFL-game-yn-yes")
        .expect("cook yes row");
    assert_eq!(cook.player_name, "James Cook");
    assert_eq!(cook.stat_id.as_deref(), Some("touchdowns"));
    assert_eq!(cook.side_id.as_deref(), Some("yes"));
    assert!((cook.avg_prob - 135.0 / 235.0).abs() < 1e-9);
}

#[test]
fn parses_list_shaped_odds_with_bare_player_ids() {
    let raw = read_fixture("props_events_list.json");
    let rows = parse_events_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 4);

    let barkley = rows
        .iter()
        .find(|r| r.market_key == "rushing_yards-SAQUON_BARKLEY_1_NFL-game-ou-over")
        .expect("barkley row");
    assert_eq!(barkley.player_name, "Saquon Barkley");
    // Line parsed from the trailing number of the market label.
    assert_eq!(barkley.line, 95.5);
    // Bare scalar book entries are accepted.
    assert_eq!(barkley.book_odds.len(), 2);

    let lamb = rows
        .iter()
        .find(|r| r.market_key == "receiving_yards-CEEDEE_LAMB_1_NFL-game-ou-over")
        .expect("lamb row");
    // "EVEN" never parses; the consensus falls back to neutral.
    assert_eq!(lamb.avg_prob, 0.5);
}

#[test]
fn parsed_rows_feed_the_matcher_end_to_end() {
    let raw = read_fixture("props_events_list.json");
    let rows = parse_events_json(&raw).expect("fixture should parse");

    let barkley: Vec<_> = rows
        .iter()
        .filter(|r| r.player_id == "SAQUON_BARKLEY_1_NFL")
        .cloned()
        .collect();
    // The alt row is ingested but the matcher must skip it.
    assert_eq!(barkley.len(), 2);
    let found = markets::find_market(StatKind::RushYards, &barkley).expect("match");
    assert_eq!(found.line, 95.5);

    let lamb: Vec<_> = rows
        .iter()
        .filter(|r| r.player_id == "CEEDEE_LAMB_1_NFL")
        .cloned()
        .collect();
    // No yes/no market: the resolver falls back to the numeric row, not to
    // the terminal (0.5, 0.5) default.
    let (line, prob) = markets::resolve_total_touchdowns(&lamb);
    assert_eq!(line, 0.5);
    assert!((prob - 100.0 / 230.0).abs() < 1e-9);
}

#[test]
fn yes_no_market_wins_over_numeric_fallback() {
    let raw = read_fixture("props_events.json");
    let rows = parse_events_json(&raw).expect("fixture should parse");
    let cook: Vec<_> = rows
        .iter()
        .filter(|r| r.player_id == "JAMES_COOK_1_NFL")
        .cloned()
        .collect();
    let (line, prob) = markets::resolve_total_touchdowns(&cook);
    assert_eq!(line, 0.5);
    assert!((prob - 135.0 / 235.0).abs() < 1e-9);
}

#[test]
fn all_payload_shapes_accept_null_and_empty() {
    assert!(parse_events_json("null").unwrap().is_empty());
    assert!(parse_events_json("").unwrap().is_empty());
    assert!(parse_events_json("[]").unwrap().is_empty());
    assert!(parse_events_json("{\"data\": []}").unwrap().is_empty());
    assert!(parse_salaries_json("null").unwrap().is_empty());
}
