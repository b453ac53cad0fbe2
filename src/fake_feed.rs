//! Synthetic market slate for keyless demo runs.
//!
//! Generates the same `MarketRow` shapes the live provider produces, so the
//! whole pipeline (matcher, projections, leaderboard, editor) runs without
//! an API key.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::odds::aggregate_probability;
use crate::state::MarketRow;

const BOOKS: &[&str] = &["draftkings", "fanduel", "betmgm", "caesars"];

const QBS: &[&str] = &[
    "Josh Allen",
    "Lamar Jackson",
    "Jalen Hurts",
    "Patrick Mahomes",
    "Joe Burrow",
    "Jared Goff",
];
const RBS: &[&str] = &[
    "Saquon Barkley",
    "Bijan Robinson",
    "Jahmyr Gibbs",
    "Derrick Henry",
    "Christian McCaffrey",
    "James Cook",
    "Josh Jacobs",
    "Kyren Williams",
];
const WRS: &[&str] = &[
    "Ja'Marr Chase",
    "Justin Jefferson",
    "CeeDee Lamb",
    "Amon-Ra St. Brown",
    "Puka Nacua",
    "A.J. Brown",
    "Nico Collins",
    "Drake London",
    "Tyreek Hill",
    "Garrett Wilson",
];
const TES: &[&str] = &[
    "Brock Bowers",
    "Trey McBride",
    "George Kittle",
    "Sam LaPorta",
    "Mark Andrews",
    "Travis Kelce",
];

pub fn demo_market_rows() -> Vec<MarketRow> {
    let mut rng = rand::thread_rng();
    let mut rows = Vec::new();

    for name in QBS {
        let id = player_id(name);
        push_ou(&mut rows, &mut rng, &id, name, "QB", "passing_yards", "Passing Yards", 215.0, 290.0);
        push_ou(&mut rows, &mut rng, &id, name, "QB", "passing_touchdowns", "Passing Touchdowns", 1.5, 2.5);
        push_ou(&mut rows, &mut rng, &id, name, "QB", "rushing_yards", "Rushing Yards", 12.0, 45.0);
        push_yes(&mut rows, &mut rng, &id, name, "QB", 0.25);
    }

    for name in RBS {
        let id = player_id(name);
        push_ou(&mut rows, &mut rng, &id, name, "RB", "rushing_yards", "Rushing Yards", 45.0, 105.0);
        push_ou(&mut rows, &mut rng, &id, name, "RB", "receptions", "Total Receptions", 1.5, 4.5);
        push_ou(&mut rows, &mut rng, &id, name, "RB", "receiving_yards", "Receiving Yards", 10.0, 38.0);
        push_yes(&mut rows, &mut rng, &id, name, "RB", 0.45);
    }

    for name in WRS {
        let id = player_id(name);
        push_ou(&mut rows, &mut rng, &id, name, "WR", "receptions", "Total Receptions", 3.5, 7.5);
        push_ou(&mut rows, &mut rng, &id, name, "WR", "receiving_yards", "Receiving Yards", 45.0, 95.0);
        push_yes(&mut rows, &mut rng, &id, name, "WR", 0.38);
    }

    for name in TES {
        let id = player_id(name);
        push_ou(&mut rows, &mut rng, &id, name, "TE", "receptions", "Total Receptions", 2.5, 5.5);
        push_ou(&mut rows, &mut rng, &id, name, "TE", "receiving_yards", "Receiving Yards", 28.0, 62.0);
        push_yes(&mut rows, &mut rng, &id, name, "TE", 0.30);
    }

    // A couple of variant rows the matcher must skip, like the live feed has.
    if let Some(name) = RBS.first() {
        let id = player_id(name);
        rows.push(build_row(
            &mut rng,
            &id,
            name,
            "RB",
            &format!("rushing_yards-{id}-1h-ou-over"),
            "Rushing Yards 1H",
            Some(32.5),
            -110,
        ));
    }

    rows.shuffle(&mut rng);
    rows
}

fn player_id(name: &str) -> String {
    let core: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    let core = core.split('_').filter(|t| !t.is_empty()).collect::<Vec<_>>().join("_");
    format!("{core}_1_NFL")
}

fn push_ou(
    rows: &mut Vec<MarketRow>,
    rng: &mut impl Rng,
    id: &str,
    name: &str,
    position: &str,
    stat: &str,
    stat_label: &str,
    lo: f64,
    hi: f64,
) {
    let line = (rng.gen_range(lo..hi) * 2.0).round() / 2.0 + 0.5;
    let juice = rng.gen_range(-125..-102);
    rows.push(build_row(
        rng,
        id,
        name,
        position,
        &format!("{stat}-{id}-game-ou-over"),
        stat_label,
        Some(line),
        juice,
    ));
}

fn push_yes(
    rows: &mut Vec<MarketRow>,
    rng: &mut impl Rng,
    id: &str,
    name: &str,
    position: &str,
    base_prob: f64,
) {
    // Convert the target probability into rough American odds for the books.
    let p = (base_prob + rng.gen_range(-0.08..0.08)).clamp(0.08, 0.75);
    let odds = if p >= 0.5 {
        -((p / (1.0 - p)) * 100.0) as i64
    } else {
        (((1.0 - p) / p) * 100.0) as i64
    };
    let mut row = build_row(
        rng,
        id,
        name,
        position,
        &format!("touchdowns-{id}-game-yn-yes"),
        "Anytime Touchdown",
        None,
        odds,
    );
    row.stat_id = Some("touchdowns".to_string());
    row.side_id = Some("yes".to_string());
    rows.push(row);
}

fn build_row(
    rng: &mut impl Rng,
    id: &str,
    name: &str,
    position: &str,
    key: &str,
    stat_label: &str,
    line: Option<f64>,
    base_odds: i64,
) -> MarketRow {
    let mut book_odds = BTreeMap::new();
    for book in BOOKS {
        // Books disagree a little; one occasionally has the market dark.
        if rng.gen_bool(0.12) {
            book_odds.insert(book.to_string(), "N/A".to_string());
            continue;
        }
        let jitter = rng.gen_range(-8..8);
        let odds = base_odds + jitter;
        let text = if odds >= 0 {
            format!("+{odds}")
        } else {
            odds.to_string()
        };
        book_odds.insert(book.to_string(), text);
    }

    let raw: Vec<&String> = book_odds.values().collect();
    let avg_prob = aggregate_probability(&raw);

    let market_label = match line {
        Some(line) => format!("{stat_label} {line}"),
        None => stat_label.to_string(),
    };

    MarketRow {
        player_id: id.to_string(),
        player_name: name.to_string(),
        position: position.to_string(),
        market_label,
        market_key: key.to_string(),
        line: line.unwrap_or(0.0),
        book_odds,
        avg_prob,
        stat_id: None,
        side_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::StatKind;

    #[test]
    fn demo_slate_covers_every_position() {
        let rows = demo_market_rows();
        for pos in ["QB", "RB", "WR", "TE"] {
            assert!(rows.iter().any(|r| r.position == pos), "missing {pos}");
        }
    }

    #[test]
    fn demo_rows_have_probabilities_in_range() {
        for row in demo_market_rows() {
            assert!(
                row.avg_prob > 0.0 && row.avg_prob < 1.0,
                "{}: {}",
                row.market_key,
                row.avg_prob
            );
        }
    }

    #[test]
    fn demo_slate_resolves_core_stats_for_a_qb() {
        let rows = demo_market_rows();
        let allen: Vec<MarketRow> = rows
            .iter()
            .filter(|r| r.player_name == "Josh Allen")
            .cloned()
            .collect();
        assert!(crate::markets::find_market(StatKind::PassYards, &allen).is_some());
        let (_, prob) = crate::markets::resolve_total_touchdowns(&allen);
        assert!(prob > 0.0 && prob < 1.0);
    }
}
