//! Weighted fantasy-point projection and the leaderboard ranking built on it.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::markets::{self, STAT_COUNT, StatKind};
use crate::odds::NEUTRAL_PROB;
use crate::state::{MarketRow, SavedOverride, StatProjection};

/// Session-scoped points-per-unit table. Starts from the fixed defaults and
/// is edited in place from the weights screen; never shared across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    values: [f64; STAT_COUNT],
}

impl Default for ScoringWeights {
    fn default() -> Self {
        let mut values = [0.0; STAT_COUNT];
        for stat in StatKind::ALL {
            values[stat.index()] = stat.default_weight();
        }
        Self { values }
    }
}

impl ScoringWeights {
    pub fn get(&self, stat: StatKind) -> f64 {
        self.values[stat.index()]
    }

    pub fn set(&mut self, stat: StatKind, weight: f64) {
        self.values[stat.index()] = weight;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProjection {
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    pub stats: [StatProjection; STAT_COUNT],
    pub total_points: f64,
}

impl PlayerProjection {
    pub fn stat(&self, stat: StatKind) -> StatProjection {
        self.stats[stat.index()]
    }
}

/// Market-derived (quantity, probability) for one stat, before overrides.
///
/// When a touchdown market resolves, Total Touchdowns keeps the resolver's
/// probability but pins the projected quantity to 0.5 — the product shows an
/// even-baseline editable default there regardless of the resolved line. A
/// player with no touchdown market at all falls through to the same
/// (0.0, 0.5) default as every other unresolved stat.
pub fn resolve_stat(stat: StatKind, rows: &[MarketRow]) -> StatProjection {
    if stat == StatKind::TotalTouchdowns {
        return match markets::try_resolve_total_touchdowns(rows) {
            Some((_line, probability)) => StatProjection {
                quantity: 0.5,
                probability,
            },
            None => StatProjection {
                quantity: 0.0,
                probability: NEUTRAL_PROB,
            },
        };
    }

    match markets::find_market(stat, rows) {
        Some(row) => StatProjection {
            quantity: row.line,
            probability: row.avg_prob,
        },
        None => StatProjection {
            quantity: 0.0,
            probability: NEUTRAL_PROB,
        },
    }
}

/// Pure projection over one player's rows. Override fields win per stat when
/// present; anything the override leaves unset is filled from fresh market
/// resolution, so a partially-saved row still tracks the market.
pub fn project_player(
    player_id: &str,
    player_name: &str,
    position: &str,
    rows: &[MarketRow],
    weights: &ScoringWeights,
    saved: Option<&SavedOverride>,
) -> PlayerProjection {
    let mut stats = [StatProjection::default(); STAT_COUNT];
    let mut total_points = 0.0;

    for stat in StatKind::ALL {
        let projection = saved
            .and_then(|s| s.stats[stat.index()])
            .unwrap_or_else(|| resolve_stat(stat, rows));
        stats[stat.index()] = projection;
        total_points += projection.quantity * weights.get(stat) * projection.probability;
    }

    PlayerProjection {
        player_id: player_id.to_string(),
        player_name: player_name.to_string(),
        position: position.to_string(),
        stats,
        total_points,
    }
}

/// Distinct players of the current pull, in ascending name order. The name
/// sort doubles as the tie-break for equal projected totals downstream.
pub fn distinct_players(rows: &[MarketRow]) -> Vec<(String, String, String)> {
    let mut seen: HashMap<&str, (String, String, String)> = HashMap::new();
    for row in rows {
        seen.entry(&row.player_id).or_insert_with(|| {
            (
                row.player_id.clone(),
                row.player_name.clone(),
                row.position.clone(),
            )
        });
    }
    let mut players: Vec<_> = seen.into_values().collect();
    players.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    players
}

/// Project every player and rank descending by total points.
///
/// The position filter applies before truncation, so a filtered board shows
/// `limit` rows of that position rather than the residue of a global top-N.
/// The descending sort is stable over the name-ordered input.
pub fn rank_leaderboard(
    rows: &[MarketRow],
    overrides: &HashMap<String, SavedOverride>,
    weights: &ScoringWeights,
    limit: usize,
    position_filter: Option<&HashSet<String>>,
) -> Vec<PlayerProjection> {
    let players = distinct_players(rows);

    let by_player: HashMap<&str, Vec<&MarketRow>> =
        rows.iter().fold(HashMap::new(), |mut acc, row| {
            acc.entry(row.player_id.as_str()).or_default().push(row);
            acc
        });

    let mut board: Vec<PlayerProjection> = players
        .par_iter()
        .map(|(id, name, position)| {
            let player_rows: Vec<MarketRow> = by_player
                .get(id.as_str())
                .map(|rs| rs.iter().map(|r| (*r).clone()).collect())
                .unwrap_or_default();
            project_player(
                id,
                name,
                position,
                &player_rows,
                weights,
                overrides.get(id.as_str()),
            )
        })
        .collect();

    if let Some(allowed) = position_filter {
        board.retain(|p| allowed.contains(&p.position.trim().to_uppercase()));
    }

    board.sort_by(|a, b| {
        b.total_points
            .partial_cmp(&a.total_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    board.truncate(limit);
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn market_row(
        player: (&str, &str, &str),
        label: &str,
        key: &str,
        line: f64,
        avg_prob: f64,
    ) -> MarketRow {
        MarketRow {
            player_id: player.0.to_string(),
            player_name: player.1.to_string(),
            position: player.2.to_string(),
            market_label: label.to_string(),
            market_key: key.to_string(),
            line,
            book_odds: BTreeMap::new(),
            avg_prob,
            stat_id: None,
            side_id: None,
        }
    }

    const ALLEN: (&str, &str, &str) = ("JOSH_ALLEN_1_NFL", "Josh Allen", "QB");

    #[test]
    fn pass_yards_contribution_matches_hand_calc() {
        let prob = crate::odds::to_probability("-115").unwrap();
        let rows = vec![market_row(
            ALLEN,
            "Passing Yards 245.5",
            "passing_yards-JOSH_ALLEN_1_NFL-game-ou-over",
            245.5,
            prob,
        )];
        let weights = ScoringWeights::default();
        let projection = project_player(ALLEN.0, ALLEN.1, ALLEN.2, &rows, &weights, None);

        let pass = projection.stat(StatKind::PassYards);
        assert_eq!(pass.quantity, 245.5);
        assert!((pass.probability - 115.0 / 215.0).abs() < 1e-12);

        let expected_pass_points = 245.5 * 0.04 * prob;
        assert!((expected_pass_points - 5.25).abs() < 0.02);

        // Everything else is unresolved -> zero contribution.
        assert!((projection.total_points - expected_pass_points).abs() < 1e-9);
    }

    #[test]
    fn projection_is_deterministic() {
        let rows = vec![market_row(
            ALLEN,
            "Rushing Yards 32.5",
            "rushing_yards-JOSH_ALLEN_1_NFL-game-ou-over",
            32.5,
            0.51,
        )];
        let weights = ScoringWeights::default();
        let a = project_player(ALLEN.0, ALLEN.1, ALLEN.2, &rows, &weights, None);
        let b = project_player(ALLEN.0, ALLEN.1, ALLEN.2, &rows, &weights, None);
        assert_eq!(a.total_points.to_bits(), b.total_points.to_bits());
    }

    #[test]
    fn zero_rows_project_to_exactly_zero_points() {
        let weights = ScoringWeights::default();
        let projection = project_player("X_1_NFL", "Nobody", "WR", &[], &weights, None);
        for stat in StatKind::ALL {
            let sp = projection.stat(stat);
            assert_eq!(sp.quantity, 0.0);
            assert_eq!(sp.probability, 0.5);
        }
        assert_eq!(projection.total_points, 0.0);
    }

    #[test]
    fn resolved_touchdown_market_pins_quantity_to_half() {
        let mut yes = market_row(
            ALLEN,
            "Anytime Touchdown",
            "touchdowns-JOSH_ALLEN_1_NFL-game-yn-yes",
            0.0,
            0.34,
        );
        yes.stat_id = Some("touchdowns".to_string());
        yes.side_id = Some("yes".to_string());
        let rows = vec![yes];
        let sp = resolve_stat(StatKind::TotalTouchdowns, &rows);
        assert_eq!(sp.quantity, 0.5);
        assert!((sp.probability - 0.34).abs() < 1e-12);
    }

    #[test]
    fn override_field_beats_market_and_gaps_fill_from_market() {
        let rows = vec![
            market_row(
                ALLEN,
                "Passing Yards 245.5",
                "passing_yards-JOSH_ALLEN_1_NFL-game-ou-over",
                245.5,
                0.53,
            ),
            market_row(
                ALLEN,
                "Rushing Yards 32.5",
                "rushing_yards-JOSH_ALLEN_1_NFL-game-ou-over",
                32.5,
                0.51,
            ),
        ];
        let mut saved = SavedOverride::new(ALLEN.0, ALLEN.1);
        saved.stats[StatKind::PassYards.index()] = Some(StatProjection {
            quantity: 300.0,
            probability: 0.6,
        });

        let weights = ScoringWeights::default();
        let projection =
            project_player(ALLEN.0, ALLEN.1, ALLEN.2, &rows, &weights, Some(&saved));

        let pass = projection.stat(StatKind::PassYards);
        assert_eq!(pass.quantity, 300.0);
        assert_eq!(pass.probability, 0.6);

        // Rush yards was not overridden: filled from the market row.
        let rush = projection.stat(StatKind::RushYards);
        assert_eq!(rush.quantity, 32.5);
        assert_eq!(rush.probability, 0.51);
    }

    #[test]
    fn custom_weight_changes_total() {
        let rows = vec![market_row(
            ALLEN,
            "Passing Yards 200.0",
            "passing_yards-JOSH_ALLEN_1_NFL-game-ou-over",
            200.0,
            0.5,
        )];
        let mut weights = ScoringWeights::default();
        weights.set(StatKind::PassYards, 0.05);
        let projection = project_player(ALLEN.0, ALLEN.1, ALLEN.2, &rows, &weights, None);
        let pass_points = 200.0 * 0.05 * 0.5;
        assert!((projection.total_points - pass_points).abs() < 1e-12);
    }

    fn slate() -> Vec<MarketRow> {
        let players = [
            ("A_1_NFL", "Amari Alpha", "WR", 90.5, 0.60),
            ("B_1_NFL", "Bo Bravo", "WR", 80.5, 0.58),
            ("C_1_NFL", "Cal Charlie", "RB", 70.5, 0.56),
            ("D_1_NFL", "Deon Delta", "RB", 60.5, 0.54),
            ("E_1_NFL", "Eli Echo", "QB", 50.5, 0.52),
        ];
        players
            .iter()
            .map(|&(id, name, pos, line, prob)| {
                market_row(
                    (id, name, pos),
                    &format!("Receiving Yards {line}"),
                    &format!("receiving_yards-{id}-game-ou-over"),
                    line,
                    prob,
                )
            })
            .collect()
    }

    #[test]
    fn leaderboard_is_strictly_descending_and_limited() {
        let rows = slate();
        let weights = ScoringWeights::default();
        let board = rank_leaderboard(&rows, &HashMap::new(), &weights, 150, None);
        assert_eq!(board.len(), 5);
        for pair in board.windows(2) {
            assert!(pair[0].total_points > pair[1].total_points);
        }
        assert_eq!(board[0].player_name, "Amari Alpha");

        let top3 = rank_leaderboard(&rows, &HashMap::new(), &weights, 3, None);
        assert_eq!(top3.len(), 3);
        assert_eq!(top3[2].player_name, "Cal Charlie");
    }

    #[test]
    fn position_filter_applies_before_truncation() {
        let rows = slate();
        let weights = ScoringWeights::default();
        let allowed: HashSet<String> = ["RB".to_string()].into_iter().collect();
        let board = rank_leaderboard(&rows, &HashMap::new(), &weights, 2, Some(&allowed));
        assert_eq!(board.len(), 2);
        assert!(board.iter().all(|p| p.position == "RB"));
        assert_eq!(board[0].player_name, "Cal Charlie");
    }

    #[test]
    fn equal_totals_rank_by_name() {
        let mut rows = slate();
        // Give two players identical markets.
        for row in rows.iter_mut() {
            row.line = 50.0;
            row.avg_prob = 0.5;
            row.market_label = "Receiving Yards 50.0".to_string();
        }
        let weights = ScoringWeights::default();
        let board = rank_leaderboard(&rows, &HashMap::new(), &weights, 150, None);
        let names: Vec<&str> = board.iter().map(|p| p.player_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Amari Alpha",
                "Bo Bravo",
                "Cal Charlie",
                "Deon Delta",
                "Eli Echo"
            ]
        );
    }

    #[test]
    fn leaderboard_prefers_saved_override() {
        let rows = slate();
        let weights = ScoringWeights::default();
        let mut overrides = HashMap::new();
        let mut saved = SavedOverride::new("E_1_NFL", "Eli Echo");
        saved.stats[StatKind::ReceivingYards.index()] = Some(StatProjection {
            quantity: 500.0,
            probability: 1.0,
        });
        overrides.insert("E_1_NFL".to_string(), saved);

        let board = rank_leaderboard(&rows, &overrides, &weights, 150, None);
        assert_eq!(board[0].player_name, "Eli Echo");
    }
}
