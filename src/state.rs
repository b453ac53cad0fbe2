use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::markets::{STAT_COUNT, StatKind};
use crate::projection::{self, ScoringWeights};

const LOG_CAP: usize = 200;

/// One observed proposition line for one player in one market. Rebuilt fresh
/// on every pull, cached as-is between pulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    /// Human-readable market text, usually with the line appended
    /// ("Passing Yards 245.5").
    pub market_label: String,
    /// Raw provider key ("passing_yards-JOSH_ALLEN_1_NFL-game-ou-over").
    pub market_key: String,
    /// Numeric threshold; 0.0 when the market carries none.
    pub line: f64,
    /// Book name -> raw odds text, exactly as the provider sent it.
    pub book_odds: BTreeMap<String, String>,
    /// Consensus implied probability, computed once at ingestion.
    /// Always in [0,1]; 0.5 when no book odds parsed.
    pub avg_prob: f64,
    #[serde(default)]
    pub stat_id: Option<String>,
    #[serde(default)]
    pub side_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatProjection {
    pub quantity: f64,
    pub probability: f64,
}

/// User-saved per-player snapshot. At most one per player; saving again
/// replaces the record. Unset stats keep tracking the live market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedOverride {
    pub player_id: String,
    pub player_name: String,
    pub stats: [Option<StatProjection>; STAT_COUNT],
}

impl SavedOverride {
    pub fn new(player_id: &str, player_name: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            player_name: player_name.to_string(),
            stats: [None; STAT_COUNT],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stats.iter().all(|s| s.is_none())
    }
}

/// Supplementary columns from the salary feed; display-only, never part of
/// the projection math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryInfo {
    pub salary: Option<f64>,
    pub external_points: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Leaderboard,
    Player,
    Weights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    All,
    Qb,
    Rb,
    Wr,
    Te,
    Flex,
}

impl PositionFilter {
    pub fn next(self) -> Self {
        match self {
            PositionFilter::All => PositionFilter::Qb,
            PositionFilter::Qb => PositionFilter::Rb,
            PositionFilter::Rb => PositionFilter::Wr,
            PositionFilter::Wr => PositionFilter::Te,
            PositionFilter::Te => PositionFilter::Flex,
            PositionFilter::Flex => PositionFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionFilter::All => "ALL",
            PositionFilter::Qb => "QB",
            PositionFilter::Rb => "RB",
            PositionFilter::Wr => "WR",
            PositionFilter::Te => "TE",
            PositionFilter::Flex => "FLEX",
        }
    }

    pub fn allowed(self) -> Option<HashSet<String>> {
        let set: &[&str] = match self {
            PositionFilter::All => return None,
            PositionFilter::Qb => &["QB"],
            PositionFilter::Rb => &["RB"],
            PositionFilter::Wr => &["WR"],
            PositionFilter::Te => &["TE"],
            PositionFilter::Flex => &["RB", "WR", "TE"],
        };
        Some(set.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorColumn {
    Quantity,
    Probability,
}

/// Per-player editor draft: cursor position plus the cells the user touched
/// since opening the player. Saving merges the draft into the override.
#[derive(Debug, Clone, Default)]
pub struct EditorDraft {
    pub stat_row: usize,
    pub column: usize,
    pub touched: [Option<StatProjection>; STAT_COUNT],
}

impl EditorDraft {
    pub fn selected_stat(&self) -> StatKind {
        StatKind::ALL[self.stat_row.min(STAT_COUNT - 1)]
    }

    pub fn selected_column(&self) -> EditorColumn {
        if self.column == 0 {
            EditorColumn::Quantity
        } else {
            EditorColumn::Probability
        }
    }
}

#[derive(Debug)]
pub enum ProviderCommand {
    /// Refresh market rows. `force` clears the blob cache first.
    Refresh { force: bool },
    FetchSalaries,
}

#[derive(Debug)]
pub enum Delta {
    Loading,
    Rows {
        rows: Vec<MarketRow>,
        fetched_at_unix: i64,
        from_cache: bool,
    },
    Salaries(HashMap<String, SalaryInfo>),
    Log(String),
}

pub struct AppState {
    pub screen: Screen,

    pub rows: Vec<MarketRow>,
    /// (player_id, player_name, position), name-sorted; derived from rows.
    pub players: Vec<(String, String, String)>,
    pub overrides: HashMap<String, SavedOverride>,
    pub weights: ScoringWeights,
    /// Keyed by lowercased player name.
    pub salaries: HashMap<String, SalaryInfo>,

    pub position_filter: PositionFilter,
    pub leaderboard_limit: usize,
    pub leaderboard_selected: usize,
    pub player_selected: usize,
    pub editor: EditorDraft,
    pub weights_selected: usize,
    /// In-progress numeric entry for the focused cell, if any.
    pub edit_buffer: Option<String>,

    pub logs: VecDeque<String>,
    pub rows_fetched_at: Option<i64>,
    pub rows_from_cache: bool,
    pub loading: bool,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new() -> Self {
        let leaderboard_limit = std::env::var("LEADERBOARD_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(150)
            .clamp(20, 500);
        Self {
            screen: Screen::Leaderboard,
            rows: Vec::new(),
            players: Vec::new(),
            overrides: HashMap::new(),
            weights: ScoringWeights::default(),
            salaries: HashMap::new(),
            position_filter: PositionFilter::All,
            leaderboard_limit,
            leaderboard_selected: 0,
            player_selected: 0,
            editor: EditorDraft::default(),
            weights_selected: 0,
            edit_buffer: None,
            logs: VecDeque::new(),
            rows_fetched_at: None,
            rows_from_cache: false,
            loading: false,
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_front(line.into());
        while self.logs.len() > LOG_CAP {
            self.logs.pop_back();
        }
    }

    pub fn leaderboard(&self) -> Vec<projection::PlayerProjection> {
        let allowed = self.position_filter.allowed();
        projection::rank_leaderboard(
            &self.rows,
            &self.overrides,
            &self.weights,
            self.leaderboard_limit,
            allowed.as_ref(),
        )
    }

    pub fn selected_player(&self) -> Option<&(String, String, String)> {
        self.players.get(self.player_selected)
    }

    pub fn rows_for_player(&self, player_id: &str) -> Vec<MarketRow> {
        self.rows
            .iter()
            .filter(|r| r.player_id == player_id)
            .cloned()
            .collect()
    }

    /// Value shown in the editor cell: draft edit, then saved override
    /// field, then fresh market resolution.
    pub fn effective_stat(&self, player_id: &str, stat: StatKind) -> StatProjection {
        if let Some(touched) = self.editor.touched[stat.index()] {
            return touched;
        }
        if let Some(saved) = self.overrides.get(player_id)
            && let Some(sp) = saved.stats[stat.index()]
        {
            return sp;
        }
        let rows = self.rows_for_player(player_id);
        projection::resolve_stat(stat, &rows)
    }

    /// Merge the editor draft into the per-player override (upsert).
    pub fn save_override(&mut self) {
        let Some((id, name, _)) = self.selected_player().cloned() else {
            return;
        };
        let mut saved = self
            .overrides
            .get(&id)
            .cloned()
            .unwrap_or_else(|| SavedOverride::new(&id, &name));
        for idx in 0..STAT_COUNT {
            if let Some(sp) = self.editor.touched[idx] {
                saved.stats[idx] = Some(sp);
            }
        }
        if saved.is_empty() {
            self.push_log(format!("[INFO] Nothing to save for {name}"));
            return;
        }
        self.overrides.insert(id, saved);
        self.editor.touched = [None; STAT_COUNT];
        self.push_log(format!("[INFO] Saved override for {name}"));
    }

    pub fn clear_override(&mut self) {
        let Some((id, name, _)) = self.selected_player().cloned() else {
            return;
        };
        self.editor.touched = [None; STAT_COUNT];
        if self.overrides.remove(&id).is_some() {
            self.push_log(format!("[INFO] Cleared override for {name}"));
        } else {
            self.push_log(format!("[INFO] No override saved for {name}"));
        }
    }

    pub fn select_player(&mut self, idx: usize) {
        if self.players.is_empty() {
            self.player_selected = 0;
        } else {
            self.player_selected = idx.min(self.players.len() - 1);
        }
        self.editor.touched = [None; STAT_COUNT];
        self.edit_buffer = None;
    }

    pub fn cycle_position_filter(&mut self) {
        self.position_filter = self.position_filter.next();
        self.leaderboard_selected = 0;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Loading => {
            state.loading = true;
        }
        Delta::Rows {
            rows,
            fetched_at_unix,
            from_cache,
        } => {
            state.loading = false;
            state.rows_fetched_at = Some(fetched_at_unix);
            state.rows_from_cache = from_cache;
            state.players = projection::distinct_players(&rows);
            state.rows = rows;
            if state.player_selected >= state.players.len() {
                state.player_selected = 0;
                state.editor.touched = [None; STAT_COUNT];
            }
            state.leaderboard_selected = 0;
            let source = if from_cache { "cache" } else { "live" };
            state.push_log(format!(
                "[INFO] {} market rows for {} players ({source})",
                state.rows.len(),
                state.players.len()
            ));
        }
        Delta::Salaries(map) => {
            state.push_log(format!("[INFO] Salary data for {} players", map.len()));
            state.salaries = map;
        }
        Delta::Log(line) => state.push_log(line),
    }
}
