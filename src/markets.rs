//! Canonical fantasy stat taxonomy and the market matcher.
//!
//! The matcher is deliberately first-match, not best-match: aliases are
//! ordered from most to least specific per stat, and the first row whose
//! label or key contains an alias core wins. Behavioral variants live in the
//! alias tables and the token set of [`crate::market_key`], not in control
//! flow.

use crate::market_key::{
    alpha_core, is_anytime_yes_label, is_variant_key, is_yes_side_key, mentions_touchdown,
};
use crate::odds::{NEUTRAL_PROB, aggregate_probability};
use crate::state::MarketRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    PassYards,
    PassTds,
    RushYards,
    RushTds,
    Receptions,
    ReceivingYards,
    ReceivingTds,
    TotalTouchdowns,
}

pub const STAT_COUNT: usize = 8;

impl StatKind {
    pub const ALL: [StatKind; STAT_COUNT] = [
        StatKind::PassYards,
        StatKind::PassTds,
        StatKind::RushYards,
        StatKind::RushTds,
        StatKind::Receptions,
        StatKind::ReceivingYards,
        StatKind::ReceivingTds,
        StatKind::TotalTouchdowns,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::PassYards => "Pass Yards",
            StatKind::PassTds => "Pass TDs",
            StatKind::RushYards => "Rush Yards",
            StatKind::RushTds => "Rush TDs",
            StatKind::Receptions => "Receptions",
            StatKind::ReceivingYards => "Receiving Yards",
            StatKind::ReceivingTds => "Receiving TDs",
            StatKind::TotalTouchdowns => "Total Touchdowns",
        }
    }

    /// Market phrasings recognized for this stat, most specific first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            StatKind::PassYards => &["passing yards", "pass yards", "pass yds"],
            StatKind::PassTds => &["passing touchdowns", "passing tds", "pass tds"],
            StatKind::RushYards => &["rushing yards", "rush yards", "rush yds"],
            StatKind::RushTds => &["rushing touchdowns", "rushing tds", "rush tds"],
            StatKind::Receptions => &["total receptions", "receptions", "catches"],
            StatKind::ReceivingYards => &["receiving yards", "rec yards", "rec yds"],
            StatKind::ReceivingTds => &["receiving touchdowns", "receiving tds", "rec tds"],
            StatKind::TotalTouchdowns => &[
                "anytime touchdown",
                "any touchdowns",
                "player touchdowns",
                "total touchdowns",
                "touchdowns",
            ],
        }
    }

    /// Points per unit, the fixed default table. User-adjustable at runtime
    /// through [`crate::projection::ScoringWeights`].
    pub fn default_weight(self) -> f64 {
        match self {
            StatKind::PassYards => 0.04,
            StatKind::PassTds => 4.0,
            StatKind::RushYards => 0.1,
            StatKind::RushTds => 6.0,
            StatKind::Receptions => 1.0,
            StatKind::ReceivingYards => 0.1,
            StatKind::ReceivingTds => 6.0,
            StatKind::TotalTouchdowns => 6.0,
        }
    }

    /// The anytime-touchdown family deliberately spans yes/no and team-split
    /// variants, signalled by "any"/"player" phrasing in its alias list.
    pub fn allows_variants(self) -> bool {
        self.aliases()
            .iter()
            .any(|a| a.contains("any") || a.contains("player"))
    }

    pub fn index(self) -> usize {
        match self {
            StatKind::PassYards => 0,
            StatKind::PassTds => 1,
            StatKind::RushYards => 2,
            StatKind::RushTds => 3,
            StatKind::Receptions => 4,
            StatKind::ReceivingYards => 5,
            StatKind::ReceivingTds => 6,
            StatKind::TotalTouchdowns => 7,
        }
    }
}

/// Two-pass, first-match alias search over one player's market rows.
///
/// Pass 1 compares each alias core against both the label core and the key
/// core. Pass 2 (reached only when pass 1 finds nothing for this stat)
/// loosens to the label alone. Rows keyed as home/away/all/alt/period
/// variants are skipped unless the stat wants them. `None` means the caller
/// supplies its own defaults; this function never fabricates a row.
pub fn find_market(stat: StatKind, rows: &[MarketRow]) -> Option<&MarketRow> {
    let exclude_variants = !stat.allows_variants();

    for alias in stat.aliases() {
        let alias_core = alpha_core(alias);
        if alias_core.is_empty() {
            continue;
        }
        for row in rows {
            if exclude_variants && is_variant_key(&row.market_key) {
                continue;
            }
            let label_core = alpha_core(&row.market_label);
            let key_core = alpha_core(&row.market_key);
            if label_core.contains(&alias_core) || key_core.contains(&alias_core) {
                return Some(row);
            }
        }
    }

    for alias in stat.aliases() {
        let alias_core = alpha_core(alias);
        if alias_core.is_empty() {
            continue;
        }
        for row in rows {
            if exclude_variants && is_variant_key(&row.market_key) {
                continue;
            }
            if alpha_core(&row.market_label).contains(&alias_core) {
                return Some(row);
            }
        }
    }

    None
}

/// Reconcile the binary "will score a touchdown" market with the numeric
/// over/under into one (line, probability) pair.
///
/// Search order: structured fields when the provider sends them, then the
/// `-yn-yes` key convention, then free-text "anytime … yes" labels, then the
/// numeric Total Touchdowns market. `None` when the player has neither.
pub fn try_resolve_total_touchdowns(rows: &[MarketRow]) -> Option<(f64, f64)> {
    let yes_row = rows
        .iter()
        .find(|r| is_structured_yes_row(r))
        .or_else(|| rows.iter().find(|r| is_pattern_yes_row(r)));

    if let Some(row) = yes_row {
        let probability = if row.avg_prob != 0.0 {
            row.avg_prob
        } else {
            let raw: Vec<&String> = row.book_odds.values().collect();
            aggregate_probability(&raw)
        };
        let line = if row.line != 0.0 { row.line } else { 0.5 };
        return Some((line, probability));
    }

    find_market(StatKind::TotalTouchdowns, rows).map(|row| (row.line, row.avg_prob))
}

/// [`try_resolve_total_touchdowns`] with the neutral (0.5, 0.5) terminal
/// default for players offering no touchdown market at all.
pub fn resolve_total_touchdowns(rows: &[MarketRow]) -> (f64, f64) {
    try_resolve_total_touchdowns(rows).unwrap_or((0.5, NEUTRAL_PROB))
}

fn is_structured_yes_row(row: &MarketRow) -> bool {
    let stat_is_td = row
        .stat_id
        .as_deref()
        .is_some_and(mentions_touchdown);
    let side_is_yes = row
        .side_id
        .as_deref()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("yes"));
    stat_is_td && side_is_yes
}

fn is_pattern_yes_row(row: &MarketRow) -> bool {
    if is_yes_side_key(&row.market_key)
        && (mentions_touchdown(&row.market_key) || mentions_touchdown(&row.market_label))
    {
        return true;
    }
    is_anytime_yes_label(&row.market_label)
}
