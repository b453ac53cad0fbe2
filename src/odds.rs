/// American odds to implied probability.
///
/// Book feeds are sloppy about the odds column: the same field arrives as
/// `-115`, `"+150"`, `"EVEN"`, `"N/A"` or an em-dash depending on the book.
/// Everything funnels through `to_probability`, which either yields a
/// probability in (0, 1) or `None`; substituting the neutral default happens
/// one layer up in `aggregate_probability`.
pub const NEUTRAL_PROB: f64 = 0.5;

pub fn to_probability(raw: &str) -> Option<f64> {
    let odds = parse_american_odds(raw)?;
    if odds == 0 {
        return None;
    }
    let o = odds as f64;
    if odds > 0 {
        Some(100.0 / (o + 100.0))
    } else {
        Some(-o / (-o + 100.0))
    }
}

/// Keep an optional leading sign plus ASCII digits, drop everything else.
/// `"-115"` -> -115, `"+150 "` -> 150, `"EVEN"`/`""`/`"—"` -> None.
fn parse_american_odds(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx == 0 && (ch == '+' || ch == '-') {
            cleaned.push(ch);
            continue;
        }
        if ch.is_ascii_digit() {
            cleaned.push(ch);
        }
    }

    if cleaned.is_empty() || cleaned == "+" || cleaned == "-" {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Mean implied probability across books. Entries that fail to parse are
/// dropped; if nothing survives the result is the neutral 0.5 so downstream
/// consumers never see a missing probability.
pub fn aggregate_probability<S: AsRef<str>>(odds: &[S]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;

    for raw in odds {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            continue;
        }
        if let Some(p) = to_probability(raw) {
            sum += p;
            n += 1;
        }
    }

    if n == 0 { NEUTRAL_PROB } else { sum / n as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_odds_follow_formula() {
        let p = to_probability("150").unwrap();
        assert!((p - 100.0 / 250.0).abs() < 1e-12);
        let p = to_probability("+100").unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn negative_odds_follow_formula() {
        let p = to_probability("-260").unwrap();
        assert!((p - 260.0 / 360.0).abs() < 1e-12);
        let p = to_probability("-115").unwrap();
        assert!((p - 115.0 / 215.0).abs() < 1e-12);
    }

    #[test]
    fn results_lie_strictly_inside_unit_interval() {
        for raw in ["+100", "-110", "+2500", "-10000", "133"] {
            let p = to_probability(raw).unwrap();
            assert!(p > 0.0 && p < 1.0, "{raw} -> {p}");
        }
    }

    #[test]
    fn sentinels_are_none() {
        for raw in ["N/A", "", "EVEN", "—", "-", "+", "  "] {
            assert!(to_probability(raw).is_none(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn zero_odds_are_unparsable() {
        assert!(to_probability("0").is_none());
        assert!(to_probability("+0").is_none());
    }

    #[test]
    fn noisy_text_is_stripped_to_digits() {
        let p = to_probability(" -115 (DK) ").unwrap();
        assert!((p - 115.0 / 215.0).abs() < 1e-12);
    }

    #[test]
    fn aggregate_means_parsed_entries() {
        let p = aggregate_probability(&["-260", "+150"]);
        let expected = (260.0 / 360.0 + 100.0 / 250.0) / 2.0;
        assert!((p - expected).abs() < 1e-9);
        assert!((p - 0.5611).abs() < 1e-3);
    }

    #[test]
    fn aggregate_of_only_sentinels_is_neutral() {
        let p = aggregate_probability(&["N/A", "", "EVEN"]);
        assert_eq!(p, 0.5);
        let p = aggregate_probability::<&str>(&[]);
        assert_eq!(p, 0.5);
    }

    #[test]
    fn aggregate_drops_unparsable_entries() {
        let p = aggregate_probability(&["-110", "N/A", "garbage"]);
        let expected = 110.0 / 210.0;
        assert!((p - expected).abs() < 1e-12);
    }
}
