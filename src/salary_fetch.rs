//! Optional salary/points enrichment feed.
//!
//! A keyed lookup per player name returning a salary figure and an
//! externally-computed projected-points figure. Supplementary display
//! columns only; the projection math never reads these. Missing
//! configuration silently disables the feed.

use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_client::http_client;
use crate::state::SalaryInfo;

pub fn salary_feed_url() -> Option<String> {
    env::var("SALARY_FEED_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn fetch_salaries(url: &str) -> Result<HashMap<String, SalaryInfo>> {
    let client = http_client()?;
    let resp = client.get(url).send().context("salary request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading salary body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("salary http {status}"));
    }
    parse_salaries_json(&body)
}

/// Accepts either a bare array of player records or a `data`/`players`
/// wrapper. Field naming differs per export; known spellings are tried in
/// order.
pub fn parse_salaries_json(raw: &str) -> Result<HashMap<String, SalaryInfo>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(HashMap::new());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid salary json")?;
    let records = match &root {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => root
            .get("data")
            .or_else(|| root.get("players"))
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };

    let mut out = HashMap::new();
    for record in records {
        let Some(name) = pick_string(record, &["name", "playerName", "Player"]) else {
            continue;
        };
        let salary = pick_f64(record, &["salary", "Salary", "dkSalary"]);
        let external_points =
            pick_f64(record, &["fantasyPoints", "projectedPoints", "fpts", "FPTS"]);
        if salary.is_none() && external_points.is_none() {
            continue;
        }
        out.insert(
            name.trim().to_lowercase(),
            SalaryInfo {
                salary,
                external_points,
            },
        );
    }
    Ok(out)
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = value.get(key) {
            let t = s.trim();
            if !t.is_empty() {
                return Some(t.to_string());
            }
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match value.get(key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                let cleaned = s.trim().trim_start_matches('$').replace(',', "");
                if let Ok(parsed) = cleaned.parse::<f64>() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array_with_mixed_field_names() {
        let raw = r#"[
            {"name": "Josh Allen", "salary": 8200, "fantasyPoints": 22.4},
            {"playerName": "James Cook", "dkSalary": "$6,100", "fpts": "15.9"},
            {"name": "No Data Guy"}
        ]"#;
        let map = parse_salaries_json(raw).unwrap();
        assert_eq!(map.len(), 2);
        let allen = map.get("josh allen").unwrap();
        assert_eq!(allen.salary, Some(8200.0));
        assert_eq!(allen.external_points, Some(22.4));
        let cook = map.get("james cook").unwrap();
        assert_eq!(cook.salary, Some(6100.0));
    }

    #[test]
    fn parses_wrapped_payload() {
        let raw = r#"{"data": [{"name": "A", "salary": 5000}]}"#;
        let map = parse_salaries_json(raw).unwrap();
        assert_eq!(map.get("a").unwrap().salary, Some(5000.0));
    }

    #[test]
    fn null_is_empty() {
        assert!(parse_salaries_json("null").unwrap().is_empty());
    }
}
