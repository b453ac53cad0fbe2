//! Single-blob cache of the last successful market pull.
//!
//! One fixed path, payload `{version, saved_at_unix, rows}`. Missing,
//! corrupt, version-mismatched or expired payloads all read as a plain cache
//! miss; nothing here propagates an error to the interactive surface.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::state::MarketRow;

const CACHE_DIR: &str = "propboard";
const CACHE_FILE: &str = "props_cache.json";
const CACHE_VERSION: u32 = 1;

const DEFAULT_MAX_AGE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    saved_at_unix: u64,
    rows: Vec<MarketRow>,
}

pub fn cache_max_age_secs() -> u64 {
    env::var("PROPS_CACHE_MAX_AGE_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_AGE_SECS)
        // 30 minutes to 7 days, the range the product has run with.
        .clamp(60, 7 * 24 * 60 * 60)
}

/// Rows from the blob if present and younger than `max_age_secs`.
pub fn load_cached_rows(max_age_secs: u64) -> Option<(Vec<MarketRow>, u64)> {
    let path = cache_path()?;
    let raw = fs::read_to_string(path).ok()?;
    let cache = serde_json::from_str::<CacheFile>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    let now = now_unix()?;
    if now.saturating_sub(cache.saved_at_unix) > max_age_secs {
        return None;
    }
    Some((cache.rows, cache.saved_at_unix))
}

/// Overwrite the blob with the latest pull. Best-effort; a failed write only
/// costs the next session a refetch.
pub fn save_rows(rows: &[MarketRow]) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let cache = CacheFile {
        version: CACHE_VERSION,
        saved_at_unix: now_unix().unwrap_or_default(),
        rows: rows.to_vec(),
    };
    if let Ok(json) = serde_json::to_string(&cache) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

pub fn clear_cache() {
    if let Some(path) = cache_path() {
        let _ = fs::remove_file(path);
    }
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

fn now_unix() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}
