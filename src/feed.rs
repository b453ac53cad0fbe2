//! Provider worker thread.
//!
//! Owns every blocking call (odds fetch, salary fetch, blob cache) so the
//! draw loop never stalls. Commands arrive over mpsc, results go back as
//! deltas; failures become advisory `[WARN]` log lines and the freshest
//! cached rows we still have.

use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::Utc;

use crate::fake_feed;
use crate::persist;
use crate::props_fetch::{self, PropsFetchConfig, env_bool};
use crate::salary_fetch;
use crate::state::{Delta, ProviderCommand};

pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let cfg = PropsFetchConfig::from_env();
        let demo = env_bool("PROPS_DEMO", false) || cfg.api_key.is_none();
        if demo {
            let _ = tx.send(Delta::Log(
                "[INFO] No PROPS_API_KEY configured, running demo slate".to_string(),
            ));
        }

        refresh(&tx, &cfg, demo, false);
        fetch_salaries(&tx);

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Refresh { force } => {
                    refresh(&tx, &cfg, demo, force);
                    fetch_salaries(&tx);
                }
                ProviderCommand::FetchSalaries => fetch_salaries(&tx),
            }
        }
    });
}

fn refresh(tx: &Sender<Delta>, cfg: &PropsFetchConfig, demo: bool, force: bool) {
    let _ = tx.send(Delta::Loading);

    if force {
        persist::clear_cache();
        let _ = tx.send(Delta::Log("[INFO] Cache cleared, fetching fresh".to_string()));
    } else if let Some((rows, saved_at)) = persist::load_cached_rows(persist::cache_max_age_secs())
    {
        let _ = tx.send(Delta::Rows {
            rows,
            fetched_at_unix: saved_at as i64,
            from_cache: true,
        });
        return;
    }

    let result = if demo {
        Ok(fake_feed::demo_market_rows())
    } else {
        props_fetch::fetch_market_rows(cfg)
    };

    match result {
        Ok(rows) if !rows.is_empty() => {
            persist::save_rows(&rows);
            let _ = tx.send(Delta::Rows {
                rows,
                fetched_at_unix: Utc::now().timestamp(),
                from_cache: false,
            });
        }
        Ok(_) => {
            let _ = tx.send(Delta::Log(
                "[WARN] Provider returned no market rows".to_string(),
            ));
            serve_stale_or_empty(tx);
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Props fetch error: {err}")));
            serve_stale_or_empty(tx);
        }
    }
}

/// After a failed pull, any cached rows beat none; TTL no longer applies.
fn serve_stale_or_empty(tx: &Sender<Delta>) {
    if let Some((rows, saved_at)) = persist::load_cached_rows(u64::MAX) {
        let _ = tx.send(Delta::Log("[INFO] Falling back to cached rows".to_string()));
        let _ = tx.send(Delta::Rows {
            rows,
            fetched_at_unix: saved_at as i64,
            from_cache: true,
        });
    } else {
        let _ = tx.send(Delta::Rows {
            rows: Vec::new(),
            fetched_at_unix: Utc::now().timestamp(),
            from_cache: false,
        });
    }
}

fn fetch_salaries(tx: &Sender<Delta>) {
    let Some(url) = salary_fetch::salary_feed_url() else {
        return;
    };
    match salary_fetch::fetch_salaries(&url) {
        Ok(map) if !map.is_empty() => {
            let _ = tx.send(Delta::Salaries(map));
        }
        Ok(_) => {
            let _ = tx.send(Delta::Log("[INFO] Salary feed returned no rows".to_string()));
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Salary fetch error: {err}")));
        }
    }
}
