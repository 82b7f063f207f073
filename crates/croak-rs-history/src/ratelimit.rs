//! Sliding-window rate limiting over the history log.

use crate::model::HistoryEntry;
use chrono::Utc;
use log::info;

const MINUTE_MS: i64 = 60 * 1_000;
const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

/// Whether a metered request may proceed at `now_ms`.
///
/// Counts valid entries whose timestamps fall inside the trailing minute and
/// trailing day, scanning the whole log so ordering never matters. A ceiling
/// of `0` disables that window.
pub fn allow(history: &[HistoryEntry], rpm_limit: u32, rpd_limit: u32, now_ms: i64) -> bool {
    if rpm_limit == 0 && rpd_limit == 0 {
        return true;
    }
    let minute_floor = now_ms - MINUTE_MS;
    let day_floor = now_ms - DAY_MS;
    let mut last_minute = 0u32;
    let mut last_day = 0u32;
    for entry in history {
        if !entry.is_valid() || entry.timestamp <= day_floor || entry.timestamp > now_ms {
            continue;
        }
        last_day += 1;
        if entry.timestamp > minute_floor {
            last_minute += 1;
        }
    }
    if rpm_limit > 0 && last_minute >= rpm_limit {
        info!(
            "per-minute rate limit reached (count={}, limit={})",
            last_minute, rpm_limit
        );
        return false;
    }
    if rpd_limit > 0 && last_day >= rpd_limit {
        info!(
            "per-day rate limit reached (count={}, limit={})",
            last_day, rpd_limit
        );
        return false;
    }
    true
}

/// [`allow`] evaluated against the current wall clock.
pub fn allow_now(history: &[HistoryEntry], rpm_limit: u32, rpd_limit: u32) -> bool {
    allow(history, rpm_limit, rpd_limit, Utc::now().timestamp_millis())
}
