use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Deref;
use tracing::info;

use crate::client::rainbet::AffiliateSource;
use crate::core::cycle::{compute_cycle, Cycle};
use crate::core::ranking::{rank_with, WagerWeighting};
use crate::error::BoardResult;

/// One displayed row. Field names follow the public JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RankedEntry {
    pub username: String,
    pub wagered: i64,
    #[serde(rename = "weightedWager")]
    pub weighted_wager: i64,
}

type Entries = Vec<RankedEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard(Entries);

impl Leaderboard {
    pub fn new() -> Leaderboard {
        Leaderboard(Entries::new())
    }
}

impl Deref for Leaderboard {
    type Target = Entries;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<RankedEntry> for Leaderboard {
    fn from_iter<I: IntoIterator<Item = RankedEntry>>(iter: I) -> Self {
        Leaderboard(iter.into_iter().collect())
    }
}

/// Leaderboard of the current cycle as held by the cache.
/// `cycle` and `timestamp` are empty until the first successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub cycle: Option<Cycle>,
    pub timestamp: Option<DateTime<Utc>>,
    pub leaderboard: Leaderboard,
}

impl Snapshot {
    pub fn new() -> Snapshot {
        Snapshot::default()
    }

    pub fn refreshed(cycle: Cycle, timestamp: DateTime<Utc>, leaderboard: Leaderboard) -> Self {
        Snapshot {
            cycle: Some(cycle),
            timestamp: Some(timestamp),
            leaderboard,
        }
    }
}

/// Ranked leaderboard of the cycle preceding the one containing `now`.
/// Never cached: each call goes to the upstream source.
pub async fn previous_cycle_leaderboard(
    source: &dyn AffiliateSource,
    now: DateTime<Utc>,
    limit: usize,
    weighting: &dyn WagerWeighting,
) -> BoardResult<Leaderboard> {
    let cycle = compute_cycle(-1, now);
    // Offset -1 is clamped to cycle 0, which is no previous cycle while `now`
    // is itself in cycle 0 or before the epoch.
    if cycle.ends_before_epoch() || cycle.contains(&now) || cycle.start > now {
        info!("No previous cycle before {}", now);
        return Ok(Leaderboard::new());
    }

    let records = source.fetch_records(&cycle).await?;
    Ok(rank_with(&records, limit, weighting))
}
