use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

use crate::utils::ymd_utc;

/// First instant of cycle 0: 11 Aug 2025 00:00:00 UTC.
pub static CYCLE_EPOCH: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2025, 8, 11, 0, 0, 0).unwrap());

pub const CYCLE_LENGTH_DAYS: i64 = 14;
const CYCLE_LENGTH_MS: i64 = CYCLE_LENGTH_DAYS * 24 * 60 * 60 * 1000;

// Keeps every reachable cycle well inside chrono's representable range
// (roughly 38 000 years after the epoch).
const MAX_CYCLE_INDEX: i64 = 1_000_000;

/// A 14-day window. `end` is inclusive: it is the last millisecond of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cycle {
    pub index: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Cycle {
    pub fn length() -> Duration {
        Duration::milliseconds(CYCLE_LENGTH_MS)
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant <= self.end
    }

    /// Whether the whole window lies before the epoch.
    pub fn ends_before_epoch(&self) -> bool {
        self.end < *CYCLE_EPOCH
    }

    pub fn start_date(&self) -> String {
        ymd_utc(&self.start)
    }

    pub fn end_date(&self) -> String {
        ymd_utc(&self.end)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} → {}", self.start_date(), self.end_date())
    }
}

/// Cycle that is `offset` cycles away from the one containing `reference`.
///
/// Instants before the epoch belong to cycle 0, and negative cycle indices are
/// clamped to 0 as well. Callers needing "no such cycle" semantics must compare
/// the returned window against [`CYCLE_EPOCH`] themselves.
pub fn compute_cycle(offset: i64, reference: DateTime<Utc>) -> Cycle {
    let elapsed_ms = (reference - *CYCLE_EPOCH).num_milliseconds().max(0);
    let index = (elapsed_ms / CYCLE_LENGTH_MS)
        .saturating_add(offset)
        .clamp(0, MAX_CYCLE_INDEX);

    let start = *CYCLE_EPOCH + Duration::milliseconds(index * CYCLE_LENGTH_MS);
    let end = start + Duration::milliseconds(CYCLE_LENGTH_MS - 1);
    Cycle { index, start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn epoch_is_first_cycle() {
        let cycle = compute_cycle(0, *CYCLE_EPOCH);
        assert_eq!(cycle.index, 0);
        assert_eq!(cycle.start, *CYCLE_EPOCH);
        assert_eq!(cycle.start_date(), "2025-08-11");
        assert_eq!(cycle.end_date(), "2025-08-24");
    }

    #[test]
    fn window_is_exactly_one_cycle_long() {
        let instants = [
            at(2020, 1, 1, 0, 0, 0),
            *CYCLE_EPOCH,
            at(2025, 8, 24, 23, 59, 59),
            at(2026, 10, 18, 12, 30, 0),
        ];
        for t in instants {
            for offset in [-3, -1, 0, 1, 7] {
                let cycle = compute_cycle(offset, t);
                assert_eq!(
                    cycle.end - cycle.start + Duration::milliseconds(1),
                    Cycle::length()
                );
            }
        }
    }

    #[test]
    fn consecutive_offsets_are_adjacent() {
        let t = at(2026, 10, 18, 12, 30, 0);
        for offset in -5..5 {
            let this = compute_cycle(offset, t);
            let next = compute_cycle(offset + 1, t);
            // Only holds while neither side is clamped to cycle 0.
            if this.index > 0 {
                assert_eq!(this.start, next.start - Cycle::length());
                assert_eq!(this.end + Duration::milliseconds(1), next.start);
            }
        }
    }

    #[test]
    fn stable_within_a_bucket() {
        let early = at(2025, 8, 25, 0, 0, 0);
        let late = at(2025, 9, 7, 23, 59, 59);
        assert_eq!(compute_cycle(0, early), compute_cycle(0, late));
        assert_eq!(compute_cycle(0, early).index, 1);
    }

    #[test]
    fn boundary_millisecond_belongs_to_previous_cycle() {
        let first = compute_cycle(0, *CYCLE_EPOCH);
        assert_eq!(compute_cycle(0, first.end), first);
        assert_eq!(
            compute_cycle(0, first.end + Duration::milliseconds(1)).index,
            1
        );
    }

    #[test]
    fn instants_before_epoch_clamp_to_first_cycle() {
        let before = at(2024, 1, 1, 0, 0, 0);
        assert_eq!(compute_cycle(0, before), compute_cycle(0, *CYCLE_EPOCH));
        assert_eq!(compute_cycle(-1, *CYCLE_EPOCH).index, 0);
    }

    #[test]
    fn previous_cycle_of_second_cycle_is_first() {
        let t = at(2025, 8, 30, 10, 0, 0);
        let prev = compute_cycle(-1, t);
        assert_eq!(prev.index, 0);
        assert!(prev.contains(&CYCLE_EPOCH));
        assert!(!prev.ends_before_epoch());
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        let t = at(2026, 10, 18, 0, 0, 0);
        assert_eq!(compute_cycle(i64::MIN, t).index, 0);
        assert_eq!(compute_cycle(i64::MAX, t).index, MAX_CYCLE_INDEX);
    }
}
