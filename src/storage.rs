use std::sync::{Arc, PoisonError, RwLock};

use crate::core::leaderboard::Snapshot;

type SharedSnapshot = Arc<RwLock<Arc<Snapshot>>>;

/// Latest leaderboard of the current cycle.
///
/// Snapshots are never mutated once stored: `replace` swaps in a new one and
/// readers holding the previous `Arc` keep seeing the previous snapshot whole.
#[derive(Clone, Default)]
pub struct MemoryCache {
    data: SharedSnapshot,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache {
            data: Arc::new(RwLock::new(Arc::new(Snapshot::new()))),
        }
    }

    pub fn read(&self) -> Arc<Snapshot> {
        // The lock only guards a pointer swap, a poisoned lock still holds a whole snapshot.
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&data)
    }

    pub fn replace(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *data = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cycle::{compute_cycle, CYCLE_EPOCH};
    use crate::core::leaderboard::{Leaderboard, RankedEntry};

    fn snapshot_of(username: &str) -> Snapshot {
        let leaderboard = vec![RankedEntry {
            username: username.to_string(),
            wagered: 10,
            weighted_wager: 10,
        }]
        .into_iter()
        .collect::<Leaderboard>();
        Snapshot::refreshed(compute_cycle(0, *CYCLE_EPOCH), *CYCLE_EPOCH, leaderboard)
    }

    #[test]
    fn starts_empty() {
        let cache = MemoryCache::new();
        let snapshot = cache.read();
        assert!(snapshot.leaderboard.is_empty());
        assert_eq!(snapshot.cycle, None);
    }

    #[test]
    fn readers_keep_the_snapshot_they_got() {
        let cache = MemoryCache::new();
        cache.replace(snapshot_of("first"));

        let before = cache.read();
        cache.replace(snapshot_of("second"));
        let after = cache.read();

        assert_eq!(before.leaderboard[0].username, "first");
        assert_eq!(after.leaderboard[0].username, "second");
    }

    #[test]
    fn clones_share_state() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        other.replace(snapshot_of("shared"));
        assert_eq!(cache.read().leaderboard[0].username, "shared");
    }

    #[test]
    fn concurrent_reads_never_see_partial_snapshots() {
        let cache = MemoryCache::new();
        let writer = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    cache.replace(snapshot_of(&format!("user{i}")));
                }
            })
        };
        for _ in 0..200 {
            let snapshot = cache.read();
            assert!(snapshot.leaderboard.len() <= 1);
            if let Some(entry) = snapshot.leaderboard.first() {
                assert!(entry.username.starts_with("user"));
                assert!(snapshot.cycle.is_some());
            }
        }
        writer.join().unwrap();
    }
}
