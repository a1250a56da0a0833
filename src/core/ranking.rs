use itertools::Itertools;

use crate::client::rainbet::AffiliateRecord;
use crate::core::leaderboard::{Leaderboard, RankedEntry};

pub const DEFAULT_LIMIT: usize = 10;
const MASK: &str = "***";

/// How a wagered amount translates into the weighted wager shown next to it.
pub trait WagerWeighting: Send + Sync {
    fn weighted(&self, amount: f64) -> i64;
}

/// Current policy: the weighted wager is the wager itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unweighted;

impl WagerWeighting for Unweighted {
    fn weighted(&self, amount: f64) -> i64 {
        round(amount)
    }
}

fn round(amount: f64) -> i64 {
    // Saturating cast, amounts are already finite and non-negative.
    amount.round() as i64
}

/// Keeps the first and last two characters of identifiers longer than four.
pub fn mask_identifier(identifier: &str) -> String {
    let chars = identifier.chars().collect::<Vec<char>>();
    if chars.len() <= 4 {
        return identifier.to_string();
    }
    let head = chars[..2].iter().collect::<String>();
    let tail = chars[chars.len() - 2..].iter().collect::<String>();
    format!("{head}{MASK}{tail}")
}

pub fn rank(records: &[AffiliateRecord], limit: usize) -> Leaderboard {
    rank_with(records, limit, &Unweighted)
}

/// Top `limit` records by wagered amount, highest first.
///
/// Records with equal amounts keep their upstream order. Once truncated, the
/// first two places are swapped whenever there are at least two entries: the
/// runner-up is displayed on top.
pub fn rank_with(
    records: &[AffiliateRecord],
    limit: usize,
    weighting: &dyn WagerWeighting,
) -> Leaderboard {
    let mut top = records
        .iter()
        .map(|record| (record, record.amount()))
        // sorted_by is stable
        .sorted_by(|(_, a), (_, b)| b.total_cmp(a))
        .take(limit)
        .collect::<Vec<(&AffiliateRecord, f64)>>();

    if top.len() >= 2 {
        top.swap(0, 1);
    }

    top.into_iter()
        .map(|(record, amount)| RankedEntry {
            username: mask_identifier(record.username.as_deref().unwrap_or_default()),
            wagered: round(amount),
            weighted_wager: weighting.weighted(amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usernames(leaderboard: &Leaderboard) -> Vec<&str> {
        leaderboard.iter().map(|e| e.username.as_str()).collect()
    }

    #[test]
    fn masks_long_identifiers_only() {
        assert_eq!(mask_identifier(""), "");
        assert_eq!(mask_identifier("ab"), "ab");
        assert_eq!(mask_identifier("abcd"), "abcd");
        assert_eq!(mask_identifier("abcde"), "ab***de");
        assert_eq!(mask_identifier("abcdef"), "ab***ef");
        assert_eq!(mask_identifier("averyverylongname"), "av***me");
        assert_eq!(mask_identifier("ñandú99"), "ña***99");
    }

    #[test]
    fn top_two_are_swapped() {
        let records = vec![
            AffiliateRecord::new("third", "80"),
            AffiliateRecord::new("first", "100"),
            AffiliateRecord::new("second", "90"),
        ];
        let leaderboard = rank(&records, DEFAULT_LIMIT);
        assert_eq!(usernames(&leaderboard), vec!["se***nd", "fi***st", "th***rd"]);
        assert_eq!(
            leaderboard.iter().map(|e| e.wagered).collect::<Vec<i64>>(),
            vec![90, 100, 80]
        );
    }

    #[test]
    fn rounds_and_masks_upstream_records() {
        let records = vec![
            AffiliateRecord::new("alice123", "150.7"),
            AffiliateRecord::new("bob", "200.2"),
        ];
        let leaderboard = rank(&records, DEFAULT_LIMIT);
        assert_eq!(
            *leaderboard,
            vec![
                RankedEntry {
                    username: "al***23".to_string(),
                    wagered: 151,
                    weighted_wager: 151,
                },
                RankedEntry {
                    username: "bob".to_string(),
                    wagered: 200,
                    weighted_wager: 200,
                },
            ]
        );
    }

    #[test]
    fn single_entry_is_not_swapped() {
        let records = vec![AffiliateRecord::new("solo", "12.5")];
        let leaderboard = rank(&records, DEFAULT_LIMIT);
        assert_eq!(usernames(&leaderboard), vec!["solo"]);
        assert_eq!(leaderboard[0].wagered, 13);
    }

    #[test]
    fn empty_input_gives_empty_leaderboard() {
        assert!(rank(&[], DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn truncates_before_swapping() {
        let records = (0..15)
            .map(|i| AffiliateRecord::new(&format!("u{i:02}"), &format!("{}", i * 10)))
            .collect::<Vec<AffiliateRecord>>();
        let leaderboard = rank(&records, DEFAULT_LIMIT);

        assert_eq!(leaderboard.len(), 10);
        assert_eq!(leaderboard[0].username, "u13");
        assert_eq!(leaderboard[1].username, "u14");
        assert_eq!(leaderboard[9].username, "u05");

        let top_one = rank(&records, 1);
        assert_eq!(usernames(&top_one), vec!["u14"]);
    }

    #[test]
    fn ties_keep_upstream_order() {
        let records = vec![
            AffiliateRecord::new("aa", "50"),
            AffiliateRecord::new("bb", "50"),
            AffiliateRecord::new("cc", "50"),
            AffiliateRecord::new("dd", "70"),
        ];
        let leaderboard = rank(&records, DEFAULT_LIMIT);
        // dd, aa, bb, cc before the swap
        assert_eq!(usernames(&leaderboard), vec!["aa", "dd", "bb", "cc"]);
    }

    #[test]
    fn sorting_sorted_input_is_stable() {
        let records = vec![
            AffiliateRecord::new("aa", "90"),
            AffiliateRecord::new("bb", "60"),
            AffiliateRecord::new("cc", "60"),
            AffiliateRecord::new("dd", "10"),
        ];
        let resorted = records
            .iter()
            .sorted_by(|a, b| b.amount().total_cmp(&a.amount()))
            .cloned()
            .collect::<Vec<AffiliateRecord>>();
        assert_eq!(rank(&records, DEFAULT_LIMIT), rank(&resorted, DEFAULT_LIMIT));
    }

    #[test]
    fn unparseable_amounts_rank_as_zero() {
        let records = vec![
            AffiliateRecord::new("broken", "oops"),
            AffiliateRecord::new("ok", "1"),
            AffiliateRecord::new("zero", "0"),
        ];
        let leaderboard = rank(&records, DEFAULT_LIMIT);
        // ok, broken, zero before the swap
        assert_eq!(usernames(&leaderboard), vec!["br***en", "ok", "zero"]);
        assert_eq!(leaderboard[0].wagered, 0);
    }

    #[test]
    fn weighting_is_pluggable() {
        struct Doubled;
        impl WagerWeighting for Doubled {
            fn weighted(&self, amount: f64) -> i64 {
                (amount * 2.0).round() as i64
            }
        }

        let records = vec![AffiliateRecord::new("solo", "10.4")];
        let leaderboard = rank_with(&records, DEFAULT_LIMIT, &Doubled);
        assert_eq!(leaderboard[0].wagered, 10);
        assert_eq!(leaderboard[0].weighted_wager, 21);
    }
}
