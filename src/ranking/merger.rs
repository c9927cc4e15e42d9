//! Merging of per-source item collections.
//!
//! Sources are folded in order into a fresh collection; a later record with
//! an already-seen id replaces the earlier record as a whole.

use serde::Serialize;

use crate::items::ItemCollection;

/// Counts collected while merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub sources: usize,
    pub items_seen: usize,
    pub items_merged: usize,
    pub duplicates_replaced: usize,
}

/// Merge sources into one deduplicated collection (last write wins).
pub fn merge<I>(sources: I) -> (ItemCollection, MergeStats)
where
    I: IntoIterator<Item = ItemCollection>,
{
    let (merged, mut stats) = sources.into_iter().fold(
        (ItemCollection::new(), MergeStats::default()),
        |(mut merged, mut stats), source| {
            stats.sources += 1;
            for record in source {
                stats.items_seen += 1;
                if merged.insert(record).is_some() {
                    stats.duplicates_replaced += 1;
                }
            }
            (merged, stats)
        },
    );

    stats.items_merged = merged.len();
    log::debug!(
        "merged {} items from {} sources ({} replaced)",
        stats.items_merged,
        stats.sources,
        stats.duplicates_replaced
    );

    (merged, stats)
}
