use ahash::AHashSet;
use std::cmp::Reverse;

use crate::series::SeriesAccumulator;
use crate::store::EntityStore;
use crate::types::{CommentId, Metric};

/// One entry of a derived ranking: a comment and the value of the last
/// sample in its series for the ranked metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub comment_id: CommentId,
    pub final_value: i64,
}

/// Orders all comments with a non-empty series for the metric by final
/// sample value, descending.
///
/// The sort is stable over the store's first-seen iteration order, so ties
/// keep their first-seen relative order and re-running on the same state is
/// deterministic. Comments with an empty series are omitted, not ranked at
/// zero.
pub fn rank_comments(
    store: &EntityStore,
    series: &SeriesAccumulator,
    metric: Metric,
) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = store
        .all_comments()
        .filter_map(|comment| {
            series.final_value(&comment.id, metric).map(|final_value| RankEntry {
                comment_id: comment.id.clone(),
                final_value,
            })
        })
        .collect();
    entries.sort_by_key(|entry| Reverse(entry.final_value));
    entries
}

/// Restricts a global ranking to one topic's current membership.
///
/// This is a filtered view of the already-sorted global ranking, never an
/// independent sort: relative order among shared comments is identical
/// between the global and per-topic views.
pub fn rank_for_topic(
    global: &[RankEntry],
    store: &EntityStore,
    topic_id: &str,
) -> Vec<RankEntry> {
    let members: AHashSet<&str> = store
        .comments_for_topic(topic_id)
        .iter()
        .map(String::as_str)
        .collect();
    global
        .iter()
        .filter(|entry| members.contains(entry.comment_id.as_str()))
        .cloned()
        .collect()
}
