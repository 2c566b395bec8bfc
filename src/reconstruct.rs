use indicatif::ProgressBar;

use crate::parser::parse_snapshot;
use crate::series::SeriesAccumulator;
use crate::source::SnapshotSource;
use crate::store::EntityStore;
use crate::types::{HistoryError, Timestamp};

/// The fully reconstructed history of one snapshot sequence.
#[derive(Debug, Default, PartialEq)]
pub struct History {
    pub store: EntityStore,
    pub series: SeriesAccumulator,
    pub snapshot_count: usize,
}

/// Drives the snapshot sequence exactly once, oldest first, building the
/// entity store and the per-comment time series.
///
/// Timestamps must be non-decreasing; the source is expected to deliver
/// chronological order and this is checked, not repaired. Any parse failure
/// aborts the whole run with no partial output, since rankings built from a
/// truncated history would be silently wrong.
pub fn reconstruct(source: &mut dyn SnapshotSource) -> Result<History, HistoryError> {
    let progress = match source.remaining() {
        Some(n) => ProgressBar::new(n as u64),
        None => ProgressBar::new_spinner(),
    };

    let mut store = EntityStore::new();
    let mut series = SeriesAccumulator::new();
    let mut snapshot_count = 0usize;
    let mut last_timestamp: Option<Timestamp> = None;

    while let Some(raw) = source.next_snapshot()? {
        let snapshot = parse_snapshot(&raw)?;
        if let Some(previous) = last_timestamp {
            if snapshot.timestamp < previous {
                return Err(HistoryError::OutOfOrder {
                    previous,
                    current: snapshot.timestamp,
                });
            }
        }
        last_timestamp = Some(snapshot.timestamp);
        snapshot_count += 1;

        for parsed_topic in snapshot.topics {
            let topic_id = parsed_topic.topic.id.clone();
            store.upsert_topic(parsed_topic.topic);

            let comment_ids = parsed_topic.comments.iter().map(|c| c.id.clone()).collect();
            store.set_topic_comments(&topic_id, comment_ids);

            for comment in parsed_topic.comments {
                series.append_score(&comment.id, snapshot.timestamp, comment.score);
                series.append_reply_count(&comment.id, snapshot.timestamp, comment.reply_count);
                store.upsert_comment(comment);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(History {
        store,
        series,
        snapshot_count,
    })
}
