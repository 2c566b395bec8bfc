use ahash::AHashMap;

use crate::types::{CommentId, Metric, Sample, Timestamp};

/// Append-only sample sequences per comment, one per tracked metric.
///
/// One sample pair is appended for every snapshot in which a comment
/// appears, in snapshot order, whether or not the value changed. A comment
/// missing from later snapshots simply stops receiving samples. Querying an
/// unseen comment yields an empty series, never an error.
#[derive(Debug, Default, PartialEq)]
pub struct SeriesAccumulator {
    scores: AHashMap<CommentId, Vec<Sample>>,
    reply_counts: AHashMap<CommentId, Vec<Sample>>,
}

impl SeriesAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_score(&mut self, comment_id: &str, timestamp: Timestamp, value: i64) {
        append(&mut self.scores, comment_id, timestamp, value);
    }

    pub fn append_reply_count(&mut self, comment_id: &str, timestamp: Timestamp, value: i64) {
        append(&mut self.reply_counts, comment_id, timestamp, value);
    }

    pub fn score_series(&self, comment_id: &str) -> &[Sample] {
        self.scores.get(comment_id).map_or(&[], Vec::as_slice)
    }

    pub fn reply_count_series(&self, comment_id: &str) -> &[Sample] {
        self.reply_counts.get(comment_id).map_or(&[], Vec::as_slice)
    }

    pub fn series(&self, comment_id: &str, metric: Metric) -> &[Sample] {
        match metric {
            Metric::Score => self.score_series(comment_id),
            Metric::ReplyCount => self.reply_count_series(comment_id),
        }
    }

    /// Value of the last sample for the metric, `None` for an empty series.
    pub fn final_value(&self, comment_id: &str, metric: Metric) -> Option<i64> {
        self.series(comment_id, metric).last().map(|s| s.value)
    }
}

fn append(map: &mut AHashMap<CommentId, Vec<Sample>>, id: &str, timestamp: Timestamp, value: i64) {
    map.entry(id.to_string())
        .or_default()
        .push(Sample { timestamp, value });
}
