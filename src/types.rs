pub type TopicId = String;
pub type CommentId = String;

/// Commit time of the snapshot, in seconds since the Unix epoch.
pub type Timestamp = i64;

/// One observation of a comment metric, taken from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: i64,
}

/// The two metrics tracked per comment across the snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Score,
    ReplyCount,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// A snapshot does not match the expected tree/record schema. Fatal for
    /// the whole reconstruction: a partial history would produce misleading
    /// rankings and series.
    #[error("malformed snapshot {snapshot}: {entity}: {reason}")]
    MalformedSnapshot {
        snapshot: String,
        entity: String,
        reason: String,
    },

    /// The snapshot source delivered a snapshot older than its predecessor.
    #[error("snapshots out of order: timestamp {current} after {previous}")]
    OutOfOrder {
        previous: Timestamp,
        current: Timestamp,
    },

    #[error("snapshot source error: {0}")]
    Source(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
