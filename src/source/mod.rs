pub mod git;

use crate::types::{HistoryError, Timestamp};

/// One comment blob as found in a snapshot, before decoding.
#[derive(Debug, Clone)]
pub struct RawComment {
    /// Name of the blob in the comments subtree, used in error messages.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One topic subtree as found in a snapshot, before decoding.
#[derive(Debug, Clone)]
pub struct RawTopic {
    /// Name of the topic subtree, used in error messages.
    pub name: String,
    /// The `topic.json` descriptor blob. `None` when the subtree lacks one,
    /// which the parser reports as a malformed snapshot.
    pub descriptor: Option<Vec<u8>>,
    pub comments: Vec<RawComment>,
}

/// One timestamped, complete view of all topics and comments.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    /// Identifier of the snapshot (commit id for the git source).
    pub id: String,
    pub timestamp: Timestamp,
    pub topics: Vec<RawTopic>,
}

/// An ordered, finite sequence of snapshots.
///
/// Implementations must deliver snapshots oldest first, with non-decreasing
/// timestamps and no repeats; the reconstructor checks the timestamp order
/// but never re-sorts. Sources are read-only over the underlying history.
pub trait SnapshotSource {
    /// Yields the next snapshot, or `None` once the history is exhausted.
    fn next_snapshot(&mut self) -> Result<Option<RawSnapshot>, HistoryError>;

    /// Number of snapshots still to come, when the source knows it.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// In-memory source used by unit tests.
#[cfg(test)]
pub(crate) struct VecSource {
    snapshots: std::vec::IntoIter<RawSnapshot>,
}

#[cfg(test)]
impl VecSource {
    pub(crate) fn new(snapshots: Vec<RawSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into_iter(),
        }
    }
}

#[cfg(test)]
impl SnapshotSource for VecSource {
    fn next_snapshot(&mut self) -> Result<Option<RawSnapshot>, HistoryError> {
        Ok(self.snapshots.next())
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.snapshots.len())
    }
}
