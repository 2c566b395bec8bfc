use git2::{ObjectType, Repository, Sort};
use std::path::Path;

use crate::source::{RawComment, RawSnapshot, RawTopic, SnapshotSource};
use crate::types::HistoryError;

/// Snapshot source backed by a git repository where every commit is one
/// snapshot: each top-level subtree is a topic holding a `topic.json`
/// descriptor and a `comments` subtree with one JSON blob per comment.
///
/// Commits are walked topologically, oldest first, so later snapshots
/// overwrite earlier state during reconstruction. The repository is never
/// mutated.
pub struct GitSnapshotSource {
    repo: Repository,
    commits: std::vec::IntoIter<git2::Oid>,
}

impl GitSnapshotSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let repo = Repository::open(path.as_ref())?;
        let commits = {
            let mut walk = repo.revwalk()?;
            walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
            walk.push_head()?;
            walk.collect::<Result<Vec<_>, _>>()?
        };
        Ok(Self {
            repo,
            commits: commits.into_iter(),
        })
    }

    fn read_topic(&self, entry: &git2::TreeEntry) -> Result<RawTopic, HistoryError> {
        let name = entry.name().unwrap_or_default().to_string();
        let topic_tree = self.repo.find_tree(entry.id())?;

        let descriptor = match topic_tree.get_name("topic.json") {
            Some(blob_entry) => Some(self.repo.find_blob(blob_entry.id())?.content().to_vec()),
            None => None,
        };

        let mut comments = Vec::new();
        if let Some(comments_entry) = topic_tree.get_name("comments") {
            let comments_tree = self.repo.find_tree(comments_entry.id())?;
            for comment_entry in comments_tree.iter() {
                let blob = self.repo.find_blob(comment_entry.id())?;
                comments.push(RawComment {
                    name: comment_entry.name().unwrap_or_default().to_string(),
                    bytes: blob.content().to_vec(),
                });
            }
        }

        Ok(RawTopic {
            name,
            descriptor,
            comments,
        })
    }
}

impl SnapshotSource for GitSnapshotSource {
    fn next_snapshot(&mut self) -> Result<Option<RawSnapshot>, HistoryError> {
        let Some(oid) = self.commits.next() else {
            return Ok(None);
        };
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;

        let mut topics = Vec::new();
        for entry in tree.iter() {
            if entry.kind() == Some(ObjectType::Tree) {
                topics.push(self.read_topic(&entry)?);
            }
        }

        Ok(Some(RawSnapshot {
            id: oid.to_string(),
            timestamp: commit.time().seconds(),
            topics,
        }))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.commits.len())
    }
}
