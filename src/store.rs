use ahash::AHashMap;

use crate::parser::{Comment, Topic};
use crate::types::{CommentId, TopicId};

/// Latest known record for every topic and comment ever seen in the
/// snapshot history, keyed by stable id.
///
/// Upserts are last-write-wins on every field. Nothing is ever evicted:
/// an entity absent from a later snapshot keeps its last known record.
/// Iteration order over topics and comments is first-seen order, which the
/// ranking engine relies on for stable tie-breaks.
#[derive(Debug, Default, PartialEq)]
pub struct EntityStore {
    topics: AHashMap<TopicId, Topic>,
    topic_order: Vec<TopicId>,
    comments: AHashMap<CommentId, Comment>,
    comment_order: Vec<CommentId>,
    comment_ids_by_topic: AHashMap<TopicId, Vec<CommentId>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_topic(&mut self, topic: Topic) {
        if !self.topics.contains_key(&topic.id) {
            self.topic_order.push(topic.id.clone());
        }
        self.topics.insert(topic.id.clone(), topic);
    }

    pub fn upsert_comment(&mut self, comment: Comment) {
        if !self.comments.contains_key(&comment.id) {
            self.comment_order.push(comment.id.clone());
        }
        self.comments.insert(comment.id.clone(), comment);
    }

    /// Replaces the topic's membership list wholesale with the comment ids
    /// of the snapshot being processed. Membership is not cumulative: a
    /// comment missing from that snapshot drops out of the list even though
    /// its record and series persist.
    pub fn set_topic_comments(&mut self, topic_id: &str, comment_ids: Vec<CommentId>) {
        self.comment_ids_by_topic
            .insert(topic_id.to_string(), comment_ids);
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.get(id)
    }

    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.get(id)
    }

    /// Comment ids of the most recently processed snapshot that contained
    /// the topic; empty for an unknown topic.
    pub fn comments_for_topic(&self, topic_id: &str) -> &[CommentId] {
        self.comment_ids_by_topic
            .get(topic_id)
            .map_or(&[], Vec::as_slice)
    }

    /// All topics, in first-seen order.
    pub fn all_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topic_order.iter().filter_map(|id| self.topics.get(id))
    }

    /// All comments, in first-seen order.
    pub fn all_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comment_order
            .iter()
            .filter_map(|id| self.comments.get(id))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}
