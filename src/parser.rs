use serde::Deserialize;

use crate::source::{RawSnapshot, RawTopic};
use crate::types::{CommentId, HistoryError, Timestamp, TopicId};

/// One rich-text fragment of a topic description. The markup is emitted
/// verbatim on the topic page, as published by the consultation platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Clause {
    pub markup: String,
}

/// Latest known record of a discussion subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply {
    pub text: String,
}

/// Latest known record of a user submission, attached to exactly one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub topic_id: TopicId,
    pub text: String,
    pub score: i64,
    pub reply_count: i64,
    pub replies: Vec<Reply>,
}

/// Wire form of `topic.json`.
#[derive(Deserialize)]
struct TopicRecord {
    id: String,
    #[serde(rename = "mediaTitle")]
    media_title: String,
    clauses: Vec<Clause>,
}

/// Wire form of one comment blob.
#[derive(Deserialize)]
struct CommentRecord {
    id: String,
    text: String,
    score: i64,
    #[serde(rename = "repliesCount")]
    replies_count: i64,
    #[serde(default)]
    replies: Vec<Reply>,
}

/// The typed contents of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSnapshot {
    pub timestamp: Timestamp,
    pub topics: Vec<ParsedTopic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTopic {
    pub topic: Topic,
    pub comments: Vec<Comment>,
}

/// Decodes one raw snapshot into typed records.
///
/// Any structural problem is a `MalformedSnapshot` error naming the
/// snapshot, the topic subtree, and the offending comment blob; there is no
/// best-effort partial parse.
pub fn parse_snapshot(raw: &RawSnapshot) -> Result<ParsedSnapshot, HistoryError> {
    let topics = raw
        .topics
        .iter()
        .map(|raw_topic| parse_topic(&raw.id, raw_topic))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParsedSnapshot {
        timestamp: raw.timestamp,
        topics,
    })
}

fn parse_topic(snapshot_id: &str, raw: &RawTopic) -> Result<ParsedTopic, HistoryError> {
    let malformed = |entity: String, reason: String| HistoryError::MalformedSnapshot {
        snapshot: snapshot_id.to_string(),
        entity,
        reason,
    };

    let descriptor = raw.descriptor.as_deref().ok_or_else(|| {
        malformed(
            format!("topic tree {}", raw.name),
            "missing topic.json descriptor".to_string(),
        )
    })?;
    let record: TopicRecord = serde_json::from_slice(descriptor)
        .map_err(|e| malformed(format!("topic tree {}", raw.name), e.to_string()))?;

    let topic = Topic {
        id: record.id,
        title: record.media_title,
        clauses: record.clauses,
    };

    let comments = raw
        .comments
        .iter()
        .map(|raw_comment| {
            let record: CommentRecord = serde_json::from_slice(&raw_comment.bytes).map_err(|e| {
                malformed(
                    format!("topic {} comment blob {}", topic.id, raw_comment.name),
                    e.to_string(),
                )
            })?;
            Ok(Comment {
                id: record.id,
                topic_id: topic.id.clone(),
                text: record.text,
                score: record.score,
                reply_count: record.replies_count,
                replies: record.replies,
            })
        })
        .collect::<Result<Vec<_>, HistoryError>>()?;

    Ok(ParsedTopic { topic, comments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawComment;

    fn raw_snapshot(topics: Vec<RawTopic>) -> RawSnapshot {
        RawSnapshot {
            id: "abc123".to_string(),
            timestamp: 1000,
            topics,
        }
    }

    fn raw_topic(descriptor: Option<&str>, comments: Vec<(&str, &str)>) -> RawTopic {
        RawTopic {
            name: "t1".to_string(),
            descriptor: descriptor.map(|d| d.as_bytes().to_vec()),
            comments: comments
                .into_iter()
                .map(|(name, json)| RawComment {
                    name: name.to_string(),
                    bytes: json.as_bytes().to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_parse_snapshot_with_wire_names() {
        let topic_json = r#"{
            "id": "t1",
            "mediaTitle": "Citizen petitions",
            "clauses": [{"markup": "<p>Intro</p>"}]
        }"#;
        let comment_json = r#"{
            "id": "c1",
            "text": "More referendums",
            "score": 7,
            "repliesCount": 2,
            "replies": [{"text": "Agreed"}]
        }"#;

        let raw = raw_snapshot(vec![raw_topic(Some(topic_json), vec![("c1", comment_json)])]);
        let parsed = parse_snapshot(&raw).unwrap();

        assert_eq!(parsed.timestamp, 1000);
        assert_eq!(parsed.topics.len(), 1);
        let topic = &parsed.topics[0].topic;
        assert_eq!(topic.id, "t1");
        assert_eq!(topic.title, "Citizen petitions");
        assert_eq!(topic.clauses[0].markup, "<p>Intro</p>");

        let comment = &parsed.topics[0].comments[0];
        assert_eq!(comment.id, "c1");
        assert_eq!(comment.topic_id, "t1");
        assert_eq!(comment.score, 7);
        assert_eq!(comment.reply_count, 2);
        assert_eq!(comment.replies[0].text, "Agreed");
    }

    #[test]
    fn test_missing_descriptor_is_malformed() {
        let raw = raw_snapshot(vec![raw_topic(None, vec![])]);
        let err = parse_snapshot(&raw).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("abc123"), "missing snapshot id: {msg}");
        assert!(msg.contains("topic.json"), "missing reason: {msg}");
    }

    #[test]
    fn test_undecodable_comment_names_blob() {
        let topic_json = r#"{"id": "t1", "mediaTitle": "T", "clauses": []}"#;
        let raw = raw_snapshot(vec![raw_topic(
            Some(topic_json),
            vec![("c9", "not json at all")],
        )]);
        let err = parse_snapshot(&raw).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("comment blob c9"), "missing blob name: {msg}");
        assert!(msg.contains("abc123"), "missing snapshot id: {msg}");
    }

    #[test]
    fn test_missing_required_comment_field_is_malformed() {
        let topic_json = r#"{"id": "t1", "mediaTitle": "T", "clauses": []}"#;
        // No repliesCount.
        let comment_json = r#"{"id": "c1", "text": "x", "score": 1}"#;
        let raw = raw_snapshot(vec![raw_topic(
            Some(topic_json),
            vec![("c1", comment_json)],
        )]);
        let err = parse_snapshot(&raw).unwrap_err();
        assert!(err.to_string().contains("repliesCount"));
    }

    #[test]
    fn test_replies_default_to_empty() {
        let topic_json = r#"{"id": "t1", "mediaTitle": "T", "clauses": []}"#;
        let comment_json = r#"{"id": "c1", "text": "x", "score": 1, "repliesCount": 0}"#;
        let raw = raw_snapshot(vec![raw_topic(
            Some(topic_json),
            vec![("c1", comment_json)],
        )]);
        let parsed = parse_snapshot(&raw).unwrap();
        assert!(parsed.topics[0].comments[0].replies.is_empty());
    }
}
