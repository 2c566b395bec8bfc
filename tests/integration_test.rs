use git2::{Oid, Repository, Signature, Time};
use std::fs;
use tempfile::TempDir;

use consultation_stats::{
    build_reports, reconstruct, GitSnapshotSource, HtmlPageWriter, LabelTable, ReportConfig,
    Sample, SnapshotSource, Stopwords, SvgChartRenderer,
};

const T1: i64 = 1_509_000_000;
const T2: i64 = 1_509_086_400;

struct TopicFixture<'a> {
    id: &'a str,
    title: &'a str,
    comments: Vec<(&'a str, i64, i64, &'a str)>, // (id, score, repliesCount, text)
}

/// Builds one snapshot commit whose tree holds one subtree per topic, each
/// with a topic.json descriptor and a comments subtree of JSON blobs.
fn commit_snapshot(
    repo: &Repository,
    topics: &[TopicFixture],
    timestamp: i64,
    parent: Option<Oid>,
) -> Oid {
    let mut root = repo.treebuilder(None).unwrap();
    for topic in topics {
        let descriptor = format!(
            r#"{{"id": "{}", "mediaTitle": "{}", "clauses": [{{"markup": "<p>Intro</p>"}}]}}"#,
            topic.id, topic.title
        );
        let descriptor_oid = repo.blob(descriptor.as_bytes()).unwrap();

        let mut comments = repo.treebuilder(None).unwrap();
        for (id, score, replies_count, text) in &topic.comments {
            let comment = format!(
                r#"{{"id": "{id}", "text": "{text}", "score": {score}, "repliesCount": {replies_count}, "replies": [{{"text": "une réponse"}}]}}"#
            );
            let oid = repo.blob(comment.as_bytes()).unwrap();
            comments.insert(format!("{id}.json"), oid, 0o100644).unwrap();
        }
        let comments_oid = comments.write().unwrap();

        let mut topic_tree = repo.treebuilder(None).unwrap();
        topic_tree.insert("topic.json", descriptor_oid, 0o100644).unwrap();
        topic_tree.insert("comments", comments_oid, 0o040000).unwrap();
        let topic_oid = topic_tree.write().unwrap();

        root.insert(topic.id, topic_oid, 0o040000).unwrap();
    }
    let tree = repo.find_tree(root.write().unwrap()).unwrap();

    let sig = Signature::new("snapshotter", "snap@example.org", &Time::new(timestamp, 0)).unwrap();
    let parents: Vec<git2::Commit> = parent
        .map(|oid| vec![repo.find_commit(oid).unwrap()])
        .unwrap_or_default();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "snapshot", &tree, &parent_refs)
        .unwrap()
}

fn fixture_repo() -> (TempDir, TempDir) {
    let repo_dir = TempDir::new().unwrap();
    let repo = Repository::init(repo_dir.path()).unwrap();

    let first = commit_snapshot(
        &repo,
        &[TopicFixture {
            id: "topic-a",
            title: "Citizen petitions",
            comments: vec![
                ("c1", 2, 0, "more petitions"),
                ("c2", 1, 3, "sortition chambers"),
            ],
        }],
        T1,
        None,
    );
    commit_snapshot(
        &repo,
        &[
            TopicFixture {
                id: "topic-a",
                title: "Citizen petitions",
                comments: vec![("c1", 5, 2, "more petitions, revised")],
            },
            TopicFixture {
                id: "topic-b",
                title: "Open amendments",
                comments: vec![("c3", 8, 1, "publish drafts early")],
            },
        ],
        T2,
        Some(first),
    );

    let html_dir = TempDir::new().unwrap();
    (repo_dir, html_dir)
}

#[test]
fn test_reconstruct_from_git_history() {
    let (repo_dir, _html_dir) = fixture_repo();

    let mut source = GitSnapshotSource::open(repo_dir.path()).unwrap();
    assert_eq!(source.remaining(), Some(2));
    let history = reconstruct(&mut source).unwrap();

    assert_eq!(history.snapshot_count, 2);
    assert_eq!(history.store.topic_count(), 2);
    assert_eq!(history.store.comment_count(), 3);

    // Last-write-wins on the comment record, full series retained.
    let c1 = history.store.comment("c1").unwrap();
    assert_eq!(c1.score, 5);
    assert_eq!(c1.text, "more petitions, revised");
    assert_eq!(
        history.series.score_series("c1"),
        &[
            Sample {
                timestamp: T1,
                value: 2
            },
            Sample {
                timestamp: T2,
                value: 5
            },
        ]
    );

    // c2 vanished after the first snapshot: record kept, series ended,
    // membership reflects the latest snapshot.
    let c2 = history.store.comment("c2").unwrap();
    assert_eq!(c2.text, "sortition chambers");
    assert_eq!(
        history.series.reply_count_series("c2"),
        &[Sample {
            timestamp: T1,
            value: 3
        }]
    );
    assert_eq!(
        history.store.comments_for_topic("topic-a"),
        ["c1".to_string()]
    );
}

#[test]
fn test_full_run_writes_site() {
    let (repo_dir, html_dir) = fixture_repo();
    fs::create_dir_all(html_dir.path().join("images")).unwrap();

    let mut source = GitSnapshotSource::open(repo_dir.path()).unwrap();
    let history = reconstruct(&mut source).unwrap();

    let config = ReportConfig {
        html_dir: html_dir.path().to_path_buf(),
        site_title: "Consultation".to_string(),
        site_subtitle: "Une assemblée nouvelle".to_string(),
        labels: LabelTable::empty(),
        stopwords: Stopwords::french(),
    };
    let renderer = SvgChartRenderer::new(html_dir.path());
    let summary = build_reports(&history, &renderer, &HtmlPageWriter, &config);

    assert!(summary.failures.is_empty(), "{:?}", summary.failures);
    assert_eq!(summary.pages_written, 3);

    let index = fs::read_to_string(html_dir.path().join("index.html")).unwrap();
    assert!(index.contains("Citizen petitions"));
    assert!(index.contains("Open amendments"));
    assert!(index.contains("images/scores.svg"));

    let topic_page = fs::read_to_string(html_dir.path().join("topic-a.html")).unwrap();
    assert!(topic_page.contains("<h1>Citizen petitions</h1>"));
    assert!(topic_page.contains("images/topic-scores-topic-a.svg"));

    for image in [
        "images/scores.svg",
        "images/replies.svg",
        "images/comments-word-cloud.svg",
        "images/topic-scores-topic-a.svg",
        "images/topic-replies-word-cloud-topic-b.svg",
    ] {
        assert!(
            html_dir.path().join(image).exists(),
            "missing image {image}"
        );
    }
}
