pub mod charts;
pub mod html;

use ahash::AHashMap;
use anyhow::{Context, Result};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rank::{rank_comments, rank_for_topic, RankEntry};
use crate::reconstruct::History;
use crate::types::{CommentId, Metric, Sample, TopicId};

pub use charts::{ChartRenderer, Stopwords, SvgChartRenderer};
pub use html::{HtmlPageWriter, PageWriter};

/// Reply-count charts plot only the ten most-replied comments; score charts
/// are uncapped.
const REPLY_CHART_LIMIT: usize = 10;

/// One comment as exposed to page rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub id: CommentId,
    pub text: String,
    pub score: i64,
    pub reply_count: i64,
}

/// One plotted line: a comment's sample sequence plus its optional legend
/// label.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLine {
    pub label: Option<String>,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<SeriesLine>,
}

/// Site-relative paths of the four images embedded in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub scores: PathBuf,
    pub replies: PathBuf,
    pub comments_cloud: PathBuf,
    pub replies_cloud: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Global,
    Topic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicLink {
    pub topic_id: TopicId,
    pub title: String,
}

/// Renderer-agnostic view model handed to the page writer.
#[derive(Debug, Clone, PartialEq)]
pub struct PageModel {
    pub kind: PageKind,
    pub title: String,
    pub site_title: String,
    pub site_subtitle: String,
    /// Topic description markup, topic pages only.
    pub clauses: Vec<String>,
    /// Comments ranked by score, descending.
    pub comments: Vec<CommentView>,
    pub charts: ChartSet,
    /// Links to the per-topic pages, global page only.
    pub topic_links: Vec<TopicLink>,
}

/// Curated short labels for well-known comment ids. Chart legends show
/// `"<label> : <final value>"`; unlabeled comments stay out of the legend.
#[derive(Debug, Default)]
pub struct LabelTable(AHashMap<CommentId, String>);

impl LabelTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a JSON object mapping comment id to label.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read label file {}", path.display()))?;
        let map: AHashMap<CommentId, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse label file {}", path.display()))?;
        Ok(Self(map))
    }

    pub fn chart_label(&self, comment_id: &str, final_value: i64) -> Option<String> {
        self.0
            .get(comment_id)
            .map(|label| format!("{label} : {final_value}"))
    }
}

pub struct ReportConfig {
    pub html_dir: PathBuf,
    pub site_title: String,
    pub site_subtitle: String,
    pub labels: LabelTable,
    pub stopwords: Stopwords,
}

/// One report that could not be produced. A failed topic report never stops
/// the remaining reports; the caller decides the process exit status.
#[derive(Debug)]
pub struct ReportFailure {
    pub report: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub pages_written: usize,
    pub failures: Vec<ReportFailure>,
}

/// Produces the global report and one report per topic from a fully
/// reconstructed history.
pub fn build_reports(
    history: &History,
    renderer: &dyn ChartRenderer,
    writer: &dyn PageWriter,
    config: &ReportConfig,
) -> ReportSummary {
    let assembler = ReportAssembler { history, config };
    let score_ranking = rank_comments(&history.store, &history.series, Metric::Score);
    let reply_ranking = rank_comments(&history.store, &history.series, Metric::ReplyCount);

    let mut summary = ReportSummary::default();
    for topic in history.store.all_topics() {
        let outcome = assembler.build_topic_report(
            &topic.id,
            &score_ranking,
            &reply_ranking,
            renderer,
            writer,
        );
        record(&mut summary, format!("topic {}", topic.id), outcome);
    }

    let outcome = assembler.build_global_report(&score_ranking, &reply_ranking, renderer, writer);
    record(&mut summary, "index".to_string(), outcome);
    summary
}

fn record(summary: &mut ReportSummary, report: String, outcome: Result<()>) {
    match outcome {
        Ok(()) => summary.pages_written += 1,
        Err(error) => summary.failures.push(ReportFailure {
            report,
            error: format!("{error:#}"),
        }),
    }
}

struct ReportAssembler<'a> {
    history: &'a History,
    config: &'a ReportConfig,
}

impl ReportAssembler<'_> {
    fn build_topic_report(
        &self,
        topic_id: &str,
        score_ranking: &[RankEntry],
        reply_ranking: &[RankEntry],
        renderer: &dyn ChartRenderer,
        writer: &dyn PageWriter,
    ) -> Result<()> {
        let store = &self.history.store;
        let topic = store
            .topic(topic_id)
            .with_context(|| format!("Unknown topic {topic_id}"))?;

        let topic_scores = rank_for_topic(score_ranking, store, topic_id);
        let topic_replies = rank_for_topic(reply_ranking, store, topic_id);

        let charts = self.render_charts(
            &topic_scores,
            &topic_replies,
            store.comments_for_topic(topic_id),
            &TopicImageNames::for_topic(topic_id),
            renderer,
        )?;

        let page = PageModel {
            kind: PageKind::Topic,
            title: topic.title.clone(),
            site_title: self.config.site_title.clone(),
            site_subtitle: self.config.site_subtitle.clone(),
            clauses: topic.clauses.iter().map(|c| c.markup.clone()).collect(),
            comments: self.comment_views(&topic_scores),
            charts,
            topic_links: vec![],
        };
        writer.write_page(
            &self.config.html_dir.join(format!("{topic_id}.html")),
            &page,
        )
    }

    fn build_global_report(
        &self,
        score_ranking: &[RankEntry],
        reply_ranking: &[RankEntry],
        renderer: &dyn ChartRenderer,
        writer: &dyn PageWriter,
    ) -> Result<()> {
        let store = &self.history.store;
        let all_ids: Vec<CommentId> = store.all_comments().map(|c| c.id.clone()).collect();

        let charts = self.render_charts(
            score_ranking,
            reply_ranking,
            &all_ids,
            &TopicImageNames::global(),
            renderer,
        )?;

        // Topic link list ordered by topic id, descending.
        let topic_links = store
            .all_topics()
            .map(|topic| TopicLink {
                topic_id: topic.id.clone(),
                title: topic.title.clone(),
            })
            .sorted_by(|a, b| b.topic_id.cmp(&a.topic_id))
            .collect();

        let page = PageModel {
            kind: PageKind::Global,
            title: self.config.site_title.clone(),
            site_title: self.config.site_title.clone(),
            site_subtitle: self.config.site_subtitle.clone(),
            clauses: vec![],
            comments: self.comment_views(score_ranking),
            charts,
            topic_links,
        };
        writer.write_page(&self.config.html_dir.join("index.html"), &page)
    }

    fn render_charts(
        &self,
        score_ranking: &[RankEntry],
        reply_ranking: &[RankEntry],
        corpus_comment_ids: &[CommentId],
        names: &TopicImageNames,
        renderer: &dyn ChartRenderer,
    ) -> Result<ChartSet> {
        let score_chart = TimeSeriesChart {
            title: "Score par commentaire".to_string(),
            x_label: "Date".to_string(),
            y_label: "Score".to_string(),
            lines: self.chart_lines(score_ranking, Metric::Score),
        };
        let reply_chart = TimeSeriesChart {
            title: "Nombre de réponses par commentaire".to_string(),
            x_label: "Date".to_string(),
            y_label: "Réponses".to_string(),
            lines: self.chart_lines(
                &reply_ranking[..reply_ranking.len().min(REPLY_CHART_LIMIT)],
                Metric::ReplyCount,
            ),
        };
        let (comment_corpus, reply_corpus) = self.corpora(corpus_comment_ids);

        Ok(ChartSet {
            scores: renderer.render_time_series(&score_chart, &names.scores)?,
            replies: renderer.render_time_series(&reply_chart, &names.replies)?,
            comments_cloud: renderer.render_word_cloud(
                &comment_corpus,
                &self.config.stopwords,
                &names.comments_cloud,
            )?,
            replies_cloud: renderer.render_word_cloud(
                &reply_corpus,
                &self.config.stopwords,
                &names.replies_cloud,
            )?,
        })
    }

    fn chart_lines(&self, ranking: &[RankEntry], metric: Metric) -> Vec<SeriesLine> {
        ranking
            .iter()
            .map(|entry| SeriesLine {
                label: self
                    .config
                    .labels
                    .chart_label(&entry.comment_id, entry.final_value),
                samples: self.history.series.series(&entry.comment_id, metric).to_vec(),
            })
            .collect()
    }

    fn comment_views(&self, ranking: &[RankEntry]) -> Vec<CommentView> {
        ranking
            .iter()
            .filter_map(|entry| self.history.store.comment(&entry.comment_id))
            .map(|comment| CommentView {
                id: comment.id.clone(),
                text: comment.text.clone(),
                score: comment.score,
                reply_count: comment.reply_count,
            })
            .collect()
    }

    /// The comment and reply text bodies feeding the two word clouds, built
    /// only from the given comment ids.
    fn corpora(&self, comment_ids: &[CommentId]) -> (String, String) {
        let comments: Vec<_> = comment_ids
            .iter()
            .filter_map(|id| self.history.store.comment(id))
            .collect();
        let comment_corpus = comments.iter().map(|c| c.text.as_str()).join("\n");
        let reply_corpus = comments
            .iter()
            .flat_map(|c| c.replies.iter())
            .map(|r| r.text.as_str())
            .join("\n");
        (comment_corpus, reply_corpus)
    }
}

struct TopicImageNames {
    scores: String,
    replies: String,
    comments_cloud: String,
    replies_cloud: String,
}

impl TopicImageNames {
    fn for_topic(topic_id: &str) -> Self {
        Self {
            scores: format!("topic-scores-{topic_id}"),
            replies: format!("topic-replies-{topic_id}"),
            comments_cloud: format!("topic-comments-word-cloud-{topic_id}"),
            replies_cloud: format!("topic-replies-word-cloud-{topic_id}"),
        }
    }

    fn global() -> Self {
        Self {
            scores: "scores".to_string(),
            replies: "replies".to_string(),
            comments_cloud: "comments-word-cloud".to_string(),
            replies_cloud: "replies-word-cloud".to_string(),
        }
    }
}
