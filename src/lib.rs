pub mod parser;
pub mod rank;
pub mod reconstruct;
pub mod report;
pub mod series;
pub mod source;
pub mod store;
pub mod types;
pub mod utils;

pub use rank::{rank_comments, rank_for_topic, RankEntry};
pub use reconstruct::{reconstruct, History};
pub use report::{
    build_reports, ChartRenderer, HtmlPageWriter, LabelTable, PageWriter, ReportConfig,
    ReportSummary, Stopwords, SvgChartRenderer,
};
pub use source::git::GitSnapshotSource;
pub use source::SnapshotSource;
pub use types::{HistoryError, Metric, Sample};
