use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use consultation_stats::{
    build_reports, reconstruct, GitSnapshotSource, HtmlPageWriter, LabelTable, ReportConfig,
    Stopwords, SvgChartRenderer,
};

#[derive(Parser)]
#[command(name = "consultation-stats")]
#[command(about = "Rebuild a consultation's history from git snapshots and generate a stats site")]
struct Cli {
    /// Path of the git snapshot repository
    repo_dir: PathBuf,

    /// Path of the generated HTML site
    html_dir: PathBuf,

    /// JSON file mapping comment ids to short chart labels
    #[arg(long)]
    labels: Option<PathBuf>,

    /// File with one extra stopword per line
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Site title shown on every page
    #[arg(
        long,
        default_value = "Quel rôle pour les citoyens dans l’élaboration et l’application de la loi ?"
    )]
    site_title: String,

    /// Subtitle shown under the site title
    #[arg(long, default_value = "Consultation pour une nouvelle Assemblée nationale")]
    site_subtitle: String,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    fs::create_dir_all(args.html_dir.join("images"))
        .with_context(|| format!("Failed to create {}", args.html_dir.display()))?;

    let labels = match &args.labels {
        Some(path) => LabelTable::from_json_file(path)?,
        None => LabelTable::empty(),
    };
    let mut stopwords = Stopwords::french();
    if let Some(path) = &args.stopwords {
        stopwords.extend_from_file(path)?;
    }

    let mut source = GitSnapshotSource::open(&args.repo_dir)
        .with_context(|| format!("Failed to open repository {}", args.repo_dir.display()))?;
    let history = reconstruct(&mut source)?;
    println!(
        "Reconstructed {} snapshots: {} topics, {} comments",
        history.snapshot_count,
        history.store.topic_count(),
        history.store.comment_count()
    );

    let config = ReportConfig {
        html_dir: args.html_dir.clone(),
        site_title: args.site_title,
        site_subtitle: args.site_subtitle,
        labels,
        stopwords,
    };
    let renderer = SvgChartRenderer::new(&args.html_dir);
    let summary = build_reports(&history, &renderer, &HtmlPageWriter, &config);

    println!("Wrote {} pages to {}", summary.pages_written, args.html_dir.display());
    if !summary.failures.is_empty() {
        for failure in &summary.failures {
            eprintln!("Failed to write {}: {}", failure.report, failure.error);
        }
        std::process::exit(1);
    }
    Ok(())
}
