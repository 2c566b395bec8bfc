use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use std::cmp::Reverse;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::{SeriesLine, TimeSeriesChart};
use crate::utils::{date_label, escape_html, tokenize};

/// Tokens excluded from word-frequency counting. Ships with a French list
/// matching the consultation corpus; extra words can be loaded from a file.
pub struct Stopwords(AHashSet<String>);

/// The usual French filler words, enough to keep the clouds readable.
const FRENCH_STOPWORDS: &[&str] = &[
    "ainsi", "alors", "après", "aussi", "autre", "autres", "avant", "avec", "avoir", "bien",
    "c'est", "cela", "celle", "celles", "celui", "cette", "ceux", "chaque", "comme", "dans",
    "d'un", "d'une", "des", "deux", "doit", "donc", "dont", "elle", "elles", "encore", "entre",
    "est", "etre", "être", "fait", "faire", "faut", "ils", "j'ai", "jour", "l'on", "les", "leur",
    "leurs", "lors", "mais", "même", "mes", "mettre", "moins", "n'est", "nos", "notre", "nous",
    "ont", "par", "pas", "peu", "peut", "plus", "pour", "qu'il", "qu'ils", "quand", "que",
    "quel", "quelle", "qui", "rien", "sans", "ses", "soit", "son", "sont", "sous", "sur", "tous",
    "tout", "toute", "toutes", "très", "une", "vers", "votre", "vos", "vous",
];

impl Stopwords {
    pub fn french() -> Self {
        Self(FRENCH_STOPWORDS.iter().map(|w| w.to_string()).collect())
    }

    /// Adds one stopword per non-empty line of the file.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stopword file {}", path.display()))?;
        self.0.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| l.to_lowercase()),
        );
        Ok(())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::french()
    }
}

/// Produces the image artifacts of a report. Pure with respect to the
/// reconstruction state; returns the path to embed in the page, relative to
/// the site root.
pub trait ChartRenderer {
    fn render_time_series(&self, chart: &TimeSeriesChart, file_name: &str) -> Result<PathBuf>;

    fn render_word_cloud(
        &self,
        corpus: &str,
        stopwords: &Stopwords,
        file_name: &str,
    ) -> Result<PathBuf>;
}

const WIDTH: u32 = 960;
const HEIGHT: u32 = 720;
const MARGIN: u32 = 70;
const MAX_FONT_SIZE: usize = 40;
const MIN_FONT_SIZE: usize = 12;
const CLOUD_WORD_LIMIT: usize = 60;

/// Matplotlib tab10, which the original charts used.
const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Renders charts and word clouds as self-contained SVG files under
/// `<html_dir>/images`, with no image library involved.
pub struct SvgChartRenderer {
    images_dir: PathBuf,
}

impl SvgChartRenderer {
    pub fn new<P: AsRef<Path>>(html_dir: P) -> Self {
        Self {
            images_dir: html_dir.as_ref().join("images"),
        }
    }

    fn write_svg(&self, file_name: &str, body: &str) -> Result<PathBuf> {
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
             viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\">\n\
             <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>\n{body}</svg>\n"
        );
        let target = self.images_dir.join(format!("{file_name}.svg"));
        fs::write(&target, svg)
            .with_context(|| format!("Failed to write image {}", target.display()))?;
        Ok(PathBuf::from("images").join(format!("{file_name}.svg")))
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render_time_series(&self, chart: &TimeSeriesChart, file_name: &str) -> Result<PathBuf> {
        let mut body = String::new();
        let lines: Vec<&SeriesLine> = chart.lines.iter().filter(|l| !l.samples.is_empty()).collect();

        let _ = writeln!(
            body,
            "<text x=\"{}\" y=\"40\" font-size=\"24\" text-anchor=\"middle\">{}</text>",
            WIDTH / 2,
            escape_html(&chart.title)
        );
        let _ = writeln!(
            body,
            "<text x=\"{}\" y=\"{}\" font-size=\"16\" text-anchor=\"middle\">{}</text>",
            WIDTH / 2,
            HEIGHT - 12,
            escape_html(&chart.x_label)
        );
        let _ = writeln!(
            body,
            "<text x=\"18\" y=\"{}\" font-size=\"16\" text-anchor=\"middle\" \
             transform=\"rotate(-90 18 {})\">{}</text>",
            HEIGHT / 2,
            HEIGHT / 2,
            escape_html(&chart.y_label)
        );

        if !lines.is_empty() {
            let t_min = lines.iter().flat_map(|l| &l.samples).map(|s| s.timestamp).min().unwrap_or(0);
            let t_max = lines.iter().flat_map(|l| &l.samples).map(|s| s.timestamp).max().unwrap_or(1);
            let v_min = lines.iter().flat_map(|l| &l.samples).map(|s| s.value).min().unwrap_or(0).min(0);
            let v_max = lines.iter().flat_map(|l| &l.samples).map(|s| s.value).max().unwrap_or(1).max(v_min + 1);

            let t_span = (t_max - t_min).max(1) as f64;
            let v_span = (v_max - v_min).max(1) as f64;
            let plot_w = (WIDTH - 2 * MARGIN) as f64;
            let plot_h = (HEIGHT - 2 * MARGIN) as f64;
            let x_of = |t: i64| MARGIN as f64 + (t - t_min) as f64 / t_span * plot_w;
            let y_of = |v: i64| (HEIGHT - MARGIN) as f64 - (v - v_min) as f64 / v_span * plot_h;

            // Axes.
            let _ = writeln!(
                body,
                "<line x1=\"{m}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"black\"/>\n\
                 <line x1=\"{m}\" y1=\"{t}\" x2=\"{m}\" y2=\"{b}\" stroke=\"black\"/>",
                m = MARGIN,
                t = MARGIN,
                b = HEIGHT - MARGIN,
                r = WIDTH - MARGIN,
            );

            // Day-month ticks along the x axis.
            let day_span = ((t_max - t_min) / 86_400).max(1) as usize;
            let tick_count = (day_span + 1).clamp(2, 6);
            for i in 0..tick_count {
                let t = t_min + (t_max - t_min) * i as i64 / (tick_count - 1) as i64;
                let _ = writeln!(
                    body,
                    "<text x=\"{:.1}\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\">{}</text>",
                    x_of(t),
                    HEIGHT - MARGIN + 22,
                    date_label(t)
                );
            }
            for i in 0..=4 {
                let v = v_min + (v_max - v_min) * i / 4;
                let _ = writeln!(
                    body,
                    "<text x=\"{}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"end\">{}</text>",
                    MARGIN - 8,
                    y_of(v) + 4.0,
                    v
                );
            }

            for (i, line) in lines.iter().enumerate() {
                let color = PALETTE[i % PALETTE.len()];
                let points = line
                    .samples
                    .iter()
                    .map(|s| format!("{:.1},{:.1}", x_of(s.timestamp), y_of(s.value)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(
                    body,
                    "<polyline points=\"{points}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>"
                );
            }

            // Legend for labeled lines only, as the original charts did.
            let mut legend_y = MARGIN + 10;
            for (i, line) in lines.iter().enumerate() {
                if let Some(label) = &line.label {
                    let color = PALETTE[i % PALETTE.len()];
                    let _ = writeln!(
                        body,
                        "<rect x=\"{x}\" y=\"{y}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\n\
                         <text x=\"{tx}\" y=\"{ty}\" font-size=\"13\">{label}</text>",
                        x = MARGIN + 16,
                        y = legend_y,
                        tx = MARGIN + 34,
                        ty = legend_y + 11,
                        label = escape_html(label),
                    );
                    legend_y += 18;
                }
            }
        }

        self.write_svg(file_name, &body)
    }

    fn render_word_cloud(
        &self,
        corpus: &str,
        stopwords: &Stopwords,
        file_name: &str,
    ) -> Result<PathBuf> {
        let mut counts: AHashMap<String, usize> = AHashMap::new();
        for token in tokenize(corpus).filter(|t| !stopwords.contains(t)) {
            *counts.entry(token).or_default() += 1;
        }

        let mut words: Vec<(String, usize)> = counts.into_iter().collect();
        // Secondary key keeps the layout deterministic across runs.
        words.sort_by_key(|(word, count)| (Reverse(*count), word.clone()));
        words.truncate(CLOUD_WORD_LIMIT);

        let max_count = words.first().map_or(1, |(_, c)| *c);
        let min_count = words.last().map_or(1, |(_, c)| *c);
        let span = (max_count - min_count).max(1);

        let mut body = String::new();
        let mut x = MARGIN;
        let mut y = MARGIN;
        for (i, (word, count)) in words.iter().enumerate() {
            let size = MIN_FONT_SIZE
                + (MAX_FONT_SIZE - MIN_FONT_SIZE) * (count - min_count) / span;
            // Crude width estimate, good enough to wrap rows.
            let advance = (word.chars().count() * size * 3 / 5 + 18) as u32;
            if x + advance > WIDTH - MARGIN {
                x = MARGIN;
                y += (MAX_FONT_SIZE + 12) as u32;
            }
            let color = PALETTE[i % PALETTE.len()];
            let _ = writeln!(
                body,
                "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" fill=\"{color}\">{}</text>",
                escape_html(word)
            );
            x += advance;
        }

        self.write_svg(file_name, &body)
    }
}
