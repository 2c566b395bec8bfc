use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::report::{PageKind, PageModel};
use crate::utils::escape_html;

const BOOTSTRAP_CSS: &str =
    "https://maxcdn.bootstrapcdn.com/bootstrap/4.0.0-beta.2/css/bootstrap.min.css";

/// Emits one static file per assembled view model. The core guarantees the
/// view model fields; the writer owns all markup decisions.
pub trait PageWriter {
    fn write_page(&self, path: &Path, page: &PageModel) -> Result<()>;
}

/// Self-contained static HTML writer mirroring the consultation site
/// layout: a global index with topic links, and one page per topic.
pub struct HtmlPageWriter;

impl HtmlPageWriter {
    fn render(page: &PageModel) -> String {
        let mut html = String::with_capacity(8192);
        html.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1, shrink-to-fit=no\">\n",
        );
        let _ = writeln!(html, "<title>{}</title>", escape_html(&page.title));
        let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">");
        html.push_str("</head>\n<body>\n<div class=\"container\">\n");

        match page.kind {
            PageKind::Global => {
                let _ = writeln!(html, "<h1>{}</h1>", escape_html(&page.site_title));
                let _ = writeln!(html, "<h2>{}</h2>", escape_html(&page.site_subtitle));
            }
            PageKind::Topic => {
                let _ = writeln!(html, "<h2>{}</h2>", escape_html(&page.site_title));
                let _ = writeln!(html, "<h3>{}</h3>", escape_html(&page.site_subtitle));
                let _ = writeln!(html, "<h1>{}</h1>", escape_html(&page.title));
                // Clause markup comes from the platform's own rich text and
                // is emitted verbatim.
                for clause in &page.clauses {
                    html.push_str(clause);
                    html.push('\n');
                }
                html.push_str("<hr>\n<h2>Commentaires</h2>\n");
            }
        }

        let _ = writeln!(
            html,
            "<p><img src=\"{}\"></p>",
            page.charts.scores.display()
        );
        let _ = writeln!(
            html,
            "<p><img src=\"{}\"></p>",
            page.charts.replies.display()
        );

        if page.kind == PageKind::Global {
            html.push_str("<ul class=\"list-group\">\n");
            for link in &page.topic_links {
                let _ = writeln!(
                    html,
                    "<li class=\"list-group-item\"><a href=\"{}.html\">{}</a></li>",
                    escape_html(&link.topic_id),
                    escape_html(&link.title)
                );
            }
            html.push_str("</ul>\n");
        } else {
            html.push_str("<ul class=\"list-group\">\n");
            for comment in &page.comments {
                html.push_str("<li class=\"list-group-item\">");
                for line in comment.text.split('\n') {
                    let _ = writeln!(html, "<p>{}</p>", escape_html(line));
                }
                let _ = writeln!(
                    html,
                    "<p>Score : {} / Réponses : {}</p></li>",
                    comment.score, comment.reply_count
                );
            }
            html.push_str("</ul>\n");
        }

        html.push_str("<h2>Mots des commentaires</h2>\n");
        let _ = writeln!(
            html,
            "<p><img src=\"{}\"></p>",
            page.charts.comments_cloud.display()
        );
        html.push_str("<h2>Mots des réponses</h2>\n");
        let _ = writeln!(
            html,
            "<p><img src=\"{}\"></p>",
            page.charts.replies_cloud.display()
        );

        html.push_str("</div>\n</body>\n</html>\n");
        html
    }
}

impl PageWriter for HtmlPageWriter {
    fn write_page(&self, path: &Path, page: &PageModel) -> Result<()> {
        fs::write(path, Self::render(page))
            .with_context(|| format!("Failed to write page {}", path.display()))?;
        Ok(())
    }
}
