use chrono::DateTime;

use crate::types::Timestamp;

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '&' => "&amp;".chars().collect::<Vec<_>>(),
            '<' => "&lt;".chars().collect(),
            '>' => "&gt;".chars().collect(),
            '"' => "&quot;".chars().collect(),
            '\'' => "&#39;".chars().collect(),
            c => vec![c],
        })
        .collect()
}

/// Formats a snapshot timestamp as a short day-month axis label.
pub fn date_label(timestamp: Timestamp) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%d-%m").to_string())
        .unwrap_or_default()
}

/// Splits a corpus into lowercase word tokens. Tokens shorter than three
/// characters carry no signal for the word clouds and are dropped.
pub fn tokenize(corpus: &str) -> impl Iterator<Item = String> + '_ {
    corpus
        .split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '’')
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.to_lowercase())
}
