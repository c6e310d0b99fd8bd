//! Rendering of summary results for the terminal.

use crate::summary::SummaryResult;
use console::{StyledObject, style};
use serde::Serialize;
use std::fmt::Write as _;

const MISSING_VALUE: &str = "N/A";
const BANNER_TITLE: &str = "━━━ Hacker News Summaries ━━━";
const BANNER_FOOTER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const SEPARATOR_WIDTH: usize = 70;

/// Hint printed when a run produced no summaries.
pub const EMPTY_RESULT_HINT: &str =
    "No summaries generated. Try increasing --last-k or check verbose output for skipped articles.";

/// Flat, presentation-ready view of one summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Story headline.
    pub title: String,
    /// Linked article URL.
    pub url: String,
    /// Vote score.
    pub score: i64,
    /// Comment count.
    pub comments: i64,
    /// Summary or sentinel text.
    pub summary: String,
    /// Submission time as RFC 3339.
    pub time_iso: String,
    /// Submitter username.
    pub by: String,
}

impl From<&SummaryResult> for SummaryRow {
    fn from(result: &SummaryResult) -> Self {
        let meta = &result.document.meta;
        Self {
            title: meta.title.clone().unwrap_or_else(|| MISSING_VALUE.into()),
            url: meta.url.clone(),
            score: meta.score,
            comments: meta.comment_count,
            summary: result.summary.clone(),
            time_iso: meta.time_iso.clone().unwrap_or_else(|| MISSING_VALUE.into()),
            by: meta.author.clone().unwrap_or_else(|| MISSING_VALUE.into()),
        }
    }
}

/// Convert results into output rows, preserving order.
pub fn rows(results: &[SummaryResult]) -> Vec<SummaryRow> {
    results.iter().map(SummaryRow::from).collect()
}

/// Render rows as a pretty-printed JSON array.
pub fn render_json(rows: &[SummaryRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}

/// Render rows as numbered text entries framed by a banner.
///
/// With `styled` set, titles, counters, URLs, and the banner carry terminal colours; otherwise
/// the output is plain text.
pub fn render_text(rows: &[SummaryRow], styled: bool) -> String {
    if rows.is_empty() {
        return style(EMPTY_RESULT_HINT).yellow().force_styling(styled).to_string();
    }

    let separator = style("─".repeat(SEPARATOR_WIDTH))
        .black()
        .bright()
        .force_styling(styled);
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", banner(BANNER_TITLE, styled));
    let _ = writeln!(out);

    for (index, row) in rows.iter().enumerate() {
        let heading = format!("{}. {}", index + 1, row.title);
        let counters = format!("   ({} points, {} comments)", row.score, row.comments);
        let _ = writeln!(
            out,
            "{}",
            style(heading).green().bright().bold().force_styling(styled)
        );
        let _ = writeln!(
            out,
            "{}",
            style(counters).yellow().bright().force_styling(styled)
        );
        let _ = writeln!(out, "   {}", row.summary);
        let _ = writeln!(
            out,
            "   {}",
            style(&row.url).blue().bright().underlined().force_styling(styled)
        );
        if index + 1 < rows.len() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{separator}");
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", banner(BANNER_FOOTER, styled));
    out
}

fn banner(text: &str, styled: bool) -> StyledObject<&str> {
    style(text).cyan().bold().force_styling(styled)
}
