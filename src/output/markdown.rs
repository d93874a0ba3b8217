//! Markdown digest generation
//!
//! This module renders crawled page records, optionally preceded by the run
//! statistics, as a human-readable markdown document.

use crate::output::stats::CrawlStatistics;
use crate::output::OutputResult;
use crate::state::PageRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Longest body excerpt rendered per page, in characters
const EXCERPT_CHARS: usize = 280;

/// Writes a markdown digest to a file
///
/// # Arguments
///
/// * `records` - The crawled pages
/// * `stats` - Run statistics, rendered first when present
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the digest
/// * `Err(OutputError)` - Failed to write the digest
pub fn generate_markdown_digest(
    records: &[PageRecord],
    stats: Option<&CrawlStatistics>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_digest(records, stats);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats page records (and optional statistics) as markdown
pub fn format_markdown_digest(records: &[PageRecord], stats: Option<&CrawlStatistics>) -> String {
    let mut md = String::new();

    match stats {
        Some(stats) => md.push_str(&format!("# Crawl Digest: {}\n\n", stats.domain)),
        None => md.push_str("# Crawl Digest\n\n"),
    }

    if let Some(stats) = stats {
        md.push_str("## Run Information\n\n");
        if let Some(started) = stats.started_at {
            md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
        }
        if let Some(finished) = stats.finished_at {
            md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
        }
        if let Some(duration) = stats.duration_seconds() {
            md.push_str(&format!("- **Duration**: {:.2} seconds\n", duration));
        }
        md.push_str(&format!("- **Phase**: {}\n\n", stats.phase));

        md.push_str("## Overall Statistics\n\n");
        md.push_str("| Metric | Count |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Pages Reserved | {} |\n", stats.pages_reserved));
        md.push_str(&format!("| Pages Fetched | {} |\n", stats.pages_fetched));
        md.push_str(&format!("| Fetch Failures | {} |\n", stats.fetch_failures));
        md.push_str(&format!("| Beyond Depth | {} |\n", stats.beyond_depth));
        md.push_str(&format!("| Records Emitted | {} |\n", stats.records_emitted));
        md.push_str(&format!(
            "| Without Body | {} |\n\n",
            stats.records_without_body
        ));

        if !stats.rejected.is_empty() {
            md.push_str("## Rejected Links\n\n");
            md.push_str("| Reason | Count |\n");
            md.push_str("|--------|-------|\n");
            for (reason, count) in &stats.rejected {
                md.push_str(&format!("| {} | {} |\n", reason, count));
            }
            md.push('\n');
        }
    }

    md.push_str(&format!("## Pages ({})\n\n", records.len()));

    for record in records {
        let heading = if record.title.trim().is_empty() {
            record.url.as_str()
        } else {
            record.title.trim()
        };
        md.push_str(&format!("### {}\n\n", heading));
        md.push_str(&format!("- **URL**: <{}>\n", record.url));
        if !record.description.is_empty() {
            md.push_str(&format!("- **Description**: {}\n", record.description));
        }
        if !record.keywords.is_empty() {
            md.push_str(&format!("- **Keywords**: {}\n", record.keywords));
        }
        md.push('\n');
        md.push_str(&format!("> {}\n\n", excerpt(&record.body)));
    }

    md
}

/// First words of the body on a single line
fn excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");

    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }

    let mut cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}
