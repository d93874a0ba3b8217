//! Output module for crawl results and reports
//!
//! This module handles:
//! - Writing page records as JSON lines, a JSON array, a URL list or markdown
//! - Generating markdown digests of crawl results
//! - Recording crawl statistics

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_digest, generate_markdown_digest};
pub use stats::{print_statistics, write_statistics, CrawlStatistics};

use crate::state::PageRecord;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("Failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How page records are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    JsonLines,
    /// A single JSON array
    Json,
    /// One URL per line
    Urls,
    /// A markdown digest
    Markdown,
}

impl OutputFormat {
    /// Whether records can be written one by one as they arrive
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::JsonLines | Self::Urls)
    }
}

/// Writes one record in a streaming format
///
/// # Returns
///
/// * `Ok(())` - The record was written
/// * `Err(OutputError::Format)` - The format needs the whole record set
pub fn write_record<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    record: &PageRecord,
) -> OutputResult<()> {
    match format {
        OutputFormat::JsonLines => {
            serde_json::to_writer(&mut *writer, record)?;
            writeln!(writer)?;
        }
        OutputFormat::Urls => writeln!(writer, "{}", record.url)?,
        OutputFormat::Json | OutputFormat::Markdown => {
            return Err(OutputError::Format(format!(
                "{:?} output cannot be written record by record",
                format
            )))
        }
    }

    Ok(())
}

/// Writes a complete record set
///
/// `stats` is only rendered by the markdown format.
pub fn write_records<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    records: &[PageRecord],
    stats: Option<&CrawlStatistics>,
) -> OutputResult<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Markdown => {
            writer.write_all(format_markdown_digest(records, stats).as_bytes())?;
        }
        OutputFormat::JsonLines | OutputFormat::Urls => {
            for record in records {
                write_record(writer, format, record)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
