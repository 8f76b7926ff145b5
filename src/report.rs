//! Report sink: render enriched citation rows to CSV.
//!
//! Only compiled with the `csv` feature (on by default). The column order is
//! fixed — chapter, citation key, title, year, first-author block,
//! last-author block, confidence, source — so downstream spreadsheet
//! tooling can rely on positions. Visual styling is the sink consumer's
//! business, not this crate's.

use crate::enrich::{AuthorDetails, EnrichedRecord};
use std::io::Write;
use thiserror::Error;

/// Fixed report header, in column order.
pub const REPORT_COLUMNS: [&str; 14] = [
    "Chapter",
    "Citation Key",
    "Title",
    "Year",
    "First Author",
    "First Author Affiliation",
    "First Author Department",
    "First Author Email",
    "Last Author",
    "Last Author Affiliation",
    "Last Author Department",
    "Last Author Email",
    "Confidence",
    "Source",
];

/// Error writing the report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Write all rows (plus the header) to `writer`.
pub fn write_report<W: Write>(rows: &[EnrichedRecord], writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        csv_writer.write_record(report_row(row))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn report_row(row: &EnrichedRecord) -> [String; 14] {
    let record = &row.record;
    let first_name = record
        .first_author
        .as_ref()
        .map(|a| a.raw.clone())
        .unwrap_or_default();
    let last_name = record
        .last_author
        .as_ref()
        .map(|a| a.raw.clone())
        .unwrap_or_default();
    // Enrichment confidence/source: prefer the first author's resolution,
    // fall back to the last author's.
    let resolved = row.first_author.as_ref().or(row.last_author.as_ref());
    [
        record.chapter_id.to_string(),
        record.citation_key.clone().unwrap_or_default(),
        record.title.clone().unwrap_or_default(),
        record.year.map(|y| y.to_string()).unwrap_or_default(),
        first_name,
        detail(&row.first_author, |d| d.affiliation.as_deref()),
        detail(&row.first_author, |d| d.department.as_deref()),
        detail(&row.first_author, |d| d.email.as_deref()),
        last_name,
        detail(&row.last_author, |d| d.affiliation.as_deref()),
        detail(&row.last_author, |d| d.department.as_deref()),
        detail(&row.last_author, |d| d.email.as_deref()),
        resolved
            .map(|d| format!("{:.2}", d.confidence))
            .unwrap_or_default(),
        detail(&resolved.cloned(), |d| d.source.as_deref()),
    ]
}

fn detail(
    details: &Option<AuthorDetails>,
    field: impl Fn(&AuthorDetails) -> Option<&str>,
) -> String {
    details
        .as_ref()
        .and_then(|d| field(d))
        .unwrap_or_default()
        .to_string()
}
