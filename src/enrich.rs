//! Enrichment boundary: the seam between the parsing core and the external
//! author-lookup service.
//!
//! The core never performs lookups itself — it hands each immutable
//! [`CitationRecord`] to an [`AuthorEnricher`] implementation (Semantic
//! Scholar, DBLP, an LLM, or any combination) and receives resolved
//! affiliation/contact details back. [`NoopEnricher`] wires a pipeline
//! together without network access, e.g. in tests.

use crate::CitationRecord;
use serde::{Deserialize, Serialize};

/// Resolved details for one author, as returned by a lookup provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorDetails {
    pub affiliation: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    /// Provider's confidence in the resolution, in `[0, 1]`.
    pub confidence: f32,
    /// Which provider produced the details (e.g. `"semantic-scholar"`).
    pub source: Option<String>,
}

/// A citation record with whatever author details the enrichment service
/// could resolve. `last_author` details are `None` whenever the record's
/// `last_author` is (a single-author work resolves once).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub record: CitationRecord,
    pub first_author: Option<AuthorDetails>,
    pub last_author: Option<AuthorDetails>,
}

/// Implemented by the external enrichment service.
pub trait AuthorEnricher {
    /// Resolve author details for one record. Implementations must not
    /// mutate the record; failed lookups are represented as `None` details,
    /// never as errors — enrichment failure is not a pipeline failure.
    fn enrich(&self, record: &CitationRecord) -> EnrichedRecord;
}

/// Enricher that resolves nothing; every record passes through with empty
/// details.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnricher;

impl AuthorEnricher for NoopEnricher {
    fn enrich(&self, record: &CitationRecord) -> EnrichedRecord {
        EnrichedRecord {
            record: record.clone(),
            first_author: None,
            last_author: None,
        }
    }
}

/// Run every record through the given enricher, preserving order.
pub fn enrich_all(enricher: &dyn AuthorEnricher, records: &[CitationRecord]) -> Vec<EnrichedRecord> {
    records.iter().map(|r| enricher.enrich(r)).collect()
}
