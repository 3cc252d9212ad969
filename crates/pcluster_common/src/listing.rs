//! Parser for `pcluster list` output.
//!
//! Expected row format: `<name> <status> <cli version>`, whitespace separated.

use crate::types::ClusterRecord;
use tracing::warn;

/// Number of whitespace-separated fields in a well-formed listing row
pub const LISTING_FIELDS: usize = 3;

/// Result of parsing a whole listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedListing {
    pub clusters: Vec<ClusterRecord>,
    /// Rows whose field count was not LISTING_FIELDS
    pub malformed_rows: usize,
}

impl ParsedListing {
    /// True when there was at least one row and none of them were well formed.
    pub fn malformed_throughout(&self) -> bool {
        !self.clusters.is_empty() && self.malformed_rows == self.clusters.len()
    }
}

/// Parse one row. Never drops the row: missing trailing fields become empty
/// strings, extra fields are ignored. Returns whether the row was well formed.
pub fn parse_listing_line(line: &str) -> (ClusterRecord, bool) {
    let mut fields: Vec<&str> = line.split_whitespace().collect();
    let well_formed = fields.len() == LISTING_FIELDS;

    if !well_formed {
        warn!(
            "`pcluster list` row has {} fields rather than the expected {}: {}",
            fields.len(),
            LISTING_FIELDS,
            line.trim()
        );
        fields.resize(LISTING_FIELDS, "");
    }

    (ClusterRecord::new(fields[0], fields[1], fields[2]), well_formed)
}

/// Parse a full listing. Blank lines are not rows and are skipped.
pub fn parse_listing_output(output: &str) -> ParsedListing {
    let mut parsed = ParsedListing::default();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let (record, well_formed) = parse_listing_line(line);
        if !well_formed {
            parsed.malformed_rows += 1;
        }
        parsed.clusters.push(record);
    }
    parsed
}
