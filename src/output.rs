//! Output types returned by a batch run.

use crate::error::StageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One written certificate file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Output filename, e.g. `CAL31 - batch_a - ABC-1.pdf`.
    pub file_name: String,
    /// Source document base name (without extension).
    pub source: String,
    /// Extracted serial, or the `Unknown_<n>` / `Error_<n>` placeholder.
    pub serial: String,
    /// First page of the certificate in the source document, 1-based.
    pub page_start: usize,
    /// Last page of the certificate in the source document, 1-based inclusive.
    pub page_end: usize,
    /// True when an earlier certificate in the batch already used this serial.
    pub duplicate: bool,
}

impl CertificateRecord {
    /// Page range as reported in the spreadsheet, e.g. `3-4`.
    pub fn page_range(&self) -> String {
        format!("{}-{}", self.page_start, self.page_end)
    }

    /// Duplicate flag as reported in the spreadsheet.
    pub fn duplicate_label(&self) -> &'static str {
        if self.duplicate {
            "oui"
        } else {
            "non"
        }
    }
}

/// Terminal state of one source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentOutcome {
    /// Every certificate group was attempted (some writes may still have failed).
    FullyProcessed,
    /// Rasterisation failed; the document produced no certificates.
    AbandonedAtLoad,
    /// The splitter could not re-open the document; no certificates written.
    AbandonedAtRead,
}

/// Per-source-document summary, one row of the `Résumé` sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Source document base name.
    pub source: String,
    pub outcome: DocumentOutcome,
    /// Certificate files written from this document.
    pub certificates: usize,
    /// How many of those carried a duplicate serial.
    pub duplicates: usize,
}

/// Wall-clock accounting for one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Documents submitted to the batch.
    pub documents_total: usize,
    /// Documents abandoned at load or at read.
    pub documents_failed: usize,
    /// Certificate files written.
    pub certificates_written: usize,
    /// Certificates flagged as duplicates.
    pub duplicates: usize,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
    pub split_duration_ms: u64,
}

/// Everything a batch run produced.
///
/// Returned even when individual documents failed; check `errors` and
/// `stats.documents_failed` for partial failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// The compressed archive holding all certificate PDFs plus the report.
    pub archive_path: PathBuf,
    pub certificates: Vec<CertificateRecord>,
    pub documents: Vec<DocumentReport>,
    pub errors: Vec<StageError>,
    pub stats: BatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duplicate: bool) -> CertificateRecord {
        CertificateRecord {
            file_name: "CAL31 - doc - ABC-1.pdf".into(),
            source: "doc".into(),
            serial: "ABC-1".into(),
            page_start: 3,
            page_end: 4,
            duplicate,
        }
    }

    #[test]
    fn page_range_is_one_based_inclusive() {
        assert_eq!(record(false).page_range(), "3-4");
    }

    #[test]
    fn duplicate_label_matches_flag() {
        assert_eq!(record(false).duplicate_label(), "non");
        assert_eq!(record(true).duplicate_label(), "oui");
    }

    #[test]
    fn certificate_record_round_trips_through_json() {
        let rec = record(true);
        let json = serde_json::to_string(&rec).unwrap();
        let back: CertificateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.file_name, rec.file_name);
        assert!(back.duplicate);
    }
}
