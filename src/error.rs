//! Error types for the certsplit library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CertSplitError`] — **Fatal**: the batch cannot run at all (working
//!   directory could not be created, the report or archive could not be
//!   written, invalid configuration). Returned as `Err(CertSplitError)` from
//!   [`crate::process::run_batch`].
//!
//! * [`StageError`] — **Recoverable**: one document or one certificate group
//!   failed at a pipeline stage (load, OCR, read, write) but the rest of the
//!   batch is fine. Collected into [`crate::output::BatchOutput::errors`] and
//!   exported as the `Erreurs` sheet of the report.
//!
//! The separation keeps the contract of the tool intact: the batch always
//! completes and always produces an archive, even when every document failed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the certsplit library.
///
/// Per-document and per-certificate failures use [`StageError`] and are
/// collected into the batch report rather than propagated here.
#[derive(Debug, Error)]
pub enum CertSplitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The per-batch temporary working directory could not be created.
    #[error("Failed to create batch working directory: {source}")]
    WorkdirFailed {
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet report could not be written.
    #[error("Failed to write report '{path}': {detail}")]
    ReportWriteFailed { path: PathBuf, detail: String },

    /// The output archive could not be written.
    #[error("Failed to write archive '{path}': {detail}")]
    ArchiveWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A recoverable error for one document or one certificate group.
///
/// The variant encodes the pipeline stage at which the failure happened.
/// `Display` renders the exact line exported to the `Erreurs` sheet, so the
/// report stays readable without any further formatting.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum StageError {
    /// Rasterisation failed; the whole document was abandoned.
    #[error("[LOAD ERROR] {document}: {detail}")]
    Load { document: String, detail: String },

    /// OCR failed for one front page; that certificate got an `Error_<n>` serial.
    #[error("[OCR ERROR] {document} → page {page}: {detail}")]
    Ocr {
        document: String,
        /// 1-based page number of the front page that failed.
        page: usize,
        detail: String,
    },

    /// The splitter could not re-open the document; it was abandoned.
    #[error("[PDF READ ERROR] {document}: {detail}")]
    Read { document: String, detail: String },

    /// One certificate group could not be written; that group was skipped.
    #[error("[PDF WRITE ERROR] {document} → pages {first}-{last}: {detail}")]
    Write {
        document: String,
        /// 1-based first page of the skipped group.
        first: usize,
        /// 1-based last page of the skipped group.
        last: usize,
        detail: String,
    },
}

impl StageError {
    /// Source document base name the error belongs to.
    pub fn document(&self) -> &str {
        match self {
            StageError::Load { document, .. }
            | StageError::Ocr { document, .. }
            | StageError::Read { document, .. }
            | StageError::Write { document, .. } => document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        let e = StageError::Load {
            document: "batch_a".into(),
            detail: "bad xref".into(),
        };
        assert_eq!(e.to_string(), "[LOAD ERROR] batch_a: bad xref");
    }

    #[test]
    fn ocr_error_display_uses_one_based_page() {
        let e = StageError::Ocr {
            document: "batch_a".into(),
            page: 3,
            detail: "tesseract exited with 1".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("[OCR ERROR]"), "got: {msg}");
        assert!(msg.contains("page 3"), "got: {msg}");
    }

    #[test]
    fn write_error_display_carries_page_range() {
        let e = StageError::Write {
            document: "batch_a".into(),
            first: 5,
            last: 6,
            detail: "disk full".into(),
        };
        assert!(e.to_string().contains("pages 5-6"));
    }

    #[test]
    fn stage_error_document_accessor() {
        let e = StageError::Read {
            document: "doc".into(),
            detail: "x".into(),
        };
        assert_eq!(e.document(), "doc");
    }

    #[test]
    fn corrupt_pdf_display_names_the_file() {
        let e = CertSplitError::CorruptPdf {
            path: PathBuf::from("note.txt"),
            detail: "not a PDF".into(),
        };
        assert!(e.to_string().contains("note.txt"));
    }
}
