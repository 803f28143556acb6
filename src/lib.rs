//! # certsplit
//!
//! Split multi-page calibration-certificate PDFs into per-certificate
//! two-page documents, named by the serial number OCR-extracted from each
//! certificate's front page.
//!
//! ## Why this crate?
//!
//! Calibration labs deliver one PDF per instrument batch: dozens of
//! certificates concatenated back-to-back, two pages each. Filing them
//! requires one file per certificate, named after the instrument serial
//! number printed on the front page. Doing that by hand is slow and
//! error-prone; this crate automates the whole round trip and produces a
//! spreadsheet report of what it did.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF batch
//!  │
//!  ├─ 1. Render   rasterise every page via pdfium
//!  ├─ 2. Extract  OCR each front page, regex-search "Serial number: X"
//!  ├─ 3. Split    re-read the PDF with lopdf, write one 2-page PDF per
//!  │              certificate, deduplicating serials batch-wide
//!  ├─ 4. Report   rapport_certificats.xlsx (Certificats / Résumé / Erreurs)
//!  └─ 5. Archive  certificats_<timestamp>.zip with all PDFs + the report
//! ```
//!
//! Stage failures are recoverable by design: a document that cannot be
//! rasterised or re-read is skipped with an error record, a page whose OCR
//! fails gets an `Error_<n>` placeholder serial, and a certificate whose
//! write fails is logged and skipped. The batch always completes and always
//! produces an archive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certsplit::{run_batch, BatchConfig};
//! use std::path::PathBuf;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::default();
//!     let inputs = vec![PathBuf::from("batch_2024_03.pdf")];
//!     let output = run_batch(&inputs, &config)?;
//!     println!(
//!         "{} certificates → {}",
//!         output.stats.certificates_written,
//!         output.archive_path.display()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `certsplit` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! certsplit = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod tracker;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder};
pub use error::{CertSplitError, StageError};
pub use output::{
    BatchOutput, BatchStats, CertificateRecord, DocumentOutcome, DocumentReport,
};
pub use pipeline::ocr::{OcrEngine, OcrError, TesseractOcr};
pub use process::{inspect, run_batch, DocumentInfo};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tracker::{Occurrence, SerialTracker};
