//! Pipeline stages for certificate splitting.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the OCR backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! render ──▶ ocr/extract ──▶ split ──▶ report ──▶ archive
//! (pdfium)   (tesseract +   (lopdf)   (xlsx)     (zip)
//!             serial regex)
//! ```
//!
//! 1. [`render`]  — rasterise every page of a document via pdfium
//! 2. [`ocr`]     — the recognition seam: [`ocr::OcrEngine`] trait plus the
//!    default Tesseract subprocess backend
//! 3. [`extract`] — run OCR over front pages and regex-search the serial
//! 4. [`split`]   — independent lopdf re-read; write one 2-page PDF per
//!    certificate, deduplicating serials through the batch tracker
//! 5. [`report`]  — assemble the multi-sheet spreadsheet
//! 6. [`archive`] — zip the certificate PDFs and the report
//!
//! The rasteriser and the splitter intentionally open the source file
//! independently; the splitter's page count is authoritative for grouping,
//! and a disagreement between the two reads is logged.

pub mod archive;
pub mod extract;
pub mod ocr;
pub mod render;
pub mod report;
pub mod split;
