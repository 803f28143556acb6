//! Batch entry points.
//!
//! [`run_batch`] drives the whole pipeline: one pass per document, strictly
//! sequential, no retries and no backward transitions. Per-document failures
//! are recorded and skipped — the only fatal errors are the ones that stop
//! the batch from producing its archive at all (working directory, report,
//! archive).
//!
//! All intermediate artifacts live in a per-batch temporary directory that
//! is removed when the run returns; only the archive survives, in the
//! configured output directory.

use crate::config::BatchConfig;
use crate::error::{CertSplitError, StageError};
use crate::output::{BatchOutput, BatchStats, DocumentOutcome, DocumentReport};
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::{archive, extract, render, report, split};
use crate::tracker::SerialTracker;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Process a batch of PDF documents into a certificate archive.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(BatchOutput)` whenever the archive was produced, even if some or all
/// documents failed (check `output.errors` and `output.stats`).
///
/// # Errors
/// Returns `Err(CertSplitError)` only when the batch infrastructure fails:
/// the temporary working directory, the report, or the archive could not be
/// written.
pub fn run_batch(inputs: &[PathBuf], config: &BatchConfig) -> Result<BatchOutput, CertSplitError> {
    let total_start = Instant::now();
    info!("Starting batch: {} document(s)", inputs.len());

    let ocr: Arc<dyn OcrEngine> = match &config.ocr {
        Some(engine) => Arc::clone(engine),
        None => Arc::new(TesseractOcr::new(
            &config.tesseract_command,
            &config.ocr_language,
        )),
    };

    let workdir = tempfile::tempdir().map_err(|source| CertSplitError::WorkdirFailed { source })?;
    let certificates_dir = workdir.path().join("certificats");
    std::fs::create_dir_all(&certificates_dir)
        .map_err(|source| CertSplitError::WorkdirFailed { source })?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(inputs.len());
    }

    let mut tracker = SerialTracker::new();
    let mut certificates = Vec::new();
    let mut documents = Vec::new();
    let mut errors: Vec<StageError> = Vec::new();
    let mut render_ms = 0u64;
    let mut ocr_ms = 0u64;
    let mut split_ms = 0u64;

    for (index, input) in inputs.iter().enumerate() {
        let document = base_name(input);
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(&document, index, inputs.len());
        }

        // ── Step 1: Rasterise ────────────────────────────────────────────
        let render_start = Instant::now();
        let images = match check_input(input, &document).and_then(|()| {
            render::rasterize_document(input, &document, config)
        }) {
            Ok(images) => images,
            Err(e) => {
                warn!("Abandoning '{}' at load: {}", document, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(&document, &e.to_string());
                }
                errors.push(e);
                documents.push(DocumentReport {
                    source: document,
                    outcome: DocumentOutcome::AbandonedAtLoad,
                    certificates: 0,
                    duplicates: 0,
                });
                continue;
            }
        };
        render_ms += render_start.elapsed().as_millis() as u64;

        // ── Step 2: Extract serials from front pages ─────────────────────
        let ocr_start = Instant::now();
        let serials = extract::extract_serials(&images, &document, ocr.as_ref(), &mut errors);
        ocr_ms += ocr_start.elapsed().as_millis() as u64;

        // ── Step 3: Split into per-certificate files ─────────────────────
        let split_start = Instant::now();
        let outcome = match split::split_document(
            input,
            &document,
            &serials,
            &mut tracker,
            &certificates_dir,
            &config.filename_prefix,
            images.len(),
            &mut errors,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Abandoning '{}' at read: {}", document, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(&document, &e.to_string());
                }
                errors.push(e);
                documents.push(DocumentReport {
                    source: document,
                    outcome: DocumentOutcome::AbandonedAtRead,
                    certificates: 0,
                    duplicates: 0,
                });
                continue;
            }
        };
        split_ms += split_start.elapsed().as_millis() as u64;

        let duplicates = outcome
            .certificates
            .iter()
            .filter(|c| c.duplicate)
            .count();
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_complete(&document, outcome.certificates.len());
        }
        documents.push(DocumentReport {
            source: document,
            outcome: DocumentOutcome::FullyProcessed,
            certificates: outcome.certificates.len(),
            duplicates,
        });
        certificates.extend(outcome.certificates);
    }

    // ── Step 4: Report ───────────────────────────────────────────────────
    let report_path = workdir.path().join(&config.report_file_name);
    report::write_report(&report_path, &certificates, &documents, &errors)?;

    // ── Step 5: Archive ──────────────────────────────────────────────────
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)
        .map_err(|source| CertSplitError::WorkdirFailed { source })?;
    let archive_path = output_dir.join(archive::archive_file_name(chrono::Local::now()));
    archive::pack_archive(
        &certificates_dir,
        &report_path,
        &config.report_file_name,
        &archive_path,
    )?;

    let stats = BatchStats {
        documents_total: inputs.len(),
        documents_failed: documents
            .iter()
            .filter(|d| d.outcome != DocumentOutcome::FullyProcessed)
            .count(),
        certificates_written: certificates.len(),
        duplicates: certificates.iter().filter(|c| c.duplicate).count(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms: render_ms,
        ocr_duration_ms: ocr_ms,
        split_duration_ms: split_ms,
    };

    info!(
        "Batch complete: {}/{} document(s), {} certificate(s), {}ms",
        stats.documents_total - stats.documents_failed,
        stats.documents_total,
        stats.certificates_written,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(inputs.len(), stats.certificates_written);
    }

    Ok(BatchOutput {
        archive_path,
        certificates,
        documents,
        errors,
        stats,
    })
}

/// Basic facts about one input document, without OCR or any writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Source document base name.
    pub source: String,
    pub page_count: usize,
    /// Number of 2-page certificates this document would yield.
    pub certificate_count: usize,
}

/// Inspect one PDF: page count and the certificate count it would produce.
///
/// Unlike [`run_batch`], a broken file here is a hard error — there is no
/// report to record it in.
pub fn inspect(input: &Path) -> Result<DocumentInfo, CertSplitError> {
    let document = base_name(input);
    check_input(input, &document).map_err(|e| match e {
        StageError::Load { detail, .. } if detail.contains("not found") => {
            CertSplitError::FileNotFound {
                path: input.to_path_buf(),
            }
        }
        other => CertSplitError::CorruptPdf {
            path: input.to_path_buf(),
            detail: other.to_string(),
        },
    })?;

    let doc = lopdf::Document::load(input).map_err(|e| CertSplitError::CorruptPdf {
        path: input.to_path_buf(),
        detail: e.to_string(),
    })?;
    let page_count = doc.get_pages().len();
    Ok(DocumentInfo {
        source: document,
        page_count,
        certificate_count: page_count.div_ceil(2),
    })
}

/// Source document base name: file stem, lossily decoded.
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Cheap pre-flight: the file exists and starts with the PDF magic.
///
/// Catching this before pdfium keeps the load-error message precise instead
/// of surfacing a renderer-specific failure for a missing or mislabelled
/// file.
fn check_input(path: &Path, document: &str) -> Result<(), StageError> {
    let load_error = |detail: String| StageError::Load {
        document: document.to_string(),
        detail,
    };

    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            load_error(format!("file not found: {}", path.display()))
        } else {
            load_error(e.to_string())
        }
    })?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .map_err(|e| load_error(e.to_string()))?;
    if &magic != b"%PDF" {
        return Err(load_error(format!(
            "not a PDF (first bytes: {:?})",
            magic
        )));
    }
    Ok(())
}
