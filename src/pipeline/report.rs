//! Spreadsheet report assembly.
//!
//! One workbook, up to three sheets:
//!
//! * `Certificats` — one row per written certificate file (always present,
//!   headers only when nothing was produced)
//! * `Résumé` — per-source totals; only present when at least one
//!   certificate row exists
//! * `Erreurs` — one row per recorded stage error; only present when errors
//!   occurred
//!
//! Column titles are the French labels the downstream archive consumers
//! expect; they are part of the output contract, not a styling choice.

use crate::error::{CertSplitError, StageError};
use crate::output::{CertificateRecord, DocumentReport};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use tracing::info;

/// Write the spreadsheet report to `path`.
pub fn write_report(
    path: &Path,
    certificates: &[CertificateRecord],
    documents: &[DocumentReport],
    errors: &[StageError],
) -> Result<(), CertSplitError> {
    let report_error = |e: XlsxError| CertSplitError::ReportWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut workbook = build_workbook(certificates, documents, errors).map_err(report_error)?;
    workbook.save(path).map_err(report_error)?;

    info!(
        "Report written: {} certificate row(s), {} error row(s)",
        certificates.len(),
        errors.len()
    );
    Ok(())
}

fn build_workbook(
    certificates: &[CertificateRecord],
    documents: &[DocumentReport],
    errors: &[StageError],
) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    // ── Certificats ──────────────────────────────────────────────────────
    let sheet = workbook.add_worksheet();
    sheet.set_name("Certificats")?;
    let titles = ["Fichier", "PDF source", "Numéro de série", "Pages", "Doublon"];
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (i, cert) in certificates.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &cert.file_name)?;
        sheet.write_string(row, 1, &cert.source)?;
        sheet.write_string(row, 2, &cert.serial)?;
        sheet.write_string(row, 3, cert.page_range())?;
        sheet.write_string(row, 4, cert.duplicate_label())?;
    }

    // ── Résumé (only when any certificate rows exist) ────────────────────
    if !certificates.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Résumé")?;
        sheet.write_string_with_format(0, 0, "PDF source", &header)?;
        sheet.write_string_with_format(0, 1, "Total", &header)?;
        sheet.write_string_with_format(0, 2, "Doublons", &header)?;
        let mut row = 1u32;
        for doc in documents.iter().filter(|d| d.certificates > 0) {
            sheet.write_string(row, 0, &doc.source)?;
            sheet.write_number(row, 1, doc.certificates as f64)?;
            sheet.write_number(row, 2, doc.duplicates as f64)?;
            row += 1;
        }
    }

    // ── Erreurs (only when errors occurred) ──────────────────────────────
    if !errors.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Erreurs")?;
        sheet.write_string_with_format(0, 0, "Erreurs", &header)?;
        for (i, error) in errors.iter().enumerate() {
            sheet.write_string(i as u32 + 1, 0, error.to_string())?;
        }
    }

    Ok(workbook)
}
