//! Archive packaging: one zip with every certificate PDF plus the report.
//!
//! Entries are added in sorted name order so two runs over identical inputs
//! produce archives that differ only in their timestamped filename.

use crate::error::CertSplitError;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Archive filename for a batch started at `now`, e.g.
/// `certificats_2024-03-18_14-02.zip`.
pub fn archive_file_name(now: DateTime<Local>) -> String {
    format!("certificats_{}.zip", now.format("%Y-%m-%d_%H-%M"))
}

/// Pack every file in `certificates_dir` plus the report into `dest`.
///
/// Certificate PDFs land at the archive root under their own names; the
/// report is stored as `report_name`.
pub fn pack_archive(
    certificates_dir: &Path,
    report_path: &Path,
    report_name: &str,
    dest: &Path,
) -> Result<(), CertSplitError> {
    let archive_error = |detail: String| CertSplitError::ArchiveWriteFailed {
        path: dest.to_path_buf(),
        detail,
    };

    let file = File::create(dest).map_err(|e| archive_error(e.to_string()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut entries: Vec<_> = std::fs::read_dir(certificates_dir)
        .map_err(|e| archive_error(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let mut count = 0usize;
    for path in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| archive_error(format!("unnameable entry: {}", path.display())))?;
        zip.start_file(name, options)
            .map_err(|e| archive_error(e.to_string()))?;
        let mut reader = File::open(&path).map_err(|e| archive_error(e.to_string()))?;
        io::copy(&mut reader, &mut zip).map_err(|e| archive_error(e.to_string()))?;
        count += 1;
    }

    zip.start_file(report_name, options)
        .map_err(|e| archive_error(e.to_string()))?;
    let mut reader = File::open(report_path).map_err(|e| archive_error(e.to_string()))?;
    io::copy(&mut reader, &mut zip).map_err(|e| archive_error(e.to_string()))?;

    zip.finish().map_err(|e| archive_error(e.to_string()))?;
    info!(
        "Archive written: {} ({} certificate file(s) + report)",
        dest.display(),
        count
    );
    Ok(())
}
