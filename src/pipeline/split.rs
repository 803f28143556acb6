//! Page splitting: re-group a document into two-page certificate PDFs.
//!
//! The splitter re-opens the source file with lopdf instead of reusing the
//! rasterised images — page objects, not pixels, end up in the output files.
//! Its page count is authoritative for grouping and reported page ranges;
//! when it disagrees with the rasteriser's count (corrupt trailing pages,
//! renderer quirks) the mismatch is logged and missing serials fall back to
//! `Unknown_<n>` so every group still produces a traceable file.
//!
//! Each group becomes a new document by cloning the source and deleting
//! every page outside the group, then pruning orphaned objects. Slower than
//! surgically copying objects, but it preserves shared resources (fonts,
//! images) without walking the dependency graph by hand.

use crate::error::StageError;
use crate::output::CertificateRecord;
use crate::pipeline::extract::unknown_serial;
use crate::tracker::SerialTracker;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, info, warn};

/// What the splitter produced for one document.
#[derive(Debug)]
pub struct SplitOutcome {
    /// One record per successfully written certificate file, in page order.
    pub certificates: Vec<CertificateRecord>,
    /// Page count seen by the splitter's own read of the document.
    pub page_count: usize,
}

/// Split one document into two-page certificate PDFs under `output_dir`.
///
/// `serials` is the extractor output, one entry per certificate;
/// `rendered_pages` is the rasteriser's page count, used only to detect a
/// count mismatch between the two independent reads. The batch-wide
/// `tracker` decides duplicate flags and filename suffixes.
///
/// # Errors
/// Returns [`StageError::Read`] when the document cannot be re-opened at
/// all; the caller abandons the document. Per-group write failures are
/// pushed to `errors` and do not interrupt the remaining groups.
#[allow(clippy::too_many_arguments)]
pub fn split_document(
    pdf_path: &Path,
    document: &str,
    serials: &[String],
    tracker: &mut SerialTracker,
    output_dir: &Path,
    prefix: &str,
    rendered_pages: usize,
    errors: &mut Vec<StageError>,
) -> Result<SplitOutcome, StageError> {
    let source = Document::load(pdf_path).map_err(|e| StageError::Read {
        document: document.to_string(),
        detail: e.to_string(),
    })?;

    let page_count = source.get_pages().len();
    if page_count != rendered_pages {
        warn!(
            "Page-count mismatch for '{}': rasteriser saw {}, splitter sees {}",
            document, rendered_pages, page_count
        );
    }

    let mut certificates = Vec::with_capacity(page_count.div_ceil(2));

    for first in (0..page_count).step_by(2) {
        let last = (first + 2).min(page_count); // exclusive
        let position = first / 2 + 1;
        let serial = serials
            .get(first / 2)
            .cloned()
            .unwrap_or_else(|| unknown_serial(position));

        let occurrence = tracker.assign(&serial);
        let file_name = output_file_name(
            prefix,
            document,
            &occurrence.file_serial(&serial),
        );
        let output_path = output_dir.join(&file_name);

        match write_page_group(&source, first as u32 + 1, last as u32, &output_path) {
            Ok(()) => {
                debug!("Wrote '{}' (pages {}-{})", file_name, first + 1, last);
                certificates.push(CertificateRecord {
                    file_name,
                    source: document.to_string(),
                    serial,
                    page_start: first + 1,
                    page_end: last,
                    duplicate: occurrence.duplicate,
                });
            }
            Err(e) => {
                warn!(
                    "Failed to write pages {}-{} of '{}': {}",
                    first + 1,
                    last,
                    document,
                    e
                );
                errors.push(StageError::Write {
                    document: document.to_string(),
                    first: first + 1,
                    last,
                    detail: e.to_string(),
                });
            }
        }
    }

    info!(
        "Split '{}' into {} certificate file(s)",
        document,
        certificates.len()
    );

    Ok(SplitOutcome {
        certificates,
        page_count,
    })
}

/// Output filename for one certificate.
pub fn output_file_name(prefix: &str, source: &str, file_serial: &str) -> String {
    format!("{} - {} - {}.pdf", prefix, source, file_serial)
}

/// Write pages `first..=last` (1-based, inclusive) of `source` as a new PDF.
fn write_page_group(
    source: &Document,
    first: u32,
    last: u32,
    output_path: &Path,
) -> Result<(), lopdf::Error> {
    let mut group = source.clone();
    let page_count = group.get_pages().len() as u32;

    // Delete in reverse so earlier deletions don't shift later page numbers.
    let unwanted: Vec<u32> = (1..=page_count)
        .rev()
        .filter(|p| *p < first || *p > last)
        .collect();
    for page in unwanted {
        group.delete_pages(&[page]);
    }

    group.prune_objects();
    group.compress();
    group.save(output_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{content::Content, content::Operation, Dictionary, Object, Stream};
    use std::path::PathBuf;

    // Minimal N-page PDF, one text line per page.
    fn create_test_pdf(dir: &Path, name: &str, num_pages: u32) -> PathBuf {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                    ),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {}", i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    fn serials(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_four_pages_into_two_certificates() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = create_test_pdf(dir.path(), "doc.pdf", 4);

        let mut tracker = SerialTracker::new();
        let mut errors = Vec::new();
        let outcome = split_document(
            &pdf,
            "doc",
            &serials(&["AAA-1", "BBB-2"]),
            &mut tracker,
            dir.path(),
            "CAL31",
            4,
            &mut errors,
        )
        .unwrap();

        assert_eq!(outcome.page_count, 4);
        assert!(errors.is_empty());
        let names: Vec<&str> = outcome
            .certificates
            .iter()
            .map(|c| c.file_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["CAL31 - doc - AAA-1.pdf", "CAL31 - doc - BBB-2.pdf"]
        );
        assert_eq!(outcome.certificates[0].page_range(), "1-2");
        assert_eq!(outcome.certificates[1].page_range(), "3-4");

        for cert in &outcome.certificates {
            let written = Document::load(dir.path().join(&cert.file_name)).unwrap();
            assert_eq!(written.get_pages().len(), 2);
        }
    }

    #[test]
    fn duplicate_serial_gets_counter_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = create_test_pdf(dir.path(), "doc.pdf", 4);

        let mut tracker = SerialTracker::new();
        let mut errors = Vec::new();
        let outcome = split_document(
            &pdf,
            "doc",
            &serials(&["ABC-1", "ABC-1"]),
            &mut tracker,
            dir.path(),
            "CAL31",
            4,
            &mut errors,
        )
        .unwrap();

        let names: Vec<&str> = outcome
            .certificates
            .iter()
            .map(|c| c.file_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["CAL31 - doc - ABC-1.pdf", "CAL31 - doc - ABC-1_2.pdf"]
        );
        assert!(!outcome.certificates[0].duplicate);
        assert!(outcome.certificates[1].duplicate);
        // The record keeps the raw serial; only the filename carries the suffix.
        assert_eq!(outcome.certificates[1].serial, "ABC-1");
    }

    #[test]
    fn odd_page_count_yields_trailing_single_page_file() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = create_test_pdf(dir.path(), "doc.pdf", 5);

        let mut tracker = SerialTracker::new();
        let mut errors = Vec::new();
        let outcome = split_document(
            &pdf,
            "doc",
            &serials(&["A", "B", "C"]),
            &mut tracker,
            dir.path(),
            "CAL31",
            5,
            &mut errors,
        )
        .unwrap();

        assert_eq!(outcome.certificates.len(), 3);
        let last = outcome.certificates.last().unwrap();
        assert_eq!(last.page_range(), "5-5");
        let written = Document::load(dir.path().join(&last.file_name)).unwrap();
        assert_eq!(written.get_pages().len(), 1);
    }

    #[test]
    fn short_serial_list_falls_back_to_unknown() {
        // Splitter sees 4 pages but the extractor only produced 1 serial.
        let dir = tempfile::tempdir().unwrap();
        let pdf = create_test_pdf(dir.path(), "doc.pdf", 4);

        let mut tracker = SerialTracker::new();
        let mut errors = Vec::new();
        let outcome = split_document(
            &pdf,
            "doc",
            &serials(&["ONLY-1"]),
            &mut tracker,
            dir.path(),
            "CAL31",
            2,
            &mut errors,
        )
        .unwrap();

        assert_eq!(outcome.certificates[1].serial, "Unknown_2");
        assert!(outcome.certificates[1].file_name.contains("Unknown_2"));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"not a pdf at all").unwrap();

        let mut tracker = SerialTracker::new();
        let mut errors = Vec::new();
        let result = split_document(
            &bogus,
            "bogus",
            &[],
            &mut tracker,
            dir.path(),
            "CAL31",
            0,
            &mut errors,
        );
        match result {
            Err(StageError::Read { document, .. }) => assert_eq!(document, "bogus"),
            other => panic!("expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn pages_one_indexed_in_output_name_free_of_path_separators() {
        let name = output_file_name("CAL31", "batch_a", "XYZ-9_2");
        assert_eq!(name, "CAL31 - batch_a - XYZ-9_2.pdf");
        assert!(!name.contains('/'));
    }
}
