//! Serial-number extraction from certificate front pages.
//!
//! Certificates are two pages long, so the front pages are the even-indexed
//! images (0, 2, 4, …). Each front page is OCR'd and the recognised text is
//! searched for the first case-insensitive `Serial number: X` label.
//!
//! ## Fallback-naming contract
//!
//! Unmatched certificates must stay traceable rather than be silently
//! dropped, so the placeholders are part of the output contract:
//!
//! * no label found   → `Unknown_<n>`
//! * OCR itself fails → `Error_<n>` plus an error record
//!
//! where `n` is the certificate's 1-based position within its document.
//! A single page's OCR failure never aborts the rest of the document.

use crate::error::StageError;
use crate::pipeline::ocr::OcrEngine;
use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Matches the literal "Serial number" label, optional punctuation or
/// whitespace, then an alphanumeric/hyphen token captured as the serial.
static SERIAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)serial number[:\s]+([\w-]+)").unwrap());

/// Search recognised text for the first serial-number label.
pub fn find_serial(text: &str) -> Option<String> {
    SERIAL_PATTERN
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Placeholder serial for a certificate whose front page carried no label.
pub fn unknown_serial(position: usize) -> String {
    format!("Unknown_{}", position)
}

/// Placeholder serial for a certificate whose front page failed OCR.
pub fn error_serial(position: usize) -> String {
    format!("Error_{}", position)
}

/// OCR every front page and return one serial per certificate, in order.
///
/// `errors` receives one [`StageError::Ocr`] per failed page; extraction
/// continues with the remaining pages regardless.
pub fn extract_serials(
    images: &[DynamicImage],
    document: &str,
    engine: &dyn OcrEngine,
    errors: &mut Vec<StageError>,
) -> Vec<String> {
    let mut serials = Vec::with_capacity(images.len().div_ceil(2));

    for (index, image) in images.iter().enumerate().step_by(2) {
        let position = index / 2 + 1;
        match engine.recognize(image) {
            Ok(text) => {
                let serial = find_serial(&text).unwrap_or_else(|| {
                    debug!(
                        "No serial label on page {} of '{}', using placeholder",
                        index + 1,
                        document
                    );
                    unknown_serial(position)
                });
                serials.push(serial);
            }
            Err(e) => {
                warn!("OCR failed on page {} of '{}': {}", index + 1, document, e);
                errors.push(StageError::Ocr {
                    document: document.to_string(),
                    page: index + 1,
                    detail: e.to_string(),
                });
                serials.push(error_serial(position));
            }
        }
    }

    serials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ocr::OcrError;
    use std::sync::Mutex;

    /// Scripted engine: returns each canned response once, in order.
    struct ScriptedOcr {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedOcr {
        fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .rev()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    impl OcrEngine for ScriptedOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .expect("more OCR calls than scripted responses")
                .map_err(OcrError::Image)
        }
    }

    fn blank_pages(n: usize) -> Vec<DynamicImage> {
        (0..n).map(|_| DynamicImage::new_rgb8(4, 4)).collect()
    }

    #[test]
    fn finds_serial_case_insensitively() {
        assert_eq!(
            find_serial("SERIAL NUMBER: AB-123\nrest of page"),
            Some("AB-123".to_string())
        );
        assert_eq!(
            find_serial("Serial number  XYZ99"),
            Some("XYZ99".to_string())
        );
    }

    #[test]
    fn takes_first_match_only() {
        let text = "Serial number: FIRST-1\nSerial number: SECOND-2";
        assert_eq!(find_serial(text), Some("FIRST-1".to_string()));
    }

    #[test]
    fn no_label_yields_none() {
        assert_eq!(find_serial("Calibration report, no identifiers here"), None);
    }

    #[test]
    fn only_front_pages_are_recognised() {
        // 4 pages → 2 certificates → exactly 2 OCR calls.
        let engine = ScriptedOcr::new(vec![
            Ok("Serial number: AAA-1"),
            Ok("Serial number: BBB-2"),
        ]);
        let mut errors = Vec::new();
        let serials = extract_serials(&blank_pages(4), "doc", &engine, &mut errors);
        assert_eq!(serials, vec!["AAA-1", "BBB-2"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn odd_page_count_still_gets_a_front_page() {
        // 5 pages → certificates at 0-1, 2-3, 4 → 3 OCR calls.
        let engine = ScriptedOcr::new(vec![Ok("Serial number: A"), Ok("nothing"), Ok("nothing")]);
        let mut errors = Vec::new();
        let serials = extract_serials(&blank_pages(5), "doc", &engine, &mut errors);
        assert_eq!(serials, vec!["A", "Unknown_2", "Unknown_3"]);
    }

    #[test]
    fn missing_label_falls_back_to_unknown() {
        let engine = ScriptedOcr::new(vec![Ok("no serial anywhere")]);
        let mut errors = Vec::new();
        let serials = extract_serials(&blank_pages(2), "doc", &engine, &mut errors);
        assert_eq!(serials, vec!["Unknown_1"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn ocr_failure_records_error_and_continues() {
        let engine = ScriptedOcr::new(vec![
            Err("engine crashed"),
            Ok("Serial number: OK-2"),
        ]);
        let mut errors = Vec::new();
        let serials = extract_serials(&blank_pages(4), "doc", &engine, &mut errors);
        assert_eq!(serials, vec!["Error_1", "OK-2"]);
        assert_eq!(errors.len(), 1);
        let msg = errors[0].to_string();
        assert!(msg.starts_with("[OCR ERROR]"), "got: {msg}");
        assert!(msg.contains("page 1"), "got: {msg}");
    }
}
