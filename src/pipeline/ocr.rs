//! The OCR seam: a small trait plus the default Tesseract backend.
//!
//! Recognition quality is not this crate's business; turning a page image
//! into text is. Putting that behind [`OcrEngine`] keeps the serial
//! extraction logic testable without any OCR installation and lets callers
//! swap in a different backend through
//! [`crate::config::BatchConfigBuilder::ocr`].
//!
//! The default backend shells out to the `tesseract` binary on a temporary
//! PNG, which is how the surrounding tooling ecosystem already invokes it
//! and avoids linking a C++ OCR stack into the crate.

use image::DynamicImage;
use std::process::Command;
use thiserror::Error;

/// Errors produced by an OCR backend.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The page image could not be written to a temporary file.
    #[error("failed to stage page image for OCR: {0}")]
    Image(String),

    /// The OCR process could not be started at all (binary missing, not executable).
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The OCR process ran but exited with a failure status.
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Turns one page image into recognised text.
///
/// Implementations must be `Send + Sync` so one engine can be shared across
/// the batch.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Default backend: the `tesseract` command-line binary.
///
/// Each call writes the page to a temporary PNG and runs
/// `tesseract <png> stdout -l <lang>`. The temp file is removed when the
/// handle drops, whatever tesseract did.
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let staged = tempfile::Builder::new()
            .prefix("certsplit-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Image(e.to_string()))?;

        image
            .save_with_format(staged.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::Image(e.to_string()))?;

        let output = Command::new(&self.command)
            .arg(staged.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|source| OcrError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
