//! Configuration for a batch run.
//!
//! All behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs, log them, and diff two runs to understand why their
//! outputs differ.

use crate::error::CertSplitError;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one batch run.
///
/// Built via [`BatchConfig::builder()`] or [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use certsplit::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .dpi(200)
///     .filename_prefix("CAL31")
///     .ocr_language("fra")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 150.
    ///
    /// 150 DPI keeps the serial-number line sharp enough for OCR on typical
    /// A4 certificates. Increase to 200–300 for small-font layouts.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap independent of DPI so oversized pages never exhaust
    /// memory during rasterisation.
    pub max_rendered_pixels: u32,

    /// Prefix of every output filename. Default: `CAL31`.
    pub filename_prefix: String,

    /// Filename of the spreadsheet report inside the archive.
    /// Default: `rapport_certificats.xlsx`.
    pub report_file_name: String,

    /// Command used to invoke the Tesseract OCR binary. Default: `tesseract`.
    ///
    /// Ignored when a pre-built [`OcrEngine`] is set via `ocr`.
    pub tesseract_command: String,

    /// Tesseract language code passed as `-l`. Default: `eng`.
    ///
    /// Calibration certificates carry the literal English label
    /// "Serial number" regardless of the surrounding language, so `eng`
    /// is the right default even for French documents.
    pub ocr_language: String,

    /// Pre-constructed OCR engine. Takes precedence over `tesseract_command`.
    ///
    /// Mainly useful in tests, or to swap in a different recognition backend
    /// without touching the rest of the pipeline.
    pub ocr: Option<Arc<dyn OcrEngine>>,

    /// Directory the archive is written to. Default: current directory.
    pub output_dir: Option<PathBuf>,

    /// Optional per-document progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_rendered_pixels: 2000,
            filename_prefix: "CAL31".to_string(),
            report_file_name: "rapport_certificats.xlsx".to_string(),
            tesseract_command: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            ocr: None,
            output_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("filename_prefix", &self.filename_prefix)
            .field("report_file_name", &self.report_file_name)
            .field("tesseract_command", &self.tesseract_command)
            .field("ocr_language", &self.ocr_language)
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn OcrEngine>"))
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.filename_prefix = prefix.into();
        self
    }

    pub fn report_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.report_file_name = name.into();
        self
    }

    pub fn tesseract_command(mut self, command: impl Into<String>) -> Self {
        self.config.tesseract_command = command.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr = Some(engine);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, CertSplitError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(CertSplitError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.filename_prefix.is_empty() {
            return Err(CertSplitError::InvalidConfig(
                "filename_prefix must not be empty".into(),
            ));
        }
        if c.report_file_name.is_empty() {
            return Err(CertSplitError::InvalidConfig(
                "report_file_name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
