//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the pipeline works through the batch. The callback approach is the
//! least-invasive integration point: callers can forward events to a terminal
//! progress bar, a GUI, or a log sink without the library knowing how the
//! host application communicates.
//!
//! Documents are processed strictly sequentially, so implementations never
//! see interleaved events; the trait is still `Send + Sync` so a single
//! callback can be shared with other threads of the host application.

use std::sync::Arc;

/// Called by the batch pipeline as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first document is processed.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document enters the pipeline.
    ///
    /// # Arguments
    /// * `document` — source document base name
    /// * `index`    — 0-based position in the batch
    fn on_document_start(&self, document: &str, index: usize, total_documents: usize) {
        let _ = (document, index, total_documents);
    }

    /// Called when a document has been fully processed.
    ///
    /// # Arguments
    /// * `certificates` — certificate files written from this document
    fn on_document_complete(&self, document: &str, certificates: usize) {
        let _ = (document, certificates);
    }

    /// Called when a document is abandoned (load or read failure).
    fn on_document_error(&self, document: &str, error: &str) {
        let _ = (document, error);
    }

    /// Called once after the archive has been written.
    fn on_batch_complete(&self, total_documents: usize, certificates_written: usize) {
        let _ = (total_documents, certificates_written);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
