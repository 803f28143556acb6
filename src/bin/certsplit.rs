//! CLI binary for certsplit.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.

use anyhow::{Context, Result};
use certsplit::{inspect, run_batch, BatchConfig, BatchProgressCallback, ProgressCallback};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the document list, with a log
/// line per completed or failed document.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Count of documents that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_documents as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Splitting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_documents} document(s)…"))
        ));
    }

    fn on_document_start(&self, document: &str, _index: usize, _total: usize) {
        self.bar.set_message(document.to_string());
    }

    fn on_document_complete(&self, document: &str, certificates: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            document,
            dim(&format!("{certificates} certificate(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, document: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = truncate_message(error, 80);

        self.bar
            .println(format!("  {} {}  {}", red("✗"), document, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, certificates_written: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} certificate(s) from {} document(s)",
                green("✔"),
                bold(&certificates_written.to_string()),
                total_documents,
            );
        } else {
            eprintln!(
                "{} {} certificate(s) from {} document(s)  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&certificates_written.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
///
/// Counts characters, not bytes: error messages embed document names, which
/// may carry accented characters that a byte-offset slice would split.
fn truncate_message(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}\u{2026}")
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split one batch PDF into certificates, archive in the current directory
  certsplit batch_2024_03.pdf

  # Several batches at once, shared serial deduplication across all of them
  certsplit january.pdf february.pdf march.pdf -o ./archives

  # Higher DPI for small-font certificates, French OCR model
  certsplit --dpi 300 --lang fra batch.pdf

  # Custom filename prefix (default: CAL31)
  certsplit --prefix LAB07 batch.pdf

  # Page counts only, no OCR and no writing
  certsplit --inspect-only batch.pdf

  # Machine-readable result on stdout
  certsplit --json batch.pdf > result.json

OUTPUT:
  One zip archive per run, certificats_<YYYY-MM-DD_HH-MM>.zip, containing:
    <prefix> - <source> - <serial>.pdf     one per certificate
    rapport_certificats.xlsx               Certificats / Résumé / Erreurs

  Certificates whose front page carries no readable "Serial number" label
  are named Unknown_<n>; pages whose OCR fails entirely become Error_<n>.
  A repeated serial gets a counter suffix (ABC-1, ABC-1_2, …).

REQUIREMENTS:
  tesseract must be on PATH (or passed via --tesseract-cmd), with the
  language model selected by --lang installed.

ENVIRONMENT VARIABLES:
  CERTSPLIT_OUTPUT_DIR    Archive output directory
  CERTSPLIT_DPI           Rendering DPI (72-400)
  CERTSPLIT_PREFIX        Output filename prefix
  CERTSPLIT_TESSERACT     Tesseract command
  CERTSPLIT_LANG          Tesseract language code
  PDFIUM_LIB_PATH         Path to an existing libpdfium
"#;

/// Split calibration-certificate batch PDFs into per-serial files.
#[derive(Parser, Debug)]
#[command(
    name = "certsplit",
    version,
    about = "Split calibration-certificate batch PDFs into per-serial files",
    long_about = "Split multi-certificate PDF batches into one two-page PDF per certificate, \
named by the serial number read from each certificate's front page via OCR. Produces a zip \
archive containing every certificate plus a spreadsheet report.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input batch PDF file(s), processed in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the archive is written to (default: current directory).
    #[arg(short, long, env = "CERTSPLIT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Rendering DPI (72-400).
    #[arg(long, env = "CERTSPLIT_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Output filename prefix.
    #[arg(long, env = "CERTSPLIT_PREFIX", default_value = "CAL31")]
    prefix: String,

    /// Tesseract command or path.
    #[arg(long = "tesseract-cmd", env = "CERTSPLIT_TESSERACT", default_value = "tesseract")]
    tesseract_cmd: String,

    /// Tesseract language code (e.g. eng, fra).
    #[arg(long, env = "CERTSPLIT_LANG", default_value = "eng")]
    lang: String,

    /// Output structured JSON (BatchOutput) instead of a summary.
    #[arg(long, env = "CERTSPLIT_JSON")]
    json: bool,

    /// Print page counts only, no OCR and no writing.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "CERTSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CERTSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CERTSPLIT_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let mut infos = Vec::with_capacity(cli.inputs.len());
        for input in &cli.inputs {
            let info = inspect(input)
                .with_context(|| format!("Failed to inspect {}", input.display()))?;
            infos.push(info);
        }

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&infos).context("Failed to serialise metadata")?
            );
        } else {
            for info in &infos {
                println!("File:          {}", info.source);
                println!("Pages:         {}", info.page_count);
                println!("Certificates:  {}", info.certificate_count);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let mut builder = BatchConfig::builder()
        .dpi(cli.dpi)
        .filename_prefix(&cli.prefix)
        .tesseract_command(&cli.tesseract_cmd)
        .ocr_language(&cli.lang);

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run batch ────────────────────────────────────────────────────────
    let output = run_batch(&cli.inputs, &config).context("Batch failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        // Summary (the callback already printed the final green/red tick).
        if !show_progress {
            eprintln!(
                "{} certificate(s) from {}/{} document(s) in {}ms",
                output.stats.certificates_written,
                output.stats.documents_total - output.stats.documents_failed,
                output.stats.documents_total,
                output.stats.total_duration_ms,
            );
        }
        if output.stats.duplicates > 0 {
            eprintln!(
                "   {} duplicate serial(s) renamed with a counter suffix",
                dim(&output.stats.duplicates.to_string())
            );
        }
        if !output.errors.is_empty() {
            eprintln!("   {} error(s) recorded in the report", output.errors.len());
        }
        eprintln!("   →  {}", bold(&output.archive_path.display().to_string()));
    }

    // Failures are recorded in the report, but a batch where nothing at all
    // succeeded should still exit non-zero.
    if output.stats.documents_failed == output.stats.documents_total
        && output.stats.documents_total > 0
    {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_passes_through() {
        assert_eq!(truncate_message("disk full", 80), "disk full");
    }

    #[test]
    fn boundary_length_is_not_truncated() {
        let msg = "x".repeat(80);
        assert_eq!(truncate_message(&msg, 80), msg);
    }

    #[test]
    fn long_message_is_cut_with_ellipsis() {
        let msg = "e".repeat(120);
        let out = truncate_message(&msg, 80);
        assert_eq!(out.chars().count(), 80);
        assert!(out.ends_with('\u{2026}'));
    }

    #[test]
    fn accented_document_name_truncates_on_char_boundary() {
        // Load errors embed the document name; French filenames put
        // multibyte characters right where a byte-offset cut would land.
        let msg = format!("[LOAD ERROR] a{}: file not found", "é".repeat(100));
        let out = truncate_message(&msg, 80);
        assert_eq!(out.chars().count(), 80);
        assert!(out.ends_with('\u{2026}'));
    }
}
