//! Batch-wide serial-number occurrence tracking.
//!
//! Duplicate detection is deliberately scoped to the whole batch, not to one
//! document: two documents both containing certificate `ABC-1` must not
//! produce two files with the same serial in their name. The tracker is an
//! explicit value created once per batch run and passed `&mut` into the
//! splitting stage, so there is no hidden cross-call state and two batch runs
//! can never contaminate each other.

use std::collections::HashMap;

/// Occurrence counts per serial number, scoped to one batch run.
///
/// Counts are monotonically increasing per serial and are never reset between
/// documents.
#[derive(Debug, Default)]
pub struct SerialTracker {
    counts: HashMap<String, u32>,
}

/// Result of assigning one serial: its post-increment occurrence count and
/// whether that makes the certificate a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// Post-increment count for this serial (1 for the first occurrence).
    pub count: u32,
    /// True when an earlier certificate in the batch already used this serial.
    pub duplicate: bool,
}

impl Occurrence {
    /// The serial as used in the output filename: the raw serial for the
    /// first occurrence, `<serial>_<count>` for duplicates.
    pub fn file_serial(&self, serial: &str) -> String {
        if self.duplicate {
            format!("{}_{}", serial, self.count)
        } else {
            serial.to_string()
        }
    }
}

impl SerialTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more occurrence of `serial` and return its status.
    pub fn assign(&mut self, serial: &str) -> Occurrence {
        let count = self.counts.entry(serial.to_string()).or_insert(0);
        *count += 1;
        Occurrence {
            count: *count,
            duplicate: *count > 1,
        }
    }

    /// Occurrences recorded so far for `serial` (0 if never seen).
    pub fn count(&self, serial: &str) -> u32 {
        self.counts.get(serial).copied().unwrap_or(0)
    }
}
