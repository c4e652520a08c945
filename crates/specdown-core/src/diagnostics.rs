//! Deduplicated diagnostics
//!
//! Sample synthesis failures tend to repeat across every operation in a
//! document that shares the offending schema. The reporter is explicit
//! state owned by the document driver and passed into the sampling entry
//! point, with a process lifetime decided by the caller.

use std::collections::HashSet;

/// Emits each distinct warning message once, counting suppressed repeats.
#[derive(Debug, Default)]
pub struct DedupReporter {
    seen: HashSet<String>,
    suppressed: usize,
}

impl DedupReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn through `tracing` unless this exact message was already seen.
    /// Returns whether the message was emitted.
    pub fn warn_once(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.seen.insert(message.clone()) {
            tracing::warn!("{message}");
            true
        } else {
            self.suppressed += 1;
            false
        }
    }

    /// Number of distinct messages emitted so far
    pub fn distinct(&self) -> usize {
        self.seen.len()
    }

    /// Number of repeat messages swallowed
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }
}
