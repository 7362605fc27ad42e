//! Process-wide token accounting.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::llm::UsageTriple;

/// Running totals of the usage triples reported by the completion API.
///
/// Counters only grow, except through [`UsageTracker::reset`]. Increments
/// are atomic so concurrently handled conversations never lose updates.
#[derive(Debug, Default)]
pub struct UsageTracker {
    total_tokens: AtomicU64,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one usage report to the running totals.
    pub fn record(&self, usage: &UsageTriple) {
        self.total_tokens.fetch_add(usage.total_tokens, Ordering::Relaxed);
        self.prompt_tokens.fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.completion_tokens
            .fetch_add(usage.completion_tokens, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageTriple {
        UsageTriple {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.total_tokens.store(0, Ordering::Relaxed);
        self.prompt_tokens.store(0, Ordering::Relaxed);
        self.completion_tokens.store(0, Ordering::Relaxed);
    }
}
