//! Extraction state tracking.

/// Per-run extraction counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionState {
    /// Posts pulled from the cursor.
    pub seen: u64,
    /// Posts excluded by the filter.
    pub filtered: u64,
    /// Posts extracted into a record.
    pub exported: u64,
    /// Posts given up on after retries or a non-transient error.
    pub skipped: u64,
    /// Extra attempts spent on transient failures.
    pub retries: u64,
    /// Video posts exported without a video URL.
    pub missing_video_urls: u64,
}

impl ExtractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_seen(&mut self) {
        self.seen += 1;
    }

    pub fn mark_filtered(&mut self) {
        self.filtered += 1;
    }

    pub fn mark_exported(&mut self) {
        self.exported += 1;
    }

    pub fn mark_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn mark_retry(&mut self) {
        self.retries += 1;
    }

    pub fn mark_missing_video_url(&mut self) {
        self.missing_video_urls += 1;
    }

    /// Posts that went through extraction (exported or skipped).
    pub fn processed(&self) -> u64 {
        self.exported + self.skipped
    }
}
