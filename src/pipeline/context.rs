use std::io::BufRead;
use std::ops::AddAssign;
use std::time::Duration;

/// A named stream of log lines
pub struct LineSource {
    pub name: String,
    pub reader: Box<dyn BufRead>,
}

impl LineSource {
    pub fn new(name: impl Into<String>, reader: Box<dyn BufRead>) -> Self {
        LineSource {
            name: name.into(),
            reader,
        }
    }
}

/// What happened to one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Rejected by the pre-filter pattern
    Prefiltered,
    /// Matched neither grammar
    Unrecognized,
    /// Diagnostic line added to the correlation buffer
    Buffered,
    /// Diagnostic line with an unusable timestamp
    Dropped,
    /// Completion record rejected by the filter
    Filtered,
    /// Completion record rendered to this text
    Rendered(String),
}

/// Runtime statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub lines_read: usize,
    pub lines_prefiltered: usize,
    pub lines_unrecognized: usize,
    pub lines_too_long: usize,
    pub diagnostics_buffered: usize,
    pub diagnostics_dropped: usize,
    pub completions_seen: usize,
    pub records_filtered: usize,
    pub records_output: usize,
    pub traces_correlated: usize,
    pub traces_expired: usize,
    pub traces_discarded: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    pub fn record(&mut self, outcome: &LineOutcome) {
        match outcome {
            LineOutcome::Prefiltered => self.lines_prefiltered += 1,
            LineOutcome::Unrecognized => self.lines_unrecognized += 1,
            LineOutcome::Buffered => self.diagnostics_buffered += 1,
            LineOutcome::Dropped => self.diagnostics_dropped += 1,
            LineOutcome::Filtered => {
                self.completions_seen += 1;
                self.records_filtered += 1;
            }
            LineOutcome::Rendered(_) => {
                self.completions_seen += 1;
                self.records_output += 1;
            }
        }
    }
}

impl AddAssign<&ProcessingStats> for ProcessingStats {
    fn add_assign(&mut self, other: &ProcessingStats) {
        self.lines_read += other.lines_read;
        self.lines_prefiltered += other.lines_prefiltered;
        self.lines_unrecognized += other.lines_unrecognized;
        self.lines_too_long += other.lines_too_long;
        self.diagnostics_buffered += other.diagnostics_buffered;
        self.diagnostics_dropped += other.diagnostics_dropped;
        self.completions_seen += other.completions_seen;
        self.records_filtered += other.records_filtered;
        self.records_output += other.records_output;
        self.traces_correlated += other.traces_correlated;
        self.traces_expired += other.traces_expired;
        self.traces_discarded += other.traces_discarded;
        self.processing_time += other.processing_time;
    }
}
