// src/pipeline/stream.rs
use regex::Regex;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, warn};

use crate::correlation::CorrelationBuffer;
use crate::error::ProcessingError;
use crate::extract::{LineExtractor, SourceTracker};
use crate::filter::RecordFilter;
use crate::output_format::OutputFormatter;
use crate::pipeline::config::{ErrorStrategy, PipelineConfig};
use crate::pipeline::context::{LineOutcome, LineSource, ProcessingStats};
use crate::record::{LogRecord, SourceIdentity};
use crate::tally::TallyTable;

/// Drives line sources through extraction, correlation, filtering and
/// rendering, one line at a time.
pub struct LogPipeline {
    config: PipelineConfig,
    extractor: LineExtractor,
    correlation: CorrelationBuffer,
    prefilter: Option<Regex>,
    filter: RecordFilter,
    formatter: OutputFormatter,
    tally: Option<TallyTable>,
    stats: ProcessingStats,
}

impl LogPipeline {
    pub fn new(
        config: PipelineConfig,
        prefilter: Option<Regex>,
        filter: RecordFilter,
        formatter: OutputFormatter,
        tally: bool,
    ) -> Self {
        LogPipeline {
            config,
            extractor: LineExtractor::new(),
            correlation: CorrelationBuffer::new(),
            prefilter,
            filter,
            formatter,
            tally: tally.then(TallyTable::new),
            stats: ProcessingStats::default(),
        }
    }

    /// Process every source in order, then print the tally if enabled
    pub fn run<W: Write>(
        &mut self,
        sources: Vec<LineSource>,
        output: &mut W,
    ) -> Result<ProcessingStats, ProcessingError> {
        for source in sources {
            self.process_stream(source.reader, output, &source.name)?;
        }
        self.finish(output)
    }

    /// Process a single file/stream. The correlation buffer carries over
    /// between streams.
    pub fn process_stream<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        output: &mut W,
        name: &str,
    ) -> Result<ProcessingStats, ProcessingError> {
        let start_time = Instant::now();
        let mut file_stats = ProcessingStats::default();
        let mut sources = SourceTracker::new(name);
        let expired_before = self.correlation.expired_count();
        let mut buf = Vec::with_capacity(512);

        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(ProcessingError::IoError(e)),
            }
            file_stats.lines_read += 1;

            let bytes = trim_line_ending(&buf);
            if bytes.len() > self.config.max_line_length {
                let error = ProcessingError::LineTooLong {
                    length: bytes.len(),
                    max_length: self.config.max_line_length,
                };
                match self.config.error_strategy {
                    ErrorStrategy::FailFast => return Err(error),
                    ErrorStrategy::Skip => {
                        file_stats.lines_too_long += 1;
                        warn!("{}: line {}: {}, skipping", name, file_stats.lines_read, error);
                        continue;
                    }
                }
            }

            let raw = String::from_utf8_lossy(bytes);
            let line = sources.resolve(&raw);
            let outcome = self.route(&raw, line, sources.current(), &mut file_stats);
            if let LineOutcome::Rendered(text) = outcome {
                self.emit(text, output)?;
            }
        }

        file_stats.traces_expired = self.correlation.expired_count() - expired_before;
        file_stats.processing_time = start_time.elapsed();
        debug!(
            "{}: {} lines, {} completions, {} output, {} unrecognized, {} correlated, {} pending",
            name,
            file_stats.lines_read,
            file_stats.completions_seen,
            file_stats.records_output,
            file_stats.lines_unrecognized,
            file_stats.traces_correlated,
            self.correlation.len()
        );

        self.stats += &file_stats;
        Ok(file_stats)
    }

    /// Route one already-decoded line from `source`. Rendered text is returned,
    /// not written or tallied.
    pub fn process_line(&mut self, line: &str, source: &SourceIdentity) -> LineOutcome {
        let mut line_stats = ProcessingStats {
            lines_read: 1,
            ..ProcessingStats::default()
        };
        let expired_before = self.correlation.expired_count();
        let outcome = self.route(line, line, source, &mut line_stats);
        line_stats.traces_expired = self.correlation.expired_count() - expired_before;
        self.stats += &line_stats;
        outcome
    }

    fn route(
        &mut self,
        raw: &str,
        line: &str,
        source: &SourceIdentity,
        stats: &mut ProcessingStats,
    ) -> LineOutcome {
        let outcome = self.classify(raw, line, source, stats);
        stats.record(&outcome);
        outcome
    }

    fn classify(
        &mut self,
        raw: &str,
        line: &str,
        source: &SourceIdentity,
        stats: &mut ProcessingStats,
    ) -> LineOutcome {
        if let Some(prefilter) = &self.prefilter {
            if !prefilter.is_match(raw) {
                return LineOutcome::Prefiltered;
            }
        }

        match self.extractor.extract(line, source) {
            None => LineOutcome::Unrecognized,
            Some(LogRecord::Diagnostic(record)) => {
                if self.correlation.store(&record) {
                    LineOutcome::Buffered
                } else {
                    LineOutcome::Dropped
                }
            }
            Some(LogRecord::Completion(record)) => {
                let extra_lines = self.correlation.retrieve(&record.common.request_id);
                if !extra_lines.is_empty() {
                    stats.traces_correlated += 1;
                }
                let record = record.with_extra_lines(extra_lines);
                if self.filter.accepts(&record) {
                    LineOutcome::Rendered(self.formatter.render(&record))
                } else {
                    LineOutcome::Filtered
                }
            }
        }
    }

    fn emit<W: Write>(&mut self, text: String, output: &mut W) -> Result<(), ProcessingError> {
        match self.tally.as_mut() {
            Some(tally) => tally.add(text),
            None => writeln!(output, "{}", text)?,
        }
        Ok(())
    }

    /// End of input: print the tally (if enabled) and drop uncorrelated
    /// diagnostic lines. Returns the accumulated stats.
    pub fn finish<W: Write>(&mut self, output: &mut W) -> Result<ProcessingStats, ProcessingError> {
        if let Some(tally) = self.tally.as_mut() {
            tally.write_report(output)?;
            *tally = TallyTable::new();
        }
        output.flush()?;

        self.stats.traces_discarded += self.correlation.clear();
        debug!(
            "done: {} lines read, {} records output, {} traces correlated, {} expired, {} discarded in {:?}",
            self.stats.lines_read,
            self.stats.records_output,
            self.stats.traces_correlated,
            self.stats.traces_expired,
            self.stats.traces_discarded,
            self.stats.processing_time
        );
        Ok(self.stats.clone())
    }

    /// Get current accumulated stats
    pub fn get_stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Request ids still waiting for their completion line
    pub fn pending_traces(&self) -> usize {
        self.correlation.len()
    }

    pub fn tally(&self) -> Option<&TallyTable> {
        self.tally.as_ref()
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
