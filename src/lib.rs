// src/lib.rs
pub mod correlation;
pub mod error;
pub mod extract;
pub mod fields;
pub mod filter;
pub mod formatters;
pub mod logging;
pub mod output_format;
pub mod pipeline;
pub mod record;
pub mod tally;

#[cfg(test)]
mod fixtures;

pub use error::*;

pub use correlation::{CorrelationBuffer, CORRELATION_WINDOW_SECS};
pub use extract::{LineExtractor, SourceTracker};
pub use fields::Field;
pub use filter::{FilterPredicate, RecordFilter};
pub use formatters::template::FormatProgram;
pub use output_format::{OutputFormat, OutputFormatter};
pub use pipeline::config::{ErrorStrategy, PipelineConfig};
pub use pipeline::context::{LineOutcome, LineSource, ProcessingStats};
pub use pipeline::stream::LogPipeline;
pub use record::{CompletionRecord, DiagnosticRecord, LogRecord, SourceIdentity};
pub use tally::TallyTable;
