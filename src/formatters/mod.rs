use crate::record::CompletionRecord;

/// Trait for rendering completion records to strings
pub trait RecordFormatter {
    fn format_record(&self, record: &CompletionRecord) -> String;
}

/// Default rendering: the correlated diagnostic lines followed by the
/// completion line itself
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFormatter;

impl RecordFormatter for RawFormatter {
    fn format_record(&self, record: &CompletionRecord) -> String {
        record.correlated_text()
    }
}

pub mod jsonl;
pub mod template;
