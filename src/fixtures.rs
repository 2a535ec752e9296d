//! Sample lines shared by unit tests
use crate::extract::LineExtractor;
use crate::record::{CompletionRecord, LogRecord, SourceIdentity};

pub fn completion_line(timestamp: &str, request_id: &str, user: &str, code: &str, path: &str) -> String {
    format!(
        r#"{} - synapse.access.http.8008 - 460 - INFO - {} - 10.0.0.1 - 8008 - {{{}}} Processed request: 0.010sec/0.001sec (0.001sec, 0.000sec) (0.000sec/0.002sec/1) 55B {} "GET {} HTTP/1.1" "curl/8.0" [0 dbevts]"#,
        timestamp, request_id, user, code, path
    )
}

pub fn completion(user: &str, code: &str, path: &str) -> CompletionRecord {
    let line = completion_line("2024-01-15 12:00:00,000", "GET-1", user, code, path);
    match LineExtractor::new().extract(&line, &SourceIdentity::new("homeserver.log")) {
        Some(LogRecord::Completion(record)) => record,
        other => panic!("expected completion record, got {:?}", other),
    }
}
