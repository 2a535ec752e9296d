// src/extract.rs
use crate::record::{
    split_user_id, CommonFields, CompletionRecord, DiagnosticRecord, LogRecord, SourceIdentity,
};
use chrono::{Local, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `2024-01-15 12:34:56,789 - synapse.access.http.8008 - 460 - INFO - GET-123 - `
const PREFIX_PATTERN: &str = concat!(
    r"^(?P<date>\d{4}-\d{2}-\d{2}) (?P<time>\d{2}:\d{2}:\d{2}),(?P<msec>\d{3})",
    r" - (?P<logger>\S+) - (?P<line_no>\d+) - (?P<level>[A-Z]+) - (?P<request_id>\S+) - ",
);

const COMPLETION_TAIL: &str = concat!(
    r"(?P<client_ip>\S+) - (?P<client_port>\d+) - \{(?P<user>[^}]*)\} Processed request: ",
    r"(?P<elapsed_time>-?[\d.]+)sec/(?P<send_time>-?[\d.]+)sec ",
    r"\((?P<user_time>-?[\d.]+)sec, (?P<sys_time>-?[\d.]+)sec\) ",
    r"\((?P<db_pool_time>-?[\d.]+)sec/(?P<db_time>-?[\d.]+)sec/(?P<db_txn_count>\d+)\) ",
    r"(?P<resp_bytes>\d+)B (?P<resp_code>\d+|-)(?P<abandoned>!?) ",
    r#""(?P<req_method>\S+) (?P<req_path>[^?\s"]*)(?:\?(?P<req_query>[^\s"]*))? (?P<req_protocol>[^"]*)" "#,
    r#""(?P<user_agent>[^"]*)" \[(?P<db_events>\d+) dbevts\]\s*$"#,
);

static COMPLETION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{PREFIX_PATTERN}{COMPLETION_TAIL}"))
        .expect("completion grammar is a valid regex")
});

static DIAGNOSTIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{PREFIX_PATTERN}(?P<message>.*)$"))
        .expect("diagnostic grammar is a valid regex")
});

/// `<source-path>:` directly followed by a log date
static SOURCE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<path>[^\s].*?):(?P<rest>\d{4}-\d{2}-\d{2} .*)$")
        .expect("source prefix pattern is a valid regex")
});

/// Classifies raw lines into completion or diagnostic records.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineExtractor;

impl LineExtractor {
    pub fn new() -> Self {
        LineExtractor
    }

    /// Classify one line (already stripped of any source prefix).
    /// Returns `None` for lines matching neither grammar.
    pub fn extract(&self, line: &str, source: &SourceIdentity) -> Option<LogRecord> {
        if let Some(caps) = COMPLETION_RE.captures(line) {
            return Some(LogRecord::Completion(Self::completion(&caps, line, source)));
        }
        DIAGNOSTIC_RE.captures(line).map(|caps| {
            LogRecord::Diagnostic(DiagnosticRecord {
                source: source.clone(),
                common: Self::common(&caps, line),
                message: group(&caps, "message"),
            })
        })
    }

    fn common(caps: &Captures, line: &str) -> CommonFields {
        let date = &caps["date"];
        let time = &caps["time"];
        let timestamp = format!("{} {},{}", date, time, &caps["msec"]);
        CommonFields {
            time_value: parse_local_seconds(date, time),
            timestamp,
            logger: group(caps, "logger"),
            line_no: group(caps, "line_no"),
            level: group(caps, "level"),
            request_id: group(caps, "request_id"),
            line: line.to_string(),
        }
    }

    fn completion(caps: &Captures, line: &str, source: &SourceIdentity) -> CompletionRecord {
        let user = group(caps, "user");
        let (user_local, user_domain) = split_user_id(&user);
        CompletionRecord {
            source: source.clone(),
            common: Self::common(caps, line),
            client_ip: group(caps, "client_ip"),
            client_port: group(caps, "client_port"),
            user,
            user_local,
            user_domain,
            elapsed_time: group(caps, "elapsed_time"),
            send_time: group(caps, "send_time"),
            user_time: group(caps, "user_time"),
            sys_time: group(caps, "sys_time"),
            db_pool_time: group(caps, "db_pool_time"),
            db_time: group(caps, "db_time"),
            db_txn_count: group(caps, "db_txn_count"),
            resp_bytes: group(caps, "resp_bytes"),
            resp_code: group(caps, "resp_code"),
            abandoned: group(caps, "abandoned"),
            req_method: group(caps, "req_method"),
            req_path: group(caps, "req_path"),
            req_query: group(caps, "req_query"),
            req_protocol: group(caps, "req_protocol"),
            user_agent: group(caps, "user_agent"),
            db_events: group(caps, "db_events"),
            extra_lines: String::new(),
        }
    }
}

/// Named group text, empty when the group did not participate
fn group(caps: &Captures, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Interpret `date time` as local wall-clock time, in epoch seconds.
/// Impossible dates and times skipped by a DST change give `None`.
pub fn parse_local_seconds(date: &str, time: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// `YYYY-MM-DD ` at the start of the line
fn starts_with_date(line: &str) -> bool {
    let b = line.as_bytes();
    b.len() >= 11
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
        && b[10] == b' '
}

/// Tracks the current source identity of one stream, honouring
/// `<source-path>:` prefixes as produced by `grep` over several files.
#[derive(Debug, Clone)]
pub struct SourceTracker {
    current: SourceIdentity,
}

impl SourceTracker {
    pub fn new(stream_name: &str) -> Self {
        SourceTracker {
            current: SourceIdentity::new(stream_name),
        }
    }

    /// Strip a source prefix if present, switching the current identity.
    /// Un-prefixed lines keep the last identity seen.
    pub fn resolve<'a>(&mut self, raw: &'a str) -> &'a str {
        if starts_with_date(raw) || !raw.contains(':') {
            return raw;
        }
        match SOURCE_PREFIX_RE.captures(raw) {
            Some(caps) => {
                let (Some(path), Some(rest)) = (caps.name("path"), caps.name("rest")) else {
                    return raw;
                };
                if path.as_str() != self.current.log_path {
                    self.current = SourceIdentity::new(path.as_str());
                }
                &raw[rest.start()..]
            }
            None => raw,
        }
    }

    pub fn current(&self) -> &SourceIdentity {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    const COMPLETION: &str = r#"2024-01-15 12:34:56,789 - synapse.access.http.8008 - 460 - INFO - GET-123 - 10.0.0.1 - 8008 - {@bob:example.org} Processed request: 0.125sec/0.001sec (0.040sec, 0.004sec) (0.002sec/0.060sec/3) 1234B 200 "GET /_matrix/client/v3/sync?since=s1&timeout=30000 HTTP/1.1" "Element/1.11" [7 dbevts]"#;

    fn source() -> SourceIdentity {
        SourceIdentity::new("homeserver.log")
    }

    fn completion(line: &str) -> CompletionRecord {
        match LineExtractor::new().extract(line, &source()) {
            Some(LogRecord::Completion(record)) => record,
            other => panic!("expected completion record, got {:?}", other),
        }
    }

    #[test]
    fn test_completion_fields_are_textually_identical() {
        let record = completion(COMPLETION);

        let expected = [
            (Field::LogPath, "homeserver.log"),
            (Field::LogFile, "homeserver.log"),
            (Field::Timestamp, "2024-01-15 12:34:56,789"),
            (Field::Logger, "synapse.access.http.8008"),
            (Field::LineNo, "460"),
            (Field::Level, "INFO"),
            (Field::RequestId, "GET-123"),
            (Field::ClientIp, "10.0.0.1"),
            (Field::ClientPort, "8008"),
            (Field::User, "@bob:example.org"),
            (Field::UserLocal, "bob"),
            (Field::UserDomain, "example.org"),
            (Field::ElapsedTime, "0.125"),
            (Field::SendTime, "0.001"),
            (Field::UserTime, "0.040"),
            (Field::SysTime, "0.004"),
            (Field::DbPoolTime, "0.002"),
            (Field::DbTime, "0.060"),
            (Field::DbTxnCount, "3"),
            (Field::RespBytes, "1234"),
            (Field::RespCode, "200"),
            (Field::Abandoned, ""),
            (Field::ReqMethod, "GET"),
            (Field::ReqPath, "/_matrix/client/v3/sync"),
            (Field::ReqQuery, "since=s1&timeout=30000"),
            (Field::ReqProtocol, "HTTP/1.1"),
            (Field::UserAgent, "Element/1.11"),
            (Field::DbEvents, "7"),
            (Field::Line, COMPLETION),
            (Field::ExtraLines, ""),
        ];
        assert_eq!(expected.len(), Field::ALL.len());
        for (field, value) in expected {
            assert_eq!(record.get(field), value, "field {}", field);
        }
        assert!(record.common.time_value.is_some());
    }

    #[test]
    fn test_query_defaults_to_empty_and_abandoned_marker() {
        let line = r#"2024-01-15 12:35:00,001 - synapse.access.http.8008 - 460 - INFO - PUT-9 - ::1 - 8008 - {None} Processed request: 30.001sec/-0.000sec (0.010sec, 0.000sec) (0.000sec/0.000sec/0) 0B 200! "PUT /_matrix/client/v3/rooms/!abc:example.org/send/m.room.message/1 HTTP/1.1" "-" [0 dbevts]"#;
        let record = completion(line);
        assert_eq!(record.req_query, "");
        assert_eq!(record.abandoned, "!");
        assert_eq!(record.resp_code, "200");
        assert_eq!(record.client_ip, "::1");
        assert_eq!(record.user, "None");
        assert_eq!(record.user_local, "");
        assert_eq!(record.user_domain, "");
    }

    #[test]
    fn test_diagnostic_line() {
        let line = "2024-01-15 12:34:56,100 - synapse.handlers.sync - 1050 - WARNING - GET-123 - Timed out waiting for stream";
        match LineExtractor::new().extract(line, &source()) {
            Some(LogRecord::Diagnostic(record)) => {
                assert_eq!(record.common.request_id, "GET-123");
                assert_eq!(record.common.level, "WARNING");
                assert_eq!(record.common.logger, "synapse.handlers.sync");
                assert_eq!(record.common.line_no, "1050");
                assert_eq!(record.common.timestamp, "2024-01-15 12:34:56,100");
                assert_eq!(record.common.line, line);
                assert_eq!(record.message, "Timed out waiting for stream");
            }
            other => panic!("expected diagnostic record, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_lines() {
        let extractor = LineExtractor::new();
        assert!(extractor.extract("", &source()).is_none());
        assert!(extractor.extract("Traceback (most recent call last):", &source()).is_none());
        assert!(extractor
            .extract("2024-01-15 12:34:56 - no millis - 1 - INFO - x - y", &source())
            .is_none());
    }

    #[test]
    fn test_impossible_date_has_no_time_value() {
        let line = "2024-13-45 12:34:56,100 - synapse.foo - 1 - INFO - GET-1 - hello";
        let record = LineExtractor::new().extract(line, &source()).unwrap();
        assert_eq!(record.common().time_value, None);
        assert_eq!(record.common().timestamp, "2024-13-45 12:34:56,100");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = LineExtractor::new();
        let first = extractor.extract(COMPLETION, &source());
        let second = extractor.extract(COMPLETION, &source());
        assert_eq!(first, second);
    }

    #[test]
    fn test_source_prefix_switches_identity() {
        let mut tracker = SourceTracker::new("-");
        let prefixed = format!("/var/log/hs1.log:{}", COMPLETION);

        let stripped = tracker.resolve(&prefixed);
        assert_eq!(stripped, COMPLETION);
        assert_eq!(tracker.current().log_path, "/var/log/hs1.log");
        assert_eq!(tracker.current().log_file, "hs1.log");

        // Continuation lines keep the last prefix
        let plain = "    at some traceback frame";
        assert_eq!(tracker.resolve(plain), plain);
        assert_eq!(tracker.current().log_path, "/var/log/hs1.log");

        let unprefixed = tracker.resolve(COMPLETION);
        assert_eq!(unprefixed, COMPLETION);
        assert_eq!(tracker.current().log_path, "/var/log/hs1.log");

        tracker.resolve(&format!("hs2.log:{}", COMPLETION));
        assert_eq!(tracker.current().log_path, "hs2.log");
    }

    #[test]
    fn test_colon_without_date_is_not_a_prefix() {
        let mut tracker = SourceTracker::new("stream");
        let line = "error: something: else";
        assert_eq!(tracker.resolve(line), line);
        assert_eq!(tracker.current().log_path, "stream");
    }
}
