// src/record.rs
use crate::fields::Field;

/// Where a line came from. Lines carrying a `<path>:` prefix override the
/// identity of the stream they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub log_path: String,
    pub log_file: String,
}

impl SourceIdentity {
    pub fn new(log_path: &str) -> Self {
        let log_file = log_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(log_path)
            .to_string();
        SourceIdentity {
            log_path: log_path.to_string(),
            log_file,
        }
    }
}

/// Fields shared by both line shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFields {
    pub timestamp: String,
    pub logger: String,
    pub line_no: String,
    pub level: String,
    pub request_id: String,
    /// Line text after any source prefix was stripped
    pub line: String,
    /// `timestamp` as local wall-clock seconds, if it is a real date
    pub time_value: Option<i64>,
}

/// A `Processed request:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub source: SourceIdentity,
    pub common: CommonFields,
    pub client_ip: String,
    pub client_port: String,
    pub user: String,
    pub user_local: String,
    pub user_domain: String,
    pub elapsed_time: String,
    pub send_time: String,
    pub user_time: String,
    pub sys_time: String,
    pub db_pool_time: String,
    pub db_time: String,
    pub db_txn_count: String,
    pub resp_bytes: String,
    pub resp_code: String,
    pub abandoned: String,
    pub req_method: String,
    pub req_path: String,
    pub req_query: String,
    pub req_protocol: String,
    pub user_agent: String,
    pub db_events: String,
    pub extra_lines: String,
}

impl CompletionRecord {
    /// Value of a known field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::LogPath => &self.source.log_path,
            Field::LogFile => &self.source.log_file,
            Field::Timestamp => &self.common.timestamp,
            Field::Logger => &self.common.logger,
            Field::LineNo => &self.common.line_no,
            Field::Level => &self.common.level,
            Field::RequestId => &self.common.request_id,
            Field::ClientIp => &self.client_ip,
            Field::ClientPort => &self.client_port,
            Field::User => &self.user,
            Field::UserLocal => &self.user_local,
            Field::UserDomain => &self.user_domain,
            Field::ElapsedTime => &self.elapsed_time,
            Field::SendTime => &self.send_time,
            Field::UserTime => &self.user_time,
            Field::SysTime => &self.sys_time,
            Field::DbPoolTime => &self.db_pool_time,
            Field::DbTime => &self.db_time,
            Field::DbTxnCount => &self.db_txn_count,
            Field::RespBytes => &self.resp_bytes,
            Field::RespCode => &self.resp_code,
            Field::Abandoned => &self.abandoned,
            Field::ReqMethod => &self.req_method,
            Field::ReqPath => &self.req_path,
            Field::ReqQuery => &self.req_query,
            Field::ReqProtocol => &self.req_protocol,
            Field::UserAgent => &self.user_agent,
            Field::DbEvents => &self.db_events,
            Field::Line => &self.common.line,
            Field::ExtraLines => &self.extra_lines,
        }
    }

    /// Attach the correlated diagnostic lines
    pub fn with_extra_lines(self, extra_lines: String) -> Self {
        CompletionRecord {
            extra_lines,
            ..self
        }
    }

    /// Correlated text: buffered diagnostic lines, then the completion line
    pub fn correlated_text(&self) -> String {
        if self.extra_lines.is_empty() {
            self.common.line.clone()
        } else {
            format!("{}\n{}", self.extra_lines, self.common.line)
        }
    }
}

/// Any other line sharing the common prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub source: SourceIdentity,
    pub common: CommonFields,
    pub message: String,
}

/// A classified log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Completion(CompletionRecord),
    Diagnostic(DiagnosticRecord),
}

impl LogRecord {
    pub fn common(&self) -> &CommonFields {
        match self {
            LogRecord::Completion(r) => &r.common,
            LogRecord::Diagnostic(r) => &r.common,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.common().request_id
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, LogRecord::Completion(_))
    }
}

/// Split `@localpart:domain` into its parts; anything else gives two empty strings.
pub fn split_user_id(user: &str) -> (String, String) {
    user.strip_prefix('@')
        .and_then(|rest| rest.split_once(':'))
        .filter(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .map(|(local, domain)| (local.to_string(), domain.to_string()))
        .unwrap_or_default()
}
