// src/fields.rs
use crate::error::CompilationError;
use std::fmt;
use std::str::FromStr;

/// The closed vocabulary of field names usable in filters, templates and keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LogPath,
    LogFile,
    Timestamp,
    Logger,
    LineNo,
    Level,
    RequestId,
    ClientIp,
    ClientPort,
    User,
    UserLocal,
    UserDomain,
    ElapsedTime,
    SendTime,
    UserTime,
    SysTime,
    DbPoolTime,
    DbTime,
    DbTxnCount,
    RespBytes,
    RespCode,
    Abandoned,
    ReqMethod,
    ReqPath,
    ReqQuery,
    ReqProtocol,
    UserAgent,
    DbEvents,
    Line,
    ExtraLines,
}

impl Field {
    /// All fields in canonical order
    pub const ALL: [Field; 30] = [
        Field::LogPath,
        Field::LogFile,
        Field::Timestamp,
        Field::Logger,
        Field::LineNo,
        Field::Level,
        Field::RequestId,
        Field::ClientIp,
        Field::ClientPort,
        Field::User,
        Field::UserLocal,
        Field::UserDomain,
        Field::ElapsedTime,
        Field::SendTime,
        Field::UserTime,
        Field::SysTime,
        Field::DbPoolTime,
        Field::DbTime,
        Field::DbTxnCount,
        Field::RespBytes,
        Field::RespCode,
        Field::Abandoned,
        Field::ReqMethod,
        Field::ReqPath,
        Field::ReqQuery,
        Field::ReqProtocol,
        Field::UserAgent,
        Field::DbEvents,
        Field::Line,
        Field::ExtraLines,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::LogPath => "log_path",
            Field::LogFile => "log_file",
            Field::Timestamp => "timestamp",
            Field::Logger => "logger",
            Field::LineNo => "line_no",
            Field::Level => "level",
            Field::RequestId => "request_id",
            Field::ClientIp => "client_ip",
            Field::ClientPort => "client_port",
            Field::User => "user",
            Field::UserLocal => "user_local",
            Field::UserDomain => "user_domain",
            Field::ElapsedTime => "elapsed_time",
            Field::SendTime => "send_time",
            Field::UserTime => "user_time",
            Field::SysTime => "sys_time",
            Field::DbPoolTime => "db_pool_time",
            Field::DbTime => "db_time",
            Field::DbTxnCount => "db_txn_count",
            Field::RespBytes => "resp_bytes",
            Field::RespCode => "resp_code",
            Field::Abandoned => "abandoned",
            Field::ReqMethod => "req_method",
            Field::ReqPath => "req_path",
            Field::ReqQuery => "req_query",
            Field::ReqProtocol => "req_protocol",
            Field::UserAgent => "user_agent",
            Field::DbEvents => "db_events",
            Field::Line => "line",
            Field::ExtraLines => "extra_lines",
        }
    }

    /// Parse a comma-separated key list such as `resp_code,req_path`
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Field>, CompilationError> {
        names
            .iter()
            .flat_map(|s| s.as_ref().split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for Field {
    type Err = CompilationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| CompilationError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
