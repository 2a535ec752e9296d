#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Line too long: {length} > {max_length}")]
    LineTooLong { length: usize, max_length: usize },
}

impl ProcessingError {
    /// True when the output side went away (e.g. `reqtrace ... | head`)
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, ProcessingError::IoError(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

/// Errors raised while compiling filters, templates and patterns, before any
/// input line is read.
#[derive(Debug, thiserror::Error)]
pub enum CompilationError {
    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("Invalid filter expression '{0}': expected 'field op value' with op one of = != ~ !~")]
    InvalidFilter(String),

    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl CompilationError {
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        CompilationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}
