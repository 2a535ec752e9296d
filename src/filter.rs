// src/filter.rs
use crate::error::CompilationError;
use crate::fields::Field;
use crate::record::CompletionRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static EXPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<field>[A-Za-z_][A-Za-z0-9_]*)\s*(?P<op>!=|!~|=|~)\s*(?P<value>.*)$")
        .expect("filter expression pattern is a valid regex")
});

/// One compiled `field op value` test
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    Equals { field: Field, value: String },
    NotEquals { field: Field, value: String },
    Matches { field: Field, pattern: Regex },
    NotMatches { field: Field, pattern: Regex },
}

impl FilterPredicate {
    /// Compile an expression such as `resp_code = 403` or `req_path !~ ^/_matrix/media`
    pub fn parse(expression: &str) -> Result<Self, CompilationError> {
        let caps = EXPRESSION_RE
            .captures(expression)
            .ok_or_else(|| CompilationError::InvalidFilter(expression.to_string()))?;

        let field: Field = caps["field"].parse()?;
        let value = unquote(caps["value"].trim_end()).to_string();

        let predicate = match &caps["op"] {
            "=" => FilterPredicate::Equals { field, value },
            "!=" => FilterPredicate::NotEquals { field, value },
            "~" => FilterPredicate::Matches {
                field,
                pattern: compile_pattern(&value)?,
            },
            "!~" => FilterPredicate::NotMatches {
                field,
                pattern: compile_pattern(&value)?,
            },
            _ => return Err(CompilationError::InvalidFilter(expression.to_string())),
        };
        Ok(predicate)
    }

    pub fn field(&self) -> Field {
        match self {
            FilterPredicate::Equals { field, .. }
            | FilterPredicate::NotEquals { field, .. }
            | FilterPredicate::Matches { field, .. }
            | FilterPredicate::NotMatches { field, .. } => *field,
        }
    }

    pub fn matches(&self, record: &CompletionRecord) -> bool {
        let actual = record.get(self.field());
        match self {
            FilterPredicate::Equals { value, .. } => actual == value,
            FilterPredicate::NotEquals { value, .. } => actual != value,
            FilterPredicate::Matches { pattern, .. } => pattern.is_match(actual),
            FilterPredicate::NotMatches { pattern, .. } => !pattern.is_match(actual),
        }
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn compile_pattern(pattern: &str) -> Result<Regex, CompilationError> {
    Regex::new(pattern).map_err(|e| CompilationError::invalid_pattern(pattern, e))
}

/// All predicates must hold for a record to pass. An empty filter passes everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    predicates: Vec<FilterPredicate>,
}

impl RecordFilter {
    pub fn compile<S: AsRef<str>>(expressions: &[S]) -> Result<Self, CompilationError> {
        let predicates = expressions
            .iter()
            .map(|e| FilterPredicate::parse(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecordFilter { predicates })
    }

    pub fn accepts(&self, record: &CompletionRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }
}
