// src/formatters/template.rs
use crate::error::CompilationError;
use crate::fields::Field;
use crate::formatters::RecordFormatter;
use crate::record::CompletionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field(Field),
}

/// A template compiled into literal text and field references.
///
/// Syntax: `${field}` inserts a field value. A backslash before `$`, `\`,
/// `{` or `}` produces that character literally; any other backslash is kept
/// as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProgram {
    segments: Vec<Segment>,
}

impl FormatProgram {
    pub fn compile(template: &str) -> Result<Self, CompilationError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.peek() {
                    Some(&next) if matches!(next, '$' | '\\' | '{' | '}') => {
                        chars.next();
                        literal.push(next);
                    }
                    _ => literal.push('\\'),
                },
                '$' if chars.peek() == Some(&'{') => {
                    chars.next(); // consume '{'
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(CompilationError::InvalidTemplate(format!(
                            "unterminated field reference '${{{}'",
                            name
                        )));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(CompilationError::InvalidTemplate(
                            "empty field reference '${}'".to_string(),
                        ));
                    }
                    let field: Field = name.parse()?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(FormatProgram { segments })
    }

    /// Implicit template: the given fields separated by single spaces
    pub fn from_fields(fields: &[Field]) -> Self {
        let mut segments = Vec::with_capacity(fields.len() * 2);
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                segments.push(Segment::Literal(" ".to_string()));
            }
            segments.push(Segment::Field(*field));
        }
        FormatProgram { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn render(&self, record: &CompletionRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(record.get(*field)),
            }
        }
        out
    }
}

/// Renders records through a compiled [`FormatProgram`]
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    program: FormatProgram,
}

impl TemplateFormatter {
    pub fn new(program: FormatProgram) -> Self {
        TemplateFormatter { program }
    }
}

impl RecordFormatter for TemplateFormatter {
    fn format_record(&self, record: &CompletionRecord) -> String {
        self.program.render(record)
    }
}
