use crate::error::CompilationError;
use crate::fields::Field;
use crate::formatters::jsonl::JsonlFormatter;
use crate::formatters::template::{FormatProgram, TemplateFormatter};
use crate::formatters::{RawFormatter, RecordFormatter};
use crate::record::CompletionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(name = "line", help = "Text lines: raw correlated text, a template, or selected keys")]
    Line,
    #[value(name = "jsonl", help = "JSON Lines format (one JSON object per line)")]
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(OutputFormat::Line),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Renders accepted completion records in the encoding chosen for the run
pub struct OutputFormatter {
    renderer: Box<dyn RecordFormatter>,
}

impl OutputFormatter {
    /// Compile the formatter. All field names are checked here, before any
    /// input is read.
    pub fn new<S: AsRef<str>>(
        format: OutputFormat,
        template: Option<&str>,
        keys: Option<&[S]>,
    ) -> Result<Self, CompilationError> {
        let keys = keys.map(Field::parse_list).transpose()?;

        let renderer: Box<dyn RecordFormatter> = match (format, template, keys) {
            (OutputFormat::Jsonl, Some(_), _) => {
                return Err(CompilationError::ConfigError(
                    "a template cannot be combined with jsonl output".to_string(),
                ))
            }
            (OutputFormat::Jsonl, None, Some(keys)) => Box::new(JsonlFormatter::with_keys(keys)),
            (OutputFormat::Jsonl, None, None) => Box::new(JsonlFormatter::all_fields()),
            (OutputFormat::Line, Some(_), Some(_)) => {
                return Err(CompilationError::ConfigError(
                    "use either a template or a key list, not both".to_string(),
                ))
            }
            (OutputFormat::Line, Some(template), None) => {
                Box::new(TemplateFormatter::new(FormatProgram::compile(template)?))
            }
            (OutputFormat::Line, None, Some(keys)) => {
                Box::new(TemplateFormatter::new(FormatProgram::from_fields(&keys)))
            }
            (OutputFormat::Line, None, None) => Box::new(RawFormatter),
        };

        Ok(OutputFormatter { renderer })
    }

    /// Raw correlated text, the rendering used when nothing else is asked for
    pub fn raw() -> Self {
        OutputFormatter {
            renderer: Box::new(RawFormatter),
        }
    }

    pub fn render(&self, record: &CompletionRecord) -> String {
        self.renderer.format_record(record)
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::raw()
    }
}
