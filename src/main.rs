use anyhow::Context;
use clap::{ArgAction, Parser};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use reqtrace::logging::init_logging;
use reqtrace::{
    CompilationError, ErrorStrategy, Field, LogPipeline, OutputFormat, OutputFormatter,
    PipelineConfig, ProcessingError, RecordFilter,
};

#[derive(Parser)]
#[command(name = "reqtrace")]
#[command(about = "Filter, correlate and summarize homeserver request logs")]
#[command(version)]
struct Args {
    /// Log files to read, in order (default: stdin)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Filter expression 'field op value' with op one of = != ~ !~ (repeat to AND)
    #[arg(short = 'e', long = "filter", action = ArgAction::Append)]
    filters: Vec<String>,

    /// Skip lines not matching this regex before parsing them
    #[arg(short = 'g', long = "grep", value_name = "REGEX")]
    grep: Option<String>,

    /// Output template, e.g. '${resp_code} ${req_path}'
    #[arg(short = 't', long = "template")]
    template: Option<String>,

    /// Comma-separated fields to output
    #[arg(short = 'k', long = "keys", value_delimiter = ',')]
    keys: Option<Vec<String>>,

    /// Output format
    #[arg(short = 'F', long = "output-format", value_enum, default_value = "line")]
    output_format: OutputFormat,

    /// Count distinct outputs instead of printing each one
    #[arg(short = 'c', long = "count")]
    count: bool,

    /// Print the known field names and exit
    #[arg(long)]
    list_fields: bool,

    /// Fail on first oversized line instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Maximum line length
    #[arg(long, default_value = "1048576")] // 1MB
    max_line_length: usize,

    /// Buffer size for I/O
    #[arg(long, default_value = "65536")] // 64KB
    buffer_size: usize,

    /// Debug mode - log processing details to stderr
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if args.list_fields {
        for field in Field::ALL {
            println!("{}", field);
        }
        return;
    }

    if let Err(e) = run(args) {
        let broken_pipe = e
            .downcast_ref::<ProcessingError>()
            .is_some_and(ProcessingError::is_broken_pipe);
        if broken_pipe {
            return;
        }
        eprintln!("reqtrace: error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // Everything is compiled before any input is opened
    let prefilter = args
        .grep
        .as_deref()
        .map(|p| Regex::new(p).map_err(|e| CompilationError::invalid_pattern(p, e)))
        .transpose()?;
    let filter = RecordFilter::compile(&args.filters)?;
    let formatter = OutputFormatter::new(
        args.output_format,
        args.template.as_deref(),
        args.keys.as_deref(),
    )?;

    let config = PipelineConfig {
        error_strategy: if args.fail_fast {
            ErrorStrategy::FailFast
        } else {
            ErrorStrategy::Skip
        },
        buffer_size: args.buffer_size,
        max_line_length: args.max_line_length,
    };

    let mut pipeline = LogPipeline::new(config, prefilter, filter, formatter, args.count);
    let mut output = io::BufWriter::with_capacity(args.buffer_size, io::stdout().lock());

    if args.files.is_empty() {
        let input = BufReader::with_capacity(args.buffer_size, io::stdin().lock());
        pipeline.process_stream(input, &mut output, "-")?;
    } else {
        for path in &args.files {
            let input = open_input(path, args.buffer_size)?;
            let name = path.to_string_lossy();
            pipeline
                .process_stream(input, &mut output, &name)
                .with_context(|| format!("Processing '{}' failed", name))?;
        }
    }

    pipeline.finish(&mut output)?;
    Ok(())
}

fn open_input(path: &Path, buffer_size: usize) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
    Ok(Box::new(BufReader::with_capacity(buffer_size, file)))
}
