//! sheetsub CLI
//!
//! Usage:
//!   sheetsub [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --source <FILE>    Value source (TOML), repeatable; earlier wins
//!   -c, --config <FILE>    TOML file with an [options] table
//!   -p, --prefix <CHAR>    Placeholder prefix (default '$')
//!       --abort            Stop at the first token that fails to resolve
//!       --chained          One pass per source so sources can feed each other
//!       --filename <NAME>  Label used in diagnostics
//!   -h, --help             Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unicode_normalization::UnicodeNormalization;

use sheetsub::{ErrorPolicy, Options, Processor, StreamSink, SubstituteError, ValueSource};

#[derive(Parser)]
#[command(name = "sheetsub")]
#[command(about = "Replace placeholder tokens in stylesheets with values from TOML sources")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Value source file (TOML); may be repeated, earlier sources take precedence
    #[arg(short, long = "source")]
    sources: Vec<PathBuf>,

    /// TOML file with an [options] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Placeholder prefix
    #[arg(short, long)]
    prefix: Option<char>,

    /// Stop at the first token that fails to resolve
    #[arg(long)]
    abort: bool,

    /// Run one pass per source, in order
    #[arg(long)]
    chained: bool,

    /// Label used in diagnostics (defaults to the input path)
    #[arg(long)]
    filename: Option<String>,
}

fn init_tracing() {
    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("Reading from stdin; pass a FILE or pipe input. See --help.");
    }

    let mut options = match &cli.config {
        Some(path) => {
            let loaded = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| Options::from_toml_str(&content).map_err(|e| e.to_string()));
            match loaded {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error loading config '{}': {}", path.display(), e);
                    process::exit(1);
                }
            }
        }
        None => Options::default(),
    };

    if let Some(prefix) = cli.prefix {
        options = options.with_prefix(prefix);
    }
    if cli.abort {
        options = options.with_on_error(ErrorPolicy::Abort);
    }
    let filename = cli
        .filename
        .clone()
        .or_else(|| cli.input.as_ref().map(|p| p.display().to_string()))
        .unwrap_or_else(|| "<stdin>".to_string());
    options = options.with_filename(filename.clone());

    let mut sources = Vec::with_capacity(cli.sources.len());
    for path in &cli.sources {
        match ValueSource::from_file(path) {
            Ok(source) => sources.push(source),
            Err(e) => {
                eprintln!("Error loading value source '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    // Read input
    let text = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    // Syntax error spans refer to the normalized text
    let text: String = text.nfc().collect();

    // stdout carries the result, so both diagnostic streams go to stderr
    let sink = StreamSink::new(io::stderr(), io::stderr());
    let mut processor = Processor::with_sink(options, sink);

    let result = if cli.chained {
        pollster::block_on(processor.substitute_each(&sources, &text))
    } else {
        processor.substitute_blocking(&sources, &text)
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(SubstituteError::Syntax(e)) => {
            eprint!("{}", e.format(&text, &filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
