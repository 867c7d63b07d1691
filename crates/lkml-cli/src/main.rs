//! LookML command-line tool.
//!
//! Examples:
//!   lkml orders.view.lkml              - plain projection as JSON
//!   lkml orders.view.lkml --tree       - syntax tree
//!   lkml orders.view.lkml --format     - reserialized source
//!   lkml model.json --from-json        - LookML built from JSON
//!   lkml -                             - read stdin

use std::io::{self, Read};

use clap::Parser;
use eyre::WrapErr;
use lkml_parse::ParseError;
use lkml_tree::{Value, ValueVisitor};
use tracing::debug;

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_CONVERSION_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

/// Parse LookML files and convert them to and from plain data.
#[derive(Debug, Parser)]
#[command(name = "lkml", version)]
struct Args {
    /// Input file path (or "-" for stdin)
    input: String,

    /// Print the syntax tree
    #[arg(long, conflicts_with_all = ["format", "from_json"])]
    tree: bool,

    /// Print the source written back out from its syntax tree
    #[arg(long, conflicts_with = "from_json")]
    format: bool,

    /// Read JSON and write it out as LookML
    #[arg(long)]
    from_json: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

enum CliError {
    Io(eyre::Report),
    Parse {
        error: ParseError,
        source: String,
        filename: String,
    },
    Convert(eyre::Report),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Parse { .. } => EXIT_SYNTAX_ERROR,
            CliError::Convert(_) => EXIT_CONVERSION_ERROR,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            match &e {
                CliError::Parse {
                    error,
                    source,
                    filename,
                } => error.write_report(filename, source, io::stderr()),
                CliError::Io(report) | CliError::Convert(report) => {
                    eprintln!("error: {report:#}");
                }
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let source = read_input(&args.input).map_err(CliError::Io)?;
    let filename = if args.input == "-" {
        "<stdin>"
    } else {
        args.input.as_str()
    };

    if args.from_json {
        let text = json_to_lookml(&source).map_err(CliError::Convert)?;
        println!("{text}");
        return Ok(());
    }

    let document = lkml_parse::parse(&source).map_err(|error| CliError::Parse {
        error,
        source: source.clone(),
        filename: filename.to_string(),
    })?;
    debug!(filename, items = document.items().len(), "parsed document");

    if args.tree {
        println!("{document:#?}");
    } else if args.format {
        print!("{document}");
    } else {
        let value = document
            .accept(&mut ValueVisitor::new())
            .wrap_err_with(|| format!("cannot convert {filename} to plain data"))
            .map_err(CliError::Convert)?;
        let text = value_to_json(&value, args.compact).map_err(CliError::Convert)?;
        println!("{text}");
    }
    Ok(())
}

fn read_input(input: &str) -> eyre::Result<String> {
    if input == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .wrap_err("failed to read stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(input).wrap_err_with(|| format!("failed to read {input}"))
    }
}

fn value_to_json(value: &Value, compact: bool) -> eyre::Result<String> {
    let json = value.to_json();
    let text = if compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    Ok(text)
}

fn json_to_lookml(source: &str) -> eyre::Result<String> {
    let json: serde_json::Value = serde_json::from_str(source).wrap_err("invalid JSON input")?;
    let value = Value::from_json(&json)?;
    Ok(lkml_tree::dump(&value)?)
}
