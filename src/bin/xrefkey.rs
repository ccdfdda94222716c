//! xrefkey CLI - SCP keys for Dynsim cross reference files
//!
//! Lists the engines of a cross reference and writes an improved copy with
//! each SCP row's signal address in the MISC5 column.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use xrefkey::{list_engines, read_path, strip, KeyReport, XrefConfig, XrefDocument, XrefError};

#[derive(Parser)]
#[command(name = "xrefkey")]
#[command(version, about = "Unique SCP keys for Dynsim cross reference files", long_about = None)]
struct Cli {
    /// Path to an xrefkey.yaml configuration file (default: $XREF_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the engines referenced by a cross reference
    Engines {
        /// Cross reference file (.csv, .xls, .xlsx)
        input: PathBuf,
    },

    /// Fill MISC5 with SCP keys and write the improved cross reference
    Keys {
        /// Cross reference file (.csv, .xls, .xlsx)
        input: PathBuf,

        /// SCP engine name (repeatable)
        #[arg(short, long = "engine")]
        engines: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the analog and digital previews
        #[arg(short, long)]
        preview: bool,
    },

    /// Derive the key of a single SCP address expression
    Strip {
        address: String,
    },

    /// Run the bundled example cross reference with its default engines
    Example {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = XrefConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Engines { input } => print_engines(&input, &config),
        Commands::Keys { input, engines, output, preview } => {
            generate_keys(&input, &engines, output.as_deref(), preview, &config)
        }
        Commands::Strip { address } => {
            println!("{}", strip(&address));
            Ok(())
        }
        Commands::Example { output } => run_example(output.as_deref(), &config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if e.is_file_error() {
            eprintln!("There was an error processing this file.");
        }
        process::exit(1);
    }
}

/// Print one engine name per line
fn print_engines(input: &Path, config: &XrefConfig) -> Result<(), XrefError> {
    let table = read_path(input, &config.ingest)?;
    for engine in list_engines(&table)? {
        println!("{}", engine);
    }
    Ok(())
}

fn generate_keys(
    input: &Path,
    engines: &[String],
    output: Option<&Path>,
    preview: bool,
    config: &XrefConfig,
) -> Result<(), XrefError> {
    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(input)?;

    let document = XrefDocument::load(&bytes, &filename, config)?;
    let report = document.generate(engines, config)?;

    write_report(&report, output, preview)
}

fn run_example(output: Option<&Path>, config: &XrefConfig) -> Result<(), XrefError> {
    let document = XrefDocument::example()?;
    let report = document.generate(&XrefDocument::EXAMPLE_ENGINES, config)?;

    write_report(&report, output, true)
}

fn write_report(report: &KeyReport, output: Option<&Path>, preview: bool) -> Result<(), XrefError> {
    if preview {
        print_preview("Analogs Preview", &report.analog_preview);
        print_preview("Digitals Preview", &report.digital_preview);
    }

    match output {
        Some(path) => {
            fs::write(path, &report.export)?;
            eprintln!("{}", report.summary);
            eprintln!("Wrote {}", path.display());
        }
        None => {
            io::stdout().write_all(report.export.as_bytes())?;
            eprintln!("{}", report.summary);
        }
    }

    Ok(())
}

/// Print preview records as a tab separated block on stderr
fn print_preview(title: &str, records: &[xrefkey::Record]) {
    eprintln!("{}", title);
    if let Some(first) = records.first() {
        let header: Vec<&str> = first.keys().map(String::as_str).collect();
        eprintln!("  {}", header.join("\t"));
    }
    for record in records {
        let values: Vec<&str> = record.values().map(String::as_str).collect();
        eprintln!("  {}", values.join("\t"));
    }
    eprintln!();
}
