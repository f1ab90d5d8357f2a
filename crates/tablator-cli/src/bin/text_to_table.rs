//! Turn plain text or tab-separated lists into Tablator table files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tablator_cli::logging;
use tablator_core::{ConvertOptions, Format, InputStyle, convert, output_path};

#[derive(Parser)]
#[command(
    name = "text-to-table",
    about = "Create Tablator tables from text files",
    version
)]
struct Cli {
    /// Input is tab-separated: name, weight, quantity, subtable
    #[arg(short, long)]
    csv: bool,

    /// Tab-separated input whose first line names the fields
    #[arg(long)]
    header: bool,

    /// Keep a weight on every row
    #[arg(short, long)]
    weights: bool,

    /// Write YAML instead of JSON
    #[arg(short, long)]
    yaml: bool,

    /// Table name (default: the input file name)
    #[arg(short = 'n', long)]
    table_name: Option<String>,

    /// Directory for the output files (default: next to the input)
    #[arg(short = 'D', long)]
    output_dir: Option<PathBuf>,

    /// Don't report written files
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug messages
    #[arg(short, long)]
    verbose: bool,

    /// Text files to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, false);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let style = if cli.header {
        InputStyle::Headed
    } else if cli.csv {
        InputStyle::Tabbed
    } else {
        InputStyle::Text
    };
    let format = if cli.yaml { Format::Yaml } else { Format::Json };

    if let Some(dir) = cli.output_dir.as_ref().filter(|d| !d.is_dir()) {
        return Err(format!("output directory not found: {}", dir.display()));
    }

    for input in &cli.files {
        let options = ConvertOptions {
            name: cli.table_name.clone().unwrap_or_else(|| default_name(input)),
            style,
            weights: cli.weights,
        };
        let written = convert_file(input, &options, format, cli.output_dir.as_deref())?;
        if !cli.quiet {
            println!("{} -> {}", input.display(), written.display());
        }
    }

    Ok(())
}

fn convert_file(
    input: &Path,
    options: &ConvertOptions,
    format: Format,
    output_dir: Option<&Path>,
) -> Result<PathBuf, String> {
    let text = fs::read_to_string(input)
        .map_err(|e| format!("cannot read {}: {e}", input.display()))?;
    let def = convert(&text, options).map_err(|e| format!("{}: {e}", input.display()))?;
    let out = output_path(input, format, output_dir);
    let body = format.write(&def).map_err(|e| e.to_string())?;
    fs::write(&out, body).map_err(|e| format!("cannot write {}: {e}", out.display()))?;
    Ok(out)
}

/// The input file's stem, used when no table name is given.
fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "TABLE NAME".to_string())
}
