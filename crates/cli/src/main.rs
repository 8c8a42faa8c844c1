// datalens CLI - normalize CSV, spreadsheet and SQLite files, and build
// the text context a language model is given alongside a question

mod exit_codes;
mod preview;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use datalens_config::settings::Settings;
use datalens_io::context::{render_context, render_prompt, ContextOptions};
use datalens_io::csv::CsvOptions;
use datalens_io::session::{DatasetToken, Reply, Workspace};
use datalens_io::{json, DatasetCollection, NormalizeError, NormalizeOptions};

use exit_codes::{normalize_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "dlens")]
#[command(about = "Normalize CSV, spreadsheet and SQLite files into uniform tables")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file to use instead of the per-user one
    #[arg(long, global = true, env = "DATALENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file and show its tables
    #[command(after_help = "\
Examples:
  dlens inspect sales.csv
  dlens inspect inventory.xlsx --rows 10
  dlens inspect app.db --json > tables.json
  dlens inspect export.csv --delimiter ';' --no-infer")]
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// Print the normalized tables as JSON
        #[arg(long)]
        json: bool,

        /// Single-line JSON instead of pretty-printed
        #[arg(long, requires = "json")]
        compact: bool,

        /// Write the JSON to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Rows to preview per table in text mode
        #[arg(long, default_value = "5")]
        rows: usize,
    },

    /// Print the data context for a file
    #[command(after_help = "\
Examples:
  dlens context sales.csv
  dlens context app.db --sample-rows 5")]
    Context {
        #[command(flatten)]
        input: InputArgs,

        /// Sample rows shown per table (defaults to context.sampleRows)
        #[arg(long)]
        sample_rows: Option<usize>,
    },

    /// Print the full prompt for a question about a file
    #[command(after_help = "\
Examples:
  dlens prompt sales.csv 'Which region had the highest revenue?'")]
    Prompt {
        #[command(flatten)]
        input: InputArgs,

        /// The question to ask about the data
        query: String,

        /// Sample rows shown per table (defaults to context.sampleRows)
        #[arg(long)]
        sample_rows: Option<usize>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// File to load (.csv, .xlsx, .xls, .xlsm, .xlsb, .ods, .db, .sqlite, .sqlite3)
    file: PathBuf,

    /// CSV field delimiter (detected from the file when omitted)
    #[arg(long)]
    delimiter: Option<char>,

    /// Keep every CSV cell as text
    #[arg(long)]
    no_infer: bool,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("DATALENS_COMMIT"), ")",
            "\nio:      datalens-io ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("DATALENS_TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("DATALENS_COMMIT"), ")",
            "\nio:      datalens-io ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("DATALENS_TARGET"),
        )
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let result = match cli.command {
        Commands::Inspect { input, json, compact, output, rows } => {
            cmd_inspect(&settings, input, json, compact, output, rows)
        }
        Commands::Context { input, sample_rows } => cmd_context(&settings, input, sample_rows),
        Commands::Prompt { input, query, sample_rows } => {
            cmd_prompt(&settings, input, query, sample_rows)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a normalization failure with its exit code.
    pub fn normalize(err: &NormalizeError) -> Self {
        let hint = match err {
            NormalizeError::UnsupportedFormat(_) => Some(
                "supported: .csv, .xlsx, .xls, .xlsm, .xlsb, .ods, .db, .sqlite, .sqlite3".to_string(),
            ),
            NormalizeError::Io(msg) if msg.contains("fields") => {
                Some("check the delimiter with --delimiter".to_string())
            }
            _ => None,
        };
        Self { code: normalize_exit_code(err), message: err.to_string(), hint }
    }

    /// Suppress the stderr message (the reply was already printed)
    pub fn silent(self) -> Self {
        Self { message: String::new(), hint: None, ..self }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Normalization options from settings, with command-line flags taking precedence
fn normalize_options(settings: &Settings, input: &InputArgs) -> Result<NormalizeOptions, CliError> {
    let delimiter = match input.delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => {
            return Err(CliError::args(format!("delimiter must be a single ASCII character, got '{}'", c)))
        }
        None => settings.csv_delimiter_byte(),
    };

    Ok(NormalizeOptions {
        csv: CsvOptions {
            delimiter,
            infer_types: settings.csv_infer_types && !input.no_infer,
        },
    })
}

fn context_options(settings: &Settings, sample_rows: Option<usize>) -> ContextOptions {
    ContextOptions { sample_rows: sample_rows.unwrap_or(settings.context_sample_rows) }
}

/// Upload `path` into a fresh workspace
fn upload(
    settings: &Settings,
    input: &InputArgs,
) -> Result<(Workspace, Result<DatasetToken, NormalizeError>), CliError> {
    let mut workspace = Workspace::with_options(normalize_options(settings, input)?);
    let result = workspace.upload(&input.file);
    if let Err(e) = &result {
        log::debug!("{} failed to load ({})", input.file.display(), e.kind());
    }
    Ok((workspace, result))
}

fn uploaded<'a>(
    workspace: &'a Workspace,
    result: Result<DatasetToken, NormalizeError>,
) -> Result<&'a DatasetCollection, CliError> {
    let token = result.map_err(|e| CliError::normalize(&e))?;
    workspace
        .get(&token)
        .ok_or_else(|| CliError::output(format!("upload {} is missing from the workspace", token)))
}

fn cmd_inspect(
    settings: &Settings,
    input: InputArgs,
    as_json: bool,
    compact: bool,
    output: Option<PathBuf>,
    rows: usize,
) -> Result<(), CliError> {
    let (workspace, result) = upload(settings, &input)?;

    // In JSON mode a failed load is reported as a reply object on stdout
    // so that callers always get parseable output.
    if as_json {
        if let Err(e) = &result {
            let reply = Reply::from_upload(&result);
            let text = serde_json::to_string(&reply).map_err(|e| CliError::output(e.to_string()))?;
            println!("{}", text);
            return Err(CliError::normalize(e).silent());
        }
    }

    let collection = uploaded(&workspace, result)?;
    let pretty = settings.pretty_json && !compact;

    if let Some(path) = output {
        write_json(collection, &path, pretty)?;
        eprintln!("wrote {} tables to {}", collection.len(), path.display());
        return Ok(());
    }

    if as_json {
        let text = json::to_string(collection, pretty).map_err(CliError::output)?;
        println!("{}", text);
    } else {
        print!("{}", preview::render_collection(collection, rows));
    }
    Ok(())
}

fn write_json(collection: &DatasetCollection, path: &Path, pretty: bool) -> Result<(), CliError> {
    json::export(collection, path, pretty).map_err(|e| {
        CliError::output(format!("cannot write {}: {}", path.display(), e))
            .with_hint("check that the output directory exists")
    })
}

fn cmd_context(settings: &Settings, input: InputArgs, sample_rows: Option<usize>) -> Result<(), CliError> {
    let (workspace, result) = upload(settings, &input)?;
    let collection = uploaded(&workspace, result)?;

    print!("{}", render_context(collection, &context_options(settings, sample_rows)));
    Ok(())
}

fn cmd_prompt(
    settings: &Settings,
    input: InputArgs,
    query: String,
    sample_rows: Option<usize>,
) -> Result<(), CliError> {
    if query.trim().is_empty() {
        return Err(CliError::args("query is empty"));
    }

    let (workspace, result) = upload(settings, &input)?;
    let collection = uploaded(&workspace, result)?;

    print!("{}", render_prompt(&query, collection, &context_options(settings, sample_rows)));
    Ok(())
}
