//! Command-line converter: one XLSX sheet to CSV.
//!
//! Usage:
//!   xlsx2csv report.xlsx                 # first sheet, `;`-separated, to stdout
//!   xlsx2csv -i 2 -d , -o out.csv in.xlsx

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{Level, LevelFilter, Log, Metadata, Record};

use xlsx2csv::export::{convert_file, CsvOptions};
use xlsx2csv::Result;

#[derive(Parser, Debug)]
#[command(name = "xlsx2csv")]
#[command(about = "Convert one sheet of an XLSX file to CSV")]
#[command(version)]
struct Args {
    /// Output file, `-` for stdout
    #[arg(short = 'o', long, default_value = "-")]
    output: String,

    /// Zero-based index of the sheet to convert
    #[arg(short = 'i', long = "sheet", default_value_t = 0)]
    sheet: usize,

    /// Maximum number of rows to write, 0 for all
    #[arg(short = 'l', long, default_value_t = 0)]
    limit: usize,

    /// Leave out rows without any cell
    #[arg(short = 'c', long)]
    compact: bool,

    /// Field delimiter (first character is used)
    #[arg(short = 'd', long, default_value = ";")]
    delimiter: String,

    /// Write only non-empty cells instead of padding every row
    #[arg(short = 's', long)]
    skip_empty_cells: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// The XLSX file to read
    file: PathBuf,
}

/// Writes log records to stderr; filtering is left to `log::max_level`.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let tag = match record.level() {
                Level::Error => "error",
                Level::Warn => "warning",
                Level::Info => "info",
                Level::Debug => "debug",
                Level::Trace => "trace",
            };
            eprintln!("{tag}: {}", record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn run(args: &Args) -> Result<()> {
    let options = CsvOptions {
        compact: args.compact,
        skip_empty_cells: args.skip_empty_cells,
        ..CsvOptions::default()
    }
    .with_delimiter(&args.delimiter)?
    .with_row_limit(args.limit);

    let out: Box<dyn Write> = match args.output.as_str() {
        "" | "-" => Box::new(io::stdout().lock()),
        path => Box::new(File::create(path)?),
    };
    let rows = convert_file(&args.file, args.sheet, BufWriter::new(out), &options)?;
    log::info!("wrote {rows} rows from {}", args.file.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
