//! xlsx2qif command line tool
//!
//! ディレクトリ内のスプレッドシートを変換し、`result.qif`を書き込みます。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rust_decimal::Decimal;
use tracing::{debug, error, info, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use xlsx2qif::{
    parse_amount, ConversionReport, ConverterBuilder, DateFormat, ProgressObserver, Row,
    XlsxToQifError, DEFAULT_EXTENSION,
};

/// Convert bank statement spreadsheets into a QIF file.
///
/// Every sheet of every spreadsheet in INPUT_DIR is read. The first row of each sheet is a
/// header; the following rows are read as column A = date, B = label, C = amount.
#[derive(Debug, Parser)]
#[command(name = "xlsx2qif", version)]
struct Args {
    /// Directory containing the spreadsheet exports.
    #[arg(env = "XLSX2QIF_INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory where result.qif is written. Defaults to INPUT_DIR.
    #[arg(long, short, env = "XLSX2QIF_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// The amount column holds running balances instead of transaction amounts.
    #[arg(long, env = "XLSX2QIF_BALANCES")]
    balances: bool,

    /// Starting balance, emitted as an "Initial Amount" transaction when non-zero.
    /// The amount is written in normalized form ("-1 250,50" becomes "-1250.5").
    #[arg(
        long,
        env = "XLSX2QIF_INITIAL_AMOUNT",
        default_value = "0",
        allow_hyphen_values = true,
        value_parser = parse_initial_amount
    )]
    initial_amount: Decimal,

    /// Date format of the D lines: "short" (DD/MM/YYYY), "iso" (YYYY-MM-DD) or a chrono
    /// format string such as "%m/%d/%Y".
    #[arg(long, env = "XLSX2QIF_DATE_FORMAT", default_value = "short")]
    date_format: String,

    /// Extension of the spreadsheet files to convert.
    #[arg(long, env = "XLSX2QIF_EXTENSION", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Print a JSON summary of the conversion on stdout.
    #[arg(long)]
    json: bool,

    /// The minimum logging level. Overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

fn parse_initial_amount(value: &str) -> Result<Decimal, String> {
    parse_amount(value).ok_or_else(|| format!("'{value}' is not a decimal amount"))
}

fn parse_date_format(value: &str) -> DateFormat {
    match value {
        "short" => DateFormat::ShortDate,
        "iso" => DateFormat::Iso8601,
        custom => DateFormat::Custom(custom.to_string()),
    }
}

/// Logs each spreadsheet as it is opened.
#[derive(Debug, Default)]
struct LogProgress {
    rows: usize,
}

impl ProgressObserver for LogProgress {
    fn file_started(&mut self, path: &Path, index: usize, total: usize) {
        info!("[{}/{}] reading {}", index + 1, total, path.display());
    }

    fn row_extracted(&mut self, row: &Row) {
        self.rows += 1;
        trace!("{} {:?} {}", row.date(), row.label(), row.amount());
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level);
    debug!("Log level set to {}", args.log_level.to_string().to_lowercase());

    match main_inner(&args) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("Unable to serialize the report: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!(
                    "Converted {} transactions ({} to {}) -> {}",
                    report.rows,
                    report.first_date,
                    report.last_date,
                    report.output_path.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn main_inner(args: &Args) -> Result<ConversionReport, XlsxToQifError> {
    trace!("{args:?}");

    let converter = ConverterBuilder::new()
        .only_transactions(!args.balances)
        .with_initial_amount(args.initial_amount)
        .with_date_format(parse_date_format(&args.date_format))
        .with_extension(args.extension.clone())
        .build()?;

    let mut progress = LogProgress::default();
    let report = converter.convert_directory_with_progress(
        &args.input_dir,
        args.output_dir.as_ref(),
        &mut progress,
    )?;
    debug!("{} rows extracted", progress.rows);

    Ok(report)
}

/// 失敗の種類ごとの終了コード
fn exit_code(error: &XlsxToQifError) -> u8 {
    match error {
        XlsxToQifError::Config(_) => 2,
        XlsxToQifError::NoInputFiles { .. } => 3,
        XlsxToQifError::EmptyExtraction => 4,
        XlsxToQifError::Parse(_)
        | XlsxToQifError::Sheet { .. }
        | XlsxToQifError::InvalidDate { .. }
        | XlsxToQifError::InvalidAmount { .. } => 5,
        XlsxToQifError::Persistence { .. } => 6,
        XlsxToQifError::EmptyOutput | XlsxToQifError::Io(_) => 1,
    }
}

fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // RUST_LOG does not exist; use the requested level for this crate only.
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["xlsx2qif", "statements"]).unwrap();
        assert_eq!(args.input_dir, PathBuf::from("statements"));
        assert!(!args.balances);
        assert_eq!(args.initial_amount, Decimal::ZERO);
        assert_eq!(args.extension, "xlsx");
        assert_eq!(parse_date_format(&args.date_format), DateFormat::ShortDate);
    }

    #[test]
    fn test_parse_negative_initial_amount() {
        let args = Args::try_parse_from([
            "xlsx2qif",
            "statements",
            "--balances",
            "--initial-amount",
            "-1 250,50",
        ])
        .unwrap();
        assert!(args.balances);
        assert_eq!(args.initial_amount, Decimal::new(-125050, 2));
    }

    #[test]
    fn test_parse_invalid_initial_amount() {
        let result =
            Args::try_parse_from(["xlsx2qif", "statements", "--initial-amount", "lots"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_date_format() {
        assert_eq!(parse_date_format("iso"), DateFormat::Iso8601);
        assert_eq!(
            parse_date_format("%m/%d/%Y"),
            DateFormat::Custom("%m/%d/%Y".to_string())
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(exit_code(&XlsxToQifError::EmptyExtraction), 4);
        assert_eq!(
            exit_code(&XlsxToQifError::NoInputFiles {
                dir: PathBuf::from("x"),
                extension: "xlsx".to_string()
            }),
            3
        );
    }
}
