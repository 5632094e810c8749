use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokenest_report_xlsx::{
    ReportError, XlsxReportWriter, derive_default_report_options, load_payload, render_report,
    write_report,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser, Debug)]
#[command(
    name = "tokenest-report",
    version,
    about = "Render token-estimation report payloads to XLSX"
)]
struct Cli {
    #[arg(long, help = "Path to the JSON report payload")]
    input: PathBuf,
    #[arg(
        long,
        required_unless_present = "dry_run",
        help = "Path of the XLSX workbook to write"
    )]
    output: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = false,
        help = "Build the workbook in memory without writing a file"
    )]
    dry_run: bool,
    #[arg(
        long,
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter used when RUST_LOG is unset"
    )]
    log_level: String,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), ReportError> {
    let options = derive_default_report_options();
    let payload = load_payload(&cli.input)?;
    debug!(input = %cli.input.display(), kind = %payload.kind(), "payload loaded");

    let report = match (&cli.output, cli.dry_run) {
        (Some(path_file_out), false) => {
            let report = write_report(&payload, path_file_out, &options)?;
            info!(output = %path_file_out.display(), "workbook written");
            report
        }
        _ => {
            // Same writer as a real run, serialized to a buffer instead of a file.
            let mut writer =
                XlsxReportWriter::new(cli.output.clone().unwrap_or_default(), &options.formats);
            let report = render_report(&payload, &mut writer, &options)?;
            let buf = writer.save_to_buffer()?;
            println!(
                "[DRY-RUN] sheets={} bytes={} (nothing written)",
                writer.sheet_count(),
                buf.len()
            );
            report
        }
    };

    println!("{report}");
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
