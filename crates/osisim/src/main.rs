mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use tracing::debug;

use crate::cmd::version::{BUILD_TARGET, LONG_VERSION};
use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

const EXIT_CODES: &str = "\
Exit codes:
  0    success, payload delivered
  1    failure (unreadable input or output file)
  60   data invalid: deframing or integrity check failed
  64   usage or configuration error
  125  internal error";

/// Send a payload through framing, error control, modulation and a noisy
/// channel, then recover it on the other side.
#[derive(Parser, Debug)]
#[command(name = "osisim", version, long_version = LONG_VERSION, after_help = EXIT_CODES)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        build_target = BUILD_TARGET,
        "osisim starting"
    );

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
