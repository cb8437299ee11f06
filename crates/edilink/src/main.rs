mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "edilink", version, about = "EDI host link client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format.
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Send trace/debug/info lines to stdout; warnings and errors stay on stderr.
    #[arg(long, global = true)]
    split_log_streams: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.split_log_streams);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["edilink", "send", "edihost:30001", "--data", "HELLO"])
            .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "edilink",
            "send",
            "edihost:30001",
            "--data",
            "HELLO",
            "--file",
            "/tmp/order.edi",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_recv_subcommand() {
        let cli = Cli::try_parse_from([
            "edilink",
            "recv",
            "edihost:30001",
            "--count",
            "3",
            "--exact",
            "--timeout",
            "5s",
        ])
        .expect("recv args should parse");
        assert!(matches!(cli.command, Command::Recv(_)));
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "edilink",
            "probe",
            "edihost:30001",
            "--format",
            "json",
            "--log-level",
            "error",
            "--split-log-streams",
        ])
        .expect("probe args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(cli.split_log_streams);
    }
}
