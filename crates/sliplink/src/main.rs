mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sliplink", version, about = "SLIP link-layer CLI")]
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

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
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
        let cli = Cli::try_parse_from([
            "sliplink",
            "send",
            "--link",
            "192.168.200.2=/dev/ttyUSB0",
            "--link",
            "192.168.201.2=/dev/ttyUSB1",
            "--to",
            "192.168.201.2",
            "--hex",
            "450000c0",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(args.links.links.len(), 2);
        assert_eq!(args.to.as_str(), "192.168.201.2");
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from(["sliplink", "encode", "--data", "hi", "--hex", "6869"])
            .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn listen_requires_a_link() {
        let err = Cli::try_parse_from(["sliplink", "listen"]).expect_err("missing --link");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_malformed_link_spec() {
        let err = Cli::try_parse_from(["sliplink", "listen", "--link", "/dev/ttyUSB0"])
            .expect_err("malformed --link should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
