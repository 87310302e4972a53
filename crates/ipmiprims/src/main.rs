mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ConnectionArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ipmiprims", version, about = "IPMI BMC management CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.connection, format);

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
    use crate::cmd::{BootCommand, ChassisCommand, PowerAction, UserCommand};

    #[test]
    fn parses_boot_set_with_global_connection_flags() {
        let cli = Cli::try_parse_from([
            "ipmiprims",
            "boot",
            "set",
            "pxe",
            "--persistent",
            "--host",
            "10.0.0.5",
            "-U",
            "admin",
        ])
        .expect("boot set args should parse");

        assert_eq!(cli.connection.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.connection.user.as_deref(), Some("admin"));
        match cli.command {
            Command::Boot(BootCommand::Set(args)) => {
                assert_eq!(args.device, "pxe");
                assert!(args.persistent);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_power_action() {
        let cli = Cli::try_parse_from(["ipmiprims", "chassis", "power", "cycle"])
            .expect("power args should parse");
        match cli.command {
            Command::Chassis(ChassisCommand::Power(args)) => {
                assert!(matches!(args.action, PowerAction::Cycle));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_raw_bytes() {
        let cli = Cli::try_parse_from(["ipmiprims", "raw", "0x06", "0x46", "0x01"])
            .expect("raw args should parse");
        match cli.command {
            Command::Raw(args) => {
                assert_eq!(args.netfn, 0x06);
                assert_eq!(args.cmd, 0x46);
                assert_eq!(args.data, vec![0x01]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_byte() {
        let err = Cli::try_parse_from(["ipmiprims", "user", "name", "0x1ff"])
            .expect_err("out of range id should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_user_summary_channel() {
        let cli = Cli::try_parse_from(["ipmiprims", "user", "summary", "2", "--channel", "1"])
            .expect("user summary args should parse");
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::Summary(ref args)) if args.id == 2 && args.channel == 1
        ));
    }
}
