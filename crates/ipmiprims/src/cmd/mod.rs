use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use ipmiprims_client::Client;
use ipmiprims_transport::{Connection, LanConfig};
use tracing::debug;

use crate::exit::{client_error, transport_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod boot;
pub mod chassis;
pub mod device;
pub mod options;
pub mod raw;
pub mod user;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show controller identity (Get Device ID).
    DeviceId,
    /// Chassis status and power control.
    #[command(subcommand)]
    Chassis(ChassisCommand),
    /// Read or set the next boot device.
    #[command(subcommand)]
    Boot(BootCommand),
    /// Manage user accounts.
    #[command(subcommand)]
    User(UserCommand),
    /// Send an arbitrary command and print the response bytes.
    Raw(RawArgs),
    /// Print the option list passed to the management utility.
    Options,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::DeviceId => device::run(conn, format),
        Command::Chassis(cmd) => chassis::run(cmd, conn, format),
        Command::Boot(cmd) => boot::run(cmd, conn, format),
        Command::User(cmd) => user::run(cmd, conn, format),
        Command::Raw(args) => raw::run(args, conn, format),
        Command::Options => options::run(conn, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection flags shared by every device command.
///
/// Values come from `--config`, then environment, then flags; later wins.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// JSON file with connection fields.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    /// BMC hostname or address.
    #[arg(long, short = 'H', env = "IPMI_HOST", global = true)]
    pub host: Option<String>,
    /// BMC user name.
    #[arg(long, short = 'U', env = "IPMI_USER", global = true)]
    pub user: Option<String>,
    /// BMC password.
    #[arg(long, env = "IPMI_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
    /// BMC port (0 uses the protocol default).
    #[arg(long, short = 'p', env = "IPMI_PORT", global = true)]
    pub port: Option<u16>,
    /// Interface mode for the management utility (default lanplus).
    #[arg(long, short = 'I', env = "IPMI_INTERFACE", global = true)]
    pub interface: Option<String>,
    /// External management utility; selects the subprocess backend.
    #[arg(long, value_name = "PATH", env = "IPMIPRIMS_TOOL", global = true)]
    pub tool: Option<PathBuf>,
    /// Reply timeout for the native LAN backend (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
    /// Resends after a LAN reply timeout.
    #[arg(long, default_value_t = 1, global = true)]
    pub retries: u32,
}

impl ConnectionArgs {
    pub fn resolve(&self) -> CliResult<Connection> {
        let mut conn = match &self.config {
            Some(path) => Connection::from_json_file(path)
                .map_err(|err| transport_error(&format!("load {}", path.display()), err))?,
            None => Connection::default(),
        };
        if let Some(host) = &self.host {
            conn.hostname = host.clone();
        }
        if let Some(user) = &self.user {
            conn.username = user.clone();
        }
        if let Some(password) = &self.password {
            conn.password = password.clone();
        }
        if let Some(port) = self.port {
            conn.port = port;
        }
        if let Some(interface) = &self.interface {
            conn.interface = interface.clone();
        }
        if let Some(tool) = &self.tool {
            conn.path = Some(tool.clone());
        }
        if conn.hostname.is_empty() {
            return Err(CliError::usage(
                "no BMC host given (use --host, IPMI_HOST or --config)",
            ));
        }
        Ok(conn)
    }

    pub fn lan_config(&self) -> CliResult<LanConfig> {
        Ok(LanConfig {
            timeout: parse_timeout(&self.timeout)?,
            retries: self.retries,
        })
    }

    /// Resolve the connection and open a client on it.
    pub fn connect(&self) -> CliResult<Client> {
        let conn = self.resolve()?;
        debug!(?conn, "connecting");
        Client::connect_with_config(conn, self.lan_config()?)
            .map_err(|err| client_error("open failed", err))
    }
}

#[derive(Subcommand, Debug)]
pub enum ChassisCommand {
    /// Show power and chassis state.
    Status,
    /// Change the power state.
    Power(PowerArgs),
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    pub action: PowerAction,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PowerAction {
    On,
    Off,
    Cycle,
    Reset,
    Diag,
    Soft,
}

#[derive(Subcommand, Debug)]
pub enum BootCommand {
    /// Show the boot flags parameter.
    Get,
    /// Set the next boot device.
    Set(BootSetArgs),
}

#[derive(Args, Debug)]
pub struct BootSetArgs {
    /// Boot device (none, pxe, disk, safe, diag, cdrom, bios, floppy, ...).
    pub device: String,
    /// Keep the selection for all future boots.
    #[arg(long)]
    pub persistent: bool,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show or set a user's name.
    Name(UserNameArgs),
    /// Set a user's password, read from an environment variable.
    Password(UserPasswordArgs),
    /// Enable a user.
    Enable(UserIdArgs),
    /// Show channel user counts and a user's privilege limit.
    Summary(UserSummaryArgs),
}

#[derive(Args, Debug)]
pub struct UserIdArgs {
    #[arg(value_parser = parse_byte)]
    pub id: u8,
}

#[derive(Args, Debug)]
pub struct UserNameArgs {
    #[arg(value_parser = parse_byte)]
    pub id: u8,
    /// New name (at most 16 bytes).
    #[arg(long)]
    pub set: Option<String>,
}

#[derive(Args, Debug)]
pub struct UserPasswordArgs {
    #[arg(value_parser = parse_byte)]
    pub id: u8,
    /// Environment variable holding the new password.
    #[arg(long, value_name = "VAR", default_value = "IPMIPRIMS_NEW_PASSWORD")]
    pub password_env: String,
}

#[derive(Args, Debug)]
pub struct UserSummaryArgs {
    #[arg(value_parser = parse_byte)]
    pub id: u8,
    /// Channel number (0x0e is the current channel).
    #[arg(long, value_parser = parse_byte, default_value = "0x0e")]
    pub channel: u8,
}

#[derive(Args, Debug)]
pub struct RawArgs {
    /// Network function (e.g. 0x06).
    #[arg(value_parser = parse_byte)]
    pub netfn: u8,
    /// Command code (e.g. 0x01).
    #[arg(value_parser = parse_byte)]
    pub cmd: u8,
    /// Request data bytes.
    #[arg(value_parser = parse_byte)]
    pub data: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte as `0x`-prefixed hex or decimal.
pub fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid byte value: {input}"))
}

fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
