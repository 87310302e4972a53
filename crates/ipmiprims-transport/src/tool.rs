//! Subprocess backend driving an external management utility (`ipmitool`).
//!
//! Every command is a one-shot `raw` invocation:
//!
//! ```text
//! <utility> -H <host> -U <user> -I <interface|lanplus> -E [-p <port>] raw <netfn> <cmd> <data...>
//! ```
//!
//! The password travels in the `IPMI_PASSWORD` environment variable (`-E`),
//! never on the command line.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use bytes::{BufMut, Bytes, BytesMut};
use ipmiprims_message::{CompletionCode, Request};
use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Utility looked up on `PATH` when the connection names none.
pub const DEFAULT_TOOL: &str = "ipmitool";

/// Environment variable read by the utility's `-E` flag.
pub const PASSWORD_ENV: &str = "IPMI_PASSWORD";

/// Build the order-stable option list for `connection`.
///
/// Host, user, interface (defaulted), the environment-password flag, then
/// the port only when nonzero.
pub fn options(connection: &Connection) -> Vec<String> {
    let mut opts = vec![
        "-H".to_string(),
        connection.hostname.clone(),
        "-U".to_string(),
        connection.username.clone(),
        "-I".to_string(),
        connection.interface_or_default().to_string(),
        "-E".to_string(),
    ];
    if connection.port != 0 {
        opts.push("-p".to_string());
        opts.push(connection.port.to_string());
    }
    opts
}

/// Subprocess transport. `open` resolves the utility; nothing runs until
/// the first `send`.
#[derive(Debug)]
pub struct ToolTransport {
    connection: Connection,
    resolved: Option<PathBuf>,
}

impl ToolTransport {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            resolved: None,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn options(&self) -> Vec<String> {
        options(&self.connection)
    }

    /// Utility resolved by the last successful `open`.
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved.as_deref()
    }

    fn configured_path(&self) -> &Path {
        self.connection
            .tool_path()
            .unwrap_or_else(|| Path::new(DEFAULT_TOOL))
    }

    fn raw_args(&self, request: &Request, data: &[u8]) -> Vec<String> {
        let mut args = self.options();
        args.reserve(3 + data.len());
        args.push("raw".to_string());
        args.push(format!("0x{:02x}", request.network_function().as_u8()));
        args.push(format!("0x{:02x}", request.command().as_u8()));
        args.extend(data.iter().map(|byte| format!("0x{byte:02x}")));
        args
    }
}

impl Transport for ToolTransport {
    fn open(&mut self) -> Result<()> {
        let path = resolve(self.configured_path())?;
        info!(path = %path.display(), host = %self.connection.hostname, "management utility ready");
        self.resolved = Some(path);
        Ok(())
    }

    fn exchange(&mut self, request: &Request) -> Result<Bytes> {
        let path = self.resolved.as_ref().ok_or(TransportError::NotOpen)?;
        let data = request.encode_payload()?;
        let args = self.raw_args(request, &data);

        debug!(
            path = %path.display(),
            netfn = %request.network_function(),
            cmd = %request.command(),
            len = data.len(),
            "invoking management utility"
        );

        let output = Command::new(path)
            .args(&args)
            .env(PASSWORD_ENV, &self.connection.password)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| TransportError::Spawn {
                path: path.clone(),
                source,
            })?;

        if output.status.success() {
            let data = parse_hex_bytes(&String::from_utf8_lossy(&output.stdout))?;
            let mut reply = BytesMut::with_capacity(1 + data.len());
            reply.put_u8(0x00);
            reply.put_slice(&data);
            return Ok(reply.freeze());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(code) = parse_completion_code(&stderr) {
            debug!(code = %CompletionCode(code), "utility reported completion code");
            return Ok(Bytes::copy_from_slice(&[code]));
        }
        Err(TransportError::ToolFailed {
            path: path.clone(),
            status: output.status,
            stderr: stderr.trim().to_string(),
        })
    }

    fn close(&mut self) -> Result<()> {
        if self.resolved.take().is_some() {
            debug!("management utility released");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Resolve `path` to an executable file. Bare names are searched on `PATH`.
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.components().count() > 1 {
        return if is_executable(path) {
            Ok(path.to_path_buf())
        } else {
            Err(TransportError::ToolNotFound {
                path: path.to_path_buf(),
            })
        };
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(path))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| TransportError::ToolNotFound {
            path: path.to_path_buf(),
        })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Parse whitespace-separated hex bytes as printed by `ipmitool raw`.
fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    text.split_whitespace()
        .map(|token| {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty() || digits.len() > 2 {
                return Err(TransportError::InvalidToolOutput(token.to_string()));
            }
            u8::from_str_radix(digits, 16)
                .map_err(|_| TransportError::InvalidToolOutput(token.to_string()))
        })
        .collect()
}

/// Extract the completion code from an `rsp=0xNN` failure report.
fn parse_completion_code(stderr: &str) -> Option<u8> {
    let start = stderr.find("rsp=0x")? + "rsp=0x".len();
    let digits: String = stderr[start..]
        .chars()
        .take_while(char::is_ascii_hexdigit)
        .take(2)
        .collect();
    u8::from_str_radix(&digits, 16).ok()
}
