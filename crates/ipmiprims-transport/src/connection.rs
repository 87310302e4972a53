use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Interface mode substituted when none is configured.
pub const DEFAULT_INTERFACE: &str = "lanplus";

/// RMCP port used when the configured port is 0.
pub const DEFAULT_PORT: u16 = 623;

/// How to reach one management controller.
///
/// Passed by value to a transport and never mutated afterwards. A non-empty
/// `path` selects the subprocess backend; otherwise the native LAN backend
/// is used.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Connection {
    pub hostname: String,
    /// 0 means the protocol default.
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Empty means the protocol default.
    pub interface: String,
    /// External management utility.
    pub path: Option<PathBuf>,
}

impl Connection {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Load a connection from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Whether an external utility is configured.
    pub fn uses_tool(&self) -> bool {
        self.tool_path().is_some()
    }

    /// The configured utility, ignoring an empty path.
    pub fn tool_path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Interface mode with the default substituted.
    pub fn interface_or_default(&self) -> &str {
        if self.interface.is_empty() {
            DEFAULT_INTERFACE
        } else {
            &self.interface
        }
    }

    /// Port with the default substituted.
    pub fn port_or_default(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_empty() {
                    "<empty>"
                } else {
                    "<redacted>"
                },
            )
            .field("interface", &self.interface)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let conn = Connection::new("bmc.example", "admin", "hunter2");
        let rendered = format!("{conn:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn defaults_are_substituted() {
        let conn = Connection::new("bmc", "admin", "pw");
        assert_eq!(conn.interface_or_default(), "lanplus");
        assert_eq!(conn.port_or_default(), 623);
        assert!(!conn.uses_tool());

        let conn = conn.with_port(1623).with_interface("lan").with_path("");
        assert_eq!(conn.interface_or_default(), "lan");
        assert_eq!(conn.port_or_default(), 1623);
        assert!(!conn.uses_tool());
    }

    #[test]
    fn deserializes_partial_json() {
        let conn: Connection = serde_json::from_str(
            r#"{"hostname":"10.0.0.5","username":"admin","password":"pw","path":"/usr/bin/ipmitool"}"#,
        )
        .expect("connection json should parse");
        assert_eq!(conn.port, 0);
        assert!(conn.interface.is_empty());
        assert_eq!(conn.tool_path(), Some(Path::new("/usr/bin/ipmitool")));

        let err = serde_json::from_str::<Connection>(r#"{"hostnam":"x"}"#);
        assert!(err.is_err());
    }
}
