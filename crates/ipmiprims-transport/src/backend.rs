use bytes::Bytes;
use ipmiprims_message::Request;

use crate::connection::Connection;
use crate::error::Result;
use crate::lan::{LanConfig, LanTransport};
use crate::tool::ToolTransport;
use crate::traits::Transport;

/// Backend chosen for a [`Connection`].
#[derive(Debug)]
pub enum Backend {
    /// One `ipmitool raw` invocation per command.
    Tool(ToolTransport),
    /// Session-less IPMI v1.5 over UDP.
    Lan(LanTransport),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Tool(_) => "tool",
            Backend::Lan(_) => "lan",
        }
    }
}

/// Select a backend from the connection: a configured utility path selects
/// the subprocess backend, anything else the native LAN backend.
pub fn new_transport(connection: Connection) -> Backend {
    new_transport_with_config(connection, LanConfig::default())
}

/// Like [`new_transport`], with explicit LAN tuning.
pub fn new_transport_with_config(connection: Connection, config: LanConfig) -> Backend {
    if connection.uses_tool() {
        Backend::Tool(ToolTransport::new(connection))
    } else {
        Backend::Lan(LanTransport::with_config(connection, config))
    }
}

impl Transport for Backend {
    fn open(&mut self) -> Result<()> {
        match self {
            Backend::Tool(inner) => inner.open(),
            Backend::Lan(inner) => inner.open(),
        }
    }

    fn exchange(&mut self, request: &Request) -> Result<Bytes> {
        match self {
            Backend::Tool(inner) => inner.exchange(request),
            Backend::Lan(inner) => inner.exchange(request),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            Backend::Tool(inner) => inner.close(),
            Backend::Lan(inner) => inner.close(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            Backend::Tool(inner) => inner.is_open(),
            Backend::Lan(inner) => inner.is_open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utility_path_selects_subprocess_backend() {
        let conn = Connection::new("bmc", "admin", "pw").with_path("/usr/bin/ipmitool");
        assert_eq!(new_transport(conn).name(), "tool");
    }

    #[test]
    fn missing_or_empty_path_selects_lan_backend() {
        let conn = Connection::new("bmc", "admin", "pw");
        assert_eq!(new_transport(conn.clone()).name(), "lan");
        assert_eq!(new_transport(conn.with_path("")).name(), "lan");
    }

    #[test]
    fn new_backend_starts_closed() {
        let backend = new_transport(Connection::new("bmc", "admin", "pw"));
        assert!(!backend.is_open());
    }
}
