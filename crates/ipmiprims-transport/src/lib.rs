//! IPMI transport abstraction.
//!
//! A [`Transport`] moves encoded commands to one management controller:
//! - [`ToolTransport`] runs an external utility (`ipmitool raw`) per command
//! - [`LanTransport`] speaks session-less IPMI v1.5 over UDP
//!
//! [`new_transport`] picks the backend from the [`Connection`].

pub mod backend;
pub mod connection;
pub mod error;
pub mod lan;
pub mod rmcp;
pub mod tool;
pub mod traits;

pub use backend::{new_transport, new_transport_with_config, Backend};
pub use connection::{Connection, DEFAULT_INTERFACE, DEFAULT_PORT};
pub use error::{ErrorKind, Result, TransportError};
pub use lan::{LanConfig, LanTransport};
pub use tool::{options, ToolTransport, DEFAULT_TOOL, PASSWORD_ENV};
pub use traits::Transport;
