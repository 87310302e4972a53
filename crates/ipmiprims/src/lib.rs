//! IPMI command primitives for talking to baseboard management controllers.
//!
//! ipmiprims encodes IPMI commands with strict length validation and moves
//! them to a BMC over a pluggable transport, either an external `ipmitool`
//! process or session-less IPMI v1.5 over UDP.
//!
//! # Crate Structure
//!
//! - [`message`]: Command codec, request/response envelope, completion codes
//! - [`transport`]: Connection settings, transport trait and backends
//! - [`client`]: Typed command helpers with scoped open/close (behind `client` feature)

/// Re-export message types.
pub mod message {
    pub use ipmiprims_message::*;
}

/// Re-export transport types.
pub mod transport {
    pub use ipmiprims_transport::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use ipmiprims_client::*;
}
