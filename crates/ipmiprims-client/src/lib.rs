//! Typed IPMI command helpers over any transport.
//!
//! A [`Client`] owns one open [`Transport`](ipmiprims_transport::Transport)
//! and exposes the common management operations (device identity, chassis
//! power, boot device, user accounts) plus a generic `send` for everything
//! else. The transport is closed when the client is closed or dropped.

pub mod client;
pub mod error;

pub use client::Client;
pub use error::{ClientError, Result};
