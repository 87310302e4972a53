use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use ipmiprims_message::{
    ChannelAuthCapabilitiesRequest, ChannelAuthCapabilitiesResponse, Request,
};
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::{Result, TransportError};
use crate::rmcp::{decode_packet, encode_packet, LanMessage};
use crate::traits::Transport;

/// Largest datagram accepted from the device.
const MAX_DATAGRAM: usize = 1024;

/// Tuning for the native LAN backend.
#[derive(Debug, Clone)]
pub struct LanConfig {
    /// How long to wait for each reply.
    pub timeout: Duration,
    /// Resends after a timed-out attempt.
    pub retries: u32,
}

impl Default for LanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 1,
        }
    }
}

/// Session-less IPMI v1.5 over UDP.
///
/// `open` connects a socket and probes the device with Get Channel
/// Authentication Capabilities, which needs no session.
#[derive(Debug)]
pub struct LanTransport {
    connection: Connection,
    config: LanConfig,
    socket: Option<UdpSocket>,
    sequence: u8,
}

impl LanTransport {
    pub fn new(connection: Connection) -> Self {
        Self::with_config(connection, LanConfig::default())
    }

    pub fn with_config(connection: Connection, config: LanConfig) -> Self {
        Self {
            connection,
            config,
            socket: None,
            sequence: 0,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn config(&self) -> &LanConfig {
        &self.config
    }

    fn remote_addr(&self) -> Result<SocketAddr> {
        let host = self.connection.hostname.as_str();
        let port = self.connection.port_or_default();
        (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                TransportError::Io(std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("no address for {host}:{port}"),
                ))
            })
    }

    fn connect(&self) -> Result<UdpSocket> {
        let remote = self.remote_addr()?;
        let local: SocketAddr = if remote.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(remote)?;
        socket.set_read_timeout(Some(self.config.timeout))?;
        debug!(%remote, local = ?socket.local_addr().ok(), "udp socket connected");
        Ok(socket)
    }

    fn next_sequence(&mut self) -> u8 {
        self.sequence = (self.sequence + 1) & 0x3f;
        self.sequence
    }

    fn probe(&mut self) -> Result<()> {
        let request = Request::from(ChannelAuthCapabilitiesRequest::default());
        let mut response = ChannelAuthCapabilitiesResponse::default();
        self.send(&request, &mut response)?;
        debug!(
            channel = response.channel_number,
            auth_none = response.supports_auth_none(),
            "device answered capability probe"
        );
        Ok(())
    }
}

impl Transport for LanTransport {
    fn open(&mut self) -> Result<()> {
        if self.socket.is_some() {
            return Ok(());
        }
        self.socket = Some(self.connect()?);
        if let Err(err) = self.probe() {
            self.socket = None;
            return Err(err);
        }
        info!(
            host = %self.connection.hostname,
            port = self.connection.port_or_default(),
            "lan session-less channel open"
        );
        Ok(())
    }

    fn exchange(&mut self, request: &Request) -> Result<Bytes> {
        if self.socket.is_none() {
            return Err(TransportError::NotOpen);
        }
        let data = request.encode_payload()?;
        let sequence = self.next_sequence();
        let outgoing = LanMessage::request(
            request.network_function(),
            request.command(),
            sequence,
            data,
        );
        let mut packet = BytesMut::new();
        encode_packet(&outgoing, &mut packet)?;

        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;
        let mut buf = [0u8; MAX_DATAGRAM];
        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                warn!(attempt, sequence, "no reply from device, resending");
            }
            socket.send(&packet)?;
            debug!(
                netfn = %request.network_function(),
                cmd = %request.command(),
                sequence,
                len = packet.len(),
                "request sent"
            );

            if let Some(data) = receive_reply(socket, &outgoing, self.config.timeout, &mut buf)? {
                return Ok(data);
            }
        }
        Err(TransportError::Timeout(
            self.config.timeout * (self.config.retries + 1),
        ))
    }

    fn close(&mut self) -> Result<()> {
        if self.socket.take().is_some() {
            info!(host = %self.connection.hostname, "lan channel closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }
}

/// Wait up to `timeout` for the reply to `request`.
///
/// Undecodable datagrams and replies to other requests (late answers to an
/// earlier attempt or command) are dropped. `None` means the deadline passed.
fn receive_reply(
    socket: &UdpSocket,
    request: &LanMessage,
    timeout: Duration,
    buf: &mut [u8],
) -> Result<Option<Bytes>> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        socket.set_read_timeout(Some(remaining))?;
        let n = match socket.recv(buf) {
            Ok(n) => n,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let reply = match decode_packet(&buf[..n]) {
            Ok(reply) => reply,
            Err(err) => {
                debug!(error = %err, len = n, "discarding undecodable datagram");
                continue;
            }
        };
        if let Err(err) = check_reply(request, &reply) {
            debug!(error = %err, sequence = reply.sequence, "discarding unmatched reply");
            continue;
        }
        return Ok(Some(reply.data));
    }
}

fn check_reply(request: &LanMessage, reply: &LanMessage) -> Result<()> {
    let expected_netfn = request.network_function | 0x01;
    if reply.network_function != expected_netfn {
        return Err(TransportError::Protocol(format!(
            "reply netfn 0x{:02x}, expected 0x{expected_netfn:02x}",
            reply.network_function
        )));
    }
    if reply.command != request.command {
        return Err(TransportError::Protocol(format!(
            "reply command 0x{:02x}, expected 0x{:02x}",
            reply.command, request.command
        )));
    }
    if reply.sequence != request.sequence {
        return Err(TransportError::Protocol(format!(
            "reply sequence {}, expected {}",
            reply.sequence, request.sequence
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ipmiprims_message::{Command, NetworkFunction};

    use super::*;

    #[test]
    fn default_config() {
        let config = LanConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retries, 1);
    }

    #[test]
    fn sequence_wraps_at_six_bits() {
        let mut transport = LanTransport::new(Connection::new("127.0.0.1", "admin", ""));
        transport.sequence = 0x3f;
        assert_eq!(transport.next_sequence(), 0);
        assert_eq!(transport.next_sequence(), 1);
    }

    #[test]
    fn mismatched_replies_are_protocol_errors() {
        let request = LanMessage::request(
            NetworkFunction::App,
            Command::GET_DEVICE_ID,
            3,
            Bytes::new(),
        );
        let good = request.response(Bytes::from_static(&[0x00]));
        assert!(check_reply(&request, &good).is_ok());

        let mut wrong_seq = good.clone();
        wrong_seq.sequence = 4;
        assert!(matches!(
            check_reply(&request, &wrong_seq),
            Err(TransportError::Protocol(_))
        ));

        let mut wrong_cmd = good;
        wrong_cmd.command = 0x02;
        assert!(matches!(
            check_reply(&request, &wrong_cmd),
            Err(TransportError::Protocol(_))
        ));
    }

    #[test]
    fn send_before_open_is_rejected() {
        let mut transport = LanTransport::new(Connection::new("127.0.0.1", "admin", ""));
        let req = Request::raw(NetworkFunction::App, 0x01, Vec::new());
        assert!(matches!(
            transport.exchange(&req),
            Err(TransportError::NotOpen)
        ));
        assert!(transport.close().is_ok());
    }
}
