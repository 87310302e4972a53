//! IPMI v1.5 LAN framing for session-less requests.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┬───────────────────────────────────┐
//! │ RMCP (4B)    │ Session (10B)                │ IPMI message (len B)              │
//! │ 06 00 ff 07  │ auth, seq u32, id u32, len   │ rsAddr netFn/LUN cs rqAddr        │
//! │              │ (auth NONE, little-endian)   │ rqSeq/LUN cmd data... cs          │
//! └──────────────┴──────────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! Requests and responses share the message shape; only the roles of the
//! two addresses swap.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ipmiprims_message::{Command, MessageError, NetworkFunction};

use crate::error::{Result, TransportError};

pub const RMCP_VERSION: u8 = 0x06;
pub const RMCP_SEQ_NO_ACK: u8 = 0xff;
pub const RMCP_CLASS_IPMI: u8 = 0x07;
pub const AUTH_TYPE_NONE: u8 = 0x00;

/// Responder address of the BMC.
pub const BMC_ADDRESS: u8 = 0x20;
/// Requester address used by remote console software.
pub const REMOTE_SOFTWARE_ID: u8 = 0x81;

const RMCP_HEADER: [u8; 4] = [RMCP_VERSION, 0x00, RMCP_SEQ_NO_ACK, RMCP_CLASS_IPMI];

/// RMCP header plus session header.
pub const HEADER_SIZE: usize = 14;

/// Message bytes around the data: addresses, netFn, seq, cmd, checksums.
const MESSAGE_OVERHEAD: usize = 7;

/// Largest data field that fits the one-byte message length.
pub const MAX_DATA_LEN: usize = u8::MAX as usize - MESSAGE_OVERHEAD;

/// One IPMI message as carried over LAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanMessage {
    pub target_address: u8,
    /// Raw six-bit network function; odd for responses.
    pub network_function: u8,
    pub target_lun: u8,
    pub source_address: u8,
    /// Six-bit requester sequence number.
    pub sequence: u8,
    pub source_lun: u8,
    pub command: u8,
    /// For responses, the completion code followed by response data.
    pub data: Bytes,
}

impl LanMessage {
    /// A request from remote software to the BMC.
    pub fn request(
        network_function: NetworkFunction,
        command: Command,
        sequence: u8,
        data: Bytes,
    ) -> Self {
        Self {
            target_address: BMC_ADDRESS,
            network_function: network_function.as_u8(),
            target_lun: 0,
            source_address: REMOTE_SOFTWARE_ID,
            sequence: sequence & 0x3f,
            source_lun: 0,
            command: command.as_u8(),
            data,
        }
    }

    /// The reply to this request, addressed back to the requester.
    pub fn response(&self, data: Bytes) -> Self {
        Self {
            target_address: self.source_address,
            network_function: self.network_function | 0x01,
            target_lun: self.source_lun,
            source_address: self.target_address,
            sequence: self.sequence,
            source_lun: self.target_lun,
            command: self.command,
            data,
        }
    }
}

/// Two's-complement checksum: the bytes plus the checksum sum to zero.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b))
        .wrapping_neg()
}

/// Encode `msg` as a complete UDP datagram.
pub fn encode_packet(msg: &LanMessage, dst: &mut BytesMut) -> Result<()> {
    if msg.data.len() > MAX_DATA_LEN {
        return Err(MessageError::FieldTooLong {
            field: "lan message data",
            len: msg.data.len(),
            max: MAX_DATA_LEN,
        }
        .into());
    }
    let len = MESSAGE_OVERHEAD + msg.data.len();
    dst.reserve(HEADER_SIZE + len);

    dst.put_slice(&RMCP_HEADER);
    dst.put_u8(AUTH_TYPE_NONE);
    dst.put_u32_le(0); // session sequence
    dst.put_u32_le(0); // session id
    dst.put_u8(len as u8);

    let head = [
        msg.target_address,
        (msg.network_function << 2) | (msg.target_lun & 0x03),
    ];
    dst.put_slice(&head);
    dst.put_u8(checksum(&head));

    let start = dst.len();
    dst.put_u8(msg.source_address);
    dst.put_u8((msg.sequence << 2) | (msg.source_lun & 0x03));
    dst.put_u8(msg.command);
    dst.put_slice(&msg.data);
    let tail = checksum(&dst[start..]);
    dst.put_u8(tail);
    Ok(())
}

/// Decode one datagram, validating headers, length and both checksums.
///
/// The message length must account for every byte after the session header.
pub fn decode_packet(src: &[u8]) -> Result<LanMessage> {
    if src.len() < HEADER_SIZE {
        return Err(protocol(format!(
            "datagram of {} bytes is shorter than the {HEADER_SIZE}-byte header",
            src.len()
        )));
    }
    if src[..4] != RMCP_HEADER {
        return Err(protocol(format!("unexpected RMCP header {:02x?}", &src[..4])));
    }

    let mut buf = &src[4..];
    let auth_type = buf.get_u8();
    if auth_type != AUTH_TYPE_NONE {
        return Err(protocol(format!("unsupported auth type 0x{auth_type:02x}")));
    }
    let _session_seq = buf.get_u32_le();
    let _session_id = buf.get_u32_le();
    let len = usize::from(buf.get_u8());

    if len < MESSAGE_OVERHEAD || buf.len() != len {
        return Err(protocol(format!(
            "message length {len} does not match {} remaining bytes",
            buf.len()
        )));
    }
    let msg = &buf[..len];

    if checksum(&msg[..2]) != msg[2] {
        return Err(protocol("header checksum mismatch".to_string()));
    }
    if checksum(&msg[3..len - 1]) != msg[len - 1] {
        return Err(protocol("data checksum mismatch".to_string()));
    }

    Ok(LanMessage {
        target_address: msg[0],
        network_function: msg[1] >> 2,
        target_lun: msg[1] & 0x03,
        source_address: msg[3],
        sequence: msg[4] >> 2,
        source_lun: msg[4] & 0x03,
        command: msg[5],
        data: Bytes::copy_from_slice(&msg[6..len - 1]),
    })
}

fn protocol(message: String) -> TransportError {
    TransportError::Protocol(message)
}
