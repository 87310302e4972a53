/// Errors that can occur while encoding or decoding IPMI messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// Fewer bytes than the message's declared size.
    #[error("short packet: {message} needs {expected} bytes, got {actual}")]
    ShortPacket {
        message: &'static str,
        expected: usize,
        actual: usize,
    },

    /// More bytes than the message's declared size.
    #[error("long packet: {message} allows {expected} bytes, got {actual}")]
    LongPacket {
        message: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A variable or fixed-width field does not fit its wire slot.
    #[error("{field} is {len} bytes, max {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A field carries a value the message layout forbids.
    #[error("invalid {field}: 0x{value:02x}")]
    InvalidField { field: &'static str, value: u8 },

    /// The network function byte does not name a known class.
    #[error("unknown network function 0x{0:02x}")]
    UnknownNetworkFunction(u8),
}

impl MessageError {
    /// True for the short/long packet conditions.
    pub fn is_malformed_packet(&self) -> bool {
        matches!(
            self,
            MessageError::ShortPacket { .. } | MessageError::LongPacket { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
