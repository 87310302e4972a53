use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use ipmiprims_message::{CompletionCode, CompletionError, MessageError};

/// Errors that can occur while exchanging commands with a device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be encoded or the reply could not be decoded.
    #[error(transparent)]
    Message(#[from] MessageError),

    /// The device answered with a nonzero completion code.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// `send` was called before `open` or after `close`.
    #[error("transport is not open")]
    NotOpen,

    /// The configured management utility does not exist or is not executable.
    #[error("management utility not found: {path}")]
    ToolNotFound { path: PathBuf },

    /// The management utility could not be started.
    #[error("failed to run {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The management utility exited unsuccessfully without a completion code.
    #[error("{path} failed ({status}): {stderr}")]
    ToolFailed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// The management utility printed something other than response bytes.
    #[error("unexpected management utility output: {0:?}")]
    InvalidToolOutput(String),

    /// An I/O error occurred on the underlying channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply arrived in time.
    #[error("no response after {0:?}")]
    Timeout(Duration),

    /// The device replied with a frame that does not match the request.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Connection settings could not be parsed.
    #[error("invalid connection config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Coarse classification of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Short/long packet or an unencodable field.
    Malformed,
    /// Nonzero completion code reported by the device.
    Device,
    /// The channel could not be opened, written, read or closed.
    Transport,
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Message(_) => ErrorKind::Malformed,
            TransportError::Completion(_) => ErrorKind::Device,
            _ => ErrorKind::Transport,
        }
    }

    /// The device-reported completion code, if this is a device failure.
    pub fn completion_code(&self) -> Option<CompletionCode> {
        match self {
            TransportError::Completion(err) => Some(err.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classifies_variants() {
        let short = TransportError::from(MessageError::ShortPacket {
            message: "test",
            expected: 2,
            actual: 1,
        });
        assert_eq!(short.kind(), ErrorKind::Malformed);

        let device = TransportError::from(CompletionError {
            code: CompletionCode::INVALID_COMMAND,
        });
        assert_eq!(device.kind(), ErrorKind::Device);
        assert_eq!(device.completion_code(), Some(CompletionCode(0xc1)));
        assert_eq!(device.to_string(), "invalid command (code=0xc1)");

        assert_eq!(TransportError::NotOpen.kind(), ErrorKind::Transport);
        assert_eq!(TransportError::NotOpen.completion_code(), None);
    }
}
