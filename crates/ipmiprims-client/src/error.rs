use ipmiprims_message::CompletionCode;
use ipmiprims_transport::{ErrorKind, TransportError};

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A single command failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A step of a multi-command sequence failed.
    #[error("{step} failed: {source}")]
    Sequence {
        step: &'static str,
        source: TransportError,
    },
}

impl ClientError {
    fn transport(&self) -> &TransportError {
        match self {
            ClientError::Transport(err) | ClientError::Sequence { source: err, .. } => err,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.transport().kind()
    }

    pub fn completion_code(&self) -> Option<CompletionCode> {
        self.transport().completion_code()
    }
}

impl From<ipmiprims_message::MessageError> for ClientError {
    fn from(err: ipmiprims_message::MessageError) -> Self {
        ClientError::Transport(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
