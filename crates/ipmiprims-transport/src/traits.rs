use bytes::Bytes;
use ipmiprims_message::{Request, Response};
use tracing::debug;

use crate::error::Result;

/// Lifecycle contract shared by every backend.
///
/// States are `closed -> open() -> open -> close() -> closed`. A transport
/// owns its channel exclusively and serves one `send` at a time.
pub trait Transport {
    /// Acquire the underlying channel. Safe to retry after a failure.
    fn open(&mut self) -> Result<()>;

    /// Move one encoded request to the device and return the raw reply,
    /// completion code first.
    fn exchange(&mut self, request: &Request) -> Result<Bytes>;

    /// Release the channel. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Exchange `request` and decode the reply into `response`.
    ///
    /// `response` is only assigned once the reply decodes. A nonzero
    /// completion code is stored and then returned as a device failure.
    fn send<R: Response>(&mut self, request: &Request, response: &mut R) -> Result<()>
    where
        Self: Sized,
    {
        let reply = self.exchange(request)?;
        let decoded = R::decode(&reply)?;
        let code = decoded.completion_code();
        *response = decoded;
        debug!(
            netfn = %request.network_function(),
            cmd = %request.command(),
            code = %code,
            "command completed"
        );
        code.check()?;
        Ok(())
    }
}
