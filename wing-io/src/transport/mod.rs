//! Transport layer for I/O abstraction

use crate::error::Result;

mod mock;
mod tcp;

pub use mock::MockTransport;
pub use tcp::TcpTransport;

/// Transport trait for console communication
///
/// The read side and the write side of a connection run independently (the
/// reader blocks while keep-alives and parameter writes go out), so every
/// transport must hand out additional handles via [`Transport::try_clone`].
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read.
    ///
    /// Returns `Ok(0)` on orderly end-of-stream and
    /// [`Error::Timeout`](crate::Error::Timeout) when the receive timeout
    /// elapses with no data.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer. A short write is a hard failure.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Create another handle onto the same underlying connection.
    fn try_clone(&self) -> Result<Box<dyn Transport>>;

    /// Shut down both directions of the connection.
    fn shutdown(&mut self) -> Result<()>;
}
