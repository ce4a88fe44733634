//! TCP transport implementation

use super::Transport;
use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// TCP transport for the console command channel
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to a console.
    ///
    /// # Arguments
    /// * `addr` - host and port (e.g., "192.168.1.40:2222")
    /// * `recv_timeout` - receive timeout; also the keep-alive period
    /// * `nodelay` - disable Nagle batching for low-latency writes
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        recv_timeout: Duration,
        nodelay: bool,
    ) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(recv_timeout))?;
        stream.set_nodelay(nodelay)?;

        log::info!(
            "Connected to console at {} (timeout {:?})",
            stream.peer_addr()?,
            recv_timeout
        );

        Ok(TcpTransport { stream })
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.stream.read(buffer) {
            Ok(n) => Ok(n),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Err(Error::Timeout)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)?;
        Ok(())
    }

    fn try_clone(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(TcpTransport {
            stream: self.stream.try_clone()?,
        }))
    }

    fn shutdown(&mut self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already torn down by the peer; nothing left to do.
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
