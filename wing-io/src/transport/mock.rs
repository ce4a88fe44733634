//! Mock transport for testing

use super::Transport;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted step on the mock's read side.
enum ReadStep {
    Data(VecDeque<u8>),
    Timeout,
}

/// Mock transport for unit testing
///
/// Clones share the same buffers, so a cloned handle stands in for the
/// write half of a connection exactly as a `try_clone`d TCP stream does.
/// When the read script runs dry the mock reports end-of-stream, which the
/// reader treats as the console closing the session.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    script: VecDeque<ReadStep>,
    write_buffer: Vec<u8>,
    shutdown: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                script: VecDeque::new(),
                write_buffer: Vec::new(),
                shutdown: false,
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.script.push_back(ReadStep::Data(data.iter().copied().collect()));
    }

    /// Inject a receive timeout before whatever is scripted next
    pub fn inject_timeout(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.script.push_back(ReadStep::Timeout);
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        let inner = self.inner.lock().unwrap();
        inner.write_buffer.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.clear();
    }

    /// Whether `shutdown` was called on any handle
    pub fn is_shutdown(&self) -> bool {
        self.inner.lock().unwrap().shutdown
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            match inner.script.front_mut() {
                None => return Ok(0),
                Some(ReadStep::Timeout) => {
                    inner.script.pop_front();
                    return Err(Error::Timeout);
                }
                Some(ReadStep::Data(bytes)) => {
                    if bytes.is_empty() {
                        inner.script.pop_front();
                        continue;
                    }
                    let available = bytes.len().min(buffer.len());
                    for item in buffer.iter_mut().take(available) {
                        *item = bytes.pop_front().unwrap();
                    }
                    return Ok(available);
                }
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.shutdown {
            return Err(Error::Closed);
        }
        inner.write_buffer.extend_from_slice(data);
        Ok(())
    }

    fn try_clone(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(self.clone()))
    }

    fn shutdown(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown = true;
        inner.script.clear();
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
