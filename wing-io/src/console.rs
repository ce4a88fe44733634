//! Console connection and event loop
//!
//! # Connection Model
//!
//! One [`Console`] owns one TCP session and runs single-threaded: the read
//! loop is the only consumer of the socket's receive side and the only
//! producer of events. Writes travel over separate handles cloned from the
//! same socket, so a callback (or another thread) can push parameter
//! changes while the reader blocks.
//!
//! ```text
//! socket rx ──▶ ByteSource ──▶ demux ──▶ CommandDecoder ──▶ events
//! caller    ──▶ ConsoleWriter ─────────────────────────▶ socket tx
//! ```
//!
//! # Keep-Alive
//!
//! The console drops sessions that stay silent, so whenever the byte
//! source is about to block (and again on every receive timeout) it
//! re-sends the two-byte channel select. The 7-second period doubles as
//! the receive timeout, which keeps the liveness check running even when
//! the console itself has nothing to say.
//!
//! # Shutdown
//!
//! [`ConsoleWriter::close`] (or dropping the [`Console`]) shuts the socket
//! down in both directions. A reader blocked in [`Console::next_event`]
//! then observes a transport error, which is reported as an orderly end of
//! stream rather than a failure.

use crate::config::{ConnectOptions, DiscoveryOptions};
use crate::discovery::{self, DiscoveryInfo};
use crate::error::{Error, Result};
use crate::protocol::constants::{CONTROL_HANDSHAKE, RX_BUFFER_SIZE};
use crate::protocol::decoder::CommandDecoder;
use crate::protocol::encoder;
use crate::transport::{TcpTransport, Transport};
use crate::types::{ConsoleEvent, NodeData, NodeDefinition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback sink for [`Console::run`]
///
/// All methods have empty defaults; implement only what you listen to.
/// Callbacks run synchronously on the reader thread, so they must not
/// block on reader-side operations; encoder-side operations through a
/// [`ConsoleWriter`] are fine.
pub trait ConsoleHandler {
    fn on_node_data(&mut self, _id: u32, _data: &NodeData) {}
    fn on_node_definition(&mut self, _def: &NodeDefinition) {}
    fn on_request_end(&mut self) {}
}

/// Periodic channel-select sender keeping the session alive
struct KeepAlive {
    tx: Box<dyn Transport>,
    last: Instant,
    period: Duration,
}

impl KeepAlive {
    fn tick(&mut self) -> Result<()> {
        if self.last.elapsed() > self.period {
            log::trace!("Sending keep-alive channel select");
            self.tx.write_all(&CONTROL_HANDSHAKE)?;
            self.last = Instant::now();
        }
        Ok(())
    }
}

/// Buffered blocking byte reader over the connection's receive side
struct ByteSource {
    rx: Box<dyn Transport>,
    keep_alive: KeepAlive,
    closed: Arc<AtomicBool>,
    buf: [u8; RX_BUFFER_SIZE],
    tail: usize,
    len: usize,
}

impl ByteSource {
    fn next_byte(&mut self) -> Result<u8> {
        loop {
            if self.len > 0 {
                let byte = self.buf[self.tail];
                self.tail += 1;
                self.len -= 1;
                return Ok(byte);
            }

            // About to block: give the keep-alive a chance first.
            if let Err(e) = self.keep_alive.tick() {
                return Err(self.map_closed(e));
            }

            match self.rx.read(&mut self.buf) {
                Ok(0) => return Err(Error::ConnectionClosed),
                Ok(n) => {
                    self.tail = 0;
                    self.len = n;
                }
                Err(Error::Timeout) => continue,
                Err(e) => return Err(self.map_closed(e)),
            }
        }
    }

    /// A transport error after `close()` is the expected way for the
    /// reader to learn about the shutdown, not a failure.
    fn map_closed(&self, e: Error) -> Error {
        if self.closed.load(Ordering::Relaxed) {
            Error::ConnectionClosed
        } else {
            e
        }
    }
}

/// Encoder-side handle: parameter writes, tree requests, close
///
/// Obtained from [`Console::writer`]; additional handles come from
/// [`ConsoleWriter::try_clone`]. Each frame goes out in a single write.
pub struct ConsoleWriter {
    tx: Box<dyn Transport>,
    closed: Arc<AtomicBool>,
}

impl ConsoleWriter {
    /// Another writer onto the same connection
    pub fn try_clone(&self) -> Result<ConsoleWriter> {
        Ok(ConsoleWriter {
            tx: self.tx.try_clone()?,
            closed: Arc::clone(&self.closed),
        })
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(Error::Closed);
        }
        self.tx.write_all(frame)
    }

    /// Write an integer value to a node
    pub fn set_int(&mut self, id: u32, value: i32) -> Result<()> {
        log::debug!("Set node {:#010x} = {}", id, value);
        self.send(&encoder::set_int(id, value))
    }

    /// Write a float value to a node
    pub fn set_float(&mut self, id: u32, value: f32) -> Result<()> {
        log::debug!("Set node {:#010x} = {}", id, value);
        self.send(&encoder::set_float(id, value))
    }

    /// Write a string value to a node (up to 256 bytes)
    pub fn set_string(&mut self, id: u32, value: &str) -> Result<()> {
        log::debug!("Set node {:#010x} = {:?}", id, value);
        let frame = encoder::set_string(id, value)?;
        self.send(&frame)
    }

    /// Ask the console to report a node's current value (0 = whole tree)
    pub fn request_node_data(&mut self, id: u32) -> Result<()> {
        self.send(&encoder::request_node_data(id))
    }

    /// Ask the console for a node's definition record (0 = tree root)
    pub fn request_node_definition(&mut self, id: u32) -> Result<()> {
        self.send(&encoder::request_node_definition(id))
    }

    /// Shut the connection down in both directions.
    ///
    /// Idempotent; every handle on the connection reports
    /// [`Error::Closed`] afterwards and a blocked reader unwinds cleanly.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed.swap(true, Ordering::Relaxed) {
            log::info!("Closing console connection");
            self.tx.shutdown()?;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

/// A live connection to a console
///
/// # Examples
///
/// ```no_run
/// use wing_io::{Console, ConsoleEvent};
///
/// # fn main() -> wing_io::Result<()> {
/// let mut console = Console::connect("192.168.1.40")?;
/// console.request_node_data(0)?;
///
/// while let Some(event) = console.next_event()? {
///     if let ConsoleEvent::NodeData { id, data } = event {
///         println!("{:#010x} = {}", id, data);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Console {
    source: ByteSource,
    decoder: CommandDecoder,
    writer: ConsoleWriter,
}

impl Console {
    /// Scan the local network for consoles
    pub fn discover(stop_on_first: bool) -> Result<Vec<DiscoveryInfo>> {
        let options = DiscoveryOptions {
            stop_on_first,
            ..DiscoveryOptions::default()
        };
        discovery::scan(&options)
    }

    /// Connect to a console by IP address with default options
    pub fn connect(ip: &str) -> Result<Self> {
        Self::connect_with(ip, &ConnectOptions::default())
    }

    /// Connect to a console by IP address
    pub fn connect_with(ip: &str, options: &ConnectOptions) -> Result<Self> {
        let period = Duration::from_secs(options.keep_alive_secs);
        let transport = TcpTransport::connect((ip, options.port), period, options.nodelay)?;
        Self::over(Box::new(transport), period)
    }

    /// Discover consoles and connect to the first one found
    pub fn connect_first() -> Result<Self> {
        let found = Self::discover(true)?;
        let info = found.first().ok_or_else(|| {
            Error::DiscoveryParse("no console answered the discovery probe".to_string())
        })?;
        log::info!("Auto-connecting to {} at {}", info.name, info.ip);
        Self::connect(&info.ip)
    }

    /// Build a connection over an already-open transport.
    ///
    /// Sends the channel-select handshake before returning, exactly as the
    /// TCP constructors do. Mainly useful with
    /// [`MockTransport`](crate::transport::MockTransport) in tests.
    pub fn over(transport: Box<dyn Transport>, keep_alive_period: Duration) -> Result<Self> {
        let keep_alive_tx = transport.try_clone()?;
        let writer_tx = transport.try_clone()?;
        let closed = Arc::new(AtomicBool::new(false));

        let mut writer = ConsoleWriter {
            tx: writer_tx,
            closed: Arc::clone(&closed),
        };
        writer.send(&CONTROL_HANDSHAKE)?;

        Ok(Console {
            source: ByteSource {
                rx: transport,
                keep_alive: KeepAlive {
                    tx: keep_alive_tx,
                    last: Instant::now(),
                    period: keep_alive_period,
                },
                closed,
                buf: [0; RX_BUFFER_SIZE],
                tail: 0,
                len: 0,
            },
            decoder: CommandDecoder::new(),
            writer,
        })
    }

    /// Block until the next event, or `None` on orderly close.
    ///
    /// Unknown opcodes and traffic on foreign channels are consumed
    /// silently; [`Error::Malformed`] means the stream can no longer be
    /// trusted and the connection should be dropped.
    pub fn next_event(&mut self) -> Result<Option<ConsoleEvent>> {
        let Console {
            source, decoder, ..
        } = self;
        decoder.next_event(|| source.next_byte())
    }

    /// Blocking event loop, delivering every event to `handler` until the
    /// console closes the session.
    pub fn run(&mut self, handler: &mut dyn ConsoleHandler) -> Result<()> {
        while let Some(event) = self.next_event()? {
            match event {
                ConsoleEvent::NodeData { id, data } => handler.on_node_data(id, &data),
                ConsoleEvent::NodeDefinition(def) => handler.on_node_definition(&def),
                ConsoleEvent::RequestEnd => handler.on_request_end(),
            }
        }
        log::info!("Console closed the session");
        Ok(())
    }

    /// Encoder-side handle usable from callbacks or other threads
    pub fn writer(&self) -> Result<ConsoleWriter> {
        self.writer.try_clone()
    }

    /// Last value the stream reported for a node, if any
    pub fn value_of(&self, id: u32) -> Option<&NodeData> {
        self.decoder.value_of(id)
    }

    /// See [`ConsoleWriter::set_int`]
    pub fn set_int(&mut self, id: u32, value: i32) -> Result<()> {
        self.writer.set_int(id, value)
    }

    /// See [`ConsoleWriter::set_float`]
    pub fn set_float(&mut self, id: u32, value: f32) -> Result<()> {
        self.writer.set_float(id, value)
    }

    /// See [`ConsoleWriter::set_string`]
    pub fn set_string(&mut self, id: u32, value: &str) -> Result<()> {
        self.writer.set_string(id, value)
    }

    /// See [`ConsoleWriter::request_node_data`]
    pub fn request_node_data(&mut self, id: u32) -> Result<()> {
        self.writer.request_node_data(id)
    }

    /// See [`ConsoleWriter::request_node_definition`]
    pub fn request_node_definition(&mut self, id: u32) -> Result<()> {
        self.writer.request_node_definition(id)
    }

    /// See [`ConsoleWriter::close`]
    pub fn close(&mut self) -> Result<()> {
        self.writer.close()
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        if !self.writer.is_closed() {
            let _ = self.writer.close();
        }
    }
}
