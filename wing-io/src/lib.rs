//! wing-io - Client library for the WING digital mixing console
//!
//! The console exposes its whole parameter tree over a TCP protocol on
//! port 2222: an escape-byte channel framing ("NRP") carrying a compact
//! one-byte command vocabulary. This library speaks that protocol:
//!
//! - discover consoles on the local network (UDP broadcast)
//! - connect and stay connected (channel handshake + keep-alive)
//! - stream value changes and node definitions as typed events
//! - write values and request tree enumeration
//!
//! ```no_run
//! use wing_io::{Console, ConsoleEvent};
//!
//! # fn main() -> wing_io::Result<()> {
//! let mut console = Console::connect_first()?;
//! console.request_node_data(0)?;
//!
//! while let Some(event) = console.next_event()? {
//!     match event {
//!         ConsoleEvent::NodeData { id, data } => println!("{:>10} = {}", id, data),
//!         ConsoleEvent::NodeDefinition(def) => println!("{}", def.describe()),
//!         ConsoleEvent::RequestEnd => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The semantic meaning of individual parameters is out of scope: ids are
//! opaque handles, and the [`schema`] table maps them to path names when a
//! generated table for the firmware is available.

pub mod config;
pub mod console;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod schema;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConnectOptions, DiscoveryOptions};
pub use console::{Console, ConsoleHandler, ConsoleWriter};
pub use discovery::DiscoveryInfo;
pub use error::{Error, Result};
pub use types::{ConsoleEvent, NodeData, NodeDefinition, NodeType, NodeUnit};
