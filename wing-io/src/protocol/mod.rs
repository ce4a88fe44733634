//! WING console wire protocol
//!
//! The console multiplexes up to 14 logical channels onto one TCP stream
//! with a single escape byte (`0xDF`), then speaks a compact one-byte
//! command vocabulary on channel 2. This module owns every layer of that
//! stack below the connection object:
//!
//! - [`constants`]: framing bytes, opcode map, timing constants
//! - [`demux`]: escape-byte channel demultiplexer
//! - [`wire`]: big-endian value codec over demuxed bytes
//! - [`decoder`]: opcode-dispatched command decoder with the current-node
//!   cursor
//! - [`encoder`]: frame builders for set/get/traversal operations

pub mod constants;
pub mod decoder;
pub mod demux;
pub mod encoder;
pub mod wire;
