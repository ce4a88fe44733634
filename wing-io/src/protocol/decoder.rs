//! Command decoder
//!
//! Opcode-dispatched state machine over the demuxed control channel. The
//! decoder keeps two pieces of state per connection: the current-node
//! cursor (set by `0xD7` on the wire) and the last known [`NodeData`] per
//! node id. Every value-carrying opcode applies to the cursor's entry;
//! an event is produced only when the change-detecting setter reports an
//! actual change, so repeated broadcasts of the same value stay quiet.
//!
//! Bytes demuxed onto channels other than the control channel are skipped
//! here, in one place, so the opcode machine never observes them.

use crate::error::{Error, Result};
use crate::protocol::constants::{
    CONTROL_CHANNEL, MAX_DEFINITION_BYTES, OP_CLICK, OP_EMPTY_STRING, OP_FAST_NAME_BASE,
    OP_FAST_NAME_END, OP_FLOAT, OP_FLOAT_ALT, OP_GOTO_ROOT, OP_GO_UP, OP_INT16, OP_INT32,
    OP_LONG_STRING, OP_NODE_DEFINITION, OP_NODE_INDEX, OP_REQUEST_DATA, OP_REQUEST_DEFINITION,
    OP_REQUEST_END, OP_SELECT_NODE, OP_SHORT_STRING_BASE, OP_SMALL_INT_MAX, OP_STEP,
};
use crate::protocol::demux::ChannelDemux;
use crate::protocol::wire::WireRead;
use crate::types::{ConsoleEvent, NodeData, NodeDefinition};
use std::collections::HashMap;

/// Stateful decoder turning raw stream bytes into [`ConsoleEvent`]s
pub struct CommandDecoder {
    demux: ChannelDemux,
    /// Current-node cursor; 0 until the stream selects a node
    cursor: u32,
    /// Last known value per node id, for change detection
    values: HashMap<u32, NodeData>,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self {
            demux: ChannelDemux::new(),
            cursor: 0,
            values: HashMap::new(),
        }
    }

    /// Id the next value opcode would apply to
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Last value seen for a node, if any opcode has touched it
    pub fn value_of(&self, id: u32) -> Option<&NodeData> {
        self.values.get(&id)
    }

    /// Decode until one event is produced.
    ///
    /// Returns `Ok(None)` when the stream ends between commands (orderly
    /// close). A stream that dies inside a definition record is
    /// [`Error::Malformed`]; other errors pass through.
    pub fn next_event<F>(&mut self, mut next_byte: F) -> Result<Option<ConsoleEvent>>
    where
        F: FnMut() -> Result<u8>,
    {
        let mut reader = ChannelReader {
            demux: &mut self.demux,
            next_byte: &mut next_byte,
        };

        loop {
            let op = match reader.read_u8() {
                Ok(op) => op,
                Err(Error::ConnectionClosed) => return Ok(None),
                Err(e) => return Err(e),
            };

            match op {
                0x00..=OP_SMALL_INT_MAX => {
                    if let Some(ev) = apply_int(&mut self.values, self.cursor, op as i32) {
                        return Ok(Some(ev));
                    }
                }
                0x40..=0x7F => {
                    log::debug!("Console requested fast node index {}", op - 0x40 + 1);
                }
                OP_SHORT_STRING_BASE..=0xBF => {
                    let len = (op - OP_SHORT_STRING_BASE + 1) as usize;
                    let bytes = reader.read_bytes(len)?;
                    let s = String::from_utf8_lossy(&bytes).into_owned();
                    if let Some(ev) = apply_string(&mut self.values, self.cursor, s) {
                        return Ok(Some(ev));
                    }
                }
                OP_FAST_NAME_BASE..=OP_FAST_NAME_END => {
                    log::debug!("Console requested fast node name {}", op - OP_FAST_NAME_BASE + 1);
                }
                OP_EMPTY_STRING => {
                    if let Some(ev) = apply_string(&mut self.values, self.cursor, String::new()) {
                        return Ok(Some(ev));
                    }
                }
                OP_LONG_STRING => {
                    let len = reader.read_u8()? as usize + 1;
                    let bytes = reader.read_bytes(len)?;
                    let s = String::from_utf8_lossy(&bytes).into_owned();
                    if let Some(ev) = apply_string(&mut self.values, self.cursor, s) {
                        return Ok(Some(ev));
                    }
                }
                OP_NODE_INDEX => {
                    let index = reader.read_u16()?;
                    log::debug!("Console reported node index {}", index as u32 + 1);
                }
                OP_INT16 => {
                    let v = reader.read_u16()? as i32;
                    if let Some(ev) = apply_int(&mut self.values, self.cursor, v) {
                        return Ok(Some(ev));
                    }
                }
                OP_INT32 => {
                    let v = reader.read_i32()?;
                    if let Some(ev) = apply_int(&mut self.values, self.cursor, v) {
                        return Ok(Some(ev));
                    }
                }
                OP_FLOAT | OP_FLOAT_ALT => {
                    let v = reader.read_f32()?;
                    if let Some(ev) = apply_float(&mut self.values, self.cursor, v) {
                        return Ok(Some(ev));
                    }
                }
                OP_SELECT_NODE => {
                    self.cursor = reader.read_u32()?;
                    log::trace!("Cursor moved to node {:#010x}", self.cursor);
                }
                OP_CLICK => {
                    log::debug!("Console sent click notification");
                }
                OP_STEP => {
                    let step = reader.read_u8()? as i8;
                    log::debug!("Console sent step notification: {}", step);
                }
                OP_GOTO_ROOT => {
                    log::debug!("Console requested tree traversal to root");
                }
                OP_GO_UP => {
                    log::debug!("Console requested tree traversal up one level");
                }
                OP_REQUEST_DATA => {
                    log::debug!("Console requested node data");
                }
                OP_REQUEST_DEFINITION => {
                    log::debug!("Console requested current node definition");
                }
                OP_REQUEST_END => {
                    return Ok(Some(ConsoleEvent::RequestEnd));
                }
                OP_NODE_DEFINITION => {
                    let def = read_definition(&mut reader)?;
                    return Ok(Some(ConsoleEvent::NodeDefinition(def)));
                }
                _ => {
                    log::warn!("Received unknown opcode: {:#04x}", op);
                }
            }
        }
    }
}

impl Default for CommandDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one length-prefixed definition record.
///
/// The record body must arrive whole: an end-of-stream inside it is a
/// protocol failure, not an orderly close.
fn read_definition<R: WireRead>(reader: &mut R) -> Result<NodeDefinition> {
    let mut len = reader.read_u16()? as usize;
    if len == 0 {
        len = reader.read_u32()? as usize;
    }
    if len > MAX_DEFINITION_BYTES {
        return Err(Error::Malformed(format!(
            "implausible definition record length {}",
            len
        )));
    }

    let body = match reader.read_bytes(len) {
        Ok(body) => body,
        Err(Error::ConnectionClosed) => {
            return Err(Error::Malformed(
                "stream closed inside definition record".to_string(),
            ))
        }
        Err(e) => return Err(e),
    };

    NodeDefinition::from_record(&body)
}

fn apply_int(values: &mut HashMap<u32, NodeData>, cursor: u32, v: i32) -> Option<ConsoleEvent> {
    let entry = values.entry(cursor).or_default();
    entry.set_int(v).then(|| ConsoleEvent::NodeData {
        id: cursor,
        data: entry.clone(),
    })
}

fn apply_float(values: &mut HashMap<u32, NodeData>, cursor: u32, v: f32) -> Option<ConsoleEvent> {
    let entry = values.entry(cursor).or_default();
    entry.set_float(v).then(|| ConsoleEvent::NodeData {
        id: cursor,
        data: entry.clone(),
    })
}

fn apply_string(values: &mut HashMap<u32, NodeData>, cursor: u32, s: String) -> Option<ConsoleEvent> {
    let entry = values.entry(cursor).or_default();
    entry.set_string(s).then(|| ConsoleEvent::NodeData {
        id: cursor,
        data: entry.clone(),
    })
}

/// Demux reader pinned to the control channel
struct ChannelReader<'a, F> {
    demux: &'a mut ChannelDemux,
    next_byte: &'a mut F,
}

impl<F> WireRead for ChannelReader<'_, F>
where
    F: FnMut() -> Result<u8>,
{
    fn read_u8(&mut self) -> Result<u8> {
        loop {
            let (channel, byte) = self.demux.next_pair(&mut *self.next_byte)?;
            if channel == CONTROL_CHANNEL {
                return Ok(byte);
            }
            log::trace!("Skipping byte {:#04x} on channel {}", byte, channel);
        }
    }
}
