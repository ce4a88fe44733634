//! Node-definition records
//!
//! A definition describes one entry of the console's parameter tree: its
//! position (parent, id, sibling index), names, value type, unit, and the
//! type-dependent bounds or enum members. On the wire the record arrives as
//! a length-prefixed body inside opcode `0xDF`; [`NodeDefinition::from_record`]
//! parses that body once the decoder has buffered it.

use crate::error::{Error, Result};
use crate::protocol::constants::{
    FLAG_READ_ONLY_BIT, FLAG_TYPE_MASK, FLAG_TYPE_SHIFT, FLAG_UNIT_MASK,
};
use crate::protocol::wire::WireRead;
use serde::Serialize;

/// Value type of a tree node, from bits 4..7 of the definition flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Node = 0,
    LinearFloat = 1,
    LogarithmicFloat = 2,
    FaderLevel = 3,
    Integer = 4,
    StringEnum = 5,
    FloatEnum = 6,
    String = 7,
}

impl NodeType {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => NodeType::Node,
            1 => NodeType::LinearFloat,
            2 => NodeType::LogarithmicFloat,
            3 => NodeType::FaderLevel,
            4 => NodeType::Integer,
            5 => NodeType::StringEnum,
            6 => NodeType::FloatEnum,
            7 => NodeType::String,
            _ => return None,
        })
    }
}

/// Display unit of a node value, from bits 0..3 of the definition flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeUnit {
    None = 0,
    Db = 1,
    Percent = 2,
    Milliseconds = 3,
    Hertz = 4,
    Meters = 5,
    Seconds = 6,
    Octaves = 7,
}

impl NodeUnit {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => NodeUnit::None,
            1 => NodeUnit::Db,
            2 => NodeUnit::Percent,
            3 => NodeUnit::Milliseconds,
            4 => NodeUnit::Hertz,
            5 => NodeUnit::Meters,
            6 => NodeUnit::Seconds,
            7 => NodeUnit::Octaves,
            _ => return None,
        })
    }

    /// Conventional suffix for display ("dB", "Hz", ...)
    pub fn suffix(&self) -> &'static str {
        match self {
            NodeUnit::None => "",
            NodeUnit::Db => "dB",
            NodeUnit::Percent => "%",
            NodeUnit::Milliseconds => "ms",
            NodeUnit::Hertz => "Hz",
            NodeUnit::Meters => "m",
            NodeUnit::Seconds => "s",
            NodeUnit::Octaves => "oct",
        }
    }
}

/// One member of a string-enum node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringEnumItem {
    pub item: String,
    pub long_item: String,
}

/// One member of a float-enum node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatEnumItem {
    pub item: f32,
    pub long_item: String,
}

/// Metadata record describing one node of the parameter tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDefinition {
    pub parent_id: u32,
    pub id: u32,
    /// Position among siblings
    pub index: u16,
    pub name: String,
    pub long_name: String,
    /// Raw flag word: type in bits 4..7, unit in bits 0..3, read-only bit 8
    pub flags: u16,

    pub min_float: Option<f32>,
    pub max_float: Option<f32>,
    pub steps: Option<u32>,
    pub min_int: Option<i32>,
    pub max_int: Option<i32>,
    pub max_string_len: Option<u16>,
    pub string_enum: Vec<StringEnumItem>,
    pub float_enum: Vec<FloatEnumItem>,
}

impl NodeDefinition {
    pub fn node_type(&self) -> NodeType {
        // from_record rejects codes outside 0..=7, so this cannot miss
        NodeType::from_code(((self.flags >> FLAG_TYPE_SHIFT) & FLAG_TYPE_MASK) as u8)
            .unwrap_or(NodeType::Node)
    }

    pub fn unit(&self) -> NodeUnit {
        NodeUnit::from_code((self.flags & FLAG_UNIT_MASK) as u8).unwrap_or(NodeUnit::None)
    }

    pub fn is_read_only(&self) -> bool {
        (self.flags >> FLAG_READ_ONLY_BIT) & 1 != 0
    }

    /// Parse a definition record body (everything after the length prefix).
    ///
    /// Bytes beyond the parsed fields are tolerated; running out of bytes
    /// mid-field is [`Error::Malformed`].
    pub fn from_record(body: &[u8]) -> Result<Self> {
        let mut r = RecordCursor { data: body, pos: 0 };

        let parent_id = r.read_u32()?;
        let id = r.read_u32()?;
        let index = r.read_u16()?;
        let name = r.read_name()?;
        let long_name = r.read_name()?;
        let flags = r.read_u16()?;

        let type_code = ((flags >> FLAG_TYPE_SHIFT) & FLAG_TYPE_MASK) as u8;
        let node_type = NodeType::from_code(type_code)
            .ok_or_else(|| Error::Malformed(format!("unknown node type code {}", type_code)))?;

        let mut def = NodeDefinition {
            parent_id,
            id,
            index,
            name,
            long_name,
            flags,
            min_float: None,
            max_float: None,
            steps: None,
            min_int: None,
            max_int: None,
            max_string_len: None,
            string_enum: Vec::new(),
            float_enum: Vec::new(),
        };

        match node_type {
            // Fader levels carry no tail on observed firmware, same as
            // plain folder nodes.
            NodeType::Node | NodeType::FaderLevel => {}
            NodeType::String => {
                def.max_string_len = Some(r.read_u16()?);
            }
            NodeType::LinearFloat | NodeType::LogarithmicFloat => {
                def.min_float = Some(r.read_f32()?);
                def.max_float = Some(r.read_f32()?);
                def.steps = Some(r.read_u32()?);
            }
            NodeType::Integer => {
                def.min_int = Some(r.read_i32()?);
                def.max_int = Some(r.read_i32()?);
            }
            NodeType::StringEnum => {
                let count = r.read_u16()?;
                def.string_enum.reserve(count as usize);
                for _ in 0..count {
                    let item = r.read_name()?;
                    let long_item = r.read_name()?;
                    def.string_enum.push(StringEnumItem { item, long_item });
                }
            }
            NodeType::FloatEnum => {
                let count = r.read_u16()?;
                def.float_enum.reserve(count as usize);
                for _ in 0..count {
                    let item = r.read_f32()?;
                    let long_item = r.read_name()?;
                    def.float_enum.push(FloatEnumItem { item, long_item });
                }
            }
        }

        Ok(def)
    }

    /// JSON rendering of the definition, for schema dump tooling
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Multi-line human-readable rendering, for monitors and dump tools
    pub fn describe(&self) -> String {
        use std::fmt::Write;

        let mut out = String::with_capacity(256);
        let _ = write!(out, "Id:        {}", self.id);
        let _ = write!(out, "\nRead-only: {}", if self.is_read_only() { "yes" } else { "no" });
        if self.index != 0 {
            let _ = write!(out, "\nIndex:     {}", self.index);
        }
        if !self.name.is_empty() {
            let _ = write!(out, "\nName:      {}", self.name);
        }
        if !self.long_name.is_empty() {
            let _ = write!(out, "\nLong name: {}", self.long_name);
        }

        let _ = write!(
            out,
            "\nType:      {}",
            match self.node_type() {
                NodeType::Node => "node",
                NodeType::LinearFloat => "linear float",
                NodeType::LogarithmicFloat => "log float",
                NodeType::FaderLevel => "fader level",
                NodeType::Integer => "integer",
                NodeType::StringEnum => "string enum",
                NodeType::FloatEnum => "float enum",
                NodeType::String => "string",
            }
        );
        if self.unit() != NodeUnit::None {
            let _ = write!(out, "\nUnit:      {}", self.unit().suffix());
        }

        if let (Some(min), Some(max)) = (self.min_float, self.max_float) {
            let _ = write!(out, "\nRange:     {} .. {}", min, max);
            if let Some(steps) = self.steps {
                let _ = write!(out, " ({} steps)", steps);
            }
        }
        if let (Some(min), Some(max)) = (self.min_int, self.max_int) {
            let _ = write!(out, "\nRange:     {} .. {}", min, max);
        }
        if let Some(len) = self.max_string_len {
            let _ = write!(out, "\nMax len:   {}", len);
        }
        for item in &self.string_enum {
            let _ = write!(out, "\nItem:      {}", item.item);
            if !item.long_item.is_empty() {
                let _ = write!(out, " ({})", item.long_item);
            }
        }
        for item in &self.float_enum {
            let _ = write!(out, "\nItem:      {}", item.item);
            if !item.long_item.is_empty() {
                let _ = write!(out, " ({})", item.long_item);
            }
        }
        out
    }
}

/// Bounded cursor over a buffered record body
struct RecordCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl RecordCursor<'_> {
    /// u8 length followed by that many bytes of text
    fn read_name(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl WireRead for RecordCursor<'_> {
    fn read_u8(&mut self) -> Result<u8> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::Malformed("definition record truncated".to_string()))?;
        self.pos += 1;
        Ok(byte)
    }
}
