//! Constants for the WING console wire protocol (NRP framing + command set)

// NRP framing
pub const NRP_ESCAPE: u8 = 0xDF; // escape byte; never data unless stuffed
pub const NRP_ESCAPED_LITERAL: u8 = 0xDE; // ESC + this = literal 0xDF data byte
pub const NRP_CHANNEL_BASE: u8 = 0xD0; // ESC + (base + n) switches to channel n
pub const NRP_NUM_CHANNELS: u8 = 14;

/// Channel the console emits parameter traffic on. Bytes demuxed onto any
/// other channel are skipped by the command decoder.
pub const CONTROL_CHANNEL: u8 = 2;

/// Exact channel-select frame sent at connect time and as the keep-alive.
pub const CONTROL_HANDSHAKE: [u8; 2] = [NRP_ESCAPE, 0xD1];

// Command opcodes (single demuxed data byte each)
pub const OP_SMALL_INT_MAX: u8 = 0x3F; // 0x00..=0x3F: literal small int
pub const OP_FAST_INDEX_BASE: u8 = 0x40; // 0x40..=0x7F: fast node index request
pub const OP_SHORT_STRING_BASE: u8 = 0x80; // 0x80..=0xBF: string, len = op - 0x7F
pub const OP_SHORT_STRING_MAX_LEN: usize = 64;
pub const OP_FAST_NAME_BASE: u8 = 0xC0; // 0xC0..=0xCF: fast node name request
pub const OP_FAST_NAME_END: u8 = 0xCF;
pub const OP_EMPTY_STRING: u8 = 0xD0;
pub const OP_LONG_STRING: u8 = 0xD1; // u8 len-1, then len bytes (65..=256)
pub const OP_LONG_STRING_MAX_LEN: usize = 256;
pub const OP_NODE_INDEX: u8 = 0xD2; // u16, informational
pub const OP_INT16: u8 = 0xD3; // u16 value
pub const OP_INT32: u8 = 0xD4; // i32 value
pub const OP_FLOAT: u8 = 0xD5; // f32 value
pub const OP_FLOAT_ALT: u8 = 0xD6; // firmware alias of OP_FLOAT
pub const OP_SELECT_NODE: u8 = 0xD7; // u32 id, sets the decoder cursor
pub const OP_CLICK: u8 = 0xD8; // informational
pub const OP_STEP: u8 = 0xD9; // i8 step, informational
pub const OP_GOTO_ROOT: u8 = 0xDA; // traversal
pub const OP_GO_UP: u8 = 0xDB; // traversal
pub const OP_REQUEST_DATA: u8 = 0xDC;
pub const OP_REQUEST_DEFINITION: u8 = 0xDD;
pub const OP_REQUEST_END: u8 = 0xDE;
pub const OP_NODE_DEFINITION: u8 = 0xDF; // length-prefixed record follows

// Node-definition flag layout
pub const FLAG_TYPE_SHIFT: u16 = 4; // bits 4..7
pub const FLAG_TYPE_MASK: u16 = 0x0F;
pub const FLAG_UNIT_MASK: u16 = 0x0F; // bits 0..3
pub const FLAG_READ_ONLY_BIT: u16 = 8;

/// Upper bound on a definition record body; anything larger is treated as
/// stream corruption rather than allocated.
pub const MAX_DEFINITION_BYTES: usize = 1 << 20;

// Networking
pub const CONSOLE_PORT: u16 = 2222; // TCP command channel and UDP discovery
pub const DISCOVERY_PROBE: &[u8] = b"WING?";
pub const DISCOVERY_PREFIX: &str = "WING";
pub const DISCOVERY_TOKENS: usize = 6; // WING,ip,name,model,serial,firmware

// Timing and sizing
pub const KEEP_ALIVE_SECS: u64 = 7; // also the receive timeout
pub const RX_BUFFER_SIZE: usize = 2048;
pub const DISCOVERY_POLL_MS: u64 = 500;
pub const DISCOVERY_MAX_POLLS: u32 = 10;
