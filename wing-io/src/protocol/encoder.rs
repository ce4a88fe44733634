//! Command frame builders
//!
//! Each operation is rendered into a complete byte frame so a single write
//! puts it on the wire atomically. Escape stuffing applies only inside
//! 32-bit node-id fields: an id byte equal to the escape goes out as
//! `DF DE`. Opcode bytes and value payloads are emitted verbatim; the
//! console's parser is defined such that they never collide with the
//! escape in legitimate messages.
//!
//! Integer and string writes pick the shortest opcode form that fits the
//! value, mirroring what the decoder accepts:
//!
//! | value | frame |
//! |---|---|
//! | int 0..=0x3F | single opcode byte |
//! | int 0..=0xFFFF | `D3` + u16 |
//! | any other int | `D4` + i32 |
//! | empty string | `D0` |
//! | string 1..=64 bytes | `0x7F+len` + bytes |
//! | string 65..=256 bytes | `D1` + (len-1) + bytes |

use crate::error::{Error, Result};
use crate::protocol::constants::{
    NRP_ESCAPE, NRP_ESCAPED_LITERAL, OP_EMPTY_STRING, OP_FLOAT, OP_GOTO_ROOT, OP_INT16,
    OP_INT32, OP_LONG_STRING, OP_LONG_STRING_MAX_LEN, OP_REQUEST_DATA, OP_REQUEST_DEFINITION,
    OP_SELECT_NODE, OP_SHORT_STRING_MAX_LEN, OP_SMALL_INT_MAX,
};
use crate::protocol::wire::{put_f32, put_i32, put_u16};

/// Append a node id with escape stuffing on its four bytes
fn push_node_id(buf: &mut Vec<u8>, id: u32) {
    for byte in id.to_be_bytes() {
        if byte == NRP_ESCAPE {
            buf.push(NRP_ESCAPE);
            buf.push(NRP_ESCAPED_LITERAL);
        } else {
            buf.push(byte);
        }
    }
}

/// Cursor-select prefix: `D7` + stuffed id
fn push_select(buf: &mut Vec<u8>, id: u32) {
    buf.push(OP_SELECT_NODE);
    push_node_id(buf, id);
}

/// Frame for `set_int(id, value)`
pub fn set_int(id: u32, value: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    push_select(&mut buf, id);
    if (0..=OP_SMALL_INT_MAX as i32).contains(&value) {
        buf.push(value as u8);
    } else if (0..=u16::MAX as i32).contains(&value) {
        buf.push(OP_INT16);
        put_u16(&mut buf, value as u16);
    } else {
        buf.push(OP_INT32);
        put_i32(&mut buf, value);
    }
    buf
}

/// Frame for `set_float(id, value)`
pub fn set_float(id: u32, value: f32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    push_select(&mut buf, id);
    buf.push(OP_FLOAT);
    put_f32(&mut buf, value);
    buf
}

/// Frame for `set_string(id, value)`
///
/// Fails with [`Error::StringTooLong`] beyond 256 bytes; nothing is queued
/// for the wire in that case.
pub fn set_string(id: u32, value: &str) -> Result<Vec<u8>> {
    let bytes = value.as_bytes();
    if bytes.len() > OP_LONG_STRING_MAX_LEN {
        return Err(Error::StringTooLong(bytes.len()));
    }

    let mut buf = Vec::with_capacity(bytes.len() + 16);
    push_select(&mut buf, id);
    if bytes.is_empty() {
        buf.push(OP_EMPTY_STRING);
    } else if bytes.len() <= OP_SHORT_STRING_MAX_LEN {
        buf.push(0x7F + bytes.len() as u8);
    } else {
        buf.push(OP_LONG_STRING);
        buf.push((bytes.len() - 1) as u8);
    }
    buf.extend_from_slice(bytes);
    Ok(buf)
}

/// Frame requesting the current value of a node (root when `id == 0`)
pub fn request_node_data(id: u32) -> Vec<u8> {
    request(id, OP_REQUEST_DATA)
}

/// Frame requesting the definition record of a node (root when `id == 0`)
pub fn request_node_definition(id: u32) -> Vec<u8> {
    request(id, OP_REQUEST_DEFINITION)
}

fn request(id: u32, op: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    if id == 0 {
        buf.push(OP_GOTO_ROOT);
    } else {
        push_select(&mut buf, id);
    }
    buf.push(op);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_int_single_byte() {
        assert_eq!(set_int(0x2A, 5), vec![0xD7, 0x00, 0x00, 0x00, 0x2A, 0x05]);
        assert_eq!(set_int(1, 0x3F), vec![0xD7, 0x00, 0x00, 0x00, 0x01, 0x3F]);
    }

    #[test]
    fn mid_int_uses_u16_form() {
        assert_eq!(
            set_int(1, 0x40),
            vec![0xD7, 0x00, 0x00, 0x00, 0x01, 0xD3, 0x00, 0x40]
        );
        assert_eq!(
            set_int(1, 0xFFFF),
            vec![0xD7, 0x00, 0x00, 0x00, 0x01, 0xD3, 0xFF, 0xFF]
        );
    }

    #[test]
    fn wide_and_negative_ints_use_i32_form() {
        assert_eq!(
            set_int(1, 0x10000),
            vec![0xD7, 0x00, 0x00, 0x00, 0x01, 0xD4, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            set_int(1, -1),
            vec![0xD7, 0x00, 0x00, 0x00, 0x01, 0xD4, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn id_bytes_are_stuffed() {
        let frame = set_int(0xDF00_0000, 1);
        assert_eq!(frame, vec![0xD7, 0xDF, 0xDE, 0x00, 0x00, 0x00, 0x01]);

        // every id byte equal to the escape is doubled out
        let frame = set_int(0xDFDF_DFDF, 0);
        assert_eq!(
            frame,
            vec![0xD7, 0xDF, 0xDE, 0xDF, 0xDE, 0xDF, 0xDE, 0xDF, 0xDE, 0x00]
        );
    }

    #[test]
    fn float_frame() {
        assert_eq!(
            set_float(9, 1.0),
            vec![0xD7, 0x00, 0x00, 0x00, 0x09, 0xD5, 0x3F, 0x80, 0x00, 0x00]
        );
    }

    #[test]
    fn string_length_classes() {
        let frame = set_string(7, "").unwrap();
        assert_eq!(frame, vec![0xD7, 0x00, 0x00, 0x00, 0x07, 0xD0]);

        let frame = set_string(7, "a").unwrap();
        assert_eq!(frame, vec![0xD7, 0x00, 0x00, 0x00, 0x07, 0x80, b'a']);

        let s64 = "x".repeat(64);
        let frame = set_string(7, &s64).unwrap();
        assert_eq!(frame[5], 0xBF);
        assert_eq!(frame.len(), 6 + 64);

        let s65 = "x".repeat(65);
        let frame = set_string(7, &s65).unwrap();
        assert_eq!(&frame[5..7], &[0xD1, 0x40]);
        assert_eq!(frame.len(), 7 + 65);

        let s256 = "x".repeat(256);
        let frame = set_string(7, &s256).unwrap();
        assert_eq!(&frame[5..7], &[0xD1, 0xFF]);

        let s257 = "x".repeat(257);
        assert!(matches!(
            set_string(7, &s257),
            Err(crate::error::Error::StringTooLong(257))
        ));
    }

    #[test]
    fn request_frames() {
        assert_eq!(request_node_data(0), vec![0xDA, 0xDC]);
        assert_eq!(request_node_definition(0), vec![0xDA, 0xDD]);
        assert_eq!(
            request_node_data(5),
            vec![0xD7, 0x00, 0x00, 0x00, 0x05, 0xDC]
        );
        assert_eq!(
            request_node_definition(5),
            vec![0xD7, 0x00, 0x00, 0x00, 0x05, 0xDD]
        );
    }
}
