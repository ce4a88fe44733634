//! Big-endian value codec
//!
//! Every multi-byte quantity on the wire is big-endian with a width fixed
//! by its opcode; there is no varint form. [`WireRead`] assembles values
//! from single demuxed bytes, so the same code path decodes a live stream
//! and a buffered definition record. Floats are IEEE-754 bit patterns
//! reassembled with `f32::from_bits`.

use crate::error::Result;

/// Reader of big-endian wire values, one demuxed byte at a time
pub trait WireRead {
    fn read_u8(&mut self) -> Result<u8>;

    fn read_u16(&mut self) -> Result<u16> {
        let hi = self.read_u8()?;
        let lo = self.read_u8()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let a = self.read_u8()?;
        let b = self.read_u8()?;
        let c = self.read_u8()?;
        let d = self.read_u8()?;
        Ok(u32::from_be_bytes([a, b, c, d]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        (0..len).map(|_| self.read_u8()).collect()
    }
}

/// Append a big-endian `u16`
pub fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Append a big-endian `u32`
pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Append a big-endian `i32`
pub fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Append an IEEE-754 `f32` bit pattern, big-endian
pub fn put_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_bits().to_be_bytes());
}
