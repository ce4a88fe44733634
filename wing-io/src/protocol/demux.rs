//! Escape-byte channel demultiplexer
//!
//! # Framing
//!
//! The console interleaves up to 14 logical channels on one byte stream.
//! `0xDF` is the escape byte; everything else is data on whichever channel
//! is currently active:
//!
//! ```text
//! DF DF        literal 0xDF data byte
//! DF DE        literal 0xDF data byte
//! DF D0..DD    switch active channel to 0..13 (emits nothing)
//! DF <other>   literal 0xDF, then <other> as the next data byte
//! ```
//!
//! The last form is not a documented wire sequence; the console's own
//! tooling treats it as a literal escape followed by a deferred data byte,
//! which keeps the stream position intact on malformed input. The deferred
//! byte sits in a one-element pipe until the next pull.
//!
//! Until the first channel switch arrives there is no active channel and
//! data bytes are dropped.

use crate::error::Result;
use crate::protocol::constants::{
    NRP_CHANNEL_BASE, NRP_ESCAPE, NRP_ESCAPED_LITERAL, NRP_NUM_CHANNELS,
};

/// Stateful demultiplexer yielding `(channel, byte)` pairs
///
/// The demux does not own the byte source; each pull is fed by a closure so
/// the same state machine runs over a live socket or a test buffer.
#[derive(Default)]
pub struct ChannelDemux {
    escape: bool,
    channel: Option<u8>,
    pipe: Option<u8>,
}

impl ChannelDemux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel currently selected by the stream, if any switch has occurred.
    pub fn current_channel(&self) -> Option<u8> {
        self.channel
    }

    /// Pull the next data byte and the channel it belongs to.
    ///
    /// `next_byte` supplies raw stream bytes; its errors pass through
    /// unchanged.
    pub fn next_pair<F>(&mut self, mut next_byte: F) -> Result<(u8, u8)>
    where
        F: FnMut() -> Result<u8>,
    {
        if let Some(byte) = self.pipe.take() {
            // channel is always set when a byte was piped
            return Ok((self.channel.unwrap_or_default(), byte));
        }

        loop {
            let byte = next_byte()?;

            if !self.escape {
                if byte == NRP_ESCAPE {
                    self.escape = true;
                    continue;
                }
                match self.channel {
                    Some(ch) => return Ok((ch, byte)),
                    None => continue, // no channel selected yet
                }
            }

            // Escaped: classify the follow-up byte. Two consecutive escapes
            // yield exactly one literal; the escape state never nests.
            self.escape = false;

            if byte == NRP_ESCAPE || byte == NRP_ESCAPED_LITERAL {
                match self.channel {
                    Some(ch) => return Ok((ch, NRP_ESCAPE)),
                    None => continue,
                }
            }

            if (NRP_CHANNEL_BASE..NRP_CHANNEL_BASE + NRP_NUM_CHANNELS).contains(&byte) {
                let ch = byte - NRP_CHANNEL_BASE;
                if self.channel != Some(ch) {
                    log::trace!("Stream switched to channel {}", ch);
                }
                self.channel = Some(ch);
                continue;
            }

            // Escape followed by a byte that is neither a literal marker nor
            // a channel id: emit the escape itself and defer the follow-up.
            match self.channel {
                Some(ch) => {
                    self.pipe = Some(byte);
                    return Ok((ch, NRP_ESCAPE));
                }
                None => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn drain(demux: &mut ChannelDemux, bytes: &[u8]) -> Vec<(u8, u8)> {
        let mut iter = bytes.iter().copied();
        let mut next = || iter.next().ok_or(Error::ConnectionClosed);
        let mut out = Vec::new();
        loop {
            match demux.next_pair(&mut next) {
                Ok(pair) => out.push(pair),
                Err(Error::ConnectionClosed) => return out,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
    }

    #[test]
    fn data_before_channel_switch_is_dropped() {
        let mut demux = ChannelDemux::new();
        let pairs = drain(&mut demux, &[0x01, 0x02, 0xDF, 0xD2, 0x03]);
        assert_eq!(pairs, vec![(2, 0x03)]);
    }

    #[test]
    fn channel_switch_routes_following_bytes() {
        let mut demux = ChannelDemux::new();
        let pairs = drain(&mut demux, &[0xDF, 0xD0, 0xAA, 0xDF, 0xDD, 0xBB]);
        assert_eq!(pairs, vec![(0, 0xAA), (13, 0xBB)]);
    }

    #[test]
    fn escaped_literal_forms() {
        let mut demux = ChannelDemux::new();
        // DF DE and DF DF both decode to a literal 0xDF data byte
        let pairs = drain(&mut demux, &[0xDF, 0xD2, 0xDF, 0xDE, 0xDF, 0xDF]);
        assert_eq!(pairs, vec![(2, 0xDF), (2, 0xDF)]);
    }

    #[test]
    fn double_escape_leaves_escape_state() {
        let mut demux = ChannelDemux::new();
        // After DF DF the next DF D3 must act as a channel switch, not as an
        // escaped payload.
        let pairs = drain(&mut demux, &[0xDF, 0xD2, 0xDF, 0xDF, 0xDF, 0xD3, 0x07]);
        assert_eq!(pairs, vec![(2, 0xDF), (3, 0x07)]);
    }

    #[test]
    fn unexpected_escape_follower_is_deferred() {
        let mut demux = ChannelDemux::new();
        // DF 42 emits the escape literally, then 42 from the pipe.
        let pairs = drain(&mut demux, &[0xDF, 0xD2, 0xDF, 0x42, 0x43]);
        assert_eq!(pairs, vec![(2, 0xDF), (2, 0x42), (2, 0x43)]);
    }

    #[test]
    fn deferred_byte_survives_source_stall() {
        let mut demux = ChannelDemux::new();
        let mut iter = [0xDF, 0xD2, 0xDF, 0x42].iter().copied();
        let mut next = || iter.next().ok_or(Error::ConnectionClosed);
        assert_eq!(demux.next_pair(&mut next).unwrap(), (2, 0xDF));
        // The source is exhausted, but the piped byte must still come out.
        assert_eq!(demux.next_pair(&mut next).unwrap(), (2, 0x42));
        assert!(matches!(
            demux.next_pair(&mut next),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn quirk_before_channel_switch_is_dropped() {
        let mut demux = ChannelDemux::new();
        let pairs = drain(&mut demux, &[0xDF, 0x42, 0xDF, 0xD2, 0x01]);
        assert_eq!(pairs, vec![(2, 0x01)]);
    }

    #[test]
    fn all_fourteen_channels_reachable() {
        let mut demux = ChannelDemux::new();
        for ch in 0..14u8 {
            let pairs = drain(&mut demux, &[0xDF, 0xD0 + ch, 0x55]);
            assert_eq!(pairs, vec![(ch, 0x55)]);
        }
    }
}
