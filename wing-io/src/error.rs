//! Error types for wing-io
//!
//! # Error Recovery Strategies
//!
//! Different error types require different recovery approaches:
//!
//! ## Transport Errors
//!
//! - **`Io`**: Socket-level failure during send/recv/bind. The connection is
//!   unusable; drop the [`Console`](crate::Console) and reconnect.
//!
//! - **`ConnectionClosed`**: The console closed the TCP stream. This is the
//!   orderly end of a session: the read loop consumes it internally and
//!   returns cleanly, so applications normally never observe this variant.
//!
//! - **`Timeout`**: Internal receive timeout used to drive the keep-alive.
//!   Consumed inside the byte source; never escapes the read loop.
//!
//! ## Protocol Errors
//!
//! - **`Malformed`**: A node-definition record was truncated or carried an
//!   impossible field. The stream position can no longer be trusted, so
//!   this propagates out of the read loop. Close and reconnect.
//!
//! ## Caller Errors (Connection Remains Usable)
//!
//! - **`StringTooLong`**: `set_string` was called with more than 256 bytes.
//!   The write is rejected before anything reaches the wire.
//!
//! - **`Closed`**: An operation was attempted on a handle after `close()`.
//!
//! ## Discovery Errors (Log and Continue)
//!
//! - **`DiscoveryParse`**: A broadcast response was not a well-formed
//!   announcement. The response is dropped and the scan continues; the
//!   variant surfaces only through logs.
//!
//! ## Configuration Errors (Fix and Retry)
//!
//! - **`Config`**: An options file is invalid. Fix the file and reload.

use thiserror::Error;

/// Errors that can occur in wing-io
///
/// See module-level documentation for recovery strategies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by console")]
    ConnectionClosed,

    #[error("receive timed out")]
    Timeout,

    #[error("malformed node definition: {0}")]
    Malformed(String),

    #[error("string value too long: {0} bytes (limit 256)")]
    StringTooLong(usize),

    #[error("connection handle is closed")]
    Closed,

    #[error("discovery response rejected: {0}")]
    DiscoveryParse(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
