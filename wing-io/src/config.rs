//! Configuration loading from TOML
//!
//! # Configuration File Format
//!
//! Both sections are optional; every field has a working default:
//!
//! ```toml
//! [connect]
//! port = 2222
//! keep_alive_secs = 7
//! nodelay = true
//!
//! [discovery]
//! port = 2222
//! poll_interval_ms = 500
//! max_polls = 10
//! stop_on_first = false
//! ```
//!
//! Libraries embedding wing-io usually build the option structs directly;
//! the file loader exists for tools that want connection settings beside
//! their own configuration.

use crate::error::{Error, Result};
use crate::protocol::constants::{
    CONSOLE_PORT, DISCOVERY_MAX_POLLS, DISCOVERY_POLL_MS, KEEP_ALIVE_SECS,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Options for [`Console::connect_with`](crate::Console::connect_with)
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectOptions {
    /// Console TCP port
    ///
    /// **Default**: 2222
    #[serde(default = "default_port")]
    pub port: u16,

    /// Keep-alive period; also the receive timeout
    ///
    /// **Units**: seconds
    /// **Valid range**: 1-60
    /// **Default**: 7 (what the console's own session timeout expects)
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    /// Disable Nagle batching on the command socket
    ///
    /// **Default**: true
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,
}

/// Options for [`discovery::scan`](crate::discovery::scan)
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryOptions {
    /// Console UDP port
    ///
    /// **Default**: 2222
    #[serde(default = "default_port")]
    pub port: u16,

    /// Receive-poll interval while waiting for announcements
    ///
    /// **Units**: milliseconds
    /// **Valid range**: 50-5000
    /// **Default**: 500
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Number of empty polls before the scan gives up
    ///
    /// **Valid range**: at least 1
    /// **Default**: 10 (a ~5 second window at the default interval)
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Return as soon as one console answers
    ///
    /// **Default**: false
    #[serde(default)]
    pub stop_on_first: bool,
}

fn default_port() -> u16 {
    CONSOLE_PORT
}
fn default_keep_alive() -> u64 {
    KEEP_ALIVE_SECS
}
fn default_nodelay() -> bool {
    true
}
fn default_poll_interval() -> u64 {
    DISCOVERY_POLL_MS
}
fn default_max_polls() -> u32 {
    DISCOVERY_MAX_POLLS
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            port: default_port(),
            keep_alive_secs: default_keep_alive(),
            nodelay: default_nodelay(),
        }
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            port: default_port(),
            poll_interval_ms: default_poll_interval(),
            max_polls: default_max_polls(),
            stop_on_first: false,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connect: ConnectOptions,
    #[serde(default)]
    pub discovery: DiscoveryOptions,
}

const MIN_KEEP_ALIVE_SECS: u64 = 1;
const MAX_KEEP_ALIVE_SECS: u64 = 60;
const MIN_POLL_INTERVAL_MS: u64 = 50;
const MAX_POLL_INTERVAL_MS: u64 = 5000;

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = basic_toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let ka = self.connect.keep_alive_secs;
        if !(MIN_KEEP_ALIVE_SECS..=MAX_KEEP_ALIVE_SECS).contains(&ka) {
            return Err(Error::Config(format!(
                "keep_alive_secs must be between {} and {} (got {}). \
                The console drops sessions that stay silent longer.",
                MIN_KEEP_ALIVE_SECS, MAX_KEEP_ALIVE_SECS, ka
            )));
        }

        let poll = self.discovery.poll_interval_ms;
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&poll) {
            return Err(Error::Config(format!(
                "poll_interval_ms must be between {} and {} (got {})",
                MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, poll
            )));
        }

        if self.discovery.max_polls == 0 {
            return Err(Error::Config("max_polls must be at least 1".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_console_constants() {
        let opts = ConnectOptions::default();
        assert_eq!(opts.port, 2222);
        assert_eq!(opts.keep_alive_secs, 7);
        assert!(opts.nodelay);

        let disc = DiscoveryOptions::default();
        assert_eq!(disc.poll_interval_ms, 500);
        assert_eq!(disc.max_polls, 10);
        assert!(!disc.stop_on_first);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = basic_toml::from_str(
            r#"
            [connect]
            keep_alive_secs = 5

            [discovery]
            stop_on_first = true
            "#,
        )
        .unwrap();
        assert_eq!(config.connect.keep_alive_secs, 5);
        assert_eq!(config.connect.port, 2222);
        assert!(config.discovery.stop_on_first);
        config.validate().unwrap();
    }

    #[test]
    fn out_of_range_keep_alive_is_rejected() {
        let config: Config = basic_toml::from_str(
            r#"
            [connect]
            keep_alive_secs = 0
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_polls_is_rejected() {
        let config: Config = basic_toml::from_str(
            r#"
            [discovery]
            max_polls = 0
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
