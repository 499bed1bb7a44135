//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Connection and server configuration
//!
//! # Examples
//!
//! ```
//! use telwire_service::{ConnectionConfig, ServerConfig};
//! use telwire_telnetcodec::TelnetOption;
//! use std::time::Duration;
//!
//! let connection = ConnectionConfig::new()
//!     .with_server_options([TelnetOption::ECHO, TelnetOption::SGA])
//!     .with_client_options([TelnetOption::NAWS])
//!     .with_negotiation_timeout(Duration::from_secs(5));
//!
//! let server = ServerConfig::new("0.0.0.0:2323".parse().unwrap())
//!     .with_connection(connection)
//!     .with_max_connections(64);
//! assert!(server.validate().is_ok());
//! ```

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;
use telwire_telnetcodec::TelnetOption;

/// Per-connection settings
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Options this end offers with WILL
    pub server_options: BTreeSet<TelnetOption>,

    /// Options this end asks the peer to enable with DO
    pub client_options: BTreeSet<TelnetOption>,

    /// How long to wait for the peer to answer every offer before closing
    pub negotiation_timeout: Duration,

    /// Number of outbound messages that may queue ahead of the write pump
    pub write_queue_capacity: usize,

    /// Size of each socket read
    pub read_buffer_size: usize,

    /// How long close waits for each connection task before aborting it
    pub shutdown_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_options: BTreeSet::new(),
            client_options: BTreeSet::new(),
            negotiation_timeout: Duration::from_secs(10),
            write_queue_capacity: 64,
            read_buffer_size: 256,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration with no options and default timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the options offered with WILL
    pub fn with_server_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<TelnetOption>,
    {
        self.server_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the options requested with DO
    pub fn with_client_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<TelnetOption>,
    {
        self.client_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the negotiation deadline
    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    /// Set the outbound queue capacity
    pub fn with_write_queue_capacity(mut self, capacity: usize) -> Self {
        self.write_queue_capacity = capacity;
        self
    }

    /// Set the socket read size
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the per-task shutdown timeout
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.negotiation_timeout.is_zero() {
            return Err("negotiation_timeout must be greater than 0".to_string());
        }

        if self.write_queue_capacity == 0 {
            return Err("write_queue_capacity must be greater than 0".to_string());
        }

        if self.read_buffer_size == 0 {
            return Err("read_buffer_size must be greater than 0".to_string());
        }

        if self.shutdown_timeout.is_zero() {
            return Err("shutdown_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Server configuration
///
/// This structure contains all configuration options for the Telnet server.
/// Use the builder pattern methods to customize the configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections
    ///
    /// Streams accepted beyond this limit are dropped immediately.
    pub max_connections: usize,

    /// Settings applied to every accepted connection
    pub connection: ConnectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 23)),
            max_connections: 1000,
            connection: ConnectionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with the given bind address
    ///
    /// All other settings will use their default values.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the maximum number of concurrent connections
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Replace the per-connection settings
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Set the options offered with WILL on every connection
    pub fn with_server_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<TelnetOption>,
    {
        self.connection = self.connection.with_server_options(options);
        self
    }

    /// Set the options requested with DO on every connection
    pub fn with_client_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<TelnetOption>,
    {
        self.connection = self.connection.with_client_options(options);
        self
    }

    /// Set the negotiation deadline for every connection
    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.connection = self.connection.with_negotiation_timeout(timeout);
        self
    }

    /// Settings handed to each accepted connection
    pub fn connection_config(&self) -> ConnectionConfig {
        self.connection.clone()
    }

    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }

        self.connection.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.bind_address.port(), 23);
        assert_eq!(config.connection.negotiation_timeout, Duration::from_secs(10));
        assert_eq!(config.connection.read_buffer_size, 256);
        assert!(config.connection.server_options.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ServerConfig::default()
            .with_max_connections(500)
            .with_server_options([TelnetOption::SGA, TelnetOption::ECHO, TelnetOption::SGA])
            .with_client_options([0u8])
            .with_negotiation_timeout(Duration::from_secs(3));

        assert_eq!(config.max_connections, 500);
        assert_eq!(
            config.connection.server_options.iter().copied().collect::<Vec<_>>(),
            vec![TelnetOption::ECHO, TelnetOption::SGA]
        );
        assert!(config.connection.client_options.contains(&TelnetOption::BINARY));
        assert_eq!(
            config.connection_config().negotiation_timeout,
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();

        // Valid config
        assert!(config.validate().is_ok());

        // Invalid: zero max_connections
        config.max_connections = 0;
        assert!(config.validate().is_err());

        // Invalid: zero timeout
        config.max_connections = 1000;
        config.connection.negotiation_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.connection.negotiation_timeout = Duration::from_secs(10);
        config.connection.write_queue_capacity = 0;
        assert!(config.validate().is_err());

        config.connection.write_queue_capacity = 1;
        config.connection.read_buffer_size = 0;
        assert!(config.validate().is_err());

        config.connection.read_buffer_size = 1;
        config.connection.shutdown_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
