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

//! Error types for the Telnet service

use crate::types::ConnectionId;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Result type for operations
pub type Result<T> = std::result::Result<T, TelnetError>;

/// Telnet service error types
///
/// Transport failures and negotiation timeouts are handled inside a connection by closing it;
/// they only surface here for the caller that was waiting on the operation.
#[derive(Debug, Error)]
pub enum TelnetError {
    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listener could not be bound
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested
        address: SocketAddr,
        /// Underlying bind failure
        source: std::io::Error,
    },

    /// `run` was called on a connection that is already running
    #[error("Connection {0} is already running")]
    AlreadyRunning(ConnectionId),

    /// `start_negotiation` was called a second time
    #[error("Negotiation already started on connection {0}")]
    AlreadyNegotiating(ConnectionId),

    /// Negotiation was requested before the connection was started
    #[error("Connection {0} is not running")]
    NotRunning(ConnectionId),

    /// Connection has been closed
    #[error("Connection closed")]
    ConnectionClosed,

    /// The peer did not answer every offer within the deadline
    #[error("Option negotiation timed out after {0:?}")]
    NegotiationTimeout(Duration),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TelnetError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors concern a single connection; the server keeps running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TelnetError::ConnectionClosed
                | TelnetError::NegotiationTimeout(_)
                | TelnetError::Io(_)
        )
    }

    /// Check if the error is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            TelnetError::ConnectionClosed
                | TelnetError::NegotiationTimeout(_)
                | TelnetError::Io(_)
        )
    }
}
