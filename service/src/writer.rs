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

//! Handler-facing output

use crate::types::ConnectionId;
use bytes::Bytes;
use std::sync::{Arc, Mutex, PoisonError};
use telwire_telnetcodec::{
    Negotiation, TelnetOption, encode_command, encode_data, encode_negotiation,
    encode_subnegotiation,
};
use tokio::sync::mpsc;
use tracing::trace;

/// Queues output for a connection's write pump.
///
/// Every call enqueues one message and the pump writes messages whole, so output from
/// concurrent handlers never interleaves mid-message. Once the connection is closed every
/// send is discarded and reports `false`.
#[derive(Clone)]
pub struct TelnetWriter {
    id: ConnectionId,
    sender: Arc<Mutex<Option<mpsc::Sender<Bytes>>>>,
}

impl TelnetWriter {
    pub(crate) fn new(id: ConnectionId, sender: mpsc::Sender<Bytes>) -> Self {
        Self {
            id,
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// Connection this writer belongs to
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Queue bytes exactly as given; the caller is responsible for any escaping.
    ///
    /// Waits while the queue is full. Returns `false` if the connection is closed.
    pub async fn send(&self, bytes: Bytes) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match sender {
            Some(sender) => {
                let len = bytes.len();
                if sender.send(bytes).await.is_ok() {
                    trace!(connection_id = %self.id, len, "Queued output");
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Queue application data, doubling any IAC bytes.
    pub async fn send_data(&self, data: &[u8]) -> bool {
        self.send(encode_data(data)).await
    }

    /// Queue `IAC <command>`.
    pub async fn send_command(&self, command: u8) -> bool {
        self.send(encode_command(command)).await
    }

    /// Queue `IAC <verb> <option>`.
    pub async fn send_negotiation(&self, negotiation: Negotiation) -> bool {
        self.send(encode_negotiation(negotiation)).await
    }

    /// Queue `IAC SB <option> <payload> IAC SE`.
    pub async fn send_subnegotiation(&self, option: TelnetOption, payload: &[u8]) -> bool {
        self.send(encode_subnegotiation(option, payload)).await
    }

    /// `true` once the connection has closed this writer.
    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_none_or(mpsc::Sender::is_closed)
    }

    pub(crate) fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl std::fmt::Debug for TelnetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetWriter")
            .field("connection_id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
