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

//! Handler traits and the handler set given to each connection

use crate::{TelnetConnection, TelnetWriter};
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use telwire_telnetcodec::{Negotiation, NegotiationCommand, TelnetOption};
use tracing::trace;

/// Receives application data.
///
/// Runs on the connection's data task. While it runs the parser can buffer at most one more
/// batch before it stops reading from the socket, so a slow handler throttles its peer.
///
/// # Example
///
/// ```no_run
/// use telwire_service::{DataHandler, TelnetWriter};
/// use async_trait::async_trait;
/// use bytes::Bytes;
///
/// struct Echo;
///
/// #[async_trait]
/// impl DataHandler for Echo {
///     async fn on_data(&self, writer: &TelnetWriter, data: Bytes) {
///         writer.send_data(&data).await;
///     }
/// }
/// ```
#[async_trait]
pub trait DataHandler: Send + Sync + 'static {
    /// Called with every byte received since the previous call
    async fn on_data(&self, writer: &TelnetWriter, data: Bytes);
}

/// Receives commands and subnegotiations.
///
/// Runs on the parsing task: the next byte is not parsed until this returns.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// Called with a single command byte (`[AYT]`) or a whole `[SB, option, .., SE]` frame
    async fn on_command(&self, writer: &TelnetWriter, command: Bytes, conn: &TelnetConnection);
}

/// Replaces the built-in negotiation rules.
///
/// Called with every negotiation the peer sends; a returned negotiation is written back.
pub type OptionCallback =
    Arc<dyn Fn(NegotiationCommand, TelnetOption) -> Option<Negotiation> + Send + Sync + 'static>;

/// Data handler that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardData;

#[async_trait]
impl DataHandler for DiscardData {
    async fn on_data(&self, writer: &TelnetWriter, data: Bytes) {
        trace!(connection_id = %writer.connection_id(), len = data.len(), "Discarding data");
    }
}

/// Command handler that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardCommands;

#[async_trait]
impl CommandHandler for DiscardCommands {
    async fn on_command(&self, _writer: &TelnetWriter, command: Bytes, conn: &TelnetConnection) {
        trace!(connection_id = %conn.id(), command = ?command.as_ref(), "Discarding command");
    }
}

/// Adapts an async closure into a [`DataHandler`].
///
/// ```no_run
/// use telwire_service::{DataFn, Handlers};
///
/// let handlers = Handlers::new().with_data(DataFn::new(|writer, data| async move {
///     writer.send_data(&data).await;
/// }));
/// ```
pub struct DataFn<F>(pub F);

impl<F> DataFn<F> {
    /// Wrap a closure taking the writer and the data batch
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(TelnetWriter, Bytes) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        DataFn(f)
    }
}

#[async_trait]
impl<F, Fut> DataHandler for DataFn<F>
where
    F: Fn(TelnetWriter, Bytes) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_data(&self, writer: &TelnetWriter, data: Bytes) {
        (self.0)(writer.clone(), data).await;
    }
}

/// Adapts an async closure into a [`CommandHandler`].
pub struct CommandFn<F>(pub F);

impl<F> CommandFn<F> {
    /// Wrap a closure taking the writer, the command frame and the connection
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(TelnetWriter, Bytes, TelnetConnection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        CommandFn(f)
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for CommandFn<F>
where
    F: Fn(TelnetWriter, Bytes, TelnetConnection) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_command(&self, writer: &TelnetWriter, command: Bytes, conn: &TelnetConnection) {
        (self.0)(writer.clone(), command, conn.clone()).await;
    }
}

/// Handlers for a connection.
///
/// Any handler left as `None` falls back to its default: [`DiscardData`], [`DiscardCommands`],
/// and the built-in negotiation rules.
#[derive(Clone, Default)]
pub struct Handlers {
    /// Application data handler
    pub data: Option<Arc<dyn DataHandler>>,
    /// Command and subnegotiation handler
    pub command: Option<Arc<dyn CommandHandler>>,
    /// Negotiation override
    pub option: Option<OptionCallback>,
}

impl Handlers {
    /// All defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data handler
    pub fn with_data(mut self, handler: impl DataHandler) -> Self {
        self.data = Some(Arc::new(handler));
        self
    }

    /// Set the command handler
    pub fn with_command(mut self, handler: impl CommandHandler) -> Self {
        self.command = Some(Arc::new(handler));
        self
    }

    /// Replace the built-in negotiation rules
    pub fn with_option_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(NegotiationCommand, TelnetOption) -> Option<Negotiation> + Send + Sync + 'static,
    {
        self.option = Some(Arc::new(callback));
        self
    }

    pub(crate) fn data_or_default(&self) -> Arc<dyn DataHandler> {
        self.data.clone().unwrap_or_else(|| Arc::new(DiscardData))
    }

    pub(crate) fn command_or_default(&self) -> Arc<dyn CommandHandler> {
        self.command.clone().unwrap_or_else(|| Arc::new(DiscardCommands))
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("data", &self.data.is_some())
            .field("command", &self.command.is_some())
            .field("option", &self.option.is_some())
            .finish()
    }
}
