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

//! Telnet server
//!
//! Binds a listener and turns every accepted stream into a running [`TelnetConnection`].

use crate::{ConnectionId, Handlers, Result, ServerConfig, TelnetConnection, TelnetError};
use dashmap::DashMap;
use metrics::counter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Telnet server
///
/// # Example
///
/// ```no_run
/// use telwire_service::{DataFn, Handlers, ServerConfig, TelnetServer, TelnetWriter};
/// use telwire_telnetcodec::TelnetOption;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::new("127.0.0.1:2323".parse()?)
///         .with_server_options([TelnetOption::ECHO, TelnetOption::SGA]);
///     let handlers = Handlers::new().with_data(DataFn::new(
///         |writer: TelnetWriter, data: bytes::Bytes| async move {
///             writer.send_data(&data).await;
///         },
///     ));
///     let server = TelnetServer::bind(config, handlers).await?;
///
///     let shutdown = CancellationToken::new();
///     server.serve(shutdown).await?;
///     Ok(())
/// }
/// ```
pub struct TelnetServer {
    config: ServerConfig,
    handlers: Handlers,
    listener: TcpListener,
    local_addr: SocketAddr,
    connections: Arc<DashMap<ConnectionId, TelnetConnection>>,
}

impl TelnetServer {
    /// Validate the configuration and bind the listener
    pub async fn bind(config: ServerConfig, handlers: Handlers) -> Result<Self> {
        config.validate().map_err(TelnetError::InvalidConfig)?;

        let address = config.bind_address;
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| TelnetError::Bind { address, source })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, max_connections = config.max_connections, "Telnet server bound");

        Ok(Self {
            config,
            handlers,
            listener,
            local_addr,
            connections: Arc::new(DashMap::new()),
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Look up a live connection
    pub fn connection(&self, id: ConnectionId) -> Option<TelnetConnection> {
        self.connections.get(&id).map(|entry| entry.value().clone())
    }

    /// Wait for the next stream and start a connection on it.
    ///
    /// The connection is running and negotiating in the background when this returns. Streams
    /// arriving while `max_connections` are live are dropped.
    pub async fn accept(&self) -> Result<TelnetConnection> {
        loop {
            let (stream, peer) = self.listener.accept().await?;

            if self.connections.len() >= self.config.max_connections {
                warn!(
                    %peer,
                    limit = self.config.max_connections,
                    "Connection limit reached, rejecting"
                );
                counter!("telwire.connections.rejected").increment(1);
                drop(stream);
                continue;
            }

            if let Err(error) = stream.set_nodelay(true) {
                debug!(%peer, %error, "Failed to set TCP_NODELAY");
            }

            let conn = TelnetConnection::from_tcp(
                stream,
                self.config.connection_config(),
                self.handlers.clone(),
            );
            conn.run()?;
            self.track(&conn);

            let negotiating = conn.clone();
            tokio::spawn(async move {
                if let Err(error) = negotiating.start_negotiation().await {
                    debug!(connection_id = %negotiating.id(), %error, "Negotiation ended early");
                }
            });

            return Ok(conn);
        }
    }

    /// Accept connections until `shutdown` is cancelled, then close every live connection.
    #[instrument(skip_all, fields(local_addr = %self.local_addr))]
    pub async fn serve(&self, shutdown: CancellationToken) -> Result<()> {
        info!("Accepting connections");
        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = self.accept() => accepted,
            };
            match accepted {
                Ok(conn) => debug!(connection_id = %conn.id(), peer_addr = ?conn.peer_addr(), "Accepted"),
                Err(error) => {
                    warn!(%error, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
        self.shutdown().await;
        Ok(())
    }

    /// Close every live connection
    pub async fn shutdown(&self) {
        let connections: Vec<TelnetConnection> = self
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        info!(count = connections.len(), "Shutting down telnet server");
        futures_util::future::join_all(connections.iter().map(TelnetConnection::close)).await;
        self.connections.clear();
        info!("Telnet server shutdown complete");
    }

    fn track(&self, conn: &TelnetConnection) {
        self.connections.insert(conn.id(), conn.clone());
        let connections = Arc::clone(&self.connections);
        let conn = conn.clone();
        tokio::spawn(async move {
            conn.closed().await;
            connections.remove(&conn.id());
        });
    }
}

impl std::fmt::Debug for TelnetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetServer")
            .field("local_addr", &self.local_addr)
            .field("connections", &self.connections.len())
            .field("max_connections", &self.config.max_connections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ServerConfig {
        ServerConfig::new("127.0.0.1:0".parse().unwrap())
    }

    #[tokio::test]
    async fn test_bind_reports_local_addr() {
        let server = TelnetServer::bind(local_config(), Handlers::new())
            .await
            .unwrap();
        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(server.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = local_config().with_max_connections(0);
        let result = TelnetServer::bind(config, Handlers::new()).await;
        assert!(matches!(result, Err(TelnetError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_bind_address_in_use() {
        let first = TelnetServer::bind(local_config(), Handlers::new())
            .await
            .unwrap();
        let taken = first.local_addr();
        let result = TelnetServer::bind(ServerConfig::new(taken), Handlers::new()).await;
        match result {
            Err(TelnetError::Bind { address, .. }) => assert_eq!(address, taken),
            other => panic!("expected bind failure, got {other:?}"),
        }
    }
}
