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

//! Simple Echo Server Example
//!
//! This example demonstrates a telnet echo server that:
//! - Accepts connections on port 6779
//! - Offers ECHO, SGA and BINARY, and asks the client for BINARY and SGA
//! - Echoes back any data received from clients
//! - Answers `IAC AYT` with a short message
//!
//! ## Usage
//!
//! Run the server:
//! ```bash
//! cargo run --example echo_server
//! ```
//!
//! Connect with a telnet client:
//! ```bash
//! telnet localhost 6779
//! ```

use bytes::Bytes;
use telwire_service::{
    CommandFn, DataFn, Handlers, ServerConfig, TelnetConnection, TelnetServer, TelnetWriter,
};
use telwire_telnetcodec::{TelnetOption, consts};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig::new("127.0.0.1:6779".parse()?)
        .with_max_connections(100)
        .with_server_options([TelnetOption::ECHO, TelnetOption::SGA, TelnetOption::BINARY])
        .with_client_options([TelnetOption::BINARY, TelnetOption::SGA]);

    let handlers = Handlers::new()
        .with_data(DataFn::new(|writer: TelnetWriter, data: Bytes| async move {
            writer.send_data(&data).await;
        }))
        .with_command(CommandFn::new(
            |writer: TelnetWriter, command: Bytes, conn: TelnetConnection| async move {
                if command[..] == [consts::AYT] {
                    let reply = format!("[{} is here]\r\n", conn.id());
                    writer.send_data(reply.as_bytes()).await;
                }
            },
        ));

    let server = TelnetServer::bind(config, handlers).await?;
    info!(address = %server.local_addr(), "Echo server listening, press Ctrl+C to stop");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    server.serve(shutdown).await?;
    info!("Server stopped");
    Ok(())
}
