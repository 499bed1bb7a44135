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

//! # Telwire Service
//!
//! Async Telnet connections and a small server built on them.
//!
//! A [`TelnetConnection`] wraps one byte stream. Once [`run`](TelnetConnection::run), it parses
//! incoming bytes with the `telwire-telnetcodec` state machine, delivers application data to a
//! [`DataHandler`], commands and subnegotiations to a [`CommandHandler`], and answers option
//! negotiation on its own. [`start_negotiation`](TelnetConnection::start_negotiation) offers the
//! configured options and waits, with a deadline, for the peer to answer them all.
//!
//! # Architecture
//!
//! ```text
//! TelnetServer
//!     ↓
//! TelnetConnection ── Negotiator
//!     ↓
//! parsing task / data task / write pump
//! ```
//!
//! # Example
//!
//! ```no_run
//! use telwire_service::{CommandFn, Handlers, ServerConfig, TelnetConnection, TelnetServer, TelnetWriter};
//! use telwire_telnetcodec::{consts, TelnetOption};
//! use bytes::Bytes;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handlers = Handlers::new().with_command(CommandFn::new(
//!         |writer: TelnetWriter, command: Bytes, _conn: TelnetConnection| async move {
//!             if command[..] == [consts::AYT] {
//!                 writer.send_data(b"[yes]\r\n").await;
//!             }
//!         },
//!     ));
//!     let config = ServerConfig::new("127.0.0.1:2323".parse()?)
//!         .with_server_options([TelnetOption::SGA]);
//!     let server = TelnetServer::bind(config, handlers).await?;
//!     let conn = server.accept().await?;
//!     conn.closed().await;
//!     Ok(())
//! }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

mod config;
mod connection;
mod error;
mod handler;
mod negotiation;
mod server;
mod types;
mod writer;

pub use config::{ConnectionConfig, ServerConfig};
pub use connection::TelnetConnection;
pub use error::{Result, TelnetError};
pub use handler::{
    CommandFn, CommandHandler, DataFn, DataHandler, DiscardCommands, DiscardData, Handlers,
    OptionCallback,
};
pub use negotiation::Negotiator;
pub use server::TelnetServer;
pub use types::{ConnectionId, NegotiationStatus};
pub use writer::TelnetWriter;
