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

//! Telnet connection runtime
//!
//! A connection runs three tasks:
//!
//! ```text
//! socket read half ──► parsing task ──► command handler (inline)
//!                          │    └─────► negotiation replies ──┐
//!                          ▼                                  ▼
//!                  one-slot data channel              outbound queue
//!                          │                                  │
//!                          ▼                                  ▼
//!                     data task ──► data handler      write pump ──► socket write half
//! ```
//!
//! The data channel holds a single batch, so the parser stops reading while the data
//! handler is behind. All output goes through the outbound queue and a single write pump.

use crate::handler::{CommandHandler, DataHandler, OptionCallback};
use crate::negotiation::Negotiator;
use crate::{
    ConnectionConfig, ConnectionId, Handlers, NegotiationStatus, Result, TelnetError, TelnetWriter,
};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use metrics::{counter, gauge, histogram};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use telwire_telnetcodec::{Negotiation, TelnetFrame, TelnetFsm, TelnetOption};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

type BoxReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

tokio::task_local! {
    static DATA_TASK: ConnectionId;
}

/// State consumed by `run`.
struct Startup {
    reader: BoxReader,
    writer: BoxWriter,
    outbound: mpsc::Receiver<Bytes>,
    negotiator: Negotiator,
}

#[derive(Default)]
struct Tasks {
    write_pump: Option<JoinHandle<()>>,
    data_worker: Option<JoinHandle<()>>,
}

struct Inner {
    id: ConnectionId,
    peer_addr: Option<SocketAddr>,
    created_at: Instant,
    config: ConnectionConfig,

    data_handler: Arc<dyn DataHandler>,
    command_handler: Arc<dyn CommandHandler>,
    option_callback: Option<OptionCallback>,
    writer: TelnetWriter,
    offers: Vec<Negotiation>,

    startup: Mutex<Option<Startup>>,
    tasks: Mutex<Tasks>,
    running: AtomicBool,
    negotiating: AtomicBool,
    closing: AtomicBool,
    closed: watch::Sender<bool>,
    negotiation: watch::Receiver<NegotiationStatus>,

    // Stops the parser and data task.
    cancel: CancellationToken,
    // Stops the write pump once the data task is done.
    pump_cancel: CancellationToken,

    bytes_sent: Arc<AtomicU64>,
    bytes_received: AtomicU64,
}

/// A Telnet session over one byte stream.
///
/// Cheap to clone; every clone refers to the same session.
///
/// # Example
///
/// ```no_run
/// use telwire_service::{ConnectionConfig, Handlers, TelnetConnection};
/// use telwire_telnetcodec::TelnetOption;
///
/// # async fn example(stream: tokio::net::TcpStream) -> telwire_service::Result<()> {
/// let config = ConnectionConfig::new().with_server_options([TelnetOption::ECHO]);
/// let conn = TelnetConnection::from_tcp(stream, config, Handlers::new());
/// conn.run()?;
/// conn.start_negotiation().await?;
/// conn.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TelnetConnection {
    inner: Arc<Inner>,
}

impl TelnetConnection {
    /// Wrap any bidirectional byte stream.
    ///
    /// Nothing is read or written until [`run`](Self::run) is called.
    pub fn new<S>(stream: S, config: ConnectionConfig, handlers: Handlers) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_peer_addr(stream, None, config, handlers)
    }

    /// Wrap an accepted TCP stream, recording its peer address.
    pub fn from_tcp(stream: TcpStream, config: ConnectionConfig, handlers: Handlers) -> Self {
        let peer_addr = stream.peer_addr().ok();
        Self::with_peer_addr(stream, peer_addr, config, handlers)
    }

    fn with_peer_addr<S>(
        stream: S,
        peer_addr: Option<SocketAddr>,
        config: ConnectionConfig,
        handlers: Handlers,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let id = ConnectionId::next();
        let (reader, writer) = tokio::io::split(stream);
        let (outbound_tx, outbound_rx) = mpsc::channel(config.write_queue_capacity.max(1));
        let (negotiator, negotiation) = Negotiator::new(
            config.server_options.clone(),
            config.client_options.clone(),
        );
        let offers = negotiator.offers();
        let (closed, _) = watch::channel(false);

        info!(
            connection_id = %id,
            peer_addr = ?peer_addr,
            server_options = config.server_options.len(),
            client_options = config.client_options.len(),
            "Creating new telnet connection"
        );
        counter!("telwire.connections.total").increment(1);
        gauge!("telwire.connections.active").increment(1.0);

        Self {
            inner: Arc::new(Inner {
                id,
                peer_addr,
                created_at: Instant::now(),
                data_handler: handlers.data_or_default(),
                command_handler: handlers.command_or_default(),
                option_callback: handlers.option,
                writer: TelnetWriter::new(id, outbound_tx),
                offers,
                startup: Mutex::new(Some(Startup {
                    reader: Box::new(reader),
                    writer: Box::new(writer),
                    outbound: outbound_rx,
                    negotiator,
                })),
                tasks: Mutex::new(Tasks::default()),
                running: AtomicBool::new(false),
                negotiating: AtomicBool::new(false),
                closing: AtomicBool::new(false),
                closed,
                negotiation,
                cancel: CancellationToken::new(),
                pump_cancel: CancellationToken::new(),
                bytes_sent: Arc::new(AtomicU64::new(0)),
                bytes_received: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// Get the peer address, if the stream has one
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.inner.peer_addr
    }

    /// Get when the connection was created
    pub fn created_at(&self) -> Instant {
        self.inner.created_at
    }

    /// Writer feeding this connection's write pump
    pub fn writer(&self) -> &TelnetWriter {
        &self.inner.writer
    }

    /// Options offered with WILL
    pub fn server_options(&self) -> &BTreeSet<TelnetOption> {
        &self.inner.config.server_options
    }

    /// Options requested with DO
    pub fn client_options(&self) -> &BTreeSet<TelnetOption> {
        &self.inner.config.client_options
    }

    /// Bytes written to the socket
    pub fn bytes_sent(&self) -> u64 {
        self.inner.bytes_sent.load(Ordering::Relaxed)
    }

    /// Application data bytes received, after unescaping
    pub fn bytes_received(&self) -> u64 {
        self.inner.bytes_received.load(Ordering::Relaxed)
    }

    /// Snapshot of negotiation progress
    pub fn negotiation_status(&self) -> NegotiationStatus {
        self.inner.negotiation.borrow().clone()
    }

    /// `true` once the peer has answered every offer
    pub fn is_negotiated(&self) -> bool {
        self.inner.negotiation.borrow().complete
    }

    /// `true` once [`close`](Self::close) has finished
    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    /// Wait until the connection is closed
    pub async fn closed(&self) {
        let mut closed = self.inner.closed.subscribe();
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Start the parsing task, the write pump and the data task.
    ///
    /// Must be called from within a Tokio runtime. A read error or end of stream closes the
    /// connection.
    #[instrument(skip(self), fields(connection_id = %self.id()))]
    pub fn run(&self) -> Result<()> {
        if self.inner.closing.load(Ordering::Acquire) {
            return Err(TelnetError::ConnectionClosed);
        }
        let Some(startup) = lock(&self.inner.startup).take() else {
            return Err(TelnetError::AlreadyRunning(self.id()));
        };

        let (data_tx, data_rx) = mpsc::channel(1);
        let write_pump = tokio::spawn(write_pump(
            self.id(),
            startup.writer,
            startup.outbound,
            self.inner.pump_cancel.clone(),
            self.inner.cancel.clone(),
            self.inner.bytes_sent.clone(),
        ));
        let data_worker = tokio::spawn(data_worker(
            self.id(),
            data_rx,
            self.inner.data_handler.clone(),
            self.inner.writer.clone(),
            self.inner.cancel.clone(),
        ));
        {
            let mut tasks = lock(&self.inner.tasks);
            tasks.write_pump = Some(write_pump);
            tasks.data_worker = Some(data_worker);
        }
        tokio::spawn(read_loop(
            self.clone(),
            startup.reader,
            startup.negotiator,
            data_tx,
        ));

        self.inner.running.store(true, Ordering::Release);
        debug!("Connection tasks started");
        Ok(())
    }

    /// Send the opening offers and wait for the peer to answer all of them.
    ///
    /// Sends `WILL` for every server option and `DO` for every client option. If the offers
    /// cannot be queued and answered within the negotiation timeout the connection is closed
    /// and [`TelnetError::NegotiationTimeout`] is returned.
    ///
    /// Options are pending from creation, so there is one offer round per connection; a second
    /// call returns [`TelnetError::AlreadyNegotiating`] without writing anything.
    #[instrument(skip(self), fields(connection_id = %self.id()))]
    pub async fn start_negotiation(&self) -> Result<()> {
        if self.inner.closing.load(Ordering::Acquire) {
            return Err(TelnetError::ConnectionClosed);
        }
        if !self.inner.running.load(Ordering::Acquire) {
            return Err(TelnetError::NotRunning(self.id()));
        }
        if self.inner.negotiating.swap(true, Ordering::AcqRel) {
            return Err(TelnetError::AlreadyNegotiating(self.id()));
        }

        let started = Instant::now();
        let mut status = self.inner.negotiation.clone();
        let mut closed = self.inner.closed.subscribe();
        let timeout = self.inner.config.negotiation_timeout;
        let outcome = tokio::time::timeout(timeout, async {
            for offer in &self.inner.offers {
                debug!(%offer, "Sending offer");
                if !self.inner.writer.send_negotiation(*offer).await {
                    return false;
                }
            }
            tokio::select! {
                complete = status.wait_for(|status| status.complete) => complete.is_ok(),
                _ = closed.wait_for(|closed| *closed) => false,
            }
        })
        .await;

        match outcome {
            Ok(true) => {
                histogram!("telwire.negotiation.duration").record(started.elapsed().as_secs_f64());
                info!(elapsed = ?started.elapsed(), "Negotiation finished");
                Ok(())
            }
            Ok(false) => Err(TelnetError::ConnectionClosed),
            Err(_) => {
                warn!(
                    ?timeout,
                    status = %self.negotiation_status(),
                    "Negotiation timed out, closing connection"
                );
                counter!("telwire.negotiation.timeouts").increment(1);
                self.close().await;
                Err(TelnetError::NegotiationTimeout(timeout))
            }
        }
    }

    /// Shut the connection down.
    ///
    /// Stops the parser, lets the data task deliver what it already holds, flushes queued
    /// output, shuts down the write half and closes the writer. Only the first call does any
    /// of this; later and concurrent calls return at once. Use [`closed`](Self::closed) to
    /// wait for completion.
    #[instrument(skip(self), fields(connection_id = %self.id()))]
    pub async fn close(&self) {
        if self.inner.closing.swap(true, Ordering::AcqRel) {
            trace!("Close already in progress");
            return;
        }
        info!("Closing connection");

        self.inner.cancel.cancel();
        drop(lock(&self.inner.startup).take());
        let (write_pump, data_worker) = {
            let mut tasks = lock(&self.inner.tasks);
            (tasks.write_pump.take(), tasks.data_worker.take())
        };
        let timeout = self.inner.config.shutdown_timeout;

        if let Some(handle) = data_worker {
            if DATA_TASK.try_with(|id| *id == self.id()).unwrap_or(false) {
                debug!("Close requested by the data handler, not waiting for its task");
            } else {
                join_task("data worker", handle, timeout).await;
            }
        }

        self.inner.pump_cancel.cancel();
        if let Some(handle) = write_pump {
            join_task("write pump", handle, timeout).await;
        }

        self.inner.writer.close();
        self.inner.closed.send_replace(true);
        gauge!("telwire.connections.active").decrement(1.0);
        info!(
            duration = ?self.inner.created_at.elapsed(),
            bytes_sent = self.bytes_sent(),
            bytes_received = self.bytes_received(),
            "Connection closed"
        );
    }

    /// Route one decoded frame. Returns `false` when the parser should stop.
    async fn dispatch(
        &self,
        frame: TelnetFrame,
        negotiator: &mut Negotiator,
        data: &mpsc::Sender<Bytes>,
    ) -> bool {
        match frame {
            TelnetFrame::Data(bytes) => {
                let len = bytes.len() as u64;
                self.inner.bytes_received.fetch_add(len, Ordering::Relaxed);
                counter!("telwire.bytes.received").increment(len);
                tokio::select! {
                    biased;
                    _ = self.inner.cancel.cancelled() => false,
                    sent = data.send(bytes) => sent.is_ok(),
                }
            }
            TelnetFrame::Command(command) => {
                counter!("telwire.commands.received").increment(1);
                trace!(command = ?command.as_ref(), "Dispatching command");
                self.inner
                    .command_handler
                    .on_command(&self.inner.writer, command, self)
                    .await;
                true
            }
            TelnetFrame::Negotiation(negotiation) => {
                let reply = match &self.inner.option_callback {
                    Some(callback) => {
                        negotiator.observe(negotiation);
                        callback(negotiation.command, negotiation.option)
                    }
                    None => negotiator.receive(negotiation),
                };
                if let Some(reply) = reply {
                    debug!(%negotiation, %reply, "Answering negotiation");
                    self.inner.writer.send_negotiation(reply).await;
                }
                true
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if !*self.closed.borrow() {
            gauge!("telwire.connections.active").decrement(1.0);
        }
    }
}

impl std::fmt::Debug for TelnetConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetConnection")
            .field("id", &self.inner.id)
            .field("peer_addr", &self.inner.peer_addr)
            .field("created_at", &self.inner.created_at)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn join_task(name: &'static str, mut handle: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => debug!(task = name, "Task stopped"),
        Ok(Err(error)) => warn!(task = name, %error, "Task ended abnormally"),
        Err(_) => {
            warn!(task = name, ?timeout, "Task did not stop in time, aborting");
            handle.abort();
        }
    }
}

#[instrument(name = "read_loop", skip_all, fields(connection_id = %conn.id()))]
async fn read_loop(
    conn: TelnetConnection,
    reader: BoxReader,
    mut negotiator: Negotiator,
    data: mpsc::Sender<Bytes>,
) {
    let cancel = conn.inner.cancel.clone();
    let capacity = conn.inner.config.read_buffer_size.max(1);
    let mut frames = FramedRead::with_capacity(reader, TelnetFsm::new(), capacity);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = frames.next() => next,
        };
        match next {
            Some(Ok(frame)) => {
                if !conn.dispatch(frame, &mut negotiator, &data).await {
                    break;
                }
            }
            Some(Err(error)) => {
                warn!(%error, "Read failed, closing connection");
                break;
            }
            None => {
                debug!("Peer closed the stream");
                break;
            }
        }
    }

    drop(frames);
    drop(data);
    conn.close().await;
}

#[instrument(name = "write_pump", skip_all, fields(connection_id = %id))]
async fn write_pump(
    id: ConnectionId,
    mut sink: BoxWriter,
    mut outbound: mpsc::Receiver<Bytes>,
    stop: CancellationToken,
    connection: CancellationToken,
    bytes_sent: Arc<AtomicU64>,
) {
    loop {
        let bytes = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            next = outbound.recv() => match next {
                Some(bytes) => bytes,
                None => break,
            },
        };
        if let Err(error) = write_message(&mut sink, &bytes).await {
            warn!(%error, "Write failed, closing connection");
            connection.cancel();
            return;
        }
        record_sent(&bytes_sent, bytes.len());
    }

    // Flush whatever was queued before the stop request.
    outbound.close();
    while let Ok(bytes) = outbound.try_recv() {
        if write_message(&mut sink, &bytes).await.is_err() {
            break;
        }
        record_sent(&bytes_sent, bytes.len());
    }
    if let Err(error) = sink.shutdown().await {
        debug!(%error, "Shutting down write half failed");
    }
    debug!("Write pump stopped");
}

async fn write_message(sink: &mut BoxWriter, bytes: &[u8]) -> std::io::Result<()> {
    sink.write_all(bytes).await?;
    sink.flush().await
}

fn record_sent(bytes_sent: &AtomicU64, len: usize) {
    bytes_sent.fetch_add(len as u64, Ordering::Relaxed);
    counter!("telwire.bytes.sent").increment(len as u64);
}

#[instrument(name = "data_worker", skip_all, fields(connection_id = %id))]
async fn data_worker(
    id: ConnectionId,
    mut batches: mpsc::Receiver<Bytes>,
    handler: Arc<dyn DataHandler>,
    writer: TelnetWriter,
    cancel: CancellationToken,
) {
    loop {
        let first = tokio::select! {
            biased;
            next = batches.recv() => match next {
                Some(bytes) => bytes,
                None => break,
            },
            _ = cancel.cancelled() => break,
        };
        let batch = coalesce(first, &mut batches);
        trace!(len = batch.len(), "Delivering data");
        DATA_TASK.scope(id, handler.on_data(&writer, batch)).await;
    }
    debug!("Data worker stopped");
}

/// Merge any batches that arrived while the handler was busy.
fn coalesce(first: Bytes, batches: &mut mpsc::Receiver<Bytes>) -> Bytes {
    let Ok(next) = batches.try_recv() else {
        return first;
    };
    let mut merged = BytesMut::with_capacity(first.len() + next.len());
    merged.extend_from_slice(&first);
    merged.extend_from_slice(&next);
    while let Ok(more) = batches.try_recv() {
        merged.extend_from_slice(&more);
    }
    merged.freeze()
}
