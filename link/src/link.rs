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

//! Matrix device link manager

use crate::{LinkConfig, LinkError, LinkMetrics, Result};
use futures::{SinkExt, StreamExt};
use matrixctl_linecodec::{Command, LineCodec};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// A complete response to one command.
///
/// Switch acknowledgments are a single line; the full status query returns
/// one line per mapping plus whatever banner noise the device emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    lines: Vec<String>,
}

impl Response {
    /// The raw response lines, in arrival order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The response as a single newline-joined string
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Connection status reported to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    /// Whether a device connection is currently established
    pub connected: bool,
    /// The configured device address
    pub device_address: String,
}

/// State guarded by the link mutex
struct LinkState {
    transport: Option<Framed<TcpStream, LineCodec>>,
    last_failed_attempt: Option<Instant>,
}

/// The single owner of the outbound matrix device connection.
///
/// Exactly one instance exists per process. All of connect, send, and
/// disconnect are mutually exclusive; concurrent callers queue on the
/// internal mutex rather than interleaving wire traffic. Callers must not
/// issue overlapping [`MatrixLink::send`] calls — the retry loop releases
/// the lock between attempts so shutdown can cut in, and interleaved sends
/// would observe each other's reconnects.
pub struct MatrixLink {
    config: LinkConfig,
    connected: AtomicBool,
    metrics: LinkMetrics,
    state: Mutex<LinkState>,
}

impl MatrixLink {
    /// Create a link manager for the configured device; no connection is
    /// attempted until the first command or an explicit
    /// [`MatrixLink::ensure_connected`].
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            connected: AtomicBool::new(false),
            metrics: LinkMetrics::new(),
            state: Mutex::new(LinkState {
                transport: None,
                last_failed_attempt: None,
            }),
        }
    }

    /// The link configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// The link counters
    pub fn metrics(&self) -> &LinkMetrics {
        &self.metrics
    }

    /// Whether a device connection is currently established.
    ///
    /// Lock-free so status queries never queue behind an in-flight command.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Connection status for callers
    pub fn status(&self) -> LinkStatus {
        LinkStatus {
            connected: self.is_connected(),
            device_address: self.config.address(),
        }
    }

    /// Ensure a device connection exists, returning whether one does.
    ///
    /// Returns true immediately when already connected. Otherwise attempts
    /// are rate-limited: after a failed attempt, further calls inside the
    /// reconnect cooldown return false without touching the wire.
    pub async fn ensure_connected(&self) -> bool {
        let mut state = self.state.lock().await;
        self.connect_locked(&mut state).await
    }

    /// Send a command and await its response, retrying transient failures.
    ///
    /// If the link is down, reconnection is attempted first; a reconnect
    /// failure is terminal for this call ([`LinkError::NotConnected`]) since
    /// the cooldown governs when the wire may be tried again. Transport
    /// failures mark the link disconnected, wait the fixed backoff, and
    /// retry from the top — up to the configured maximum, after which
    /// [`LinkError::RetriesExhausted`] is surfaced unmasked.
    pub async fn send(&self, command: Command) -> Result<Response> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.attempt(command).await {
                Ok(response) => {
                    debug!(command = %command, attempts, "command completed");
                    return Ok(response);
                }
                Err(err) if err.is_recoverable() => {
                    self.metrics.transport_error();
                    if attempts >= self.config.max_retries {
                        warn!(
                            command = %command,
                            attempts,
                            error = %err,
                            "matrix command failed, retries exhausted"
                        );
                        return Err(LinkError::RetriesExhausted { attempts });
                    }
                    warn!(
                        command = %command,
                        attempt = attempts,
                        error = %err,
                        "matrix command attempt failed, backing off"
                    );
                    self.metrics.retry();
                    sleep(self.config.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Close the device connection if one exists; otherwise a no-op.
    ///
    /// Safe to call during shutdown even while a send is mid-retry: the
    /// retry loop holds the lock only per attempt, so disconnect slots in
    /// between attempts.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        self.connected.store(false, Ordering::Release);
        if let Some(transport) = state.transport.take() {
            let mut stream = transport.into_inner();
            if let Err(err) = stream.shutdown().await {
                debug!(error = %err, "error closing matrix connection");
            }
            info!("disconnected from matrix device");
        }
    }

    /// One locked connect-and-exchange attempt.
    async fn attempt(&self, command: Command) -> Result<Response> {
        let mut state = self.state.lock().await;
        if !self.connect_locked(&mut state).await {
            return Err(LinkError::NotConnected);
        }
        let Some(transport) = state.transport.as_mut() else {
            return Err(LinkError::NotConnected);
        };
        match self.exchange(transport, command).await {
            Ok(response) => Ok(response),
            Err(err) => {
                // A failed exchange leaves the stream in an unknown state;
                // drop it so the next attempt starts from a clean connect.
                state.transport = None;
                self.connected.store(false, Ordering::Release);
                Err(err)
            }
        }
    }

    async fn connect_locked(&self, state: &mut LinkState) -> bool {
        if state.transport.is_some() {
            return true;
        }
        if let Some(last) = state.last_failed_attempt {
            if last.elapsed() < self.config.reconnect_cooldown {
                debug!(
                    cooldown = ?self.config.reconnect_cooldown,
                    "reconnect suppressed inside cooldown window"
                );
                return false;
            }
        }
        let address = self.config.address();
        match timeout(self.config.connect_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => {
                let _ = stream.set_nodelay(true);
                state.transport = Some(Framed::new(
                    stream,
                    LineCodec::with_max_line_length(self.config.max_line_length),
                ));
                state.last_failed_attempt = None;
                self.connected.store(true, Ordering::Release);
                self.metrics.connect();
                info!(address = %address, "connected to matrix device");
                true
            }
            Ok(Err(err)) => {
                state.last_failed_attempt = Some(Instant::now());
                self.connected.store(false, Ordering::Release);
                warn!(address = %address, error = %err, "failed to connect to matrix device");
                false
            }
            Err(_) => {
                state.last_failed_attempt = Some(Instant::now());
                self.connected.store(false, Ordering::Release);
                warn!(
                    address = %address,
                    timeout = ?self.config.connect_timeout,
                    "connection attempt to matrix device timed out"
                );
                false
            }
        }
    }

    /// Write one command and collect its response lines.
    async fn exchange(
        &self,
        transport: &mut Framed<TcpStream, LineCodec>,
        command: Command,
    ) -> Result<Response> {
        transport.send(command).await?;
        self.metrics.command_sent();

        let first = match timeout(self.config.response_timeout, transport.next()).await {
            Err(_) => return Err(LinkError::ResponseTimeout(self.config.response_timeout)),
            Ok(None) => return Err(LinkError::Io(std::io::ErrorKind::ConnectionReset.into())),
            Ok(Some(line)) => line?,
        };

        // The query response is multi-line with no terminator sentinel, so
        // collect until the device goes quiet for the drain window.
        let mut lines = vec![first];
        loop {
            match timeout(self.config.drain_window, transport.next()).await {
                Err(_) => break,
                Ok(Some(Ok(line))) => lines.push(line),
                Ok(Some(Err(err))) => return Err(err.into()),
                // Peer closed after responding; the dead socket surfaces on
                // the next send.
                Ok(None) => break,
            }
        }

        self.metrics.response_received();
        Ok(Response { lines })
    }
}
