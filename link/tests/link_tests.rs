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

//! Link manager tests against a scripted mock device

use matrixctl_link::{Command, LinkConfig, LinkError, MatrixLink};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

fn test_config(addr: SocketAddr) -> LinkConfig {
    LinkConfig::new(addr.ip().to_string(), addr.port())
        .with_connect_timeout(Duration::from_secs(1))
        .with_response_timeout(Duration::from_millis(500))
        .with_drain_window(Duration::from_millis(100))
        .with_retry_backoff(Duration::from_millis(50))
        .with_reconnect_cooldown(Duration::from_millis(200))
}

/// Spawn a device that acknowledges switches and answers status queries.
async fn spawn_device() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepts = Arc::new(AtomicUsize::new(0));
    let counter = accepts.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(handle_device_connection(stream));
        }
    });
    (addr, accepts)
}

async fn handle_device_connection(stream: TcpStream) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.starts_with("SET SW") {
            let _ = write.write_all(b"OK\r\n").await;
        } else if line.starts_with("GET MP") {
            let _ = write
                .write_all(b"MP in2 out1\r\nMP in0 out2\r\nnoise\r\n")
                .await;
        }
    }
}

#[tokio::test]
async fn test_switch_command_puts_exact_bytes_on_wire() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 64];
        let mut filled = 0;
        loop {
            let n = stream.read(&mut buf[filled..]).await.unwrap();
            assert!(n > 0, "client closed before sending a full line");
            filled += n;
            if buf[..filled].windows(2).any(|w| w == b"\r\n") {
                break;
            }
        }
        stream.write_all(b"OK\r\n").await.unwrap();
        tx.send(buf[..filled].to_vec()).unwrap();
    });

    let link = MatrixLink::new(test_config(addr));
    let response = link
        .send(Command::switch_route(0, 5).unwrap())
        .await
        .unwrap();

    assert_eq!(response.text(), "OK");
    assert_eq!(rx.await.unwrap(), b"SET SW in0 out5\r\n");
}

#[tokio::test]
async fn test_query_collects_multiline_response() {
    let (addr, _accepts) = spawn_device().await;
    let link = MatrixLink::new(test_config(addr));

    let response = link.send(Command::query_all_mappings()).await.unwrap();
    let lines: Vec<&str> = response.lines().iter().map(String::as_str).collect();
    assert_eq!(lines, ["MP in2 out1", "MP in0 out2", "noise"]);
    assert!(link.is_connected());
}

#[tokio::test]
async fn test_send_exhausts_retries_with_backoff() {
    // Device accepts connections but never responds, so every attempt times
    // out and the retry loop must run to its bound.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepts = Arc::new(AtomicUsize::new(0));
    let counter = accepts.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(stream);
        }
    });

    let link = MatrixLink::new(
        test_config(addr)
            .with_response_timeout(Duration::from_millis(100))
            .with_max_retries(3),
    );

    let started = Instant::now();
    let err = link.send(Command::query_all_mappings()).await.unwrap_err();

    assert!(matches!(err, LinkError::RetriesExhausted { attempts: 3 }));
    // Three timed-out attempts with two backoff sleeps between them.
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(accepts.load(Ordering::SeqCst), 3);
    assert!(!link.is_connected());
}

#[tokio::test]
async fn test_send_fails_not_connected_when_device_absent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let link = MatrixLink::new(test_config(addr));
    let err = link
        .send(Command::switch_route(1, 1).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, LinkError::NotConnected));
    assert!(!link.is_connected());
}

#[tokio::test]
async fn test_reconnect_cooldown_suppresses_attempts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let link = MatrixLink::new(test_config(addr).with_reconnect_cooldown(Duration::from_millis(300)));

    // First attempt really touches the wire and fails.
    assert!(!link.ensure_connected().await);

    // The device comes back immediately, but inside the cooldown the second
    // call must not try the wire at all — so it still reports false.
    let listener = TcpListener::bind(addr).await.unwrap();
    assert!(!link.ensure_connected().await);

    // Past the cooldown a real attempt is made and succeeds.
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(link.ensure_connected().await);
    assert!(link.is_connected());
    drop(listener);
}

#[tokio::test]
async fn test_ensure_connected_is_idempotent_while_up() {
    let (addr, accepts) = spawn_device().await;
    let link = MatrixLink::new(test_config(addr));

    assert!(link.ensure_connected().await);
    assert!(link.ensure_connected().await);

    assert_eq!(accepts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let (addr, _accepts) = spawn_device().await;
    let link = MatrixLink::new(test_config(addr));

    // Disconnecting a link that never connected is a no-op.
    link.disconnect().await;
    assert!(!link.is_connected());

    assert!(link.ensure_connected().await);
    link.disconnect().await;
    link.disconnect().await;
    assert!(!link.is_connected());
}

#[tokio::test]
async fn test_metrics_track_wire_traffic() {
    let (addr, _accepts) = spawn_device().await;
    let link = MatrixLink::new(test_config(addr));

    link.send(Command::switch_route(3, 4).unwrap()).await.unwrap();
    let snapshot = link.metrics().snapshot();

    assert_eq!(snapshot.connects, 1);
    assert_eq!(snapshot.commands_sent, 1);
    assert_eq!(snapshot.responses_received, 1);
    assert_eq!(snapshot.transport_errors, 0);
}
