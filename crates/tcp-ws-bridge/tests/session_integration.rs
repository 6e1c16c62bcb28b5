//! Drives a single [`Session`] directly and checks the summary it reports.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use tcp_ws_bridge::domain::{Direction, SessionOutcome, Termination};
use tcp_ws_bridge::infrastructure::Session;

use common::{bridge_config, collect_until_close, spawn_ws_server, tcp_pair, STEP_TIMEOUT};

#[tokio::test]
async fn test_tcp_eof_finishes_tcp_to_ws_first() {
    // Arrange: a peer that never sends anything
    let ws_addr = spawn_ws_server(|ws| async move {
        collect_until_close(ws).await;
    })
    .await;
    let config = Arc::new(bridge_config(&format!("ws://{ws_addr}/"), None));
    let (mut client, server, peer) = tcp_pair().await;

    // Act
    let session = tokio::spawn(Session::new(peer, config).run(server));
    client.write_all(b"hello").await.unwrap();
    client.shutdown().await.unwrap();
    let outcome = timeout(STEP_TIMEOUT, session).await.unwrap().unwrap();

    // Assert
    let SessionOutcome::Bridged(summary) = outcome else {
        panic!("expected a bridged session, got {outcome:?}");
    };
    assert_eq!(summary.first_finished, Direction::TcpToWs);
    assert_eq!(summary.termination, Termination::Eof);
    assert_eq!(summary.tcp_to_ws_bytes, 5);
    assert_eq!(summary.ws_to_tcp_bytes, 0);
}

#[tokio::test]
async fn test_ws_close_finishes_ws_to_tcp_first() {
    // Arrange
    let ws_addr = spawn_ws_server(|mut ws| async move {
        ws.send(Message::Binary(b"xyz".to_vec())).await.unwrap();
        let _ = ws.close(None).await;
        collect_until_close(ws).await;
    })
    .await;
    let config = Arc::new(bridge_config(&format!("ws://{ws_addr}/"), None));
    let (_client, server, peer) = tcp_pair().await;

    // Act: the client stays connected and silent
    let outcome = timeout(STEP_TIMEOUT, Session::new(peer, config).run(server))
        .await
        .unwrap();

    // Assert
    let SessionOutcome::Bridged(summary) = outcome else {
        panic!("expected a bridged session, got {outcome:?}");
    };
    assert_eq!(summary.first_finished, Direction::WsToTcp);
    assert!(summary.termination.is_clean());
    assert_eq!(summary.ws_to_tcp_bytes, 3);
    assert_eq!(summary.tcp_to_ws_bytes, 0);
}

/// The WS→TCP pump is parked in a TCP write that can never finish (the client
/// does not read). TCP EOF must still end the session promptly.
#[tokio::test]
async fn test_tcp_eof_cancels_ws_to_tcp_pump_blocked_on_write() {
    // Arrange: a peer that floods until the connection goes away
    let ws_addr = spawn_ws_server(|mut ws| async move {
        let chunk = vec![0x5a; 64 * 1024];
        while ws.send(Message::Binary(chunk.clone())).await.is_ok() {}
    })
    .await;
    let config = Arc::new(bridge_config(&format!("ws://{ws_addr}/"), None));
    let (mut client, server, peer) = tcp_pair().await;
    let session = tokio::spawn(Session::new(peer, config).run(server));

    // Let the flood fill the client's receive buffer and the bridge's send buffer
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Act: half-close without ever reading
    client.shutdown().await.unwrap();
    let outcome = timeout(STEP_TIMEOUT, session)
        .await
        .expect("session must end even though a TCP write is pending")
        .unwrap();

    // Assert
    let SessionOutcome::Bridged(summary) = outcome else {
        panic!("expected a bridged session, got {outcome:?}");
    };
    assert_eq!(summary.first_finished, Direction::TcpToWs);
    assert_eq!(summary.termination, Termination::Eof);
    assert_eq!(summary.tcp_to_ws_bytes, 0);
    assert!(summary.ws_to_tcp_bytes > 0, "some of the flood must have been relayed");
    drop(client);
}

#[tokio::test]
async fn test_ws_drop_without_close_is_reported_as_failure() {
    // Arrange
    let ws_addr = spawn_ws_server(|ws| async move {
        drop(ws);
    })
    .await;
    let config = Arc::new(bridge_config(&format!("ws://{ws_addr}/"), None));
    let (_client, server, peer) = tcp_pair().await;

    // Act
    let outcome = timeout(STEP_TIMEOUT, Session::new(peer, config).run(server))
        .await
        .unwrap();

    // Assert
    let SessionOutcome::Bridged(summary) = outcome else {
        panic!("expected a bridged session, got {outcome:?}");
    };
    assert_eq!(summary.first_finished, Direction::WsToTcp);
    assert!(matches!(summary.termination, Termination::Failed(_)));
}

#[tokio::test]
async fn test_handshake_failure_is_reported() {
    // Arrange
    let config = Arc::new(bridge_config(&common::dead_ws_url().await, None));
    let (_client, server, peer) = tcp_pair().await;

    // Act
    let outcome = timeout(STEP_TIMEOUT, Session::new(peer, config).run(server))
        .await
        .unwrap();

    // Assert
    assert!(matches!(outcome, SessionOutcome::HandshakeFailed(_)));
}
