// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

// Drives PendingTxSubscription against a local websocket server that speaks
// just enough of the eth_subscribe protocol to exercise intake.

use alloy::primitives::{Address, B256};
use futures::{SinkExt, StreamExt};
use presale_racer::network::subscription::{PendingTxSubscription, SubscriptionRequest};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

fn notification(hash: B256) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","method":"eth_subscription","params":{{"subscription":"0xsub","result":"{hash:#x}"}}}}"#
    )
}

/// Accept one client, hand its first frame back, then push `frames`.
async fn serve_once(frames: Vec<String>) -> (String, oneshot::Receiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}", listener.local_addr().expect("addr"));
    let (req_tx, req_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = req_tx.send(serde_json::from_str::<Value>(&text).expect("request json"));
        }
        for frame in frames {
            ws.send(Message::Text(frame.into())).await.expect("send frame");
        }
        // Hold the connection open until the client goes away.
        while let Some(Ok(_)) = ws.next().await {}
    });
    (url, req_rx)
}

#[tokio::test]
async fn forwards_hashes_in_order_and_drops_malformed_frames() {
    let h1 = B256::from([0x11; 32]);
    let h2 = B256::from([0x22; 32]);
    let (url, request) = serve_once(vec![
        r#"{"jsonrpc":"2.0","id":1,"result":"0xsub"}"#.to_string(),
        notification(h1),
        "{not json".to_string(),
        r#"{"jsonrpc":"2.0","method":"eth_subscription","params":{"result":"0x12"}}"#.to_string(),
        notification(h2),
    ])
    .await;

    let sub = PendingTxSubscription::open(&url, &SubscriptionRequest::hashes_only())
        .await
        .expect("open");
    let (tx, mut rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(sub.forward(tx, shutdown.clone()));

    let request = request.await.expect("request seen");
    assert_eq!(request["method"], "eth_subscribe");
    assert_eq!(request["params"][0], "alchemy_pendingTransactions");
    assert_eq!(request["params"][1]["hashesOnly"], true);
    assert!(request["params"][1].get("toAddress").is_none());

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("first hash");
    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("second hash");
    assert_eq!(first, Some(h1));
    assert_eq!(second, Some(h2));

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("forward stops")
        .expect("join");
    assert!(result.is_ok());
}

#[tokio::test]
async fn filtered_request_reaches_the_server() {
    let contract = Address::from([0xa4; 20]);
    let (url, request) = serve_once(vec![]).await;
    let req = SubscriptionRequest::hashes_only().with_filter(Some(contract), None);
    let sub = PendingTxSubscription::open(&url, &req).await.expect("open");

    let request = request.await.expect("request seen");
    assert_eq!(request["params"][1]["toAddress"], format!("{contract:#x}"));
    assert!(request["params"][1].get("fromAddress").is_none());
    sub.close().await;
}

#[tokio::test]
async fn rejected_subscribe_ends_forward_with_error() {
    let (url, _request) = serve_once(vec![
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid params"}}"#.to_string(),
    ])
    .await;
    let sub = PendingTxSubscription::open(&url, &SubscriptionRequest::hashes_only())
        .await
        .expect("open");
    let (tx, _rx) = mpsc::channel(1);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        sub.forward(tx, CancellationToken::new()),
    )
    .await
    .expect("forward returns");
    assert!(result.is_err());
}

#[tokio::test]
async fn tls_handshake_failure_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    tokio::spawn(async move {
        // Accept and hang up without speaking TLS.
        if let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });

    let url = format!("wss://localhost:{port}");
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        PendingTxSubscription::open(&url, &SubscriptionRequest::hashes_only()),
    )
    .await
    .expect("open returns");
    assert!(result.is_err());
}
