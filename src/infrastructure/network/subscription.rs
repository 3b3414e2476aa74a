// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::common::parsing::parse_b256_hex;
use crate::domain::constants::{PENDING_TX_TOPIC, SUBSCRIBE_METHOD};
use crate::network::provider::ConnectionFactory;
use alloy::primitives::{Address, B256};
use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Parameters of the pending-transaction subscribe call. Unfiltered unless
/// `with_filter` narrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub to_address: Option<Address>,
    pub from_addresses: Vec<Address>,
}

impl SubscriptionRequest {
    pub fn hashes_only() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, to: Option<Address>, from: Option<Address>) -> Self {
        self.to_address = to;
        self.from_addresses = from.into_iter().collect();
        self
    }

    pub fn params(&self) -> Value {
        let mut opts = Map::new();
        if let Some(to) = self.to_address {
            opts.insert("toAddress".into(), json!(format!("{to:#x}")));
        }
        if !self.from_addresses.is_empty() {
            let from: Vec<String> = self
                .from_addresses
                .iter()
                .map(|a| format!("{a:#x}"))
                .collect();
            opts.insert("fromAddress".into(), json!(from));
        }
        opts.insert("hashesOnly".into(), json!(true));
        json!([PENDING_TX_TOPIC, Value::Object(opts)])
    }

    pub fn to_json(&self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": SUBSCRIBE_METHOD,
            "params": self.params(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    PendingHash(B256),
    SubscriptionAck(String),
    /// The node refused the subscribe call.
    Rejected(String),
    Other,
}

/// Classify one text frame. Errors mean the frame is malformed and should be dropped.
pub fn parse_notification(text: &str) -> Result<Notification, AppError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| AppError::Subscription(format!("Undecodable frame: {}", e)))?;

    if let Some(params) = value.get("params") {
        let result = params
            .get("result")
            .ok_or_else(|| AppError::Subscription("Notification without result".into()))?;
        // Full-tx subscriptions carry an object; hashesOnly carries the bare hash.
        let raw = result
            .as_str()
            .or_else(|| result.get("hash").and_then(Value::as_str))
            .ok_or_else(|| AppError::Subscription(format!("Unexpected result shape: {}", result)))?;
        let hash = parse_b256_hex(raw)
            .ok_or_else(|| AppError::Subscription(format!("Bad hash in notification: {raw}")))?;
        return Ok(Notification::PendingHash(hash));
    }

    if let Some(err) = value.get("error") {
        return Ok(Notification::Rejected(err.to_string()));
    }

    if value.get("id").is_some()
        && let Some(id) = value.get("result").and_then(Value::as_str)
    {
        return Ok(Notification::SubscriptionAck(id.to_string()));
    }

    Ok(Notification::Other)
}

pub struct PendingTxSubscription {
    ws: WsStream,
    url: String,
}

impl PendingTxSubscription {
    /// Connect and send the subscribe request. The acknowledgement is handled by `forward`.
    pub async fn open(url: &str, request: &SubscriptionRequest) -> Result<Self, AppError> {
        ConnectionFactory::install_tls_provider();
        let (mut ws, _) = connect_async(url)
            .await
            .map_err(|e| AppError::Connection(format!("WebSocket connect to {} failed: {}", url, e)))?;

        let payload = request.to_json().to_string();
        tracing::debug!(target: "subscription", request = %payload, "Sending subscribe request");
        ws.send(Message::Text(payload.into()))
            .await
            .map_err(|e| AppError::Subscription(format!("Subscribe send failed: {}", e)))?;

        tracing::info!(target: "subscription", url = %url, "Pending tx subscription opened");
        Ok(Self {
            ws,
            url: url.to_string(),
        })
    }

    /// Pump hashes into `tx` in arrival order until cancelled, the receiver
    /// goes away, or the connection ends.
    pub async fn forward(
        mut self,
        tx: mpsc::Sender<B256>,
        shutdown: CancellationToken,
    ) -> Result<(), AppError> {
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => None,
                frame = self.ws.next() => Some(frame),
            };
            let Some(frame) = next else {
                tracing::info!(target: "subscription", "Shutdown requested; closing subscription");
                self.close().await;
                return Ok(());
            };

            let text = match frame {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(reason))) => {
                    tracing::warn!(target: "subscription", url = %self.url, ?reason, "Subscription closed by server");
                    return Ok(());
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(target: "subscription", url = %self.url, error = %e, "Subscription stream error");
                    return Ok(());
                }
                None => {
                    tracing::warn!(target: "subscription", url = %self.url, "Subscription stream ended");
                    return Ok(());
                }
            };

            match parse_notification(&text) {
                Ok(Notification::PendingHash(hash)) => {
                    if tx.send(hash).await.is_err() {
                        tracing::debug!(target: "subscription", "Receiver dropped; stopping forward");
                        return Ok(());
                    }
                }
                Ok(Notification::SubscriptionAck(id)) => {
                    tracing::info!(target: "subscription", subscription_id = %id, "Subscribed to pending transactions");
                }
                Ok(Notification::Rejected(err)) => {
                    self.close().await;
                    return Err(AppError::Subscription(format!("Subscribe rejected: {}", err)));
                }
                Ok(Notification::Other) => {}
                Err(e) => {
                    tracing::warn!(target: "subscription", error = %e, "Dropping malformed message");
                }
            }
        }
    }

    pub async fn close(mut self) {
        if let Err(e) = self.ws.close(None).await {
            tracing::debug!(target: "subscription", error = %e, "Close handshake failed");
        }
    }
}
