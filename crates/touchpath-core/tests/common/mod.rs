//! Shared test helpers for touchpath-core integration tests.
//!
//! This module provides recording transports, scripted layout sources and a
//! mock DevTools endpoint (HTTP target list plus WebSocket) for tests that
//! exercise the full gesture stack.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;

use touchpath_core::frame::FrameBox;
use touchpath_core::geometry::Rect;
use touchpath_core::layout::{ContextNode, ElementTarget, EmbeddedFrameInfo, LayoutSnapshot, LayoutSource};
use touchpath_core::transport::{
    TouchEventKind, TouchEventPayload, TouchTransport, TransportError,
};

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

/// Records every payload together with the (tokio) time it was sent.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(TouchEventPayload, Instant)>>,
    fail_at: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A transport that rejects the call with the given zero-based index.
    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_at: Some(index),
        })
    }

    pub fn payloads(&self) -> Vec<TouchEventPayload> {
        self.sent.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn kinds(&self) -> Vec<TouchEventKind> {
        self.sent.lock().iter().map(|(p, _)| p.kind).collect()
    }

    /// Gaps between consecutive events, in milliseconds.
    pub fn gaps_ms(&self) -> Vec<u128> {
        self.sent
            .lock()
            .windows(2)
            .map(|w| (w[1].1 - w[0].1).as_millis())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl TouchTransport for RecordingTransport {
    async fn dispatch_touch(&self, payload: &TouchEventPayload) -> Result<(), TransportError> {
        let mut sent = self.sent.lock();
        if self.fail_at == Some(sent.len()) {
            return Err(TransportError::ConnectionLost("browser went away".into()));
        }
        sent.push((payload.clone(), Instant::now()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Layout sources
// ---------------------------------------------------------------------------

/// Serves snapshots in order, repeating the last one. Counts calls.
pub struct ScriptedLayout {
    snapshots: Vec<LayoutSnapshot>,
    calls: Mutex<usize>,
}

impl ScriptedLayout {
    pub fn new(snapshots: Vec<LayoutSnapshot>) -> Arc<Self> {
        assert!(!snapshots.is_empty());
        Arc::new(Self {
            snapshots,
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl LayoutSource for ScriptedLayout {
    async fn snapshot(&self, _target: &ElementTarget) -> Result<LayoutSnapshot, TransportError> {
        let mut calls = self.calls.lock();
        let index = (*calls).min(self.snapshots.len() - 1);
        *calls += 1;
        Ok(self.snapshots[index].clone())
    }
}

/// A layout source whose element never exists.
pub struct MissingElement;

#[async_trait]
impl LayoutSource for MissingElement {
    async fn snapshot(&self, target: &ElementTarget) -> Result<LayoutSnapshot, TransportError> {
        Err(TransportError::ElementNotFound(target.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Snapshot fixtures
// ---------------------------------------------------------------------------

fn context(id: &str, parent: Option<&str>, frame: Option<FrameBox>) -> ContextNode {
    ContextNode {
        id: id.to_string(),
        parent: parent.map(str::to_string),
        frame,
        embedded: Vec::new(),
    }
}

/// Element at (8, 12) in a 1:1 frame at (100, 50), inside a top-level page.
pub fn framed_snapshot() -> LayoutSnapshot {
    LayoutSnapshot {
        context: "1".into(),
        element: Rect::new(8.0, 12.0, 300.0, 200.0),
        contexts: vec![
            context("0", None, None),
            context(
                "1",
                Some("0"),
                Some(FrameBox::new(Rect::new(100.0, 50.0, 640.0, 480.0), 640.0)),
            ),
        ],
        root: Some("0".into()),
    }
}

/// Element at (4, 6) in a frame at (10, 10) of a middle document, which is
/// itself shown at (20, 30) in the top page, scaled 2x.
pub fn nested_scaled_snapshot() -> LayoutSnapshot {
    LayoutSnapshot {
        context: "2".into(),
        element: Rect::new(4.0, 6.0, 100.0, 100.0),
        contexts: vec![
            context("0", None, None),
            context(
                "1",
                Some("0"),
                Some(FrameBox::new(Rect::new(20.0, 30.0, 800.0, 600.0), 400.0)),
            ),
            context(
                "2",
                Some("1"),
                Some(FrameBox::new(Rect::new(10.0, 10.0, 200.0, 200.0), 200.0)),
            ),
        ],
        root: Some("0".into()),
    }
}

/// Like [`framed_snapshot`], but the inner context cannot read its hosting
/// frame; the parent lists it as embedded content instead.
pub fn cross_origin_snapshot() -> LayoutSnapshot {
    let frame = FrameBox::new(Rect::new(100.0, 50.0, 640.0, 480.0), 640.0);
    let mut top = context("0", None, None);
    top.embedded = vec![
        EmbeddedFrameInfo {
            content: "ads".into(),
            frame: FrameBox::new(Rect::new(0.0, 0.0, 10.0, 10.0), 10.0),
        },
        EmbeddedFrameInfo {
            content: "1".into(),
            frame,
        },
    ];
    LayoutSnapshot {
        context: "1".into(),
        element: Rect::new(8.0, 12.0, 300.0, 200.0),
        contexts: vec![top, context("1", Some("0"), None)],
        root: Some("0".into()),
    }
}

// ---------------------------------------------------------------------------
// Mock DevTools endpoint
// ---------------------------------------------------------------------------

/// Commands received by a mock page, in order.
pub type Received = Arc<Mutex<Vec<(String, Value)>>>;

/// Start a mock page WebSocket that accepts one connection and answers
/// every command with `respond(method, params)`. `Err((code, message))`
/// is sent back as a protocol error.
pub async fn mock_page<F>(respond: F) -> (String, Received)
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let request: Value = serde_json::from_str(text.as_str()).unwrap();
            let id = request["id"].as_u64().unwrap();
            let method = request["method"].as_str().unwrap().to_string();
            let params = request.get("params").cloned().unwrap_or(Value::Null);
            let reply = match respond(&method, &params) {
                Ok(result) => json!({ "id": id, "result": result }),
                Err((code, message)) => json!({ "id": id, "error": { "code": code, "message": message } }),
            };
            log.lock().push((method, params));
            // An unrelated event first, as a real browser interleaves them.
            let event = json!({ "method": "Runtime.consoleAPICalled", "params": {} });
            ws.send(Message::Text(event.to_string().into())).await.unwrap();
            ws.send(Message::Text(reply.to_string().into())).await.unwrap();
        }
    });

    (format!("ws://{}", addr), received)
}

/// Start a mock page WebSocket that accepts one connection and closes it
/// as soon as the first command arrives.
pub async fn closing_page() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        let _ = ws.close(None).await;
    });
    format!("ws://{}", addr)
}

/// Start a one-shot HTTP server answering `GET /json/list` with `targets`.
pub async fn mock_target_list(targets: Value) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        assert!(String::from_utf8_lossy(&request).starts_with("GET /json/list "));

        let body = targets.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    });

    addr
}

/// Replies like a browser: `Runtime.evaluate` returns `value`, everything
/// else returns an empty result.
pub fn evaluate_returns(value: Value) -> impl Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + 'static {
    move |method: &str, _params: &Value| match method {
        "Runtime.evaluate" => Ok(json!({ "result": { "type": "object", "value": value.clone() } })),
        _ => Ok(json!({})),
    }
}
