//! DevTools WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use super::protocol::{select_page, CdpRequest, CdpResponse, PageInfo};
use crate::transport::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type Pending = Arc<Mutex<PendingCalls>>;

/// Callers waiting for a response, and why the socket closed once it has.
///
/// Both live under one lock so a call cannot register after the receive
/// loop drained the waiters.
#[derive(Default)]
struct PendingCalls {
    waiters: HashMap<u64, oneshot::Sender<Result<Value, TransportError>>>,
    closed: Option<String>,
}

/// How long a command may wait for its response.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// A connection to one page's DevTools WebSocket.
///
/// Commands are matched to responses by id; a background task reads the
/// socket and completes the waiting caller. Events are ignored.
pub struct CdpClient {
    ws_url: String,
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Pending,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Discovers a page at a DevTools HTTP endpoint and connects to it.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - DevTools endpoint (e.g., "http://localhost:9222")
    /// * `page_filter` - Optional text the page URL must contain
    pub async fn connect(endpoint: &str, page_filter: Option<&str>) -> Result<Self, TransportError> {
        let pages = Self::list_pages(endpoint).await?;
        let page = select_page(&pages, page_filter).ok_or_else(|| {
            TransportError::CommandFailed(match page_filter {
                Some(f) => format!("no page at {} matches '{}'", endpoint, f),
                None => format!("no debuggable page at {}", endpoint),
            })
        })?;
        debug!(id = %page.id, url = %page.url, "selected page");

        let ws_url = page
            .web_socket_debugger_url
            .as_deref()
            .ok_or(TransportError::NotConnected)?;
        Self::connect_ws(ws_url).await
    }

    /// Lists the targets of a DevTools HTTP endpoint.
    pub async fn list_pages(endpoint: &str) -> Result<Vec<PageInfo>, TransportError> {
        let url = format!("{}/json/list", endpoint.trim_end_matches('/'));
        debug!("Fetching targets from {}", url);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages)
    }

    /// Connects directly to a page WebSocket URL.
    pub async fn connect_ws(ws_url: &str) -> Result<Self, TransportError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url).await?;
        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Pending = Arc::new(Mutex::new(PendingCalls::default()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        debug!("CDP client connected to {}", ws_url);

        Ok(Self {
            ws_url: ws_url.to_string(),
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            request_id: AtomicU64::new(1),
            pending,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Pending) {
        let reason = loop {
            match ws_source.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!("CDP recv: {}", text);
                    let resp = match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => resp,
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                            continue;
                        }
                    };
                    let Some(id) = resp.id else {
                        continue;
                    };
                    let waiter = pending.lock().waiters.remove(&id);
                    if let Some(tx) = waiter {
                        let result = match resp.error {
                            Some(error) => Err(TransportError::Protocol {
                                code: error.code,
                                message: error.message,
                            }),
                            None => Ok(resp.result.unwrap_or(Value::Null)),
                        };
                        let _ = tx.send(result);
                    }
                }
                Some(Ok(Message::Close(_))) | None => break "WebSocket closed".to_string(),
                Some(Err(e)) => break e.to_string(),
                Some(Ok(_)) => {}
            }
        };

        debug!(%reason, "CDP receive loop ended");
        let mut pending = pending.lock();
        for (_, tx) in pending.waiters.drain() {
            let _ = tx.send(Err(TransportError::ConnectionLost(reason.clone())));
        }
        pending.closed = Some(reason);
    }

    /// Sends a command and waits for its result.
    ///
    /// Fails with [`TransportError::ConnectionLost`] once the socket has
    /// closed, without waiting for the response timeout.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, TransportError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
        };
        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if let Some(reason) = &pending.closed {
                return Err(TransportError::ConnectionLost(reason.clone()));
            }
            pending.waiters.insert(id, tx);
        }

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().waiters.remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(RESPONSE_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TransportError::ConnectionLost(format!("{} got no response", method))),
            Err(_) => {
                self.pending.lock().waiters.remove(&id);
                Err(TransportError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// The page WebSocket URL.
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
