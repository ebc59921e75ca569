//! A page driven over the DevTools protocol.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::client::CdpClient;
use super::probe::layout_probe;
use crate::layout::{ElementTarget, LayoutSnapshot, LayoutSource};
use crate::transport::{TouchEventPayload, TouchTransport, TransportError};

/// One connected page, usable as both [`TouchTransport`] and
/// [`LayoutSource`].
#[derive(Clone)]
pub struct CdpPage {
    client: Arc<CdpClient>,
}

impl CdpPage {
    /// Wraps a connected client.
    pub fn new(client: Arc<CdpClient>) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<CdpClient> {
        &self.client
    }

    /// Evaluates a JavaScript expression and returns its value.
    ///
    /// Promises are awaited. A thrown exception becomes
    /// [`TransportError::JavaScript`].
    pub async fn evaluate(&self, expression: &str) -> Result<Value, TransportError> {
        let result = self
            .client
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(TransportError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}

#[async_trait]
impl TouchTransport for CdpPage {
    async fn dispatch_touch(&self, payload: &TouchEventPayload) -> Result<(), TransportError> {
        let params = serde_json::to_value(payload)?;
        self.client
            .call("Input.dispatchTouchEvent", Some(params))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LayoutSource for CdpPage {
    async fn snapshot(&self, target: &ElementTarget) -> Result<LayoutSnapshot, TransportError> {
        let value = self.evaluate(&layout_probe(target)).await?;
        if value.is_null() {
            return Err(TransportError::ElementNotFound(target.to_string()));
        }
        let snapshot: LayoutSnapshot = serde_json::from_value(value)?;
        debug!(
            context = %snapshot.context,
            contexts = snapshot.contexts.len(),
            "layout snapshot"
        );
        Ok(snapshot)
    }
}
