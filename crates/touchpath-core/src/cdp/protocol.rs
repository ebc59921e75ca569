//! DevTools protocol messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command sent to the browser.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A message received from the browser: either a response (with `id`) or an
/// event (with `method`).
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
}

/// Error object of a failed command.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// A debuggable target, as listed by `/json/list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

impl PageInfo {
    /// Returns true for ordinary tabs (not workers, extensions or iframes).
    pub fn is_page(&self) -> bool {
        self.page_type == "page"
    }
}

/// Picks the page a gesture should run in.
///
/// The first ordinary page with a WebSocket URL wins; with a `filter`, its
/// URL must also contain the filter text.
pub fn select_page<'a>(pages: &'a [PageInfo], filter: Option<&str>) -> Option<&'a PageInfo> {
    pages.iter().find(|p| {
        p.is_page()
            && p.web_socket_debugger_url.is_some()
            && filter.map_or(true, |f| p.url.contains(f))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, kind: &str, url: &str) -> PageInfo {
        PageInfo {
            id: id.to_string(),
            page_type: kind.to_string(),
            title: String::new(),
            url: url.to_string(),
            web_socket_debugger_url: Some(format!("ws://localhost:9222/devtools/page/{}", id)),
        }
    }

    #[test]
    fn request_omits_missing_params() {
        let req = CdpRequest {
            id: 7,
            method: "Input.dispatchTouchEvent".to_string(),
            params: None,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"id":7,"method":"Input.dispatchTouchEvent"}"#
        );
    }

    #[test]
    fn response_with_error() {
        let json = r#"{"id": 3, "error": {"code": -32602, "message": "Invalid parameters"}}"#;
        let resp: CdpResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id, Some(3));
        let error = resp.error.unwrap();
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "Invalid parameters");
    }

    #[test]
    fn event_has_method_and_no_id() {
        let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}"#;
        let resp: CdpResponse = serde_json::from_str(json).unwrap();
        assert!(resp.id.is_none());
        assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
    }

    #[test]
    fn page_info_deserialize() {
        let json = r#"{
            "id": "page123",
            "type": "page",
            "title": "Game",
            "url": "http://localhost:8080/game.html",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
        }"#;
        let info: PageInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.id, "page123");
        assert!(info.is_page());
    }

    #[test]
    fn select_first_page_or_filtered() {
        let pages = vec![
            page("w", "service_worker", "http://localhost:8080/sw.js"),
            page("a", "page", "http://localhost:8080/index.html"),
            page("b", "page", "http://localhost:8080/game.html"),
        ];
        assert_eq!(select_page(&pages, None).unwrap().id, "a");
        assert_eq!(select_page(&pages, Some("game")).unwrap().id, "b");
        assert!(select_page(&pages, Some("missing")).is_none());
    }

    #[test]
    fn select_skips_pages_without_websocket() {
        let mut attached = page("a", "page", "http://x/");
        attached.web_socket_debugger_url = None;
        let pages = vec![attached, page("b", "page", "http://y/")];
        assert_eq!(select_page(&pages, None).unwrap().id, "b");
    }
}
