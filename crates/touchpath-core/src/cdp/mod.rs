//! Chrome DevTools Protocol (CDP) transport.
//!
//! Connects to one page of a Chromium-based browser over its DevTools
//! WebSocket and exposes it to the gesture engine:
//!
//! - [`CdpPage`] delivers touch events with `Input.dispatchTouchEvent` and
//!   snapshots element layout with a `Runtime.evaluate` probe.
//! - [`PageTrail`] draws the finger trail as an overlay in the page.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Connect:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://localhost:9222", Some("game")).await?;
//!    let page = CdpPage::new(Arc::new(client));
//!    ```

mod client;
mod overlay;
mod page;
pub mod probe;
mod protocol;

pub use client::{CdpClient, RESPONSE_TIMEOUT};
pub use overlay::PageTrail;
pub use page::CdpPage;
pub use protocol::{select_page, CdpErrorResponse, CdpRequest, CdpResponse, PageInfo};
