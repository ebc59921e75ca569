//! # touchpath-core
//!
//! Core library for simulating multi-finger touch swipes in a web page.
//!
//! A swipe is a list of checkpoints, one position per finger, relative to a
//! target element. This crate interpolates the path between checkpoints,
//! maps every position through any chain of nested and scaled iframes to
//! top-level device coordinates, and delivers the resulting touch events to
//! the browser one at a time with a natural pace.
//!
//! ## Modules
//!
//! - [`gesture`] - Checkpoints, gesture configuration and step timing
//! - [`interpolate`] - Path interpolation and the event plan of a gesture
//! - [`frame`] - Position and scale of nested rendering contexts
//! - [`layout`] - Layout snapshots of the target element
//! - [`mapper`] - Element-relative to device coordinate mapping
//! - [`dispatch`] - Delivery of one touch event
//! - [`controller`] - Sequential execution of a whole gesture
//! - [`trail`] - Finger-trail visualization
//! - [`cdp`] - Chrome DevTools Protocol transport
//! - [`config`] - Persistent settings
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use touchpath_core::cdp::{CdpClient, CdpPage, PageTrail};
//! use touchpath_core::controller::GestureController;
//! use touchpath_core::geometry::Point;
//! use touchpath_core::gesture::GestureConfig;
//! use touchpath_core::layout::ElementTarget;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let page = Arc::new(CdpPage::new(Arc::new(
//!     CdpClient::connect("http://localhost:9222", None).await?,
//! )));
//! let target = ElementTarget::new("canvas").within_frame("#game");
//! let trail = Arc::new(PageTrail::new(page.clone(), target.clone()));
//!
//! // Two-finger pinch-out.
//! GestureController::new(page.clone(), page)
//!     .with_trail(trail)
//!     .swipe(
//!         &target,
//!         vec![
//!             vec![Point::new(180.0, 200.0), Point::new(220.0, 200.0)],
//!             vec![Point::new(80.0, 200.0), Point::new(320.0, 200.0)],
//!         ],
//!         &GestureConfig::default().with_delay_ms(600),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cdp;
pub mod clock;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod interpolate;
pub mod layout;
pub mod log;
pub mod mapper;
pub mod trail;
pub mod transport;

pub use error::SwipeError;
