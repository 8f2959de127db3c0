//! dayline is a horizontally scrolled, virtualized strip of calendar days that
//! grows in both directions.
//!
//! # Overview
//!
//! The strip keeps a contiguous window of days materialized and extends it by
//! whole months as the user nears either edge. When days are inserted in
//! front, the scroll offset moves by exactly the inserted width in the same
//! step, so the content under the user's finger does not jump. Once scrolling
//! settles, the leftmost visible month is reported to the host, at most once
//! per change.
//!
//! The crate is toolkit agnostic. A host feeds a
//! [`DateStripController`](controller::DateStripController) with layout and
//! scroll events, calls [`tick`](controller::DateStripController::tick) once
//! per frame and reads back render plans and scroll requests.
//!
//! # Modules
//!
//! - [`window`]: the materialized days and the operations that grow them.
//! - [`anchor`]: cell geometry, prepend compensation and scroll requests.
//! - [`viewport`]: visibility sampling and the month header signal.
//! - [`controller`]: the event-driven state machine tying them together.
//! - [`handle`]: imperative "go to today" navigation for the parent.
//! - [`overlay`]: the process-wide channel that opens the hosting overlay.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use chrono::NaiveDate;
//! use dayline::{DateStripArgs, DateStripController, MonthYear, Px};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let mut strip = DateStripController::new(
//!     DateStripArgs::default().today_provider(move || today),
//! )
//! .unwrap();
//! strip.set_viewport_width(Px(420));
//!
//! // The user drags back into February and lets go.
//! let start = Instant::now();
//! strip.on_scroll(Px(900), start);
//! let update = strip.tick(start + Duration::from_millis(200));
//! assert_eq!(update.month, Some(MonthYear::new(2, 2024)));
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod anchor;
pub mod args;
pub mod calendar;
pub mod controller;
pub mod error;
pub mod handle;
pub mod logging;
pub mod overlay;
pub mod prop;
pub mod px;
pub mod viewport;
pub mod window;

pub use anchor::{ScrollAnchor, ScrollRequest, StripScroll, compensate_for_prepend};
pub use args::{DateStripArgs, DateStripConfig};
pub use calendar::{DateCell, MonthYear};
pub use controller::{
    DateStripController, FrameUpdate, GrowthPhase, MomentumEnd, RenderItem, RenderPlan,
};
pub use error::DateStripError;
pub use handle::{DateStripHandle, StripCommand};
pub use logging::init_tracing;
pub use overlay::{OverlayRequest, OverlaySignal, OverlaySubscription};
pub use px::Px;
pub use viewport::{ViewportObserver, visible_range};
pub use window::{Coverage, DateWindow, DateWindowStore, Prepend};
