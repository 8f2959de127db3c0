//! Process-wide open/close channel for the overlay that hosts a date strip.
//!
//! Any part of an application can ask for the date picker overlay without a
//! reference to the layout that renders it. The root layout subscribes once;
//! everything else publishes.
//!
//! There is at most one subscriber. Subscribing again replaces the previous
//! subscriber, and dropping a stale [`OverlaySubscription`] leaves the newer
//! one in place.
//!
//! ```
//! use dayline::overlay::{self, OverlayRequest, OverlaySignal};
//!
//! let _subscription = overlay::subscribe(|signal| match signal {
//!     OverlaySignal::Open(request) => println!("open at {:?}", request.focus),
//!     OverlaySignal::Close => println!("close"),
//! });
//! assert!(overlay::open(OverlayRequest::default()));
//! assert!(overlay::close());
//! ```

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicU64, Ordering},
};

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Parameters for opening the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayRequest {
    /// Date the overlay's strip should be anchored at. `None` means today.
    pub focus: Option<NaiveDate>,
}

impl OverlayRequest {
    /// A request focused on `date`.
    pub fn at(date: NaiveDate) -> Self {
        Self { focus: Some(date) }
    }
}

/// A message delivered to the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlaySignal {
    /// Show the overlay.
    Open(OverlayRequest),
    /// Hide the overlay.
    Close,
}

type Handler = dyn Fn(OverlaySignal) + Send + Sync;

struct Subscriber {
    id: u64,
    handler: Arc<Handler>,
}

static SUBSCRIBER: OnceLock<RwLock<Option<Subscriber>>> = OnceLock::new();
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn subscriber_slot() -> &'static RwLock<Option<Subscriber>> {
    SUBSCRIBER.get_or_init(|| RwLock::new(None))
}

/// Keeps a subscription alive. Dropping it unsubscribes, unless a newer
/// subscriber has replaced it in the meantime.
#[must_use = "dropping the subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct OverlaySubscription {
    id: u64,
}

impl OverlaySubscription {
    /// Whether this subscription is still the one receiving signals.
    pub fn is_active(&self) -> bool {
        subscriber_slot()
            .read()
            .as_ref()
            .is_some_and(|current| current.id == self.id)
    }
}

impl Drop for OverlaySubscription {
    fn drop(&mut self) {
        let mut slot = subscriber_slot().write();
        if slot.as_ref().is_some_and(|current| current.id == self.id) {
            *slot = None;
            debug!(id = self.id, "overlay subscriber removed");
        }
    }
}

/// Installs `handler` as the only overlay subscriber.
pub fn subscribe<F>(handler: F) -> OverlaySubscription
where
    F: Fn(OverlaySignal) + Send + Sync + 'static,
{
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let previous = subscriber_slot().write().replace(Subscriber {
        id,
        handler: Arc::new(handler),
    });
    if let Some(previous) = previous {
        warn!(
            previous = previous.id,
            id, "overlay subscriber replaced; only one subscriber is supported"
        );
    } else {
        debug!(id, "overlay subscriber installed");
    }
    OverlaySubscription { id }
}

/// Whether a subscriber is installed.
pub fn is_subscribed() -> bool {
    subscriber_slot().read().is_some()
}

fn publish(signal: OverlaySignal) -> bool {
    // The handler runs outside the lock so it may subscribe or publish itself.
    let handler = subscriber_slot()
        .read()
        .as_ref()
        .map(|current| Arc::clone(&current.handler));
    match handler {
        Some(handler) => {
            handler(signal);
            true
        }
        None => {
            debug!(?signal, "overlay signal dropped without a subscriber");
            false
        }
    }
}

/// Asks the subscriber to show the overlay. Returns `false` when nobody is
/// subscribed.
pub fn open(request: OverlayRequest) -> bool {
    publish(OverlaySignal::Open(request))
}

/// Asks the subscriber to hide the overlay. Returns `false` when nobody is
/// subscribed.
pub fn close() -> bool {
    publish(OverlaySignal::Close)
}
