//! Extension-side producers for TabTrail.
//!
//! The browser platform is reached only through the traits in [`host`]; the
//! observer and tracker never talk to the network themselves. Whatever they
//! produce goes to an [`EventSink`](tabtrail_core_types::EventSink), normally
//! the relay handle.

pub mod background;
pub mod host;
pub mod observer;
pub mod tracker;

pub use background::{BackgroundContext, MessageAck, RuntimeMessage};
pub use host::{Clock, HostError, PageHost, StaticPage, SystemClock, TabHost};
pub use observer::PageObserver;
pub use tracker::{FocusState, PendingDuration, TabActivityTracker};
