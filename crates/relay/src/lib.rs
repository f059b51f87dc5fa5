//! Event relay between the extension producers and the collector.
//!
//! Producers call [`EventSink::emit`](tabtrail_core_types::EventSink::emit) on
//! a [`RelayHandle`]; the event is queued and a background worker performs the
//! network delivery. Results are published as [`RelayOutcome`]s for whoever
//! wants to watch them. With the default [`RelayConfig`] the relay makes a
//! single attempt per event and drops it on failure.

pub mod config;
pub mod errors;
pub mod relay;
pub mod transport;

pub use config::{RelayConfig, RetryPolicy};
pub use errors::RelayError;
pub use relay::{DeadLetter, EventRelay, RelayHandle, RelayOutcome};
pub use transport::{DeliveryAck, HttpTransport, Transport};
