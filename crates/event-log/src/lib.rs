//! Collector storage: an unbounded, append-only list of received payloads.

pub mod config;
pub mod errors;
pub mod log;

pub use config::Strictness;
pub use errors::EventLogError;
pub use log::{EventLog, RecordAck};
