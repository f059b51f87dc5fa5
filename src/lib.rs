//! TabTrail collector and command line.
//!
//! The extension-side producers live in `tabtrail-tracker`, delivery in
//! `tabtrail-relay` and storage in `tabtrail-event-log`; this crate wires them
//! into the `tabtrail` binary and serves the collector HTTP API.

pub mod cli;
pub mod config;
pub mod server;

pub use config::Config;
pub use server::{build_collector_router, CollectorState};
