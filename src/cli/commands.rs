use clap::Subcommand;

use super::list::ListArgs;
use super::send::SendArgs;
use super::serve::ServeArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the collector that stores relayed events in memory
    Serve(ServeArgs),

    /// Print every event the collector has stored
    List(ListArgs),

    /// Observe a page and relay its page-view event once
    Send(SendArgs),

    /// Show version and build information
    Info,
}
