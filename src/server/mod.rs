mod router;
mod state;

pub use router::build_collector_router;
pub use state::CollectorState;
