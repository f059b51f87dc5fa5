use std::sync::Arc;

use tabtrail_event_log::{EventLog, Strictness};

#[derive(Clone)]
pub struct CollectorState {
    log: Arc<EventLog>,
}

impl CollectorState {
    pub fn new(strictness: Strictness) -> Self {
        Self::with_log(Arc::new(EventLog::new(strictness)))
    }

    pub fn with_log(log: Arc<EventLog>) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &EventLog {
        self.log.as_ref()
    }
}
