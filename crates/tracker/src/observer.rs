use std::sync::Arc;

use tracing::{debug, warn};

use tabtrail_core_types::{ActivityEvent, EventSink, PageViewEvent};

use crate::host::{Clock, PageHost};

/// Emits one page view per page load.
pub struct PageObserver {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl PageObserver {
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self { clock, sink }
    }

    /// Reads the page, stamps it and hands the record to the sink.
    ///
    /// A location that does not parse as a URL produces nothing.
    pub fn on_page_load(&self, page: &dyn PageHost) -> Option<PageViewEvent> {
        let href = page.location_href();
        let title = page.document_title();
        let event = match PageViewEvent::observe(href, title, self.clock.now_ms()) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "skipping page view with unparseable location");
                return None;
            }
        };
        debug!(url = %event.url, domain = %event.domain, "page view observed");
        self.sink.emit(ActivityEvent::PageView(event.clone()));
        Some(event)
    }
}
