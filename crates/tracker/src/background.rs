//! Receiving end of page-script messages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use tabtrail_core_types::{ActivityEvent, EpochMillis, EventSink, PageViewEvent, PageViewKind};

/// One-shot message a page script sends to the background context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    #[serde(rename = "PAGE_VIEW")]
    PageView {
        url: String,
        domain: String,
        title: String,
        timestamp: EpochMillis,
    },
    #[serde(other)]
    Unknown,
}

impl From<PageViewEvent> for RuntimeMessage {
    fn from(event: PageViewEvent) -> Self {
        RuntimeMessage::PageView {
            url: event.url,
            domain: event.domain,
            title: event.title,
            timestamp: event.timestamp,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAck {
    pub status: String,
}

impl MessageAck {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Routes page-script messages onward. Every message is acknowledged,
/// whether or not it was understood.
pub struct BackgroundContext {
    sink: Arc<dyn EventSink>,
}

impl BackgroundContext {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn handle_message(&self, message: RuntimeMessage) -> MessageAck {
        match message {
            RuntimeMessage::PageView {
                url,
                domain,
                title,
                timestamp,
            } => {
                info!(%url, "visit logged");
                self.sink.emit(ActivityEvent::PageView(PageViewEvent {
                    kind: PageViewKind::PageView,
                    url,
                    domain,
                    title,
                    timestamp,
                }));
            }
            RuntimeMessage::Unknown => debug!("ignoring runtime message of unknown type"),
        }
        MessageAck::ok()
    }

    /// Same as [`handle_message`](Self::handle_message) for an undecoded
    /// payload. Payloads that do not decode are acknowledged and dropped.
    pub fn handle_raw(&self, payload: Value) -> MessageAck {
        match serde_json::from_value::<RuntimeMessage>(payload) {
            Ok(message) => self.handle_message(message),
            Err(err) => {
                debug!(error = %err, "ignoring undecodable runtime message");
                MessageAck::ok()
            }
        }
    }
}

/// Page scripts hand their records over as runtime messages; everything else
/// passes straight through.
impl EventSink for BackgroundContext {
    fn emit(&self, event: ActivityEvent) {
        match event {
            ActivityEvent::PageView(page) => {
                self.handle_message(RuntimeMessage::from(page));
            }
            other => self.sink.emit(other),
        }
    }
}
