//! Shared primitives for the TabTrail activity pipeline.
//!
//! Both producers (page observer and tab tracker) and both consumers (relay
//! and collector) agree on the records defined here, so their wire shape is
//! fixed in one place.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = u64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("malformed url {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },
}

/// Host-assigned tab identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Discriminator carried by every page-view record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum PageViewKind {
    #[default]
    #[serde(rename = "page-view")]
    PageView,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewEvent {
    pub kind: PageViewKind,
    pub url: String,
    pub domain: String,
    pub title: String,
    pub timestamp: EpochMillis,
}

impl PageViewEvent {
    /// Builds a page view, deriving `domain` from `url`.
    pub fn observe(
        url: impl Into<String>,
        title: impl Into<String>,
        timestamp: EpochMillis,
    ) -> Result<Self, CoreError> {
        let url = url.into();
        let domain = parse_domain(&url)?;
        Ok(Self {
            kind: PageViewKind::PageView,
            url,
            domain,
            title: title.into(),
            timestamp,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationEvent {
    pub url: String,
    pub domain: String,
    pub duration: u64,
    pub timestamp: EpochMillis,
}

impl DurationEvent {
    pub fn measure(
        url: impl Into<String>,
        duration: u64,
        timestamp: EpochMillis,
    ) -> Result<Self, CoreError> {
        let url = url.into();
        let domain = parse_domain(&url)?;
        Ok(Self {
            url,
            domain,
            duration,
            timestamp,
        })
    }
}

/// Any record a producer can hand to the relay.
///
/// Serialized untagged: each variant keeps exactly its own wire shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityEvent {
    PageView(PageViewEvent),
    Duration(DurationEvent),
}

impl ActivityEvent {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityEvent::PageView(_) => "page-view",
            ActivityEvent::Duration(_) => "duration",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ActivityEvent::PageView(event) => &event.url,
            ActivityEvent::Duration(event) => &event.url,
        }
    }

    pub fn timestamp(&self) -> EpochMillis {
        match self {
            ActivityEvent::PageView(event) => event.timestamp,
            ActivityEvent::Duration(event) => event.timestamp,
        }
    }
}

impl From<PageViewEvent> for ActivityEvent {
    fn from(value: PageViewEvent) -> Self {
        ActivityEvent::PageView(value)
    }
}

impl From<DurationEvent> for ActivityEvent {
    fn from(value: DurationEvent) -> Self {
        ActivityEvent::Duration(value)
    }
}

/// Hostname of an absolute URL.
///
/// URLs without a host (`about:blank`, `file:///tmp/x`) yield an empty string,
/// the same answer a browser's `URL.hostname` gives.
pub fn parse_domain(raw: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(raw).map_err(|err| CoreError::MalformedUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    Ok(parsed.host_str().unwrap_or_default().to_string())
}

/// Destination for emitted events.
///
/// `emit` must return without waiting on I/O; producers call it from their
/// focus and page-load handlers.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ActivityEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_view_serializes_with_discriminator() {
        let event = PageViewEvent::observe("http://a.test/x", "X", 1000).unwrap();
        let value = serde_json::to_value(ActivityEvent::from(event)).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "page-view",
                "url": "http://a.test/x",
                "domain": "a.test",
                "title": "X",
                "timestamp": 1000,
            })
        );
    }

    #[test]
    fn duration_has_no_discriminator() {
        let event = DurationEvent::measure("https://docs.rs/tokio", 500, 1500).unwrap();
        let value = serde_json::to_value(ActivityEvent::from(event)).unwrap();
        assert!(value.get("kind").is_none());
        assert_eq!(value["domain"], "docs.rs");
        assert_eq!(value["duration"], 500);
    }

    #[test]
    fn untagged_decode_picks_matching_variant() {
        let page: ActivityEvent = serde_json::from_value(json!({
            "kind": "page-view",
            "url": "http://a.test/",
            "domain": "a.test",
            "title": "",
            "timestamp": 1,
        }))
        .unwrap();
        assert_eq!(page.label(), "page-view");

        let duration: ActivityEvent = serde_json::from_value(json!({
            "url": "http://a.test/",
            "domain": "a.test",
            "duration": 10,
            "timestamp": 2,
        }))
        .unwrap();
        assert_eq!(duration.label(), "duration");

        let partial = serde_json::from_value::<ActivityEvent>(json!({"url": "http://a.test/"}));
        assert!(partial.is_err());
    }

    #[test]
    fn domain_parsing() {
        assert_eq!(
            parse_domain("https://sub.example.com:8443/a?b").unwrap(),
            "sub.example.com"
        );
        assert_eq!(parse_domain("about:blank").unwrap(), "");
        assert!(matches!(
            parse_domain("not a url"),
            Err(CoreError::MalformedUrl { .. })
        ));
    }
}
