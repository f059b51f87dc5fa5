//! Browser platform surface consumed by the producers.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use tabtrail_core_types::{EpochMillis, TabId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("tab {0} no longer exists")]
    TabClosed(TabId),
    #[error("tab {0} is not accessible: {1}")]
    Inaccessible(TabId, String),
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// What a page-level script can read about its own document.
pub trait PageHost {
    fn location_href(&self) -> String;
    fn document_title(&self) -> String;
}

/// Tab lookup offered to the background context.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Current URL of `tab`. `Ok(None)` means the tab exists but exposes no URL.
    async fn tab_url(&self, tab: TabId) -> Result<Option<String>, HostError>;
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> EpochMillis;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMillis {
        // Pre-epoch wall clocks clamp to zero.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// A fixed document, for callers that already know what was loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticPage {
    pub href: String,
    pub title: String,
}

impl StaticPage {
    pub fn new(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: title.into(),
        }
    }
}

impl PageHost for StaticPage {
    fn location_href(&self) -> String {
        self.href.clone()
    }

    fn document_title(&self) -> String {
        self.title.clone()
    }
}
