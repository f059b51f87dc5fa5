//! Focus dwell-time tracking.
//!
//! [`FocusState`] is the whole state machine and stays synchronous. The
//! tracker wraps it with the host lookups that turn a finished focus span into
//! a [`DurationEvent`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use tabtrail_core_types::{ActivityEvent, DurationEvent, EpochMillis, EventSink, TabId};

use crate::host::{Clock, TabHost};

/// Upper bound on one tab URL lookup before its duration is abandoned.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Which tab holds focus and since when.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusState {
    current_tab: Option<TabId>,
    started_at: Option<EpochMillis>,
}

/// A closed focus span whose URL has not been looked up yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDuration {
    pub tab: TabId,
    pub duration: u64,
    pub ended_at: EpochMillis,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tab(&self) -> Option<TabId> {
        self.current_tab
    }

    pub fn started_at(&self) -> Option<EpochMillis> {
        self.started_at
    }

    /// Moves focus to `new_tab` at `now`, closing the previous span if there
    /// was one.
    pub fn transition(&mut self, new_tab: TabId, now: EpochMillis) -> Option<PendingDuration> {
        let closed = match (self.current_tab, self.started_at) {
            (Some(tab), Some(started_at)) => Some(PendingDuration {
                tab,
                duration: now.saturating_sub(started_at),
                ended_at: now,
            }),
            _ => None,
        };
        self.current_tab = Some(new_tab);
        self.started_at = Some(now);
        closed
    }
}

impl PendingDuration {
    /// Looks up the tab's final URL. Closed tabs, lookup failures and
    /// unparseable URLs all resolve to `None`.
    pub async fn resolve(&self, host: &dyn TabHost) -> Option<DurationEvent> {
        let url = match host.tab_url(self.tab).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!(tab = %self.tab, "tab exposes no url; dropping duration");
                return None;
            }
            Err(err) => {
                debug!(tab = %self.tab, error = %err, "tab lookup failed; dropping duration");
                return None;
            }
        };
        match DurationEvent::measure(url, self.duration, self.ended_at) {
            Ok(event) => Some(event),
            Err(err) => {
                debug!(tab = %self.tab, error = %err, "dropping duration for malformed url");
                None
            }
        }
    }
}

/// Long-lived focus tracker for one background context.
///
/// Must be driven from inside a tokio runtime: URL lookups are spawned so the
/// focus bookkeeping never waits on them. Each lookup task lives at most
/// `lookup_timeout`, so a host that never answers cannot pile up tasks beyond
/// the focus changes made within that window.
pub struct TabActivityTracker {
    state: Mutex<FocusState>,
    host: Arc<dyn TabHost>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    lookup_timeout: Duration,
}

impl TabActivityTracker {
    pub fn new(host: Arc<dyn TabHost>, clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Mutex::new(FocusState::new()),
            host,
            clock,
            sink,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Handles a focus-change notification.
    ///
    /// Returns the lookup task for the span that just closed, if any. Callers
    /// may ignore it; the event is emitted from the task either way.
    pub fn focus_changed(&self, new_tab: TabId) -> Option<JoinHandle<Option<DurationEvent>>> {
        let now = self.clock.now_ms();
        let closed = self.state.lock().transition(new_tab, now);
        trace!(tab = %new_tab, at = now, "focus moved");

        let pending = closed?;
        let host = Arc::clone(&self.host);
        let sink = Arc::clone(&self.sink);
        let limit = self.lookup_timeout;
        Some(tokio::spawn(async move {
            let event = match tokio::time::timeout(limit, pending.resolve(host.as_ref())).await {
                Ok(resolved) => resolved?,
                Err(_) => {
                    debug!(tab = %pending.tab, "tab lookup timed out; dropping duration");
                    return None;
                }
            };
            sink.emit(ActivityEvent::Duration(event.clone()));
            Some(event)
        }))
    }

    pub fn snapshot(&self) -> FocusState {
        self.state.lock().clone()
    }

    /// Forgets the focused tab, as a restarted background context would.
    pub fn reset(&self) {
        *self.state.lock() = FocusState::new();
    }
}
