use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tabtrail_cli::{build_collector_router, CollectorState};
use tabtrail_core_types::{EpochMillis, TabId};
use tabtrail_event_log::{EventLog, Strictness};
use tabtrail_relay::{EventRelay, HttpTransport, RelayConfig, RelayOutcome};
use tabtrail_tracker::{
    BackgroundContext, Clock, HostError, PageObserver, StaticPage, TabActivityTracker, TabHost,
};
use tokio::net::TcpListener;
use tokio::time::timeout;

#[derive(Default)]
struct ManualClock(AtomicU64);

impl Clock for ManualClock {
    fn now_ms(&self) -> EpochMillis {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct FakeTabs(Mutex<HashMap<i64, String>>);

#[async_trait]
impl TabHost for FakeTabs {
    async fn tab_url(&self, tab: TabId) -> Result<Option<String>, HostError> {
        self.0
            .lock()
            .get(&tab.0)
            .cloned()
            .map(Some)
            .ok_or(HostError::TabClosed(tab))
    }
}

async fn spawn_collector(log: Arc<EventLog>) -> SocketAddr {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = build_collector_router(CollectorState::with_log(log));
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("collector");
    });
    addr
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tracked_activity_reaches_the_collector() {
    let log = Arc::new(EventLog::new(Strictness::Strict));
    let addr = spawn_collector(Arc::clone(&log)).await;

    let config = RelayConfig {
        endpoint: format!("http://{addr}/log-visit"),
        ..RelayConfig::default()
    };
    let transport = HttpTransport::new(&config.endpoint, Duration::from_secs(5)).unwrap();
    let relay = Arc::new(EventRelay::spawn(&config, Arc::new(transport)));
    let mut outcomes = relay.subscribe();

    let tabs = Arc::new(FakeTabs::default());
    tabs.0.lock().insert(1, "https://a.test/one".into());
    tabs.0.lock().insert(2, "https://b.test/two".into());
    tabs.0.lock().insert(3, "https://c.test/three".into());
    let clock = Arc::new(ManualClock::default());
    let tracker = TabActivityTracker::new(tabs, clock.clone(), relay.clone());

    let background = Arc::new(BackgroundContext::new(relay.clone()));
    clock.0.store(900, Ordering::SeqCst);
    PageObserver::new(clock.clone(), background)
        .on_page_load(&StaticPage::new("http://a.test/x", "X"))
        .expect("page view");

    for (tab, at) in [(1, 1000), (2, 1500), (3, 2300)] {
        clock.0.store(at, Ordering::SeqCst);
        if let Some(lookup) = tracker.focus_changed(TabId(tab)) {
            lookup.await.unwrap().expect("duration resolved");
        }
    }

    for _ in 0..3 {
        let outcome = timeout(Duration::from_secs(5), outcomes.recv())
            .await
            .expect("outcome in time")
            .expect("outcome channel open");
        assert!(
            matches!(outcome, RelayOutcome::Delivered { .. }),
            "unexpected outcome: {:?}",
            outcome
        );
    }
    relay.shutdown().await;

    let listed: Vec<Value> = reqwest::get(format!("http://{addr}/visits"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.contains(&json!({
        "kind": "page-view",
        "url": "http://a.test/x",
        "domain": "a.test",
        "title": "X",
        "timestamp": 900,
    })));
    assert!(listed.contains(&json!({
        "url": "https://a.test/one",
        "domain": "a.test",
        "duration": 500,
        "timestamp": 1500,
    })));
    assert!(listed.contains(&json!({
        "url": "https://b.test/two",
        "domain": "b.test",
        "duration": 800,
        "timestamp": 2300,
    })));
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn unreachable_collector_loses_event_quietly() {
    let port = {
        let probe = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        probe.local_addr().unwrap().port()
    };
    let config = RelayConfig {
        endpoint: format!("http://127.0.0.1:{port}/log-visit"),
        ..RelayConfig::default()
    };
    let transport = HttpTransport::new(&config.endpoint, Duration::from_secs(2)).unwrap();
    let relay = Arc::new(EventRelay::spawn(&config, Arc::new(transport)));
    let mut outcomes = relay.subscribe();

    let clock = Arc::new(ManualClock::default());
    let observer = PageObserver::new(clock, relay.clone());
    assert!(observer
        .on_page_load(&StaticPage::new("http://a.test/", "A"))
        .is_some());

    let outcome = timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, RelayOutcome::Dropped { .. }));
    assert!(relay.dead_letters().is_empty());
    relay.shutdown().await;
}
