use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use tabtrail_core_types::{DurationEvent, PageViewEvent};

use crate::config::Strictness;
use crate::errors::EventLogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RecordAck {
    pub total: usize,
}

/// Arrival-ordered payload log.
///
/// Appends are serialized by the write lock; readers get a cloned snapshot.
#[derive(Debug, Default)]
pub struct EventLog {
    strictness: Strictness,
    entries: RwLock<Vec<Value>>,
}

impl EventLog {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn record(&self, payload: Value) -> Result<RecordAck, EventLogError> {
        if self.strictness.is_strict() {
            if let Err(err) = check_shape(&payload) {
                warn!(error = %err, "strict log rejected payload");
                return Err(EventLogError::Rejected(describe_shape_error(&payload)));
            }
        }

        let mut guard = self.entries.write();
        guard.push(payload);
        let total = guard.len();
        drop(guard);

        debug!(total, "event recorded");
        Ok(RecordAck { total })
    }

    pub fn list(&self) -> Vec<Value> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `kind` field commits the payload to the page-view shape; anything else
/// must be a complete duration record.
fn check_shape(payload: &Value) -> Result<(), serde_json::Error> {
    if payload.get("kind").is_some() {
        serde_json::from_value::<PageViewEvent>(payload.clone()).map(drop)
    } else {
        serde_json::from_value::<DurationEvent>(payload.clone()).map(drop)
    }
}

fn describe_shape_error(payload: &Value) -> String {
    let Some(object) = payload.as_object() else {
        return "expected a JSON object".to_string();
    };
    let required: &[&str] = if object.contains_key("kind") {
        &["kind", "url", "domain", "title", "timestamp"]
    } else {
        &["url", "domain", "duration", "timestamp"]
    };
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if missing.is_empty() {
        "fields do not match a page-view or duration record".to_string()
    } else {
        format!("missing fields: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn page_view() -> Value {
        json!({
            "kind": "page-view",
            "url": "http://a.test/x",
            "domain": "a.test",
            "title": "X",
            "timestamp": 1000,
        })
    }

    #[test]
    fn record_then_list_round_trips() {
        let log = EventLog::default();
        let ack = log.record(page_view()).unwrap();
        assert_eq!(ack.total, 1);
        assert_eq!(log.list(), vec![page_view()]);
    }

    #[test]
    fn list_is_idempotent() {
        let log = EventLog::default();
        log.record(page_view()).unwrap();
        log.record(json!({"url": "http://b.test/", "duration": 3})).unwrap();
        assert_eq!(log.list(), log.list());
    }

    #[test]
    fn permissive_keeps_anything_verbatim() {
        let log = EventLog::new(Strictness::Permissive);
        let odd = json!({"nested": {"a": [1, null, "x"]}, "n": 1.5});
        log.record(odd.clone()).unwrap();
        log.record(json!("just a string")).unwrap();
        assert_eq!(log.list(), vec![odd, json!("just a string")]);
    }

    #[test]
    fn strict_rejects_partial_records() {
        let log = EventLog::new(Strictness::Strict);
        let err = log
            .record(json!({"url": "http://a.test/", "domain": "a.test", "timestamp": 1}))
            .unwrap_err();
        assert_eq!(err, EventLogError::Rejected("missing fields: duration".into()));

        let err = log.record(json!({"kind": "page-view", "url": "x"})).unwrap_err();
        assert_eq!(
            err,
            EventLogError::Rejected("missing fields: domain, title, timestamp".into())
        );
        assert!(log.is_empty());

        log.record(page_view()).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn strict_does_not_read_tagged_page_view_as_duration() {
        let log = EventLog::new(Strictness::Strict);
        let err = log
            .record(json!({
                "kind": "page-view",
                "url": "http://a.test/",
                "domain": "a.test",
                "duration": 5,
                "timestamp": 1,
            }))
            .unwrap_err();
        assert_eq!(err, EventLogError::Rejected("missing fields: title".into()));
        assert!(log.is_empty());

        log.record(json!({
            "url": "http://a.test/",
            "domain": "a.test",
            "duration": 5,
            "timestamp": 1,
        }))
        .unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_records_are_both_kept() {
        let log = Arc::new(EventLog::default());
        let first = json!({"n": 1});
        let second = json!({"n": 2});

        let a = tokio::spawn({
            let log = Arc::clone(&log);
            let payload = first.clone();
            async move { log.record(payload) }
        });
        let b = tokio::spawn({
            let log = Arc::clone(&log);
            let payload = second.clone();
            async move { log.record(payload) }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let listed = log.list();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&first));
        assert!(listed.contains(&second));
    }
}
