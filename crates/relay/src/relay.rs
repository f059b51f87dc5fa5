use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tabtrail_core_types::{ActivityEvent, EventSink};

use crate::config::{RelayConfig, RetryPolicy};
use crate::errors::RelayError;
use crate::transport::Transport;

/// What happened to one emitted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelayOutcome {
    Delivered {
        event: &'static str,
        url: String,
        attempts: u32,
        total: Option<u64>,
    },
    Dropped {
        event: &'static str,
        url: String,
        reason: String,
    },
    DeadLettered {
        event: &'static str,
        url: String,
        attempts: u32,
        error: String,
    },
}

/// An event that used up its retry budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadLetter {
    pub event: ActivityEvent,
    pub attempts: u32,
    pub error: RelayError,
}

pub struct EventRelay;

impl EventRelay {
    /// Starts the delivery worker on the current tokio runtime.
    pub fn spawn(config: &RelayConfig, transport: Arc<dyn Transport>) -> RelayHandle {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (outcomes, _) = broadcast::channel(config.outcome_capacity.max(1));
        let dead_letters = Arc::new(DeadLetterBuffer::new(config.dead_letter_capacity));

        let worker = Worker {
            transport,
            retry: config.retry.clone(),
            outcomes: outcomes.clone(),
            dead_letters: Arc::clone(&dead_letters),
        };
        let task = tokio::spawn(worker.run(rx));
        info!(
            queue = config.queue_capacity,
            attempts = config.retry.max_attempts,
            "event relay started"
        );

        RelayHandle {
            tx: Mutex::new(Some(tx)),
            outcomes,
            dead_letters,
            worker: Mutex::new(Some(task)),
        }
    }
}

/// Producer-side handle. Emitting never waits on the network.
pub struct RelayHandle {
    tx: Mutex<Option<mpsc::Sender<ActivityEvent>>>,
    outcomes: broadcast::Sender<RelayOutcome>,
    dead_letters: Arc<DeadLetterBuffer>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RelayHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<RelayOutcome> {
        self.outcomes.subscribe()
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.snapshot()
    }

    /// Stops accepting events and waits for queued ones to be processed.
    pub async fn shutdown(&self) {
        self.tx.lock().take();
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                warn!(?err, "relay worker ended abnormally");
            }
        }
    }

    fn publish(&self, outcome: RelayOutcome) {
        let _ = self.outcomes.send(outcome);
    }
}

impl EventSink for RelayHandle {
    fn emit(&self, event: ActivityEvent) {
        let Some(tx) = self.tx.lock().clone() else {
            warn!(event = event.label(), "relay is shut down; dropping event");
            self.publish(dropped(&event, "relay shut down"));
            return;
        };
        let (event, reason) = match tx.try_send(event) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(event)) => (event, "queue full"),
            Err(mpsc::error::TrySendError::Closed(event)) => (event, "relay worker stopped"),
        };
        warn!(event = event.label(), url = %event.url(), reason, "dropping event before relay");
        self.publish(dropped(&event, reason));
    }
}

struct Worker {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    outcomes: broadcast::Sender<RelayOutcome>,
    dead_letters: Arc<DeadLetterBuffer>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::Receiver<ActivityEvent>) {
        while let Some(event) = rx.recv().await {
            let outcome = self.deliver(event).await;
            let _ = self.outcomes.send(outcome);
        }
        debug!("event relay worker drained");
    }

    async fn deliver(&self, event: ActivityEvent) -> RelayOutcome {
        let max_attempts = self.retry.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.deliver(&event).await {
                Ok(ack) => {
                    debug!(
                        event = event.label(),
                        at = event.timestamp(),
                        attempt,
                        total = ?ack.total,
                        "event delivered"
                    );
                    return RelayOutcome::Delivered {
                        event: event.label(),
                        url: event.url().to_string(),
                        attempts: attempt,
                        total: ack.total,
                    };
                }
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    let delay = self.retry.backoff_after(attempt);
                    debug!(
                        event = event.label(),
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "delivery failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return self.give_up(event, attempt, err),
            }
        }
    }

    fn give_up(&self, event: ActivityEvent, attempts: u32, error: RelayError) -> RelayOutcome {
        warn!(
            event = event.label(),
            url = %event.url(),
            attempts,
            error = %error,
            "error sending event to collector"
        );
        if !self.dead_letters.enabled() {
            return dropped(&event, &error.to_string());
        }
        let outcome = RelayOutcome::DeadLettered {
            event: event.label(),
            url: event.url().to_string(),
            attempts,
            error: error.to_string(),
        };
        self.dead_letters.push(DeadLetter {
            event,
            attempts,
            error,
        });
        outcome
    }
}

fn dropped(event: &ActivityEvent, reason: &str) -> RelayOutcome {
    RelayOutcome::Dropped {
        event: event.label(),
        url: event.url().to_string(),
        reason: reason.to_string(),
    }
}

struct DeadLetterBuffer {
    capacity: usize,
    queue: Mutex<VecDeque<DeadLetter>>,
}

impl DeadLetterBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    fn enabled(&self) -> bool {
        self.capacity > 0
    }

    fn push(&self, letter: DeadLetter) {
        let mut guard = self.queue.lock();
        if guard.len() >= self.capacity {
            guard.pop_front();
        }
        guard.push_back(letter);
    }

    fn snapshot(&self) -> Vec<DeadLetter> {
        self.queue.lock().iter().cloned().collect()
    }
}
