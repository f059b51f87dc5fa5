use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/log-visit";

/// Runtime knobs for [`EventRelay`](crate::EventRelay).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub endpoint: String,
    pub queue_capacity: usize,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    /// Zero disables the dead-letter buffer; exhausted events are dropped.
    pub dead_letter_capacity: usize,
    pub outcome_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            queue_capacity: 256,
            request_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            dead_letter_capacity: 0,
            outcome_capacity: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total delivery attempts per event, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }

    /// Delay before attempt number `attempt + 1`, doubling from
    /// `initial_backoff` and capped at `max_backoff`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        };
        let delays: Vec<u128> = (1..=5)
            .map(|attempt| policy.backoff_after(attempt).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.attempts(), 1);
    }
}
