//! Retry state machine for completion calls.
//!
//! The policy lives here as a pure, deterministic transition function so it
//! can be unit-tested without a network or a clock. The client loop in
//! `llm_client` drives it: classify each failed call, feed the class in,
//! act on the returned step.

use std::time::Duration;

/// Knobs governing one `execute` call's retry behaviour.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries on top of the initial attempt; `3` means up to 4 calls.
    pub max_retries: u32,
    /// Starting exponential-backoff delay for rate limits and 5xx.
    pub initial_delay: Duration,
    /// Ceiling for the exponential backoff.
    pub max_delay: Duration,
    /// Fixed delay after a timed-out call.
    pub timeout_delay: Duration,
    /// Fixed delay after a connection failure.
    pub connection_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            timeout_delay: Duration::from_secs(1),
            connection_delay: Duration::from_secs(2),
        }
    }
}

/// How a failed call should be handled, independent of the concrete error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Rate limit or server-side error: exponential backoff.
    Backoff,
    /// Timed-out call: short fixed delay.
    ShortDelay,
    /// Connection failure: longer fixed delay.
    LongDelay,
    /// The requested model is unavailable: advance to the next candidate
    /// without consuming a retry.
    NextModel,
}

/// What the driving loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sleep for the given duration, then retry the current model.
    Backoff(Duration),
    /// Retry immediately against the (already advanced) next model.
    NextModel,
    /// No recovery possible.
    Fail(FailReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    RetriesExhausted,
    CandidatesExhausted,
}

/// Mutable state of a single `execute` call's retry loop. Never shared:
/// each call constructs its own and drops it on return.
#[derive(Debug)]
pub struct RetryState {
    models: Vec<String>,
    model_idx: usize,
    attempts_left: u32,
    delay: Duration,
    policy: RetryPolicy,
}

impl RetryState {
    /// `models` must be non-empty; the first entry is the primary model.
    pub fn new(models: Vec<String>, policy: RetryPolicy) -> Self {
        debug_assert!(!models.is_empty());
        RetryState {
            models,
            model_idx: 0,
            attempts_left: policy.max_retries,
            delay: policy.initial_delay,
            policy,
        }
    }

    pub fn current_model(&self) -> &str {
        &self.models[self.model_idx]
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// Transition on a failed call. Attempts strictly decrease on every
    /// retry-consuming branch and never go negative; the exponential delay
    /// doubles only on `Backoff`-class failures and is capped at the
    /// policy ceiling. Model advances do not consume a retry, and do not
    /// reset the backoff delay.
    pub fn on_failure(&mut self, class: RetryClass) -> Step {
        match class {
            RetryClass::Backoff => {
                if self.attempts_left == 0 {
                    return Step::Fail(FailReason::RetriesExhausted);
                }
                self.attempts_left -= 1;
                let sleep = self.delay;
                self.delay = (self.delay * 2).min(self.policy.max_delay);
                Step::Backoff(sleep)
            }
            RetryClass::ShortDelay => self.fixed_delay(self.policy.timeout_delay),
            RetryClass::LongDelay => self.fixed_delay(self.policy.connection_delay),
            RetryClass::NextModel => {
                if self.model_idx + 1 < self.models.len() {
                    self.model_idx += 1;
                    Step::NextModel
                } else {
                    Step::Fail(FailReason::CandidatesExhausted)
                }
            }
        }
    }

    fn fixed_delay(&mut self, delay: Duration) -> Step {
        if self.attempts_left == 0 {
            return Step::Fail(FailReason::RetriesExhausted);
        }
        self.attempts_left -= 1;
        Step::Backoff(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(max_retries: u32) -> RetryState {
        RetryState::new(
            vec!["primary".to_string(), "fallback".to_string()],
            RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            },
        )
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut s = state(10);
        let delays: Vec<Step> = (0..5).map(|_| s.on_failure(RetryClass::Backoff)).collect();
        assert_eq!(
            delays,
            vec![
                Step::Backoff(Duration::from_secs(1)),
                Step::Backoff(Duration::from_secs(2)),
                Step::Backoff(Duration::from_secs(4)),
                Step::Backoff(Duration::from_secs(8)),
                Step::Backoff(Duration::from_secs(8)),
            ]
        );
    }

    #[test]
    fn test_attempts_strictly_decrease() {
        let mut s = state(3);
        for expected in [2, 1, 0] {
            s.on_failure(RetryClass::Backoff);
            assert_eq!(s.attempts_left(), expected);
        }
        // A fourth failure must fail rather than decrement below zero.
        assert_eq!(
            s.on_failure(RetryClass::Backoff),
            Step::Fail(FailReason::RetriesExhausted)
        );
        assert_eq!(s.attempts_left(), 0);
    }

    #[test]
    fn test_zero_retry_budget_fails_on_first_failure() {
        let mut s = state(0);
        assert_eq!(
            s.on_failure(RetryClass::Backoff),
            Step::Fail(FailReason::RetriesExhausted)
        );
    }

    #[test]
    fn test_timeout_uses_fixed_short_delay() {
        let mut s = state(3);
        assert_eq!(
            s.on_failure(RetryClass::ShortDelay),
            Step::Backoff(Duration::from_secs(1))
        );
        // Fixed delays do not advance the exponential schedule.
        assert_eq!(
            s.on_failure(RetryClass::ShortDelay),
            Step::Backoff(Duration::from_secs(1))
        );
        assert_eq!(
            s.on_failure(RetryClass::Backoff),
            Step::Backoff(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_connection_uses_fixed_long_delay() {
        let mut s = state(3);
        assert_eq!(
            s.on_failure(RetryClass::LongDelay),
            Step::Backoff(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_next_model_does_not_consume_retry() {
        let mut s = state(3);
        assert_eq!(s.current_model(), "primary");
        assert_eq!(s.on_failure(RetryClass::NextModel), Step::NextModel);
        assert_eq!(s.current_model(), "fallback");
        assert_eq!(s.attempts_left(), 3);
    }

    #[test]
    fn test_exhausting_candidates_is_terminal() {
        let mut s = state(3);
        assert_eq!(s.on_failure(RetryClass::NextModel), Step::NextModel);
        assert_eq!(
            s.on_failure(RetryClass::NextModel),
            Step::Fail(FailReason::CandidatesExhausted)
        );
    }

    #[test]
    fn test_backoff_survives_model_advance() {
        let mut s = state(10);
        assert_eq!(
            s.on_failure(RetryClass::Backoff),
            Step::Backoff(Duration::from_secs(1))
        );
        s.on_failure(RetryClass::NextModel);
        // The delay schedule keeps doubling across the fallback model.
        assert_eq!(
            s.on_failure(RetryClass::Backoff),
            Step::Backoff(Duration::from_secs(2))
        );
    }
}
