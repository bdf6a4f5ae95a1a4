//! Readiness gate for the local validator
//!
//! This module handles:
//! - Polling an external progress counter until it passes a floor
//! - Funding the deploy identity with retries paced by a ladder of floors
//! - Error propagation when the retry ladder is exhausted

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use thiserror::Error;

/// A read-only source of a monotonically non-decreasing progress counter,
/// such as the latest ledger sequence of a validator.
#[async_trait]
pub trait ProgressSource {
    /// Read the counter once. An `Err` is treated by the gate as "counter
    /// not yet available", never as a fatal condition.
    async fn query(&self) -> Result<u64>;
}

/// A state-mutating external call that funds an account.
///
/// The gate may invoke it once per ladder step, so the underlying action is
/// assumed to be idempotent by the collaborator that implements this trait.
#[async_trait]
pub trait FundingAction {
    async fn fund(&self) -> Result<()>;
}

/// Outcome of a single readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateResult {
    /// The counter was observed strictly above the requested floor
    Ready,
    /// The caller-supplied deadline expired before the counter got there
    TimedOut,
}

/// Errors that cross the gate boundary
#[derive(Debug, Error)]
pub enum GateError {
    /// The retry ladder was consumed without a successful funding call
    #[error("funding failed after {attempts} attempts, retry ladder exhausted")]
    Exhausted {
        /// Number of funding attempts that were made
        attempts: usize,
    },
}

/// Ordered list of escalating ledger floors used to pace funding retries.
///
/// One funding attempt is made up front, then one more after each floor is
/// passed, so a ladder of `n` floors allows `n + 1` attempts in total. A
/// ladder is built fresh for each funding sequence and consumed left to
/// right; exhaustion is reported as an explicit terminal error rather than
/// with a sentinel floor.
#[derive(Debug, Clone)]
pub struct RetryLadder {
    floors: Vec<u64>,
}

impl RetryLadder {
    pub fn new(floors: Vec<u64>) -> Self {
        Self { floors }
    }

    /// Upper bound on funding attempts this ladder allows
    pub fn max_attempts(&self) -> usize {
        self.floors.len() + 1
    }

    pub fn floors(&self) -> &[u64] {
        &self.floors
    }
}

impl Default for RetryLadder {
    /// The ladder used for local bring-up: retry once the chain has passed
    /// ledgers 10, 20 and 30.
    fn default() -> Self {
        Self::new(vec![10, 20, 30])
    }
}

/// Gate configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Delay between progress queries
    pub poll_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// States of the funding retry machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Attempting,
    WaitingForProgress(u64),
    Succeeded,
    Exhausted,
}

/// Blocking-poll readiness primitive over a [`ProgressSource`].
///
/// Single-task and cooperative: the gate occupies its calling task for the
/// duration of the wait, sleeping a fixed interval between queries. It is
/// meant to be invoked once per process lifetime during bring-up; nothing is
/// cached across calls.
pub struct ReadinessGate<P> {
    source: P,
    config: GateConfig,
}

impl<P: ProgressSource> ReadinessGate<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            config: GateConfig::default(),
        }
    }

    pub fn with_config(source: P, config: GateConfig) -> Self {
        Self { source, config }
    }

    /// Block until the progress counter is observed strictly above `floor`.
    ///
    /// Query failures and unparseable payloads are absorbed and retried: a
    /// validator that is still booting answers with connection errors and
    /// partial payloads, and the gate keeps polling through those. This loop
    /// never gives up on its own; callers that need an upper bound should
    /// use [`ReadinessGate::await_progress_deadline`].
    pub async fn await_progress(&self, floor: u64) -> GateResult {
        debug!("Waiting for progress counter to pass {}", floor);

        loop {
            match self.source.query().await {
                Ok(counter) if counter > floor => {
                    debug!("Progress counter at {} (floor {})", counter, floor);
                    return GateResult::Ready;
                }
                Ok(counter) => {
                    debug!(
                        "Progress counter at {} (floor {}), still waiting",
                        counter, floor
                    );
                }
                Err(e) => {
                    warn!("Progress query failed, treating as not ready: {}", e);
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Like [`ReadinessGate::await_progress`] but bounded by a wall-clock
    /// deadline, returning [`GateResult::TimedOut`] on expiry.
    pub async fn await_progress_deadline(&self, floor: u64, deadline: Duration) -> GateResult {
        match tokio::time::timeout(deadline, self.await_progress(floor)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Deadline of {:?} expired waiting for progress past {}",
                    deadline, floor
                );
                GateResult::TimedOut
            }
        }
    }

    /// Attempt `funder` until it succeeds or the ladder is exhausted.
    ///
    /// After each failed attempt the next ladder floor is consumed and the
    /// gate waits for the counter to pass it before retrying, so retries are
    /// paced by chain progress rather than by wall-clock backoff. At most
    /// one attempt is made per ladder step; only
    /// [`GateError::Exhausted`] is ever surfaced to the caller.
    pub async fn fund_with_retry<F: FundingAction>(
        &self,
        funder: &F,
        ladder: &RetryLadder,
    ) -> Result<(), GateError> {
        let mut floors = ladder.floors().iter();
        let mut attempts = 0;
        let mut state = GateState::Attempting;

        loop {
            state = match state {
                GateState::Attempting => {
                    attempts += 1;
                    info!("Funding attempt {} of {}", attempts, ladder.max_attempts());

                    match funder.fund().await {
                        Ok(()) => GateState::Succeeded,
                        Err(e) => {
                            warn!("Funding attempt {} failed: {}", attempts, e);
                            match floors.next() {
                                Some(&floor) => GateState::WaitingForProgress(floor),
                                None => GateState::Exhausted,
                            }
                        }
                    }
                }
                GateState::WaitingForProgress(floor) => {
                    info!("Waiting for ledger {} before retrying", floor);
                    self.await_progress(floor).await;
                    GateState::Attempting
                }
                GateState::Succeeded => {
                    info!("Funding succeeded after {} attempt(s)", attempts);
                    return Ok(());
                }
                GateState::Exhausted => {
                    return Err(GateError::Exhausted { attempts });
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed sequence of counter readings, repeating the last one
    /// once the sequence is consumed.
    struct ScriptedSource {
        values: Mutex<VecDeque<u64>>,
        queries: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(values: &[u64]) -> Self {
            Self {
                values: Mutex::new(values.iter().copied().collect()),
                queries: AtomicUsize::new(0),
            }
        }

        fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProgressSource for ScriptedSource {
        async fn query(&self) -> Result<u64> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            let mut values = self.values.lock().unwrap();
            if values.len() > 1 {
                Ok(values.pop_front().unwrap())
            } else {
                Ok(*values.front().expect("scripted source needs at least one value"))
            }
        }
    }

    /// Fails the first `fail_first` calls, then succeeds.
    struct FlakyFunder {
        fail_first: usize,
        calls: AtomicUsize,
    }

    impl FlakyFunder {
        fn new(fail_first: usize) -> Self {
            Self {
                fail_first,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FundingAction for FlakyFunder {
        async fn fund(&self) -> Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err(anyhow!("friendbot not yet available"))
            } else {
                Ok(())
            }
        }
    }

    fn fast_gate(source: ScriptedSource) -> ReadinessGate<ScriptedSource> {
        ReadinessGate::with_config(
            source,
            GateConfig {
                poll_interval: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn await_progress_returns_on_first_value_above_floor() {
        let gate = fast_gate(ScriptedSource::new(&[0, 0, 0, 5]));

        let result = gate.await_progress(0).await;

        assert_eq!(result, GateResult::Ready);
        assert_eq!(gate.source.queries(), 4);
    }

    #[tokio::test]
    async fn await_progress_never_returns_on_value_equal_to_floor() {
        let gate = fast_gate(ScriptedSource::new(&[5]));

        let result = gate
            .await_progress_deadline(5, Duration::from_millis(50))
            .await;

        assert_eq!(result, GateResult::TimedOut);
    }

    #[tokio::test]
    async fn stuck_counter_only_returns_via_deadline() {
        let gate = fast_gate(ScriptedSource::new(&[0]));

        let result = gate
            .await_progress_deadline(0, Duration::from_millis(50))
            .await;

        assert_eq!(result, GateResult::TimedOut);
        // The poll kept running until the deadline cut it off
        assert!(gate.source.queries() > 1);
    }

    #[tokio::test]
    async fn query_errors_are_absorbed_and_polling_continues() {
        struct FailsThenAdvances {
            queries: AtomicUsize,
        }

        #[async_trait]
        impl ProgressSource for FailsThenAdvances {
            async fn query(&self) -> Result<u64> {
                let n = self.queries.fetch_add(1, Ordering::SeqCst);
                if n < 3 {
                    Err(anyhow!("connection refused"))
                } else {
                    Ok(7)
                }
            }
        }

        let gate = ReadinessGate::with_config(
            FailsThenAdvances {
                queries: AtomicUsize::new(0),
            },
            GateConfig {
                poll_interval: Duration::from_millis(1),
            },
        );

        let result = gate.await_progress(0).await;

        assert_eq!(result, GateResult::Ready);
        assert_eq!(gate.source.queries.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn funding_success_on_first_attempt_makes_no_progress_waits() {
        let gate = fast_gate(ScriptedSource::new(&[100]));
        let funder = FlakyFunder::new(0);

        let result = gate.fund_with_retry(&funder, &RetryLadder::default()).await;

        assert!(result.is_ok());
        assert_eq!(funder.calls(), 1);
        assert_eq!(gate.source.queries(), 0);
    }

    #[tokio::test]
    async fn funding_retries_wait_for_each_ladder_floor() {
        // Floors 10, 20, 30; each wait needs two queries before the counter
        // is past the floor.
        let gate = fast_gate(ScriptedSource::new(&[5, 15, 15, 25, 25, 35]));
        let funder = FlakyFunder::new(3);

        let result = gate
            .fund_with_retry(&funder, &RetryLadder::new(vec![10, 20, 30]))
            .await;

        assert!(result.is_ok());
        assert_eq!(funder.calls(), 4);
        assert_eq!(gate.source.queries(), 6);
    }

    #[tokio::test]
    async fn funding_success_mid_ladder_stops_immediately() {
        let gate = fast_gate(ScriptedSource::new(&[100]));
        let funder = FlakyFunder::new(1);

        let result = gate
            .fund_with_retry(&funder, &RetryLadder::new(vec![10, 20, 30]))
            .await;

        assert!(result.is_ok());
        assert_eq!(funder.calls(), 2);
        // Exactly one wait, satisfied on its first query
        assert_eq!(gate.source.queries(), 1);
    }

    #[tokio::test]
    async fn exhausted_ladder_reports_total_attempts() {
        let gate = fast_gate(ScriptedSource::new(&[100]));
        let funder = FlakyFunder::new(usize::MAX);

        let result = gate
            .fund_with_retry(&funder, &RetryLadder::new(vec![10, 20, 30]))
            .await;

        match result {
            Err(GateError::Exhausted { attempts }) => assert_eq!(attempts, 4),
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(funder.calls(), 4);
        // One progress wait per ladder floor
        assert_eq!(gate.source.queries(), 3);
    }

    #[tokio::test]
    async fn empty_ladder_allows_a_single_attempt() {
        let gate = fast_gate(ScriptedSource::new(&[100]));
        let funder = FlakyFunder::new(usize::MAX);

        let result = gate
            .fund_with_retry(&funder, &RetryLadder::new(vec![]))
            .await;

        match result {
            Err(GateError::Exhausted { attempts }) => assert_eq!(attempts, 1),
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(funder.calls(), 1);
        assert_eq!(gate.source.queries(), 0);
    }

    #[test]
    fn ladder_attempt_bound_counts_the_upfront_attempt() {
        assert_eq!(RetryLadder::default().max_attempts(), 4);
        assert_eq!(RetryLadder::new(vec![]).max_attempts(), 1);
    }

    #[test]
    fn exhausted_error_message_names_the_attempt_count() {
        let err = GateError::Exhausted { attempts: 4 };
        assert!(err.to_string().contains("4 attempts"));
    }
}
