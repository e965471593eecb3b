use crate::error::SnapshotError;
use crate::models::{
    AbortReason, Candidate, CommitResult, PollOutcome, PollReport, PollStats, Snapshot,
};
use crate::policy::PriorityPolicy;
use crate::services::{classifier, ranking, window};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use resilience::{with_retry_if_using, with_timeout, RetryConfig, RetryError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Polling loop over a perishable inventory
///
/// **Cycle**:
/// 1. Acquire a fresh snapshot (transient failures retried in place)
/// 2. Classify, window-filter and rank the rows
/// 3. Commit the top candidate, if any, and confirm it independently
/// 4. Otherwise sleep `refresh_interval`, check the deadline, repeat
///
/// A rejected commit is the normal outcome of losing a race for a seat and
/// sends the loop back to searching.
///
/// **Usage**:
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let poller = PollingLoop::new(source, gateway, SystemClock, PollingConfig::default())
///     .with_shutdown(shutdown_rx);
///
/// let report = poller.run(&policy).await;
///
/// // From elsewhere: stop promptly
/// shutdown_tx.send(true)?;
/// ```
pub struct PollingLoop<S, C, K> {
    source: S,
    gateway: C,
    clock: K,
    config: PollingConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

/// Produces the current inventory.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Opaque per-row reference the commit gateway understands
    type Handle: Send + Sync;

    async fn acquire_snapshot(&self) -> Result<Snapshot<Self::Handle>, SnapshotError>;
}

/// Books a seat and checks whether a reservation exists.
#[async_trait]
pub trait CommitGateway<H: Send + Sync>: Send + Sync {
    async fn attempt_commit(&self, handle: &H) -> CommitResult;

    /// Must be safe to call after a partially completed commit.
    async fn confirm_commit(&self) -> bool;
}

/// Wall clock plus the sleep between iterations.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    async fn sleep(&self, duration: Duration);
}

/// Local wall clock and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Pause between two searches
    pub refresh_interval: Duration,
    /// Retries of a failed snapshot acquisition within one iteration
    pub max_snapshot_retries: u32,
    /// Initial backoff between snapshot retries
    pub retry_backoff: Duration,
    /// Upper bound on any single collaborator call
    pub call_timeout: Duration,
    /// Stop searching at this instant even if the policy window is open
    pub hard_stop: Option<NaiveDateTime>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(500),
            max_snapshot_retries: 3,
            retry_backoff: Duration::from_millis(200),
            call_timeout: Duration::from_secs(15),
            hard_stop: None,
        }
    }
}

impl PollingConfig {
    fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_snapshot_retries,
            initial_backoff: self.retry_backoff,
            max_backoff: self.retry_backoff * 8,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl<S, C, K> PollingLoop<S, C, K>
where
    S: SnapshotSource,
    C: CommitGateway<S::Handle>,
    K: Clock,
{
    pub fn new(source: S, gateway: C, clock: K, config: PollingConfig) -> Self {
        Self {
            source,
            gateway,
            clock,
            config,
            shutdown: None,
        }
    }

    /// Abort as soon as `true` is published on this channel.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn gateway(&self) -> &C {
        &self.gateway
    }

    /// Earliest of the hard stop and the policy's max time.
    pub fn deadline(&self, policy: &PriorityPolicy) -> Option<NaiveDateTime> {
        match (self.config.hard_stop, policy.max_time()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub async fn run(&self, policy: &PriorityPolicy) -> PollReport {
        let mut stats = PollStats::default();
        let mut shutdown = self.shutdown.clone();
        let deadline = self.deadline(policy);

        info!(
            deadline = ?deadline,
            refresh_ms = self.config.refresh_interval.as_millis() as u64,
            mode = ?policy.ranking_mode(),
            "Polling loop started"
        );

        let outcome = loop {
            if is_cancelled(&shutdown) {
                break PollOutcome::Aborted(AbortReason::Cancelled);
            }

            stats.iterations += 1;
            let iteration = stats.iterations;

            let acquired = tokio::select! {
                result = self.acquire_snapshot(&mut stats) => result,
                _ = wait_for_shutdown(&mut shutdown) => {
                    break PollOutcome::Aborted(AbortReason::Cancelled);
                }
            };

            let snapshot = match acquired {
                Ok(snapshot) => snapshot,
                Err(reason) => {
                    error!(iteration, reason = %reason, "Giving up on snapshot acquisition");
                    break PollOutcome::Aborted(reason);
                }
            };

            let now = self.clock.now();
            let classified = classifier::classify_snapshot(&snapshot, policy);
            stats.rows_skipped += classified.rows_skipped as u32;
            stats.candidates_seen += classified.candidates.len() as u32;

            let in_window = window::filter(classified.candidates, policy, now);
            let ranked = ranking::rank(in_window, policy, now);

            debug!(
                iteration,
                rows = snapshot.rows.len(),
                ranked = ranked.len(),
                "Snapshot evaluated"
            );

            if let Some(top) = ranked.first() {
                stats.commit_attempts += 1;
                if self.commit(top, iteration).await {
                    break PollOutcome::Committed(top.to_committed());
                }
            }

            tokio::select! {
                _ = self.clock.sleep(self.config.refresh_interval) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    break PollOutcome::Aborted(AbortReason::Cancelled);
                }
            }

            if let Some(deadline) = deadline {
                if self.clock.now() >= deadline {
                    break PollOutcome::DeadlineExceeded;
                }
            }
        };

        info!(
            outcome = ?outcome,
            iterations = stats.iterations,
            commit_attempts = stats.commit_attempts,
            "Polling loop finished"
        );

        PollReport { outcome, stats }
    }

    async fn acquire_snapshot(
        &self,
        stats: &mut PollStats,
    ) -> Result<Snapshot<S::Handle>, AbortReason> {
        let failures = AtomicU32::new(0);
        let failures_ref = &failures;
        let source = &self.source;
        let clock = &self.clock;
        let call_timeout = self.config.call_timeout;

        // Retry backoff is measured on the injected clock
        let result = with_retry_if_using(
            &self.config.retry_config(),
            SnapshotError::is_transient,
            |delay| clock.sleep(delay),
            move || async move {
                let result = with_timeout(call_timeout, source.acquire_snapshot())
                    .await
                    .unwrap_or_else(|e| Err(SnapshotError::Transient(e.to_string())));
                if result.is_err() {
                    failures_ref.fetch_add(1, Ordering::Relaxed);
                }
                result
            },
        )
        .await;

        stats.snapshot_failures += failures.load(Ordering::Relaxed);

        match result {
            Ok(snapshot) => {
                stats.snapshots_acquired += 1;
                Ok(snapshot)
            }
            Err(RetryError::Exhausted {
                attempts,
                last_error,
            }) => Err(AbortReason::SnapshotRetriesExhausted {
                attempts,
                last_error: last_error.to_string(),
            }),
            Err(RetryError::Permanent(SnapshotError::Fatal(msg)))
            | Err(RetryError::Permanent(SnapshotError::Transient(msg))) => {
                Err(AbortReason::SnapshotSourceFailed(msg))
            }
        }
    }

    /// Returns true once a reservation is confirmed.
    async fn commit(&self, candidate: &Candidate<'_, S::Handle>, iteration: u32) -> bool {
        info!(
            iteration,
            departure = %candidate.departure,
            category = %candidate.category,
            "Attempting commit"
        );

        let result = with_timeout(
            self.config.call_timeout,
            self.gateway.attempt_commit(candidate.handle),
        )
        .await
        .unwrap_or_else(|e| {
            warn!(iteration, error = %e, "Commit attempt timed out");
            CommitResult::TransientError
        });

        match result {
            CommitResult::Accepted => {
                if self.confirm().await {
                    info!(iteration, departure = %candidate.departure, "Reservation confirmed");
                    true
                } else {
                    warn!(iteration, "Commit accepted but no reservation found");
                    false
                }
            }
            CommitResult::Rejected => {
                info!(iteration, "Commit rejected, seat already taken");
                false
            }
            CommitResult::TransientError => {
                // The commit may have gone through before failing
                let confirmed = self.confirm().await;
                if confirmed {
                    info!(iteration, "Reservation confirmed after transient commit error");
                } else {
                    warn!(iteration, "Transient commit error, resuming search");
                }
                confirmed
            }
        }
    }

    async fn confirm(&self) -> bool {
        with_timeout(self.config.call_timeout, self.gateway.confirm_commit())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Commit confirmation timed out");
                false
            })
    }
}

fn is_cancelled(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    shutdown.as_ref().map_or(false, |rx| *rx.borrow())
}

/// Resolves once cancellation is requested. A dropped sender can no longer
/// cancel, so the future then never resolves.
async fn wait_for_shutdown(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
    std::future::pending::<()>().await
}
