/// Resilience helpers for calls into flaky external collaborators
///
/// This library provides:
/// - **Retry**: bounded retries with exponential backoff and optional jitter,
///   with a predicate separating transient failures from permanent ones
/// - **Timeout**: time limits on a single collaborator call
///
/// # Example: bounded retry of a snapshot fetch
///
/// ```rust,no_run
/// use resilience::{with_retry_if, RetryConfig, RetryError};
///
/// #[tokio::main]
/// async fn main() {
///     let config = RetryConfig::default();
///
///     let result = with_retry_if(
///         &config,
///         |e: &String| e.starts_with("transient"),
///         || async { Err::<(), _>("transient: page not loaded".to_string()) },
///     )
///     .await;
///
///     assert!(matches!(result, Err(RetryError::Exhausted { .. })));
/// }
/// ```

pub mod retry;
pub mod timeout;

// Re-export main types for convenience
pub use retry::{with_retry, with_retry_if, with_retry_if_using, RetryConfig, RetryError};
pub use timeout::{with_timeout, TimeoutError};
