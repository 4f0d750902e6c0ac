//! Waiting on long-running zone operations
//!
//! Mutating Compute Engine calls return an [`Operation`] handle. The poller
//! re-reads it until it is `DONE`, sleeping a short interval between polls.
//! Transport timeouts while polling are retried a bounded number of times;
//! any other failure ends the wait immediately.

use crate::models::Operation;
use async_trait::async_trait;
use skybridge_cloud::{CloudError, Result};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Anything that can fetch the current state of an operation by name
#[async_trait]
pub trait OperationSource: Send + Sync {
    async fn operation(&self, name: &str) -> Result<Operation>;
}

#[derive(Debug, Clone)]
pub struct OperationPoller {
    poll_interval: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl Default for OperationPoller {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl OperationPoller {
    pub fn new(poll_interval: Duration, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            poll_interval,
            max_retries,
            retry_delay,
        }
    }

    /// Wait until `operation` is done
    ///
    /// Fails with [`CloudError::Operation`] when the operation finishes with
    /// errors or when polling times out more than `max_retries` times in a
    /// row. A successful poll resets the count.
    pub async fn wait<S>(&self, source: &S, operation: &Operation) -> Result<()>
    where
        S: OperationSource + ?Sized,
    {
        let mut retries = 0;
        loop {
            match source.operation(&operation.name).await {
                Ok(current) if current.is_done() => {
                    let errors = current.error_messages();
                    if errors.is_empty() {
                        tracing::debug!("Operation {} completed", operation.name);
                        return Ok(());
                    }
                    return Err(CloudError::Operation(format!(
                        "operation {} failed: {}",
                        operation.name,
                        errors.join("; ")
                    )));
                }
                Ok(current) => {
                    tracing::debug!("Operation {} is {}", operation.name, current.status);
                    retries = 0;
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) if e.is_timeout() => {
                    retries += 1;
                    if retries > self.max_retries {
                        return Err(CloudError::Operation(format!(
                            "gave up waiting for operation {} after {} retries: {}",
                            operation.name, self.max_retries, e
                        )));
                    }
                    tracing::warn!(
                        "Timed out polling operation {} (retry {}/{})",
                        operation.name,
                        retries,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Step {
        Status(&'static str),
        Failed(&'static str),
        Timeout,
        Refused,
    }

    /// Replays a fixed sequence of poll results, then reports DONE
    struct Scripted {
        steps: Mutex<VecDeque<Step>>,
        polls: AtomicUsize,
    }

    impl Scripted {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                polls: AtomicUsize::new(0),
            }
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    fn operation(status: &str) -> Operation {
        serde_json::from_value(serde_json::json!({"name": "operation-1", "status": status}))
            .unwrap()
    }

    #[async_trait]
    impl OperationSource for Scripted {
        async fn operation(&self, _name: &str) -> Result<Operation> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                None | Some(Step::Status("DONE")) => Ok(operation("DONE")),
                Some(Step::Status(status)) => Ok(operation(status)),
                Some(Step::Failed(message)) => Ok(serde_json::from_value(serde_json::json!({
                    "name": "operation-1",
                    "status": "DONE",
                    "error": {"errors": [{"code": "ZONE_RESOURCE_POOL_EXHAUSTED", "message": message}]}
                }))
                .unwrap()),
                Some(Step::Timeout) => Err(CloudError::Timeout("operation poll timed out".into())),
                Some(Step::Refused) => Err(CloudError::transport(Some(503), "unavailable")),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_on_first_poll() {
        let source = Scripted::new(vec![Step::Status("DONE")]);
        let started = tokio::time::Instant::now();

        OperationPoller::default()
            .wait(&source, &operation("RUNNING"))
            .await
            .unwrap();

        assert_eq!(source.polls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_pending_polls() {
        let source = Scripted::new(vec![Step::Status("PENDING"), Step::Status("RUNNING")]);
        let started = tokio::time::Instant::now();

        OperationPoller::default()
            .wait(&source, &operation("PENDING"))
            .await
            .unwrap();

        assert_eq!(source.polls(), 3);
        assert_eq!(started.elapsed(), DEFAULT_POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_timeouts_then_succeeds() {
        let source = Scripted::new(vec![Step::Timeout, Step::Timeout, Step::Timeout]);
        let started = tokio::time::Instant::now();

        OperationPoller::default()
            .wait(&source, &operation("RUNNING"))
            .await
            .unwrap();

        // three retries plus the successful poll
        assert_eq!(source.polls(), 4);
        assert_eq!(started.elapsed(), DEFAULT_RETRY_DELAY * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_retry_bound() {
        let source = Scripted::new((0..10).map(|_| Step::Timeout).collect());

        let err = OperationPoller::default()
            .wait(&source, &operation("RUNNING"))
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::Operation(_)));
        assert_eq!(source.polls(), DEFAULT_MAX_RETRIES as usize + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_poll_resets_retry_count() {
        let mut steps = Vec::new();
        for _ in 0..3 {
            steps.extend((0..DEFAULT_MAX_RETRIES).map(|_| Step::Timeout));
            steps.push(Step::Status("RUNNING"));
        }
        let source = Scripted::new(steps);

        OperationPoller::default()
            .wait(&source, &operation("RUNNING"))
            .await
            .unwrap();

        assert_eq!(source.polls(), (DEFAULT_MAX_RETRIES as usize + 1) * 3 + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let source = Scripted::new(vec![Step::Refused]);

        let err = OperationPoller::default()
            .wait(&source, &operation("RUNNING"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CloudError::Transport {
                status: Some(503),
                ..
            }
        ));
        assert_eq!(source.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_operation_reports_backend_errors() {
        let source = Scripted::new(vec![Step::Failed("The zone does not have enough resources")]);

        let err = OperationPoller::new(Duration::from_millis(10), 1, Duration::from_millis(10))
            .wait(&source, &operation("RUNNING"))
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::Operation(_)));
        assert!(err.to_string().contains("ZONE_RESOURCE_POOL_EXHAUSTED"));
    }
}
