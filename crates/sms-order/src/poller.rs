//! SMS code polling.

use crate::api::OrderApi;
use crate::cache::OrderCache;
use crate::error::OrderError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};
use vtu_api_client::OrderStatus;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Fixed-delay polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between the end of one request and the start of the next
    pub interval: Duration,
    /// Total number of code requests before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        if self.max_attempts == 0 {
            return Err(OrderError::Validation(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.interval.is_zero() {
            return Err(OrderError::Validation(
                "poll interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Upper bound on how long polling can take, ignoring request latency.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Progress of a polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The backend answered without a code.
    Waiting { attempt: u32, max_attempts: u32 },
    /// A transient failure used up an attempt.
    RequestFailed { attempt: u32, error: String },
    /// The code arrived. Always the last event.
    CodeReceived { code: String, attempt: u32 },
}

/// Polls the backend for an order's SMS code.
///
/// Polling runs on the task that drives the returned future or stream, so
/// dropping it stops the timer chain. One request is in flight at a time.
#[derive(Clone)]
pub struct CodePoller {
    api: Arc<dyn OrderApi>,
    cache: OrderCache,
    config: PollConfig,
}

enum Step<T> {
    Cancelled,
    Done(T),
}

impl CodePoller {
    pub fn new(api: Arc<dyn OrderApi>, config: PollConfig) -> Self {
        Self::with_cache(api, OrderCache::new(), config)
    }

    pub fn with_cache(api: Arc<dyn OrderApi>, cache: OrderCache, config: PollConfig) -> Self {
        Self { api, cache, config }
    }

    /// Poll as a stream of progress events.
    ///
    /// The stream ends after `CodeReceived` or after yielding one error:
    /// `Timeout` once the attempt budget is spent, `OrderClosed` if the order
    /// expired or was cancelled, `Cancelled` when `cancel` fires, or `Api`
    /// for non-transient failures.
    pub fn events(
        &self,
        order_id: &str,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<PollEvent, OrderError>> + Send + 'static {
        let api = self.api.clone();
        let cache = self.cache.clone();
        let config = self.config;
        let order_id = order_id.to_string();

        async_stream::stream! {
            if let Err(e) = config.validate() {
                yield Err(e);
                return;
            }

            debug!(
                order_id = %order_id,
                interval = ?config.interval,
                max_attempts = config.max_attempts,
                "Polling for code"
            );

            let mut attempt = 0;
            loop {
                attempt += 1;

                if cancel.is_cancelled() {
                    debug!(order_id = %order_id, attempt, "Polling cancelled");
                    yield Err(OrderError::Cancelled);
                    return;
                }

                let step = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Step::Cancelled,
                    response = api.get_code(&order_id) => Step::Done(response),
                };
                let response = match step {
                    Step::Cancelled => {
                        debug!(order_id = %order_id, attempt, "Polling cancelled");
                        yield Err(OrderError::Cancelled);
                        return;
                    }
                    Step::Done(response) => response,
                };

                match response {
                    Ok(answer) => {
                        if let Some(code) = answer.code() {
                            let code = code.to_string();
                            cache.record_code(&order_id, &code).await;
                            info!(order_id = %order_id, attempt, "Code received");
                            yield Ok(PollEvent::CodeReceived { code, attempt });
                            return;
                        }

                        if matches!(answer.status, OrderStatus::Expired | OrderStatus::Cancelled) {
                            cache.update_status(&order_id, answer.status).await;
                            info!(order_id = %order_id, status = %answer.status, "Order closed without code");
                            yield Err(OrderError::OrderClosed { status: answer.status });
                            return;
                        }

                        yield Ok(PollEvent::Waiting {
                            attempt,
                            max_attempts: config.max_attempts,
                        });
                    }
                    Err(e) if e.is_transient() => {
                        warn!(order_id = %order_id, attempt, "Code request failed: {}", e);
                        yield Ok(PollEvent::RequestFailed {
                            attempt,
                            error: e.to_string(),
                        });
                    }
                    Err(e) => {
                        yield Err(OrderError::Api(e));
                        return;
                    }
                }

                if attempt >= config.max_attempts {
                    info!(order_id = %order_id, attempts = attempt, "No code before attempt budget ran out");
                    yield Err(OrderError::Timeout { attempts: attempt });
                    return;
                }

                let step = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Step::Cancelled,
                    _ = sleep(config.interval) => Step::Done(()),
                };
                if let Step::Cancelled = step {
                    debug!(order_id = %order_id, attempt, "Polling cancelled");
                    yield Err(OrderError::Cancelled);
                    return;
                }
            }
        }
    }

    /// Poll until the code arrives or polling stops.
    pub async fn wait_for_code(
        &self,
        order_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String, OrderError> {
        let stream = self.events(order_id, cancel.clone());
        tokio::pin!(stream);

        while let Some(event) = stream.next().await {
            match event? {
                PollEvent::CodeReceived { code, .. } => return Ok(code),
                other => debug!(?other, "Poll progress"),
            }
        }

        Err(OrderError::Timeout {
            attempts: self.config.max_attempts,
        })
    }

    /// Poll on a background task.
    ///
    /// The task listens to a child of `parent`; dropping the handle cancels it.
    pub fn spawn(&self, order_id: &str, parent: &CancellationToken) -> PollHandle {
        let token = parent.child_token();
        let poller = self.clone();
        let order_id = order_id.to_string();
        let task_token = token.clone();

        let task = tokio::spawn(async move { poller.wait_for_code(&order_id, &task_token).await });

        PollHandle {
            task,
            token: token.clone(),
            _guard: token.drop_guard(),
        }
    }
}

/// Owner of a background poll. Dropping it stops the poll.
pub struct PollHandle {
    task: JoinHandle<Result<String, OrderError>>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poll's outcome.
    pub async fn join(self) -> Result<String, OrderError> {
        let PollHandle { task, _guard, .. } = self;
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(OrderError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockOrderApi;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vtu_api_client::{ApiError, CodeResponse};

    fn pending() -> Result<CodeResponse, ApiError> {
        Ok(CodeResponse {
            code: None,
            status: OrderStatus::Pending,
        })
    }

    fn poller(api: MockOrderApi, interval_ms: u64, max_attempts: u32) -> CodePoller {
        CodePoller::new(
            Arc::new(api),
            PollConfig::new(Duration::from_millis(interval_ms), max_attempts),
        )
    }

    #[test]
    fn test_config_validation() {
        assert!(PollConfig::default().validate().is_ok());
        assert!(PollConfig::new(Duration::from_secs(1), 0).validate().is_err());
        assert!(PollConfig::new(Duration::ZERO, 3).validate().is_err());
        assert_eq!(
            PollConfig::new(Duration::from_secs(5), 4).budget(),
            Duration::from_secs(15)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_max_attempts() {
        let mut api = MockOrderApi::new();
        api.expect_get_code().times(4).returning(|_| pending());

        let poller = poller(api, 1000, 4);
        let result = poller
            .wait_for_code("ord_1", &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(OrderError::Timeout { attempts: 4 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_first_code() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut api = MockOrderApi::new();
        api.expect_get_code().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                pending()
            } else {
                Ok(CodeResponse {
                    code: Some("123456".into()),
                    status: OrderStatus::CodeReceived,
                })
            }
        });

        let poller = poller(api, 1000, 10);
        let code = poller
            .wait_for_code("ord_1", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(code, "123456");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_order_stops_polling() {
        let mut api = MockOrderApi::new();
        api.expect_get_code().times(1).returning(|_| {
            Ok(CodeResponse {
                code: None,
                status: OrderStatus::Expired,
            })
        });

        let poller = poller(api, 1000, 10);
        let result = poller
            .wait_for_code("ord_1", &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(OrderError::OrderClosed {
                status: OrderStatus::Expired
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_consume_attempts() {
        let mut api = MockOrderApi::new();
        api.expect_get_code()
            .times(3)
            .returning(|_| Err(ApiError::RateLimit));

        let poller = poller(api, 500, 3);
        let events: Vec<_> = poller
            .events("ord_1", CancellationToken::new())
            .collect()
            .await;

        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            Ok(PollEvent::RequestFailed { attempt: 1, .. })
        ));
        assert!(matches!(events[3], Err(OrderError::Timeout { attempts: 3 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_aborts() {
        let mut api = MockOrderApi::new();
        api.expect_get_code()
            .times(1)
            .returning(|_| Err(ApiError::Unauthorized));

        let poller = poller(api, 500, 5);
        let result = poller
            .wait_for_code("ord_1", &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(OrderError::Api(ApiError::Unauthorized))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_issues_no_request() {
        let mut api = MockOrderApi::new();
        api.expect_get_code().never();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poller(api, 1000, 5).wait_for_code("ord_1", &cancel).await;
        assert!(matches!(result, Err(OrderError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_issues_no_request() {
        let mut api = MockOrderApi::new();
        api.expect_get_code().never();

        let result = poller(api, 1000, 0)
            .wait_for_code("ord_1", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }
}
