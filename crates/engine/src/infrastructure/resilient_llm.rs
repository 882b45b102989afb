//! Retrying wrapper around any `LlmPort`.
//!
//! Transient generator failures (network errors, timeouts) are retried with
//! exponential backoff and jitter. Each attempt can carry its own deadline,
//! so a hung request is retried like any other timeout. Auth and bad-request
//! failures are returned immediately, and so are unparseable bodies: those
//! are regenerated by the turn generator under its own cap. The default
//! budget is a single retry; after that the caller degrades to catalog-only
//! play.

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse, ToolDefinition};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Cap on exponential growth
    pub max_delay_ms: u64,
    /// Fraction (0.0-1.0) of the delay randomised either way
    pub jitter_factor: f64,
    /// Deadline for each attempt; an expired attempt is a retryable timeout
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter_factor: 0.2,
            attempt_timeout: None,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Un-jittered delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped.
    fn capped_delay_ms(&self, retry: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)))
            .min(self.max_delay_ms)
    }

    /// Longest a full call can take: every attempt runs to its deadline
    /// (`attempt_timeout`, else `attempt`) and every backoff draws its
    /// largest jitter.
    pub fn worst_case(&self, attempt: Duration) -> Duration {
        let attempt = self.attempt_timeout.unwrap_or(attempt);
        let backoff_ms: u64 = (1..=self.max_retries)
            .map(|retry| {
                let capped = self.capped_delay_ms(retry);
                capped + (capped as f64 * self.jitter_factor).ceil() as u64
            })
            .sum();
        attempt
            .saturating_mul(self.max_retries.saturating_add(1))
            .saturating_add(Duration::from_millis(backoff_ms))
    }
}

pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Backoff before retry number `retry` (1-based), jittered.
    fn backoff_ms(&self, retry: u32) -> u64 {
        let capped = self.config.capped_delay_ms(retry);

        let spread = (capped as f64 * self.config.jitter_factor) as i64;
        if spread <= 0 {
            return capped;
        }
        let jitter = rand::thread_rng().gen_range(-spread..=spread);
        (capped as i64 + jitter).max(0) as u64
    }

    fn is_retryable(error: &LlmError) -> bool {
        match error {
            LlmError::RequestFailed(msg) => {
                !["400", "401", "403", "404"].iter().any(|code| msg.contains(code))
            }
            LlmError::Timeout(_) => true,
            LlmError::InvalidResponse(_) => false,
        }
    }

    async fn with_retry<F, Fut>(&self, operation: &'static str, call: F) -> Result<LlmResponse, LlmError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<LlmResponse, LlmError>>,
    {
        let mut attempt = 0;
        loop {
            let result = match self.config.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, call()).await {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout(limit.as_secs())),
                },
                None => call().await,
            };
            let error = match result {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, operation, "Generator call succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) => e,
            };

            if !Self::is_retryable(&error) {
                tracing::error!(error = %error, operation, "Generator call failed with non-retryable error");
                return Err(error);
            }
            if attempt >= self.config.max_retries {
                tracing::error!(
                    attempts = attempt + 1,
                    error = %error,
                    operation,
                    "Generator call failed after all retry attempts"
                );
                return Err(error);
            }

            attempt += 1;
            let delay = self.backoff_ms(attempt);
            tracing::warn!(
                attempt,
                max_retries = self.config.max_retries,
                delay_ms = delay,
                error = %error,
                operation,
                "Generator call failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.with_retry("generate", || {
            let inner = Arc::clone(&self.inner);
            let request = request.clone();
            async move { inner.generate(request).await }
        })
        .await
    }

    async fn generate_with_tools(
        &self,
        request: LlmRequest,
        tools: Vec<ToolDefinition>,
    ) -> Result<LlmResponse, LlmError> {
        self.with_retry("generate_with_tools", || {
            let inner = Arc::clone(&self.inner);
            let request = request.clone();
            let tools = tools.clone();
            async move { inner.generate_with_tools(request, tools).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times with `error`, then answers.
    struct FlakyLlm {
        failures: AtomicU32,
        calls: AtomicU32,
        error: LlmError,
    }

    impl FlakyLlm {
        fn new(failures: u32, error: LlmError) -> Self {
            Self {
                failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
                error,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmPort for FlakyLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                Err(self.error.clone())
            } else {
                Ok(LlmResponse::text("ok"))
            }
        }

        async fn generate_with_tools(
            &self,
            request: LlmRequest,
            _tools: Vec<ToolDefinition>,
        ) -> Result<LlmResponse, LlmError> {
            self.generate(request).await
        }
    }

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 5,
            jitter_factor: 0.0,
            attempt_timeout: None,
        }
    }

    #[tokio::test]
    async fn single_retry_recovers_from_timeout() {
        let inner = Arc::new(FlakyLlm::new(1, LlmError::Timeout(30)));
        let client = ResilientLlmClient::new(inner.clone(), fast(1));

        let response = client.generate(LlmRequest::new(vec![])).await.unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let inner = Arc::new(FlakyLlm::new(5, LlmError::RequestFailed("connection reset".into())));
        let client = ResilientLlmClient::new(inner.clone(), fast(1));

        let result = client.generate_with_tools(LlmRequest::new(vec![]), vec![]).await;
        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn auth_errors_are_not_retried() {
        let inner = Arc::new(FlakyLlm::new(5, LlmError::RequestFailed("401 Unauthorized".into())));
        let client = ResilientLlmClient::new(inner.clone(), fast(3));

        assert!(client.generate(LlmRequest::new(vec![])).await.is_err());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_responses_are_left_to_the_caller() {
        let inner = Arc::new(FlakyLlm::new(5, LlmError::InvalidResponse("bad json".into())));
        let client = ResilientLlmClient::new(inner.clone(), fast(3));

        let result = client.generate(LlmRequest::new(vec![])).await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
        assert_eq!(inner.calls(), 1);
    }

    /// Hangs on the first call, answers on every later one.
    struct HangsOnceLlm {
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmPort for HangsOnceLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
            }
            Ok(LlmResponse::text("ok"))
        }

        async fn generate_with_tools(
            &self,
            request: LlmRequest,
            _tools: Vec<ToolDefinition>,
        ) -> Result<LlmResponse, LlmError> {
            self.generate(request).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempt_times_out_and_is_retried() {
        let inner = Arc::new(HangsOnceLlm { calls: AtomicU32::new(0) });
        let client = ResilientLlmClient::new(
            inner.clone(),
            fast(1).with_attempt_timeout(Duration::from_secs(30)),
        );

        let response = client.generate(LlmRequest::new(vec![])).await.unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn worst_case_covers_every_attempt_and_backoff() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter_factor: 0.2,
            attempt_timeout: None,
        };
        // 3 x 30s + (500 + 100) + (1000 + 200)
        assert_eq!(
            config.worst_case(Duration::from_secs(30)),
            Duration::from_millis(91_800)
        );
        assert_eq!(
            RetryConfig::with_max_retries(0).worst_case(Duration::from_secs(30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn backoff_doubles_until_capped() {
        let client = ResilientLlmClient::new(
            Arc::new(FlakyLlm::new(0, LlmError::Timeout(1))),
            RetryConfig {
                max_retries: 5,
                base_delay_ms: 500,
                max_delay_ms: 3_000,
                jitter_factor: 0.0,
                attempt_timeout: None,
            },
        );
        assert_eq!(client.backoff_ms(1), 500);
        assert_eq!(client.backoff_ms(2), 1_000);
        assert_eq!(client.backoff_ms(3), 2_000);
        assert_eq!(client.backoff_ms(4), 3_000);
    }

    #[test]
    fn default_config_retries_once() {
        assert_eq!(RetryConfig::default().max_retries, 1);
        assert_eq!(RetryConfig::with_max_retries(3).max_retries, 3);
    }
}
