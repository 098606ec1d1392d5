//! Polling loop for CloudStack async jobs

use super::asyncjob::{JobOutcome, QueryAsyncJobResultParams, QueryAsyncJobResultResponse};
use super::client::Dispatch;
use super::common::ApiParams;
use super::error::{ApiError, Result};
use super::response::decode;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const BACKOFF_STEP: Duration = Duration::from_secs(1);
const BACKOFF_CEILING: Duration = Duration::from_secs(15);

/// Linear delay between status queries, one second longer each time up
/// to fifteen seconds.
#[derive(Debug, Clone, Default)]
pub struct Backoff {
    current: Duration,
}

impl Backoff {
    pub fn next_delay(&mut self) -> Duration {
        if self.current < BACKOFF_CEILING {
            self.current += BACKOFF_STEP;
        }
        self.current
    }
}

/// Waits for async jobs by polling `queryAsyncJobResult`.
pub struct AsyncPoller<'a, D: Dispatch + ?Sized> {
    dispatcher: &'a D,
    cancel: Option<CancellationToken>,
}

impl<'a, D: Dispatch + ?Sized> AsyncPoller<'a, D> {
    pub fn new(dispatcher: &'a D) -> Self {
        Self {
            dispatcher,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Polls until the job succeeds, fails, or `timeout` has elapsed.
    ///
    /// Returns the raw `jobresult` on success. Never returns while the job
    /// is still pending.
    pub async fn await_job(&self, job_id: &str, timeout: Duration) -> Result<Value> {
        let started = Instant::now();
        let mut backoff = Backoff::default();

        loop {
            if self.is_cancelled() {
                return Err(ApiError::Cancelled {
                    job_id: job_id.to_string(),
                });
            }

            let status = self.query(job_id).await?;
            match status.outcome() {
                JobOutcome::Succeeded(result) => return Ok(result),
                JobOutcome::Failed(failure) => {
                    return Err(ApiError::JobFailed {
                        job_id: job_id.to_string(),
                        message: failure.message(),
                        result: failure.into_payload(),
                    });
                }
                JobOutcome::Pending => {}
            }

            let delay = backoff.next_delay();
            tracing::debug!(job_id, delay_secs = delay.as_secs(), "async job still pending");
            self.sleep(job_id, delay).await?;

            // no query may be sent once the deadline has passed
            if started.elapsed() > timeout {
                return Err(ApiError::AsyncTimeout {
                    job_id: job_id.to_string(),
                });
            }
        }
    }

    async fn query(&self, job_id: &str) -> Result<QueryAsyncJobResultResponse> {
        let params = QueryAsyncJobResultParams::new(job_id).to_params();
        let payload = self
            .dispatcher
            .dispatch("queryAsyncJobResult", params, false)
            .await?;
        decode(payload)
    }

    async fn sleep(&self, job_id: &str, delay: Duration) -> Result<()> {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ApiError::Cancelled {
                        job_id: job_id.to_string(),
                    }),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::ScriptedDispatcher;
    use serde_json::json;

    fn pending() -> Value {
        json!({"jobid": "J1", "jobstatus": 0})
    }

    #[test]
    fn backoff_grows_linearly_then_holds() {
        let mut backoff = Backoff::default();
        let delays: Vec<u64> = (0..18).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(
            delays,
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 15, 15, 15]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn returns_result_after_pending_polls() {
        let dispatcher = ScriptedDispatcher::new(vec![
            Ok(pending()),
            Ok(pending()),
            Ok(json!({"jobid": "J1", "jobstatus": 1, "jobresult": {"host": {"id": "h1"}}})),
        ]);

        let started = Instant::now();
        let result = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::from_secs(300))
            .await
            .unwrap();

        assert_eq!(result, json!({"host": {"id": "h1"}}));
        assert_eq!(dispatcher.call_count(), 3);
        // two sleeps: 1s then 2s
        assert_eq!(started.elapsed(), Duration::from_secs(3));

        for (command, params, post) in dispatcher.calls() {
            assert_eq!(command, "queryAsyncJobResult");
            assert_eq!(params.get_str("jobid"), Some("J1"));
            assert!(!post);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn text_failure_message_is_the_job_result() {
        let dispatcher = ScriptedDispatcher::new(vec![Ok(json!({
            "jobid": "J1",
            "jobstatus": 2,
            "jobresulttype": "text",
            "jobresult": "disk full"
        }))]);

        let err = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::from_secs(300))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert!(matches!(err, ApiError::JobFailed { ref job_id, .. } if job_id == "J1"));
    }

    #[tokio::test(start_paused = true)]
    async fn object_failure_is_undefined_error() {
        let dispatcher = ScriptedDispatcher::new(vec![Ok(json!({
            "jobstatus": 2,
            "jobresulttype": "object",
            "jobresult": {"errorcode": 530, "errortext": "no capacity"}
        }))]);

        let err = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::from_secs(300))
            .await
            .unwrap_err();

        match err {
            ApiError::JobFailed {
                message, result, ..
            } => {
                assert!(message.starts_with("Undefined error: "));
                assert_eq!(result["errorcode"], 530);
            }
            other => panic!("expected job failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_while_pending() {
        let dispatcher = ScriptedDispatcher::repeating(pending());

        let started = Instant::now();
        let err = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(err.is_async_timeout());
        assert_eq!(err.job_id(), Some("J1"));
        // queries at t=0, 1 and 3; the next sleep ends at t=6, past the deadline
        assert_eq!(dispatcher.call_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_the_deadline_is_never_queried() {
        let dispatcher = ScriptedDispatcher::new(vec![
            Ok(pending()),
            Ok(pending()),
            Ok(pending()),
            Ok(json!({"jobid": "J1", "jobstatus": 1, "jobresult": {"ok": true}})),
        ]);

        let err = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(err.is_async_timeout());
        assert_eq!(dispatcher.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_still_sends_the_first_query() {
        let dispatcher = ScriptedDispatcher::repeating(pending());

        let err = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::ZERO)
            .await
            .unwrap_err();

        assert!(err.is_async_timeout());
        assert_eq!(dispatcher.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_errors_propagate_unchanged() {
        let dispatcher = ScriptedDispatcher::new(vec![
            Ok(pending()),
            Err(ApiError::Envelope("{}".to_string())),
        ]);

        let err = AsyncPoller::new(&dispatcher)
            .await_job("J1", Duration::from_secs(300))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Envelope(_)));
        assert_eq!(dispatcher.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let dispatcher = ScriptedDispatcher::repeating(pending());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            canceller.cancel();
        });

        let err = AsyncPoller::new(&dispatcher)
            .with_cancellation(token)
            .await_job("J1", Duration::from_secs(300))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Cancelled { ref job_id } if job_id == "J1"));
        assert_eq!(dispatcher.call_count(), 2);
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_the_query() {
        let dispatcher = ScriptedDispatcher::repeating(pending());
        let token = CancellationToken::new();
        token.cancel();

        let err = AsyncPoller::new(&dispatcher)
            .with_cancellation(token)
            .await_job("J1", Duration::from_secs(300))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Cancelled { .. }));
        assert_eq!(dispatcher.call_count(), 0);
    }
}
