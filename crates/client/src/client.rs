//! [`RateLimitedClient`]: one logical call, retried through rate limits and
//! write conflicts until it completes or its time budget runs out.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use domain::{ApiTimeout, RateLimitState, RetryBudget, MAX_CONFLICT_BACKOFF};

use crate::{ApiRequest, ApiResponse, ClientError, Clock, SystemClock, Transport};

/// What to do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Hand the response to the caller, whatever its status.
    Complete,
    /// `403` with an exhausted window: wait for the reset and resend.
    RateLimited(RateLimitState),
    /// `409` on a verb that retries conflicts: back off and resend.
    Conflict,
}

fn classify(request: &ApiRequest, response: &ApiResponse) -> Disposition {
    if response.is_rate_limited() {
        Disposition::RateLimited(response.rate_limit_state())
    } else if response.status() == StatusCode::CONFLICT && request.method().retries_conflicts() {
        Disposition::Conflict
    } else {
        Disposition::Complete
    }
}

/// Executes requests, absorbing rate-limit and conflict responses.
///
/// Every call to [`RateLimitedClient::execute`] gets a fresh [`RetryBudget`].
/// Before each back-off sleep the elapsed time is compared with the timeout;
/// once it is exceeded the call fails with
/// [`ClientError::RateLimitTimeout`] or [`ClientError::ConflictTimeout`]. A
/// sleep that has started always runs to completion.
///
/// Any other status, success or not, is returned to the caller unchanged.
#[derive(Clone)]
pub struct RateLimitedClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    timeout: ApiTimeout,
    max_backoff: Duration,
}

impl RateLimitedClient {
    /// Creates a client on the system clock.
    pub fn new(transport: Arc<dyn Transport>, timeout: ApiTimeout) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            timeout,
            max_backoff: MAX_CONFLICT_BACKOFF,
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the cap on the doubling conflict back-off.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// The per-call time budget.
    pub fn timeout(&self) -> ApiTimeout {
        self.timeout
    }

    /// Sends `request` until it yields a response that is neither rate limited
    /// nor a retryable conflict.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut budget = RetryBudget::with_max_backoff(self.clock.now(), self.timeout, self.max_backoff);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let response = self.transport.send(request).await?;
            let now = self.clock.now();

            let wait = match classify(request, &response) {
                Disposition::Complete => {
                    debug!(status = response.status().as_u16(), attempts, "Request complete");
                    return Ok(response);
                }
                Disposition::RateLimited(state) => {
                    if budget.is_exhausted(now) {
                        return Err(ClientError::RateLimitTimeout {
                            url: request.url().to_string(),
                            elapsed: budget.elapsed(now),
                            timeout: budget.timeout().as_duration(),
                            attempts,
                        });
                    }
                    let wait = state.wait_from(now);
                    warn!(
                        reset = ?state.reset_epoch_seconds,
                        wait_secs = wait.as_secs_f64(),
                        attempts,
                        "Rate limit exhausted, waiting for reset"
                    );
                    wait
                }
                Disposition::Conflict => {
                    if budget.is_exhausted(now) {
                        return Err(ClientError::ConflictTimeout {
                            url: request.url().to_string(),
                            elapsed: budget.elapsed(now),
                            timeout: budget.timeout().as_duration(),
                            attempts,
                        });
                    }
                    let wait = budget.next_conflict_backoff();
                    warn!(wait_secs = wait.as_secs_f64(), attempts, "Conflict, backing off");
                    wait
                }
            };

            self.clock.sleep(wait).await;
        }
    }
}

impl std::fmt::Debug for RateLimitedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedClient")
            .field("timeout", &self.timeout)
            .field("max_backoff", &self.max_backoff)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderValue};

    use domain::Timestamp;

    use super::*;
    use crate::{HttpMethod, ManualClock, TransportError};

    const START: i64 = 1_700_000_000;

    /// Replays canned responses and advances the shared clock by `latency`
    /// for every request it answers.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        sent: Mutex<Vec<HttpMethod>>,
        clock: Arc<ManualClock>,
        latency: Duration,
    }

    impl ScriptedTransport {
        fn new(clock: Arc<ManualClock>, responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                sent: Mutex::new(Vec::new()),
                clock,
                latency: Duration::ZERO,
            }
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.sent.lock().unwrap().push(request.method());
            self.clock.advance(self.latency);
            let next = self.responses.lock().unwrap().pop_front();
            next.ok_or_else(|| TransportError::Send {
                url: request.url().to_string(),
                message: "script exhausted".to_string(),
            })
        }
    }

    fn status(code: u16) -> ApiResponse {
        ApiResponse::new(StatusCode::from_u16(code).unwrap(), HeaderMap::new(), "")
    }

    fn rate_limited(reset: i64) -> ApiResponse {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from(reset));
        ApiResponse::new(StatusCode::FORBIDDEN, headers, "API rate limit exceeded")
    }

    fn setup(
        responses: Vec<ApiResponse>,
        timeout_secs: f64,
    ) -> (RateLimitedClient, Arc<ManualClock>, Arc<ScriptedTransport>) {
        let clock = Arc::new(ManualClock::starting_at(Timestamp::from_epoch_seconds(START).unwrap()));
        let transport = Arc::new(ScriptedTransport::new(clock.clone(), responses));
        let client = client_for(transport.clone(), clock.clone(), timeout_secs);
        (client, clock, transport)
    }

    fn client_for(
        transport: Arc<ScriptedTransport>,
        clock: Arc<ManualClock>,
        timeout_secs: f64,
    ) -> RateLimitedClient {
        RateLimitedClient::new(transport, ApiTimeout::from_secs_f64(timeout_secs).unwrap()).with_clock(clock)
    }

    #[tokio::test]
    async fn immediate_success_does_not_sleep() {
        let (client, clock, transport) = setup(vec![status(200)], 60.0);

        let response = client.execute(&ApiRequest::get("https://api.test/repos")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(clock.sleeps().is_empty());
        assert_eq!(transport.sent_count(), 1);
    }

    #[tokio::test]
    async fn rate_limit_waits_for_reset_plus_buffer() {
        let ok = ApiResponse::new(StatusCode::OK, HeaderMap::new(), r#"{"names":["rust"]}"#);
        let (client, clock, transport) = setup(vec![rate_limited(START + 5), ok], 60.0);

        let response = client.execute(&ApiRequest::get("https://api.test/topics")).await.unwrap();

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(15)]);
        assert_eq!(response.body(), r#"{"names":["rust"]}"#);
        assert_eq!(transport.sent_count(), 2);
    }

    #[tokio::test]
    async fn rate_limit_with_past_reset_retries_without_waiting() {
        let (client, clock, _) = setup(vec![rate_limited(START - 3600), status(200)], 60.0);

        client.execute(&ApiRequest::get("https://api.test/")).await.unwrap();

        assert_eq!(clock.sleeps(), vec![Duration::ZERO]);
    }

    #[tokio::test]
    async fn plain_forbidden_is_returned_to_the_caller() {
        let (client, clock, _) = setup(vec![status(403)], 60.0);

        let response = client.execute(&ApiRequest::get("https://api.test/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn conflicts_on_post_back_off_exponentially() {
        let responses = vec![status(409), status(409), status(409), status(409), status(201)];
        let (client, clock, transport) = setup(responses, 600.0);

        let response = client
            .execute(&ApiRequest::post("https://api.test/attach").with_json(serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let secs: Vec<u64> = clock.sleeps().iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![1, 2, 4, 8]);
        assert_eq!(transport.sent_count(), 5);
    }

    #[tokio::test]
    async fn conflict_backoff_is_capped() {
        let mut responses: Vec<ApiResponse> = (0..8).map(|_| status(409)).collect();
        responses.push(status(200));
        let (client, clock, _) = setup(responses, 3600.0);

        client.execute(&ApiRequest::patch("https://api.test/")).await.unwrap();

        let secs: Vec<u64> = clock.sleeps().iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[tokio::test]
    async fn conflicts_on_get_and_put_are_not_retried() {
        let (client, clock, _) = setup(vec![status(409), status(409)], 60.0);

        let get = client.execute(&ApiRequest::get("https://api.test/")).await.unwrap();
        let put = client.execute(&ApiRequest::put("https://api.test/")).await.unwrap();

        assert_eq!(get.status(), StatusCode::CONFLICT);
        assert_eq!(put.status(), StatusCode::CONFLICT);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn conflict_times_out_before_sleeping_again() {
        // Each attempt takes 4s; with a 10s budget the third conflict is seen
        // at 4 + 1 + 4 + 2 + 4 = 15s elapsed.
        let clock = Arc::new(ManualClock::starting_at(Timestamp::from_epoch_seconds(START).unwrap()));
        let transport = Arc::new(
            ScriptedTransport::new(clock.clone(), vec![status(409), status(409), status(409), status(200)])
                .with_latency(Duration::from_secs(4)),
        );
        let client = client_for(transport.clone(), clock.clone(), 10.0);

        let err = client.execute(&ApiRequest::post("https://api.test/")).await.unwrap_err();

        match err {
            ClientError::ConflictTimeout { elapsed, attempts, .. } => {
                assert_eq!(elapsed, Duration::from_secs(15));
                assert_eq!(attempts, 3);
            }
            other => panic!("expected conflict timeout, got {other:?}"),
        }
        assert_eq!(clock.sleeps().len(), 2);
        assert_eq!(transport.sent_count(), 3);
    }

    #[tokio::test]
    async fn rate_limit_times_out_before_sleeping_again() {
        // The first wait (15s) already exceeds the 5s budget, so the second
        // rate-limited response fails without a further sleep.
        let (client, clock, _) = setup(vec![rate_limited(START + 5), rate_limited(START + 90)], 5.0);

        let err = client.execute(&ApiRequest::get("https://api.test/")).await.unwrap_err();

        assert!(matches!(err, ClientError::RateLimitTimeout { attempts: 2, .. }));
        assert!(err.is_timeout());
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(15)]);
    }

    #[tokio::test]
    async fn transport_failures_propagate_without_retry() {
        let (client, clock, transport) = setup(vec![], 60.0);

        let err = client.execute(&ApiRequest::get("https://api.test/")).await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::Send { .. })));
        assert!(clock.sleeps().is_empty());
        assert_eq!(transport.sent_count(), 1);
    }
}
