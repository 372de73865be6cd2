//! HTTP client utilities and retry logic.
//!
//! [`ServiceClient`] owns the `reqwest` client, attaches credentials and
//! standard headers, and retries transient failures with exponential backoff.
//! API-specific crates wrap it and supply their own status mapping.

use crate::config::PmClientConfig;
use crate::response::error_message;
use crate::{Error, Result};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Default timeout for ProjectManager requests (seconds)
pub const PM_DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Retry settings

/// Default maximum number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds (for exponential backoff)
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Header carrying the calling application's name.
pub const APPLICATION_NAME_HEADER: &str = "X-Application-Name";

/// Retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential backoff)
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            backoff_multiplier: 2,
        }
    }

    /// Create a retry policy with no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate delay for a given attempt number.
    ///
    /// Uses exponential backoff: delay = min(initial_delay * multiplier^(attempt-1), max_delay)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.saturating_pow(attempt - 1);
        let delay = self.initial_delay.saturating_mul(multiplier);

        std::cmp::min(delay, self.max_delay)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport-level settings that do not belong to the API configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Timeout for establishing a connection
    pub connect_timeout: Duration,

    /// Enable response compression
    pub enable_compression: bool,
}

impl HttpConfig {
    /// Create a new HTTP configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            retry_policy: RetryPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            enable_compression: true,
        }
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    config: PmClientConfig,
    http_config: HttpConfig,
    user_agent: String,
}

impl ServiceClientBuilder {
    /// Create a builder from a client configuration.
    #[must_use]
    pub fn new(config: PmClientConfig) -> Self {
        Self {
            config,
            http_config: HttpConfig::new(),
            user_agent: concat!("pm-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.http_config = self.http_config.with_retry_policy(retry);
        self
    }

    /// Override the HTTP configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Validate the configuration and build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<ServiceClient> {
        self.config.check()?;
        let base_url = self.config.environment.base_url()?;

        let http = ClientBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.config.timeout())
            .connect_timeout(self.http_config.connect_timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        if !self.config.has_bearer_token() {
            warn!(
                environment = self.config.environment.name(),
                "No bearer token configured; API calls will be rejected"
            );
        }

        Ok(ServiceClient {
            http,
            base_url,
            config: self.config,
            retry_policy: self.http_config.retry_policy,
        })
    }
}

/// Authenticated HTTP client bound to one ProjectManager environment.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    config: PmClientConfig,
    retry_policy: RetryPolicy,
}

impl ServiceClient {
    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the configuration the client was built from.
    #[must_use]
    pub fn config(&self) -> &PmClientConfig {
        &self.config
    }

    /// Return the retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request, retrying transient failures.
    ///
    /// `customize` receives the request after credentials and standard headers
    /// are attached. Non-success statuses are passed to `map_status` together
    /// with the API's error message (or the raw body when it is not an
    /// envelope); the resulting error is retried only if it is transient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] without sending anything when no bearer
    /// token is configured, otherwise the last error encountered.
    pub async fn execute_with_retry<F, M>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        customize: F,
        map_status: M,
    ) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
        M: Fn(StatusCode, String) -> Error,
    {
        let Some(authorization) = self.config.authorization_header() else {
            return Err(Error::Unauthorized(
                "No bearer token configured; set PM_API_KEY".to_string(),
            ));
        };

        let url = self.build_url(path)?;
        let mut attempt = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .query(params)
                .header("Authorization", &authorization)
                .header("Accept", "application/json");

            if let Some(name) = &self.config.application_name {
                request = request.header(APPLICATION_NAME_HEADER, name);
            }
            request = customize(request);

            info!(%method, path = %path, ?params, attempt, "Sending ProjectManager request");

            let error = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let message = error_message(&body).unwrap_or(body);
                    map_status(status, message)
                }
                Err(err) => Error::from(err),
            };

            if !error.is_transient() {
                return Err(error);
            }

            attempt += 1;
            if attempt > self.retry_policy.max_retries {
                warn!(path = %path, attempts = attempt, %error, "ProjectManager request failed after retries");
                return Err(error);
            }

            let delay = self.retry_policy.delay_for_attempt(attempt);
            if delay > Duration::from_millis(0) {
                debug!("Retrying ProjectManager request after {:?}", delay);
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> ServiceClient {
        let config = PmClientConfig::new(&server.uri())
            .unwrap()
            .with_bearer_token(token)
            .with_application_name("core-tests");
        ServiceClientBuilder::new(config)
            .with_retry_policy(
                RetryPolicy::new()
                    .with_max_retries(2)
                    .with_initial_delay(Duration::from_millis(1)),
            )
            .build()
            .unwrap()
    }

    fn simple_map(status: StatusCode, text: String) -> Error {
        if status.is_server_error() {
            Error::ServiceUnavailable(text)
        } else {
            Error::BadRequest(text)
        }
    }

    #[test]
    fn test_retry_policy_delay_calculation() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(0));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(4000));
        // 8000ms capped at max_delay
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(5000));
    }

    #[test]
    fn test_retry_policy_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_retries, 0);
        assert!(!policy.has_retries());
        assert!(RetryPolicy::default().has_retries());
    }

    #[test]
    fn test_http_config_builder() {
        let config = HttpConfig::new().with_retry_policy(RetryPolicy::no_retry());

        assert_eq!(config.retry_policy.max_retries, 0);
        assert_eq!(
            config.pool_idle_timeout,
            Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT)
        );
        assert!(config.enable_compression);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = PmClientConfig::default().with_timeout(0);
        let result = ServiceClientBuilder::new(config).build();
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_sends_credentials_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/me"))
            .and(header("Authorization", "Bearer token-1"))
            .and(header(APPLICATION_NAME_HEADER, "core-tests"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("token-1"));
        let response = client
            .execute_with_retry(Method::GET, "api/data/me", &[], |r| r, simple_map)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client
            .execute_with_retry(Method::GET, "api/data/me", &[], |r| r, simple_map)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/tasks"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let err = client
            .execute_with_retry(Method::GET, "/api/data/tasks", &[], |r| r, simple_map)
            .await
            .unwrap_err();
        assert_eq!(err, Error::ServiceUnavailable("busy".to_string()));
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "error": { "message": "Invalid $filter" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let err = client
            .execute_with_retry(Method::GET, "api/data/tasks", &[], |r| r, simple_map)
            .await
            .unwrap_err();
        assert_eq!(err, Error::BadRequest("Invalid $filter".to_string()));
    }
}
