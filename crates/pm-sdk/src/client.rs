//! Asynchronous ProjectManager client implementation.

use crate::models::{ODataQuery, Project, Task, UserProfile};
use crate::Result;
use pm_core::client::{HttpConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
use pm_core::config::{Environment, PmClientConfig};
use pm_core::response::ApiResponse;
use pm_core::Error;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Version of this client library.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const USER_AGENT: &str = concat!("pm-sdk/", env!("CARGO_PKG_VERSION"));

/// Fluent builder for [`ProjectManagerClient`].
///
/// The environment is resolved when [`build`](Self::build) is called, so the
/// whole chain can be written before any error handling.
#[derive(Debug, Clone)]
pub struct ProjectManagerClientBuilder {
    environment: String,
    bearer_token: Option<String>,
    application_name: Option<String>,
    timeout_secs: Option<u64>,
    http_config: HttpConfig,
}

impl ProjectManagerClientBuilder {
    fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            bearer_token: None,
            application_name: None,
            timeout_secs: None,
            http_config: HttpConfig::new(),
        }
    }

    /// Set the bearer token. `None` builds a client whose calls are rejected.
    #[must_use]
    pub fn with_bearer_token<S: Into<String>>(mut self, token: Option<S>) -> Self {
        self.bearer_token = token.map(Into::into);
        self
    }

    /// Set the application name reported to the API.
    #[must_use]
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Override the request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
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

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the environment cannot be resolved, or
    /// [`Error::ValidationError`] if the configuration fails validation.
    pub fn build(self) -> Result<ProjectManagerClient> {
        let mut config =
            PmClientConfig::new(&self.environment)?.with_bearer_token(self.bearer_token);
        if let Some(name) = self.application_name {
            config = config.with_application_name(name);
        }
        if let Some(seconds) = self.timeout_secs {
            config = config.with_timeout(seconds);
        }

        let inner = ServiceClientBuilder::new(config)
            .with_user_agent(USER_AGENT)
            .with_http_config(self.http_config)
            .build()?;

        Ok(ProjectManagerClient { inner })
    }
}

/// Asynchronous ProjectManager client.
///
/// Endpoints are grouped the way the API groups them: [`me`](Self::me),
/// [`tasks`](Self::tasks) and [`projects`](Self::projects).
#[derive(Clone)]
pub struct ProjectManagerClient {
    inner: ServiceClient,
}

impl ProjectManagerClient {
    /// Start building a client for the named environment (`production` or a URL).
    #[must_use]
    pub fn with_environment(environment: impl Into<String>) -> ProjectManagerClientBuilder {
        ProjectManagerClientBuilder::new(environment)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Return the environment this client talks to.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.inner.config().environment
    }

    /// Endpoints about the signed-in user.
    #[must_use]
    pub fn me(&self) -> MeClient<'_> {
        MeClient { inner: &self.inner }
    }

    /// Task endpoints.
    #[must_use]
    pub fn tasks(&self) -> TaskClient<'_> {
        TaskClient { inner: &self.inner }
    }

    /// Project endpoints.
    #[must_use]
    pub fn projects(&self) -> ProjectClient<'_> {
        ProjectClient { inner: &self.inner }
    }
}

/// Client for `api/data/me`.
pub struct MeClient<'a> {
    inner: &'a ServiceClient,
}

impl MeClient<'_> {
    /// Retrieve the profile of the user the bearer token belongs to.
    pub async fn retrieve_me(&self) -> Result<UserProfile> {
        get_data(self.inner, "api/data/me", &[]).await
    }
}

/// Client for `api/data/tasks`.
pub struct TaskClient<'a> {
    inner: &'a ServiceClient,
}

impl TaskClient<'_> {
    /// Query tasks across all projects visible to the user.
    pub async fn query_tasks(&self, query: &ODataQuery) -> Result<Vec<Task>> {
        get_data(self.inner, "api/data/tasks", &query.to_pairs()).await
    }
}

/// Client for `api/data/projects`.
pub struct ProjectClient<'a> {
    inner: &'a ServiceClient,
}

impl ProjectClient<'_> {
    /// Query projects visible to the user.
    pub async fn query_projects(&self, query: &ODataQuery) -> Result<Vec<Project>> {
        get_data(self.inner, "api/data/projects", &query.to_pairs()).await
    }

    /// Find a project by id, short id or name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] listing the available projects when nothing matches.
    pub async fn find_project(&self, identifier: &str) -> Result<Project> {
        let projects = self.query_projects(&ODataQuery::new()).await?;

        if let Some(project) = projects.iter().find(|p| p.matches(identifier)) {
            return Ok(project.clone());
        }

        let available = projects
            .iter()
            .map(|p| format!("{} - {}", p.short_id.as_deref().unwrap_or("?"), p.name))
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::NotFound(format!(
            "Found {} project(s), but none with ID, short ID, or name '{identifier}' ({available})",
            projects.len()
        )))
    }
}

async fn get_data<T>(
    inner: &ServiceClient,
    path: &str,
    params: &[(&'static str, String)],
) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = inner
        .execute_with_retry(Method::GET, path, params, |request| request, map_status_to_error)
        .await?;

    let envelope = response.json::<ApiResponse<T>>().await.map_err(|err| {
        Error::ParseError(format!("Failed to parse response for `{path}`: {err}"))
    })?;
    debug!(path = %path, success = ?envelope.success, "Decoded ProjectManager response");

    envelope.into_result()
}

fn map_status_to_error(status: StatusCode, text: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(text),
        StatusCode::NOT_FOUND => Error::NotFound(text),
        StatusCode::BAD_REQUEST => Error::BadRequest(text),
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            Error::ServiceUnavailable(format!("ProjectManager temporarily unavailable: {text}"))
        }
        status if status.is_server_error() => {
            Error::ServiceUnavailable(format!("ProjectManager server error {status}: {text}"))
        }
        _ => Error::HttpError(format!("ProjectManager error {status}: {text}")),
    }
}
