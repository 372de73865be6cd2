//! Configuration structures for ProjectManager clients.
//!
//! This module resolves environment names into base URLs and holds the
//! immutable settings a client is built from: environment, bearer token,
//! application name and request timeout.

use crate::client::PM_DEFAULT_TIMEOUT;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Base URL of the production environment.
pub const PRODUCTION_URL: &str = "https://api.projectmanager.com/";

/// Name of the production environment.
pub const PRODUCTION: &str = "production";

/// Longest application name sent to the API, in characters.
pub const MAX_APPLICATION_NAME_LEN: usize = 128;

/// A ProjectManager environment the client talks to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// The public production API.
    #[default]
    Production,
    /// Any other deployment, addressed by URL.
    Custom(Url),
}

impl Environment {
    /// Resolve an environment name or URL.
    ///
    /// `production` (case-insensitive) selects the public API. Anything else
    /// must be an absolute `http` or `https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for unknown names and unsupported URLs.
    pub fn resolve(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(PRODUCTION) {
            return Ok(Self::Production);
        }

        let url = Url::parse(name).map_err(|e| {
            Error::ConfigError(format!(
                "Unknown environment `{name}`: expected `{PRODUCTION}` or a URL ({e})"
            ))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self::Custom(url)),
            scheme => Err(Error::ConfigError(format!(
                "Unsupported scheme `{scheme}` for environment `{name}`"
            ))),
        }
    }

    /// Base URL for API requests, always ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn base_url(&self) -> Result<Url> {
        let mut url = match self {
            Self::Production => Url::parse(PRODUCTION_URL)?,
            Self::Custom(url) => url.clone(),
        };

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    /// Display name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Production => PRODUCTION,
            Self::Custom(url) => url.as_str(),
        }
    }
}

const fn default_request_timeout_secs() -> u64 {
    PM_DEFAULT_TIMEOUT
}

/// Configuration for a ProjectManager client instance.
///
/// Built once through the `with_*` methods and never mutated afterwards; the
/// client keeps its own copy.
#[derive(Debug, Clone, Validate)]
pub struct PmClientConfig {
    /// Environment the client talks to
    pub environment: Environment,

    /// Bearer token; calls fail with [`Error::Unauthorized`] when absent
    pub bearer_token: Option<SecretString>,

    /// Application name reported to the API
    #[validate(length(min = 1, max = 128))]
    pub application_name: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

impl PmClientConfig {
    /// Create a configuration for the named environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be resolved.
    pub fn new(environment: &str) -> Result<Self> {
        Ok(Self {
            environment: Environment::resolve(environment)?,
            bearer_token: None,
            application_name: None,
            request_timeout_secs: default_request_timeout_secs(),
        })
    }

    /// Set or clear the bearer token.
    ///
    /// An empty or whitespace-only token is treated as absent.
    #[must_use]
    pub fn with_bearer_token<S: Into<String>>(mut self, token: Option<S>) -> Self {
        self.bearer_token = token
            .map(Into::into)
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        self
    }

    /// Set the application name.
    ///
    /// A blank name is treated as absent. Names longer than
    /// [`MAX_APPLICATION_NAME_LEN`] characters are truncated.
    #[must_use]
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        self.application_name = (!name.is_empty())
            .then(|| name.chars().take(MAX_APPLICATION_NAME_LEN).collect());
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns true if a bearer token is configured.
    #[must_use]
    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Value for the `Authorization` header, if a token is configured.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer_token
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] describing the invalid fields.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

impl Default for PmClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            bearer_token: None,
            application_name: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
