//! Command-line and environment options.

use crate::app::{AppSettings, ExampleApp, FailureMessage, GREETING};
use anyhow::Context;
use clap::Parser;
use pm_core::config::PRODUCTION;
use pm_sdk::{ODataQuery, ProjectManagerClient, ProjectManagerClientBuilder};
use std::ffi::OsString;
use std::io::Write;

/// Application name reported to the API unless overridden.
pub const DEFAULT_APP_NAME: &str = "Example Rust App";

/// Example application for the ProjectManager API.
#[derive(Parser, Debug)]
#[command(name = "pm-example", version, about)]
pub struct Cli {
    /// Bearer token used to authenticate
    #[arg(long, env = "PM_API_KEY", hide_env_values = true)]
    pub api_key: Option<OsString>,

    /// Environment name (`production`) or base URL of a custom environment
    #[arg(long = "env", env = "PM_ENV", default_value = PRODUCTION)]
    pub environment: OsString,

    /// Application name reported to the API
    #[arg(long, env = "PM_APP_NAME", default_value = DEFAULT_APP_NAME)]
    pub app_name: OsString,

    /// How to report failed API calls
    #[arg(long, value_enum, default_value_t = FailureMessage::Detailed)]
    pub failure_message: FailureMessage,

    /// Only sign in; do not list tasks
    #[arg(long)]
    pub no_tasks: bool,

    /// List projects instead of tasks
    #[arg(long, conflicts_with = "project")]
    pub list_projects: bool,

    /// Maximum number of tasks to list
    #[arg(long)]
    pub top: Option<u32>,

    /// Number of tasks to skip
    #[arg(long)]
    pub skip: Option<u32>,

    /// OData filter applied to the task query
    #[arg(long)]
    pub filter: Option<String>,

    /// OData sort expression for the task query
    #[arg(long)]
    pub orderby: Option<String>,

    /// Only list tasks of this project (id, short id or name)
    #[arg(long)]
    pub project: Option<String>,
}

impl Cli {
    /// Bearer token, with any invalid UTF-8 replaced.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_ref()
            .map(|key| key.to_string_lossy().into_owned())
    }

    /// Client builder for these options.
    #[must_use]
    pub fn client_builder(&self) -> ProjectManagerClientBuilder {
        ProjectManagerClient::with_environment(self.environment.to_string_lossy())
            .with_bearer_token(self.api_key())
            .with_application_name(self.app_name.to_string_lossy())
    }

    /// Run settings for these options.
    #[must_use]
    pub fn settings(&self) -> AppSettings {
        let mut query = ODataQuery::new();
        if let Some(top) = self.top {
            query = query.with_top(top);
        }
        if let Some(skip) = self.skip {
            query = query.with_skip(skip);
        }
        if let Some(filter) = &self.filter {
            query = query.with_filter(filter.as_str());
        }
        if let Some(orderby) = &self.orderby {
            query = query.with_orderby(orderby.as_str());
        }

        AppSettings {
            failure_message: self.failure_message,
            list_tasks: !self.no_tasks,
            list_projects: self.list_projects,
            task_query: query,
            project: self.project.clone(),
        }
    }

    /// Build the client and run the example, writing user-facing lines to `out`.
    ///
    /// The greeting is written even when the client cannot be configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid or `out`
    /// cannot be written.
    pub async fn run<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let client = match self.client_builder().build() {
            Ok(client) => client,
            Err(err) => {
                writeln!(out, "{GREETING}")?;
                return Err(err).context("Failed to configure the ProjectManager client");
            }
        };

        ExampleApp::new(client, self.settings())
            .run(out)
            .await
            .context("Failed to write output")
    }
}
