//! The example run: greet, sign in, list tasks or projects.

use async_trait::async_trait;
use pm_core::{Error, Result};
use pm_sdk::{ODataQuery, Project, ProjectManagerClient, Task, UserProfile, SDK_VERSION};
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// First line printed by every run.
pub const GREETING: &str = "Hello, world";

/// Guidance printed instead of the underlying error in [`FailureMessage::Guidance`] mode.
pub const GUIDANCE: &str =
    "Your API key is not valid.  Please set the environment variable PM_API_KEY and try again.";

/// Printed when a task query succeeds without results.
pub const NO_RECORDS: &str = "No records found matching this query.";

/// How remote failures are reported to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailureMessage {
    /// Echo the message returned by the API.
    #[default]
    Detailed,
    /// Point the user at the `PM_API_KEY` environment variable.
    Guidance,
}

/// The slice of the ProjectManager API the example needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Profile of the signed-in user.
    async fn retrieve_me(&self) -> Result<UserProfile>;

    /// Tasks matching `query`.
    async fn query_tasks(&self, query: &ODataQuery) -> Result<Vec<Task>>;

    /// Projects visible to the user.
    async fn query_projects(&self, query: &ODataQuery) -> Result<Vec<Project>>;

    /// Project with the given id, short id or name.
    async fn find_project(&self, identifier: &str) -> Result<Project>;
}

#[async_trait]
impl WorkspaceApi for ProjectManagerClient {
    async fn retrieve_me(&self) -> Result<UserProfile> {
        self.me().retrieve_me().await
    }

    async fn query_tasks(&self, query: &ODataQuery) -> Result<Vec<Task>> {
        self.tasks().query_tasks(query).await
    }

    async fn query_projects(&self, query: &ODataQuery) -> Result<Vec<Project>> {
        self.projects().query_projects(query).await
    }

    async fn find_project(&self, identifier: &str) -> Result<Project> {
        self.projects().find_project(identifier).await
    }
}

/// What the run does after signing in.
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    /// Failure reporting style.
    pub failure_message: FailureMessage,
    /// Whether to query tasks after signing in.
    pub list_tasks: bool,
    /// List projects instead of tasks.
    pub list_projects: bool,
    /// Query options forwarded to the task query.
    pub task_query: ODataQuery,
    /// Restrict tasks to this project (id, short id or name).
    pub project: Option<String>,
}

impl AppSettings {
    /// Settings matching the plain example: list all tasks, echo errors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list_tasks: true,
            ..Self::default()
        }
    }

    /// Set the failure reporting style.
    #[must_use]
    pub fn with_failure_message(mut self, style: FailureMessage) -> Self {
        self.failure_message = style;
        self
    }

    /// Skip the task query.
    #[must_use]
    pub fn without_tasks(mut self) -> Self {
        self.list_tasks = false;
        self
    }

    /// List projects after signing in, instead of tasks.
    #[must_use]
    pub fn listing_projects(mut self) -> Self {
        self.list_projects = true;
        self
    }
}

/// Sequential example run over a [`WorkspaceApi`].
pub struct ExampleApp<A> {
    api: A,
    settings: AppSettings,
}

impl<A: WorkspaceApi> ExampleApp<A> {
    /// Create an app over `api`.
    pub fn new(api: A, settings: AppSettings) -> Self {
        Self { api, settings }
    }

    /// Run the example, writing user-facing lines to `out`.
    ///
    /// Remote failures are printed and end the run early; only errors
    /// writing to `out` are returned.
    pub async fn run<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{GREETING}")?;

        match self.api.retrieve_me().await {
            Ok(me) => {
                writeln!(
                    out,
                    "You are logged on as {} ({})",
                    me.full_name, me.email_address
                )?;
                debug!(sdk_version = SDK_VERSION, "Testing against SDK {SDK_VERSION}");
            }
            Err(err) => {
                warn!(code = err.error_code(), %err, "Failed to retrieve current user");
                return self.report(out, "Failed to connect to the server.", &err);
            }
        }

        if self.settings.list_projects {
            return self.list_projects(out).await;
        }

        if !self.settings.list_tasks {
            return Ok(());
        }

        let Some(query) = self.task_query(out).await? else {
            return Ok(());
        };

        match self.api.query_tasks(&query).await {
            Ok(tasks) if tasks.is_empty() => writeln!(out, "{NO_RECORDS}"),
            Ok(tasks) => {
                info!(count = tasks.len(), "Retrieved tasks");
                for task in &tasks {
                    writeln!(out, "Task {} - {}", task.short_id, task.name)?;
                }
                Ok(())
            }
            Err(err) => {
                warn!(code = err.error_code(), %err, "Failed to retrieve tasks");
                self.report(out, "Failed to retrieve tasks.", &err)
            }
        }
    }

    async fn list_projects<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.api.query_projects(&ODataQuery::new()).await {
            Ok(projects) => {
                writeln!(out, "Found {} projects:", projects.len())?;
                for project in &projects {
                    writeln!(
                        out,
                        "* {} - {} ({})",
                        project.short_id.as_deref().unwrap_or_default(),
                        project.name,
                        project.id
                    )?;
                }
                Ok(())
            }
            Err(err) => {
                warn!(code = err.error_code(), %err, "Failed to retrieve projects");
                self.report(out, "Failed to retrieve projects.", &err)
            }
        }
    }

    /// Build the task query, scoping it to the configured project if any.
    /// Returns `None` after reporting a failed project lookup.
    async fn task_query<W: Write>(&self, out: &mut W) -> io::Result<Option<ODataQuery>> {
        let mut query = self.settings.task_query.clone();
        let Some(identifier) = &self.settings.project else {
            return Ok(Some(query));
        };

        match self.api.find_project(identifier).await {
            Ok(project) => {
                writeln!(
                    out,
                    "Project {} ({})",
                    project.name,
                    project.short_id.as_deref().unwrap_or("-")
                )?;
                let scope = format!("projectId eq {}", project.id);
                query.filter = Some(match query.filter.take() {
                    Some(filter) => format!("({scope}) and ({filter})"),
                    None => scope,
                });
                Ok(Some(query))
            }
            Err(err) => {
                warn!(code = err.error_code(), %err, project = %identifier, "Project lookup failed");
                self.report(out, "Failed to find project.", &err)?;
                Ok(None)
            }
        }
    }

    fn report<W: Write>(&self, out: &mut W, context: &str, err: &Error) -> io::Result<()> {
        match self.settings.failure_message {
            FailureMessage::Detailed => writeln!(out, "{context}  Error: {}", err.message()),
            FailureMessage::Guidance => writeln!(out, "{GUIDANCE}"),
        }
    }
}
