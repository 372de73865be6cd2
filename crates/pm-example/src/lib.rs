//! Example application for the ProjectManager API client.
//!
//! Signs in with a bearer token, prints who the token belongs to and lists
//! tasks or projects. Remote failures are reported on standard output and
//! never abort the run.

#![deny(missing_docs)]

pub mod app;
pub mod cli;
pub mod logging;

pub use app::{AppSettings, ExampleApp, FailureMessage, WorkspaceApi, GREETING};
pub use cli::Cli;
