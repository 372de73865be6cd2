//! ProjectManager API client.
//!
//! Provides typed models and an asynchronous client for the ProjectManager
//! REST API: the signed-in user's profile, tasks and projects.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{
    MeClient, ProjectClient, ProjectManagerClient, ProjectManagerClientBuilder, TaskClient,
    SDK_VERSION,
};
pub use models::{ODataQuery, Project, Task, UserProfile};

/// Convenient result alias that reuses the shared ProjectManager error type.
pub type Result<T> = pm_core::Result<T>;
