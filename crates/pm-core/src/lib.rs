//! # pm-core
//!
//! Core types and utilities for working with the ProjectManager API.
//!
//! This crate provides foundational types, error handling, and HTTP client utilities
//! shared by the ProjectManager client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`ids`] - Strongly-typed identifiers for ProjectManager resources
//! - [`config`] - Client configuration and environment resolution
//! - [`client`] - HTTP client utilities and retry logic
//! - [`response`] - The `success`/`data`/`error` response envelope
//! - [`query`] - OData query parameter builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod query;
pub mod response;

// Re-export commonly used types
pub use error::{Error, Result};
