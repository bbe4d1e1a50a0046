//! reposync application library
//!
//! Adapters for the core ports, the services that drive them, and the CLI.
//! Exposed for the binary and for integration tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod context;
pub mod services;
