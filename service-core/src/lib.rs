//! service-core: Shared infrastructure for the key dispenser workspace.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;
