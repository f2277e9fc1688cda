pub mod admin;
pub mod app;
pub mod keys;
pub mod metrics;
