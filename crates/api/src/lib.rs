//! HTTP API: routing, the bearer-token guard and request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
