//! Launchpad API server library.
//!
//! Exposes configuration, state, routing and the serve loop so the
//! binary entrypoint and integration tests share one router.

pub mod app;
pub mod config;
pub mod routes;
pub mod server;
pub mod state;
