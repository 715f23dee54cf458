//! `launchpad` orchestrator library.
//!
//! Wires the bootstrap stages to their collaborators: the dependency
//! installer, the migration engine, admin provisioning, and the server
//! handoff. The binary entrypoint lives in `main.rs`.

pub mod database;
pub mod dependencies;
pub mod handoff;
pub mod pipeline;
pub mod stages;
