//! Launchpad core library.
//!
//! Holds the bootstrap data model (stages, runs), the stage sequencer,
//! the error taxonomy with its process exit codes, environment
//! configuration, and password hashing. This crate has no database or
//! HTTP dependencies; those collaborators live in `launchpad-db` and
//! `launchpad-api`.

pub mod admin;
pub mod config;
pub mod error;
pub mod password;
pub mod roles;
pub mod run;
pub mod sequencer;
pub mod stage;
pub mod types;
