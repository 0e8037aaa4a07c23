//! Gatepass operator tool library.
//!
//! Exposes configuration, logging setup and the command implementations so
//! integration tests and the binary entrypoint can both use them.

pub mod commands;
pub mod config;
pub mod input;
pub mod logging;
