//! Odoo container entry point library.
//!
//! This module exports the start-up components for testing and integration.

pub mod cli;
pub mod config;
pub mod entrypoint;
pub mod env;
pub mod error;
pub mod format;
pub mod logging;
pub mod overlay;
pub mod provision;
pub mod roles;
pub mod rules;
pub mod sources;
pub mod supervisor;
