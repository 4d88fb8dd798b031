//! CLI command definitions for odoo-entrypoint
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod overlay;
pub mod run;
pub mod vars;

use clap::{Parser, Subcommand};
use overlay::OverlayArgs;
use run::RunArgs;
use std::path::PathBuf;
use vars::VarsArgs;

/// Prepare an Odoo container and hand off to its supervisor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the entry point settings file (YAML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prepare the container and exec the supervisor (default if no subcommand given)
    Run(RunArgs),

    /// Overlay overrides onto a single configuration file
    Overlay(OverlayArgs),

    /// Print the resolved prefixed overrides
    Vars(VarsArgs),
}
