//! Overlay subcommand: rewrite one configuration file.

use crate::entrypoint::OverlayMode;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the overlay subcommand
#[derive(Args, Debug)]
pub struct OverlayArgs {
    /// Configuration file to rewrite (default: the configured server file)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Which passes to run
    #[arg(long, value_enum, default_value_t = OverlayMode::Both)]
    pub mode: OverlayMode,
}
