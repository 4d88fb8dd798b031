//! Vars subcommand: show what the prefixed pass would apply.

use crate::format::OutputFormat;
use clap::Args;

/// Arguments for the vars subcommand
#[derive(Args, Debug)]
pub struct VarsArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Conf)]
    pub format: OutputFormat,

    /// Print secret-looking values instead of `***`
    #[arg(long)]
    pub show_secrets: bool,
}
