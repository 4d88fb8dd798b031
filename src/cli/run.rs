//! Run subcommand: the container start-up sequence.

use clap::Args;

/// Arguments for the run subcommand
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Prepare the container but do not exec the supervisor
    #[arg(long)]
    pub no_exec: bool,

    /// Leave ownership and permissions untouched
    #[arg(long)]
    pub skip_permissions: bool,

    /// Command to exec instead of the supervisor
    ///
    /// Multi-container deployments run the server binary directly:
    /// `odoo-entrypoint run -- odoo --config /home/odoo/.openerp_serverrc`
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
