//! Odoo container entry point
//!
//! Seeds and overlays the server configuration file, prepares the filesystem
//! and execs the supervisor.

use anyhow::{Context, Result};
use clap::Parser;
use odoo_entrypoint::cli::overlay::OverlayArgs;
use odoo_entrypoint::cli::run::RunArgs;
use odoo_entrypoint::cli::vars::VarsArgs;
use odoo_entrypoint::cli::{Cli, Command};
use odoo_entrypoint::config::{ConfigLoader, ConfigPaths, Settings};
use odoo_entrypoint::entrypoint::{self, RunOptions};
use odoo_entrypoint::env::Environment;
use odoo_entrypoint::format::{format_vars, redact};
use odoo_entrypoint::logging::{self, LogTarget};
use odoo_entrypoint::supervisor::Handoff;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let target: LogTarget = cli.log.parse()?;
    logging::init(&target, cli.verbose)?;

    let env = Environment::from_process();
    let paths = ConfigPaths::discover(cli.settings.as_deref(), &env);
    let loader = ConfigLoader::load(&paths, &env).context("Failed to load entry point settings")?;
    debug!(
        tiers = ?loader.tiers(),
        file = ?loader.settings_path(),
        "Settings loaded"
    );
    let settings = loader.into_settings();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(&settings, &env, args),
        Command::Overlay(args) => overlay(&settings, &env, args),
        Command::Vars(args) => vars(&settings, &env, args),
    }
}

fn run(settings: &Settings, env: &Environment, args: RunArgs) -> Result<()> {
    let options = RunOptions {
        skip_permissions: args.skip_permissions,
    };
    let report = entrypoint::run(settings, env, &options).context("Container preparation failed")?;
    debug!(?report, "Run finished");

    let handoff = Handoff::resolve(&settings.handoff, &args.command);
    if args.no_exec {
        info!(command = %handoff, "Not handing off (--no-exec)");
        return Ok(());
    }
    match handoff.exec()? {}
}

fn overlay(settings: &Settings, env: &Environment, args: OverlayArgs) -> Result<()> {
    let path = args.file.unwrap_or_else(|| settings.config_file());
    let (legacy, prefixed) = entrypoint::overlay_file(settings, env, &path, args.mode)
        .with_context(|| format!("Failed to overlay {}", path.display()))?;
    debug!(?legacy, ?prefixed, "Overlay finished");
    Ok(())
}

fn vars(settings: &Settings, env: &Environment, args: VarsArgs) -> Result<()> {
    let vars = entrypoint::resolve_vars(settings, env);
    let vars = if args.show_secrets { vars } else { redact(&vars) };
    print!("{}", format_vars(&vars, args.format)?);
    Ok(())
}
