//! Process handoff.
//!
//! Once the container is prepared the entry point replaces itself with the
//! supervisor, which becomes the container's main process. Multi-container
//! deployments may pass the server command instead and skip the supervisor.

use crate::config::HandoffSettings;
use crate::error::{EntrypointError, Result};
use std::os::unix::process::CommandExt;
use std::process::Command;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub program: String,
    pub args: Vec<String>,
}

impl Handoff {
    /// The configured supervisor, or `command` when it is not empty.
    pub fn resolve(settings: &HandoffSettings, command: &[String]) -> Self {
        match command.split_first() {
            Some((program, args)) => Self {
                program: program.clone(),
                args: args.to_vec(),
            },
            None => Self {
                program: settings.program.clone(),
                args: settings.args.clone(),
            },
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Replace the current process. Only returns on failure.
    pub fn exec(self) -> Result<std::convert::Infallible> {
        info!(program = %self.program, args = ?self.args, "Handing off");
        let source = self.command().exec();
        Err(EntrypointError::Exec {
            program: self.program,
            source,
        })
    }
}

impl std::fmt::Display for Handoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_supervisor() {
        let handoff = Handoff::resolve(&HandoffSettings::default(), &[]);
        assert_eq!(handoff.to_string(), "supervisord -c /etc/supervisor/supervisord.conf");
    }

    #[test]
    fn test_resolve_explicit_command() {
        let command = vec!["odoo".to_string(), "--workers=0".to_string()];
        let handoff = Handoff::resolve(&HandoffSettings::default(), &command);
        assert_eq!(handoff.program, "odoo");
        assert_eq!(handoff.args, vec!["--workers=0"]);
    }

    #[test]
    fn test_exec_missing_program_returns_error() {
        let handoff = Handoff {
            program: "/nonexistent/supervisord".to_string(),
            args: vec![],
        };
        assert!(matches!(handoff.exec(), Err(EntrypointError::Exec { .. })));
    }
}
