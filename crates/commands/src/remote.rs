//! Process-invocation seam for the remote deployment tooling.

use {async_trait::async_trait, tokio::process::Command, tracing::debug};

use crate::error::{Error, Result};

/// Operations the remote deployment tooling understands.
///
/// Each maps one to one onto a slash command and onto the first argument
/// passed to the configured program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Deploy,
    Reload,
    Rollforward,
    Scheduler,
    Worker,
}

impl RemoteOp {
    /// Every operation, in registration order.
    pub const ALL: [RemoteOp; 5] = [
        RemoteOp::Deploy,
        RemoteOp::Reload,
        RemoteOp::Rollforward,
        RemoteOp::Scheduler,
        RemoteOp::Worker,
    ];

    /// Name shared by the slash command and the remote subcommand.
    #[must_use]
    pub fn command_name(self) -> &'static str {
        match self {
            RemoteOp::Deploy => "deploy",
            RemoteOp::Reload => "reload",
            RemoteOp::Rollforward => "rollforward",
            RemoteOp::Scheduler => "scheduler",
            RemoteOp::Worker => "worker",
        }
    }
}

impl std::fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command_name())
    }
}

/// Capability to run one remote operation against a target.
///
/// Commands depend on this trait rather than on a concrete process so tests
/// can substitute a recording implementation.
#[async_trait]
pub trait RemoteRunner: Send + Sync {
    /// Run `op` against `target`, returning captured stdout.
    async fn run(&self, target: &str, op: RemoteOp, args: &[String]) -> Result<String>;
}

/// Runs operations by invoking a configured external program as
/// `<program> <operation> <target> [args...]`.
///
/// With no program configured every run is recorded as a no-op, which keeps
/// the webhook flow exercisable on a workstation without deploy tooling.
pub struct ProcessRunner {
    program: Option<String>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(program: Option<String>) -> Self {
        Self { program }
    }
}

#[async_trait]
impl RemoteRunner for ProcessRunner {
    async fn run(&self, target: &str, op: RemoteOp, args: &[String]) -> Result<String> {
        let Some(program) = &self.program else {
            debug!(%op, target, "no remote program configured, recording no-op");
            return Ok(String::new());
        };

        let output = Command::new(program)
            .arg(op.command_name())
            .arg(target)
            .args(args)
            .output()
            .await
            .map_err(|source| Error::spawn(program.clone(), source))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::execution_failed(op, code, stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
