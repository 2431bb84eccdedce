use crate::remote::RemoteOp;

/// Crate-wide result type for command operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for dispatch, remote execution, and status lookups.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No command is registered under the requested name.
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },

    /// The request named an environment absent from the configuration.
    #[error("unknown environment: {name}")]
    UnknownEnvironment { name: String },

    /// The request text carried no environment name at all.
    #[error("missing environment name")]
    MissingEnvironment,

    /// The remote program could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote program ran and exited non-zero.
    #[error("{operation} exited with code {code}: {stderr}")]
    ExecutionFailed {
        operation: RemoteOp,
        code: i32,
        stderr: String,
    },

    /// A deployment-status endpoint could not be queried or parsed.
    #[error("fetching {service} status for {environment}: {source}")]
    StatusFetch {
        environment: String,
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP client construction failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    #[must_use]
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    #[must_use]
    pub fn unknown_environment(name: impl Into<String>) -> Self {
        Self::UnknownEnvironment { name: name.into() }
    }

    #[must_use]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    #[must_use]
    pub fn execution_failed(operation: RemoteOp, code: i32, stderr: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            operation,
            code,
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn status_fetch(
        environment: impl Into<String>,
        service: &'static str,
        source: reqwest::Error,
    ) -> Self {
        Self::StatusFetch {
            environment: environment.into(),
            service,
            source,
        }
    }
}
