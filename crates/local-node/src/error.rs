use std::{fmt, io, path::PathBuf, process::ExitStatus, time::Duration};

use rrelayer::CredentialsError;
use thiserror::Error;

use crate::services::Stage;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Executable `{program}` could not be found, make sure it is installed and on PATH")]
    ExecutableNotFound { program: String },

    #[error("Working directory {0:?} does not exist or is not a directory")]
    InvalidWorkingDirectory(PathBuf),

    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StartError {
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// A readiness probe ran out of attempts.
#[derive(Error, Debug)]
#[error("{stage} was not ready after {attempts} attempts ({elapsed:?})")]
pub struct TimeoutError {
    pub stage: Stage,
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Error, Debug)]
pub enum StopError {
    #[error("Stop command `{command}` could not run: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: LaunchError,
    },

    #[error("Stop command `{command}` exited with {status}")]
    CommandExited { command: String, status: ExitStatus },

    #[error("Stop command `{command}` did not finish within {after:?} and was killed")]
    TimedOut { command: String, after: Duration },

    #[error("Process {pid:?} ({command}) did not exit cleanly: {source}")]
    Wait {
        command: String,
        pid: Option<u32>,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: StopError,
}

/// Every stop action that failed during one teardown pass.
#[derive(Error, Debug)]
pub struct TeardownError {
    pub failures: Vec<StageFailure>,
}

impl TeardownError {
    pub fn stages(&self) -> Vec<Stage> {
        self.failures.iter().map(|failure| failure.stage).collect()
    }
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stop action(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, " [{}: {}]", failure.stage, failure.error)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("Environment variable {0} not found")]
    MissingEnvVar(String),

    #[error("Environment variable {name} has an invalid value `{value}`")]
    InvalidEnvVar { name: String, value: String },

    #[error("Can not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config is invalid yaml and does not match the struct - {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Readiness policy for {0} needs at least one attempt")]
    ZeroAttempts(String),
}

/// Top-level bring-up failure.
///
/// Start and timeout failures carry the stage they happened in and, when
/// cleaning up the already started stages also went wrong, the teardown
/// report as a secondary error.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{stage} failed to start: {source}")]
    Start {
        stage: Stage,
        #[source]
        source: StartError,
        teardown: Option<TeardownError>,
    },

    #[error("{source}")]
    Timeout {
        #[source]
        source: TimeoutError,
        teardown: Option<TeardownError>,
    },

    #[error("Interrupted before the scenario finished")]
    Interrupted,
}

impl EnvironmentError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EnvironmentError::Configuration(_) | EnvironmentError::Interrupted => None,
            EnvironmentError::Start { stage, .. } => Some(*stage),
            EnvironmentError::Timeout { source, .. } => Some(source.stage),
        }
    }

    pub fn teardown_report(&self) -> Option<&TeardownError> {
        match self {
            EnvironmentError::Configuration(_) | EnvironmentError::Interrupted => None,
            EnvironmentError::Start { teardown, .. }
            | EnvironmentError::Timeout { teardown, .. } => teardown.as_ref(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, EnvironmentError::Timeout { .. })
    }
}

/// Why a single readiness check could not answer. Never fatal on its own.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Database check failed: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Health check failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Node check failed: {0}")]
    Node(#[from] NodeRpcError),

    #[error("Check timed out after {0:?}")]
    TimedOut(Duration),

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum NodeRpcError {
    #[error("Node request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Node returned error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Node returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid ether amount `{0}`")]
    InvalidAmount(String),
}
