mod database;
mod node;
mod relayer_server;

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use database::DatabaseLauncher;
pub use node::NodeLauncher;
pub use relayer_server::RelayerServerLauncher;

use crate::{
    config::{EnvironmentConfig, ServiceCommand},
    error::{ProbeError, StartError, StopError},
    process::{OutputMode, ProcessHandle},
    readiness::ReadinessPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Database,
    Node,
    RelayerServer,
}

impl Stage {
    /// Each stage depends on every stage before it being ready.
    pub const STARTUP_ORDER: [Stage; 3] = [Stage::Database, Stage::Node, Stage::RelayerServer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Database => "database",
            Stage::Node => "node",
            Stage::RelayerServer => "relayer-server",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start, probe and stop actions for one external service.
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    fn stage(&self) -> Stage;

    fn readiness(&self) -> ReadinessPolicy;

    /// Launches the service and hands back its process without waiting for
    /// readiness.
    async fn start(&self, quiet: bool) -> Result<ProcessHandle, StartError>;

    /// A single readiness check.
    async fn check_ready(&self) -> Result<bool, ProbeError>;

    async fn is_running(&self) -> bool {
        matches!(self.check_ready().await, Ok(true))
    }

    /// Stops the service. `process` is `None` when this run did not launch it.
    /// Calling this again after it returned is harmless.
    async fn stop(&self, process: Option<&mut ProcessHandle>, quiet: bool) -> Result<(), StopError>;
}

/// The database, node and relayer server launchers, in startup order.
pub fn default_launchers(config: &EnvironmentConfig) -> Vec<Arc<dyn ServiceLauncher>> {
    let database: Arc<dyn ServiceLauncher> = Arc::new(DatabaseLauncher::from_config(config));
    let node: Arc<dyn ServiceLauncher> = Arc::new(NodeLauncher::from_config(config));
    let relayer_server: Arc<dyn ServiceLauncher> =
        Arc::new(RelayerServerLauncher::from_config(config));

    vec![database, node, relayer_server]
}

pub(crate) fn launch(
    stage: Stage,
    command: &ServiceCommand,
    quiet: bool,
) -> Result<ProcessHandle, StartError> {
    if !quiet {
        info!("Starting {} with `{}`", stage, command);
    }

    let process = ProcessHandle::launch(stage.as_str(), command, OutputMode::for_quiet(quiet))?;

    if !quiet {
        info!("Started {} (pid {:?})", stage, process.pid());
    }

    Ok(process)
}

/// Runs the optional graceful stop command, then shuts the process down.
///
/// Both steps always run and each is bounded by `grace`; the first failure
/// is returned.
pub(crate) async fn stop_service(
    stage: Stage,
    stop_command: Option<&ServiceCommand>,
    process: Option<&mut ProcessHandle>,
    grace: Duration,
    quiet: bool,
) -> Result<(), StopError> {
    let mut first_error = None;

    if let Some(command) = stop_command {
        if !quiet {
            info!("Stopping {} with `{}`", stage, command);
        }
        if let Err(e) = run_to_completion(stage, command, grace, quiet).await {
            first_error = Some(e);
        }
    }

    if let Some(process) = process {
        if let Err(source) = process.shutdown(grace).await {
            let error = StopError::Wait {
                command: process.command().to_string(),
                pid: process.pid(),
                source,
            };
            first_error.get_or_insert(error);
        } else if !quiet {
            info!("{} stopped", stage);
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

async fn run_to_completion(
    stage: Stage,
    command: &ServiceCommand,
    grace: Duration,
    quiet: bool,
) -> Result<(), StopError> {
    let mut process = ProcessHandle::launch(stage.as_str(), command, OutputMode::for_quiet(quiet))
        .map_err(|source| StopError::CommandFailed { command: command.to_string(), source })?;

    let status = match tokio::time::timeout(grace, process.wait()).await {
        Ok(result) => result.map_err(|source| StopError::Wait {
            command: command.to_string(),
            pid: process.pid(),
            source,
        })?,
        Err(_) => {
            warn!("Stop command `{}` for {} hung for {:?}, killing it", command, stage, grace);
            if let Err(e) = process.kill().await {
                warn!("Could not kill stop command `{}`: {}", command, e);
            }
            return Err(StopError::TimedOut { command: command.to_string(), after: grace });
        }
    };

    if !status.success() {
        return Err(StopError::CommandExited { command: command.to_string(), status });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_and_order() {
        let names: Vec<_> = Stage::STARTUP_ORDER.iter().map(|stage| stage.to_string()).collect();
        assert_eq!(names, ["database", "node", "relayer-server"]);
    }

    #[test]
    fn test_default_launchers_follow_startup_order() {
        let launchers = default_launchers(&EnvironmentConfig::default());
        let stages: Vec<_> = launchers.iter().map(|launcher| launcher.stage()).collect();

        assert_eq!(stages, Stage::STARTUP_ORDER);
    }

    #[tokio::test]
    async fn test_stop_service_runs_stop_command_and_reaps_process() {
        let dir = tempfile::tempdir().unwrap();
        let stop = ServiceCommand::new("touch", ["stopped"]).with_working_dir(dir.path());
        let mut process = launch(Stage::Node, &ServiceCommand::new("sleep", ["30"]), true).unwrap();

        stop_service(Stage::Node, Some(&stop), Some(&mut process), Duration::from_secs(5), true)
            .await
            .unwrap();

        assert!(dir.path().join("stopped").exists());
        assert!(!process.is_running());

        // second stop is harmless
        stop_service(Stage::Node, None, Some(&mut process), Duration::from_secs(5), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_service_still_stops_process_when_stop_command_fails() {
        let stop = ServiceCommand::new("false", Vec::<String>::new());
        let mut process =
            launch(Stage::Database, &ServiceCommand::new("sleep", ["30"]), true).unwrap();

        let result = stop_service(
            Stage::Database,
            Some(&stop),
            Some(&mut process),
            Duration::from_secs(5),
            true,
        )
        .await;

        assert!(matches!(result, Err(StopError::CommandExited { .. })));
        assert!(!process.is_running());
    }

    #[tokio::test]
    async fn test_hanging_stop_command_is_killed_and_process_still_stopped() {
        let hanging = ServiceCommand::new("sleep", ["30"]);
        let mut process = launch(Stage::Node, &ServiceCommand::new("sleep", ["30"]), true).unwrap();
        let pid = process.pid().unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            stop_service(
                Stage::Node,
                Some(&hanging),
                Some(&mut process),
                Duration::from_millis(100),
                true,
            ),
        )
        .await
        .expect("stop_service must respect the grace period");

        assert!(matches!(
            result,
            Err(StopError::TimedOut { after, .. }) if after == Duration::from_millis(100)
        ));
        assert!(!process.is_running());
        assert!(!crate::test_support::pid_is_alive(pid));
    }

    #[tokio::test]
    async fn test_stop_service_without_process() {
        stop_service(Stage::RelayerServer, None, None, Duration::from_secs(1), true).await.unwrap();
    }
}
