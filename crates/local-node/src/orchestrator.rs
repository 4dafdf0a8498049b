use std::{future::Future, sync::Arc};

use rrelayer::{AuthConfig, Client, CreateClientConfig, create_client};
use tracing::{error, info, warn};

use crate::{
    config::EnvironmentConfig,
    error::{EnvironmentError, StageFailure, TeardownError, TimeoutError},
    process::ProcessHandle,
    readiness::{Readiness, ReadinessProbe},
    services::{ServiceLauncher, Stage, default_launchers},
};

struct StartedStage {
    launcher: Arc<dyn ServiceLauncher>,
    /// `None` when the service was already up before this run.
    process: Option<ProcessHandle>,
    stopped: bool,
}

/// Every stage brought up in one run, in startup order.
///
/// Must be released with [`EnvironmentHandle::tear_down`]; dropping it only
/// kills the direct child processes.
pub struct EnvironmentHandle {
    stages: Vec<StartedStage>,
}

impl EnvironmentHandle {
    fn new() -> Self {
        Self { stages: Vec::new() }
    }

    fn push(&mut self, launcher: Arc<dyn ServiceLauncher>, process: Option<ProcessHandle>) {
        self.stages.push(StartedStage { launcher, process, stopped: false });
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.stages.iter().map(|started| started.launcher.stage()).collect()
    }

    /// Pids this run launched, in startup order.
    pub fn pids(&self) -> Vec<u32> {
        self.stages
            .iter()
            .filter_map(|started| started.process.as_ref().and_then(ProcessHandle::pid))
            .collect()
    }

    pub fn is_stage_running(&mut self, stage: Stage) -> bool {
        self.stages
            .iter_mut()
            .filter(|started| started.launcher.stage() == stage)
            .any(|started| started.process.as_mut().is_some_and(ProcessHandle::is_running))
    }

    pub fn any_running(&mut self) -> bool {
        self.stages
            .iter_mut()
            .any(|started| started.process.as_mut().is_some_and(ProcessHandle::is_running))
    }

    pub fn is_torn_down(&self) -> bool {
        self.stages.iter().all(|started| started.stopped)
    }

    /// Stops every stage in reverse startup order.
    ///
    /// A failing stop is recorded and the remaining stages are still stopped.
    /// Stages already stopped by an earlier call are skipped, so calling this
    /// twice is a no-op the second time.
    pub async fn tear_down(&mut self, quiet: bool) -> Result<(), TeardownError> {
        let mut failures = Vec::new();

        for started in self.stages.iter_mut().rev() {
            if started.stopped {
                continue;
            }

            let stage = started.launcher.stage();
            if !quiet {
                info!("Stopping {}...", stage);
            }

            if let Err(error) = started.launcher.stop(started.process.as_mut(), quiet).await {
                warn!("Failed to stop {}: {}", stage, error);
                failures.push(StageFailure { stage, error });
            }
            started.stopped = true;
        }

        if failures.is_empty() {
            if !quiet {
                info!("All services stopped");
            }
            return Ok(());
        }

        let teardown = TeardownError { failures };
        warn!("Teardown finished with failures: {}", teardown);
        Err(teardown)
    }
}

impl Drop for EnvironmentHandle {
    fn drop(&mut self) {
        if !self.is_torn_down() {
            warn!(
                "Environment dropped without tear down, stages {:?} may still be running",
                self.stages()
            );
        }
    }
}

/// A fully ready stack plus a client bound to its relayer server.
pub struct Environment {
    pub client: Client,
    pub handle: EnvironmentHandle,
}

pub struct EnvironmentOrchestrator {
    config: EnvironmentConfig,
    launchers: Vec<Arc<dyn ServiceLauncher>>,
}

impl EnvironmentOrchestrator {
    pub fn new(config: EnvironmentConfig) -> Self {
        let launchers = default_launchers(&config);
        Self { config, launchers }
    }

    /// Uses the given launchers, in the given order, instead of the defaults.
    pub fn with_launchers(
        config: EnvironmentConfig,
        launchers: Vec<Arc<dyn ServiceLauncher>>,
    ) -> Self {
        Self { config, launchers }
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Starts each stage in order and waits for it before moving on.
    ///
    /// Credentials are resolved before anything is launched. If a stage fails
    /// to start or never becomes ready, everything started so far (the failing
    /// stage included) is torn down before the error is returned.
    pub async fn bring_up(&self) -> Result<Environment, EnvironmentError> {
        let auth = self.config.auth.resolve()?;
        let mut handle = EnvironmentHandle::new();

        self.start_stages(&mut handle).await?;

        Ok(Environment { client: self.client(auth), handle })
    }

    async fn start_stages(&self, handle: &mut EnvironmentHandle) -> Result<(), EnvironmentError> {
        let quiet = self.config.quiet;

        if !quiet {
            info!("Bringing up local environment...");
        }

        for launcher in &self.launchers {
            let stage = launcher.stage();

            if launcher.is_running().await {
                if !quiet {
                    info!("{} is already running, reusing it", stage);
                }
                handle.push(Arc::clone(launcher), None);
                continue;
            }

            let process = match launcher.start(quiet).await {
                Ok(process) => process,
                Err(source) => {
                    error!("{} failed to start: {}", stage, source);
                    let teardown = handle.tear_down(quiet).await.err();
                    return Err(EnvironmentError::Start { stage, source, teardown });
                }
            };
            handle.push(Arc::clone(launcher), Some(process));

            let probe = ReadinessProbe::new(stage.as_str(), launcher.readiness()).quiet(quiet);
            match probe.wait_until_ready(|| launcher.check_ready()).await {
                Readiness::Ready { .. } => {}
                Readiness::TimedOut { attempts, elapsed } => {
                    let source = TimeoutError { stage, attempts, elapsed };
                    error!("{}", source);
                    let teardown = handle.tear_down(quiet).await.err();
                    return Err(EnvironmentError::Timeout { source, teardown });
                }
            }
        }

        if !quiet {
            info!("Local environment is ready at {}", self.config.server_url);
        }

        Ok(())
    }

    fn client(&self, auth: AuthConfig) -> Client {
        create_client(CreateClientConfig { server_url: self.config.server_url.clone(), auth })
    }

    pub async fn tear_down(&self, handle: &mut EnvironmentHandle) -> Result<(), TeardownError> {
        handle.tear_down(self.config.quiet).await
    }

    /// Brings the stack up, runs `scenario`, and tears down on every exit path.
    ///
    /// The scenario's own result is returned; a teardown failure afterwards is
    /// only logged.
    pub async fn run_scenario<F, Fut, T>(&self, scenario: F) -> anyhow::Result<T>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.run_scenario_until(std::future::pending(), scenario).await
    }

    /// Like [`run_scenario`](Self::run_scenario), but gives up as soon as
    /// `shutdown` resolves, whether the stack is still coming up or the
    /// scenario is running. Whatever was started is torn down either way and
    /// [`EnvironmentError::Interrupted`] is returned.
    pub async fn run_scenario_until<S, F, Fut, T>(
        &self,
        shutdown: S,
        scenario: F,
    ) -> anyhow::Result<T>
    where
        S: Future<Output = ()>,
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let auth = self.config.auth.resolve().map_err(EnvironmentError::from)?;
        let mut handle = EnvironmentHandle::new();

        let outcome = tokio::select! {
            outcome = async {
                self.start_stages(&mut handle).await?;
                scenario(self.client(auth)).await
            } => outcome,
            _ = shutdown => {
                warn!("Interrupted, tearing the environment down");
                Err(EnvironmentError::Interrupted.into())
            }
        };

        if let Err(teardown) = self.tear_down(&mut handle).await {
            warn!("Scenario finished but teardown was incomplete: {}", teardown);
        }

        outcome
    }
}
