use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ServiceLauncher, Stage, launch, stop_service};
use crate::{
    config::{EnvironmentConfig, ServiceCommand},
    error::{ProbeError, StartError, StopError},
    process::ProcessHandle,
    readiness::ReadinessPolicy,
};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// The rrelayer server, probed with `GET /health`.
#[derive(Debug, Clone)]
pub struct RelayerServerLauncher {
    start_command: ServiceCommand,
    stop_command: Option<ServiceCommand>,
    health_url: String,
    client: Client,
    readiness: ReadinessPolicy,
    stop_grace: Duration,
}

impl RelayerServerLauncher {
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self {
            start_command: config.start_command(Stage::RelayerServer),
            stop_command: config.stop_command(Stage::RelayerServer),
            health_url: format!("{}/health", config.server_url.trim_end_matches('/')),
            client: Client::builder().timeout(HEALTH_TIMEOUT).build().unwrap_or_default(),
            readiness: config.readiness_for(Stage::RelayerServer),
            stop_grace: config.stop_grace(),
        }
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }
}

#[async_trait]
impl ServiceLauncher for RelayerServerLauncher {
    fn stage(&self) -> Stage {
        Stage::RelayerServer
    }

    fn readiness(&self) -> ReadinessPolicy {
        self.readiness
    }

    async fn start(&self, quiet: bool) -> Result<ProcessHandle, StartError> {
        launch(Stage::RelayerServer, &self.start_command, quiet)
    }

    async fn check_ready(&self) -> Result<bool, ProbeError> {
        let response = self.client.get(&self.health_url).send().await?;
        Ok(response.status().is_success())
    }

    async fn stop(
        &self,
        process: Option<&mut ProcessHandle>,
        quiet: bool,
    ) -> Result<(), StopError> {
        stop_service(
            Stage::RelayerServer,
            self.stop_command.as_ref(),
            process,
            self.stop_grace,
            quiet,
        )
            .await
    }
}
