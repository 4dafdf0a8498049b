use std::time::Duration;

use async_trait::async_trait;

use super::{ServiceLauncher, Stage, launch, stop_service};
use crate::{
    config::{EnvironmentConfig, ServiceCommand},
    error::{ProbeError, StartError, StopError},
    node_rpc::NodeRpc,
    process::ProcessHandle,
    readiness::ReadinessPolicy,
};

/// The anvil dev node, probed with `eth_blockNumber`.
#[derive(Debug, Clone)]
pub struct NodeLauncher {
    start_command: ServiceCommand,
    stop_command: Option<ServiceCommand>,
    rpc: NodeRpc,
    readiness: ReadinessPolicy,
    stop_grace: Duration,
}

impl NodeLauncher {
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self {
            start_command: config.start_command(Stage::Node),
            stop_command: config.stop_command(Stage::Node),
            rpc: NodeRpc::new(config.provider_url.clone()),
            readiness: config.readiness_for(Stage::Node),
            stop_grace: config.stop_grace(),
        }
    }
}

#[async_trait]
impl ServiceLauncher for NodeLauncher {
    fn stage(&self) -> Stage {
        Stage::Node
    }

    fn readiness(&self) -> ReadinessPolicy {
        self.readiness
    }

    async fn start(&self, quiet: bool) -> Result<ProcessHandle, StartError> {
        launch(Stage::Node, &self.start_command, quiet)
    }

    async fn check_ready(&self) -> Result<bool, ProbeError> {
        self.rpc.block_number().await?;
        Ok(true)
    }

    async fn stop(
        &self,
        process: Option<&mut ProcessHandle>,
        quiet: bool,
    ) -> Result<(), StopError> {
        stop_service(Stage::Node, self.stop_command.as_ref(), process, self.stop_grace, quiet).await
    }
}
