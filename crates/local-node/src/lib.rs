mod config;
mod environment;
mod error;
pub mod logger;
mod node_rpc;
mod orchestrator;
mod process;
mod readiness;
mod services;

#[cfg(test)]
mod test_support;

pub use config::{
    AuthSetup, CONFIG_FILE_NAME, EnvironmentConfig, ServiceCommand, ServiceConfig, Services,
};
pub use environment::load_env_from_project_path;
pub use error::{
    ConfigurationError, EnvironmentError, LaunchError, NodeRpcError, ProbeError, StageFailure,
    StartError, StopError, TeardownError, TimeoutError,
};
pub use node_rpc::{DEV_ACCOUNT, NodeRpc, fund_address};
pub use orchestrator::{Environment, EnvironmentHandle, EnvironmentOrchestrator};
pub use process::{OutputMode, ProcessHandle, ProcessState};
pub use readiness::{Readiness, ReadinessPolicy, ReadinessProbe};
pub use services::{
    DatabaseLauncher, NodeLauncher, RelayerServerLauncher, ServiceLauncher, Stage,
    default_launchers,
};
