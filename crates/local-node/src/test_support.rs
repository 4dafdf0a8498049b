//! Scripted launchers that run real `sleep` processes with a fixed readiness script.

use std::{
    process::Stdio,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    config::ServiceCommand,
    error::{ProbeError, StartError, StopError},
    process::{OutputMode, ProcessHandle},
    readiness::ReadinessPolicy,
    services::{ServiceLauncher, Stage},
};

const MISSING_PROGRAM: &str = "rrelayer-local-node-missing-binary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Started(Stage),
    Stopped(Stage),
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    fn record(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

pub struct ScriptedLauncherBuilder {
    stage: Stage,
    log: EventLog,
    ready_after: Option<u32>,
    policy: ReadinessPolicy,
    already_running: bool,
    fail_start: bool,
    fail_stop: bool,
}

impl ScriptedLauncherBuilder {
    pub fn ready_after(mut self, checks: u32) -> Self {
        self.ready_after = Some(checks);
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.ready_after = None;
        self
    }

    pub fn policy(mut self, max_attempts: u32, interval: Duration) -> Self {
        self.policy = ReadinessPolicy::new(max_attempts, interval);
        self
    }

    pub fn already_running(mut self) -> Self {
        self.already_running = true;
        self
    }

    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn fail_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn build(self) -> Arc<ScriptedLauncher> {
        Arc::new(ScriptedLauncher {
            stage: self.stage,
            log: self.log,
            ready_after: self.ready_after,
            policy: self.policy,
            already_running: self.already_running,
            fail_start: self.fail_start,
            fail_stop: self.fail_stop,
            started: AtomicBool::new(false),
            checks: AtomicU32::new(0),
            start_calls: AtomicU32::new(0),
            stop_calls: AtomicU32::new(0),
            pids: Mutex::new(Vec::new()),
        })
    }
}

/// Becomes ready on the n-th check made after `start`. Checks made before
/// `start` answer "not running" and are not counted.
pub struct ScriptedLauncher {
    stage: Stage,
    log: EventLog,
    ready_after: Option<u32>,
    policy: ReadinessPolicy,
    already_running: bool,
    fail_start: bool,
    fail_stop: bool,
    started: AtomicBool,
    checks: AtomicU32,
    start_calls: AtomicU32,
    stop_calls: AtomicU32,
    pids: Mutex<Vec<u32>>,
}

impl ScriptedLauncher {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(stage: Stage, log: &EventLog) -> ScriptedLauncherBuilder {
        ScriptedLauncherBuilder {
            stage,
            log: log.clone(),
            ready_after: Some(1),
            policy: ReadinessPolicy::new(10, Duration::from_millis(10)),
            already_running: false,
            fail_start: false,
            fail_stop: false,
        }
    }

    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> u32 {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn pids(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceLauncher for ScriptedLauncher {
    fn stage(&self) -> Stage {
        self.stage
    }

    fn readiness(&self) -> ReadinessPolicy {
        self.policy
    }

    async fn start(&self, _quiet: bool) -> Result<ProcessHandle, StartError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        let command = if self.fail_start {
            ServiceCommand::new(MISSING_PROGRAM, Vec::<String>::new())
        } else {
            ServiceCommand::new("sleep", ["30"])
        };

        let process = ProcessHandle::launch(self.stage.as_str(), &command, OutputMode::Discard)?;
        if let Some(pid) = process.pid() {
            self.pids.lock().unwrap().push(pid);
        }

        self.log.record(Event::Started(self.stage));
        self.started.store(true, Ordering::SeqCst);

        Ok(process)
    }

    async fn check_ready(&self) -> Result<bool, ProbeError> {
        if self.already_running {
            return Ok(true);
        }
        if !self.started.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let check = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        match self.ready_after {
            Some(ready_after) if check >= ready_after => Ok(true),
            _ => Err(ProbeError::Unavailable(format!("{} not ready", self.stage))),
        }
    }

    async fn stop(
        &self,
        process: Option<&mut ProcessHandle>,
        _quiet: bool,
    ) -> Result<(), StopError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.log.record(Event::Stopped(self.stage));

        if let Some(process) = process {
            process.shutdown(Duration::from_secs(5)).await.map_err(|source| StopError::Wait {
                command: process.command().to_string(),
                pid: process.pid(),
                source,
            })?;
        }

        if self.fail_stop {
            return Err(StopError::CommandFailed {
                command: format!("stop {}", self.stage),
                source: crate::error::LaunchError::ExecutableNotFound {
                    program: MISSING_PROGRAM.to_string(),
                },
            });
        }

        Ok(())
    }
}

/// Whether `pid` is a live, non-zombie process.
pub fn pid_is_alive(pid: u32) -> bool {
    let signalled = std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);

    if !signalled {
        return false;
    }

    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .map(|rest| !rest.trim_start().starts_with('Z'))
            .unwrap_or(true),
        Err(_) => true,
    }
}
