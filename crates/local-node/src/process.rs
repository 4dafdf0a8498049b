use std::{
    io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::{Child, Command},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{config::ServiceCommand, error::LaunchError};

const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Where a launched process writes its stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Discard,
    /// Each line is re-emitted as a `debug!` event tagged with the process label.
    Forward,
}

impl OutputMode {
    pub fn for_quiet(quiet: bool) -> Self {
        if quiet { OutputMode::Discard } else { OutputMode::Forward }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited(ExitStatus),
}

/// One external OS process started for a stage.
///
/// The process is placed in its own process group so that terminating it
/// also reaches whatever it spawned (`make` starting anvil, a `cargo run`
/// wrapper starting a server binary). Once an exit status has been observed the handle
/// stays exited.
#[derive(Debug)]
pub struct ProcessHandle {
    label: String,
    command: String,
    working_dir: PathBuf,
    pid: Option<u32>,
    child: Child,
    exit_status: Option<ExitStatus>,
    output_forwarders: Vec<JoinHandle<()>>,
}

impl ProcessHandle {
    pub fn launch(
        label: &str,
        command: &ServiceCommand,
        output: OutputMode,
    ) -> Result<Self, LaunchError> {
        let working_dir = match &command.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .map_err(|_| LaunchError::InvalidWorkingDirectory(PathBuf::from(".")))?,
        };

        if !working_dir.is_dir() {
            return Err(LaunchError::InvalidWorkingDirectory(working_dir));
        }

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match output {
            OutputMode::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
            OutputMode::Forward => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => {
                LaunchError::ExecutableNotFound { program: command.program.clone() }
            }
            _ => LaunchError::Spawn { program: command.program.clone(), source },
        })?;

        let pid = child.id();
        let mut output_forwarders = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            output_forwarders.push(forward_lines(label.to_string(), stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            output_forwarders.push(forward_lines(label.to_string(), stderr));
        }

        debug!("Launched {} `{}` in {:?} (pid {:?})", label, command, working_dir, pid);

        Ok(Self {
            label: label.to_string(),
            command: command.to_string(),
            working_dir,
            pid,
            child,
            exit_status: None,
            output_forwarders,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The pid captured at launch; it is kept after the process exits.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&mut self) -> ProcessState {
        if let Some(status) = self.exit_status {
            return ProcessState::Exited(status);
        }

        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exit_status = Some(status);
                ProcessState::Exited(status)
            }
            Ok(None) => ProcessState::Running,
            Err(e) => {
                warn!("Could not poll {} (pid {:?}): {}", self.label, self.pid, e);
                ProcessState::Running
            }
        }
    }

    pub fn is_running(&mut self) -> bool {
        self.state() == ProcessState::Running
    }

    /// Sends SIGTERM to the process group and returns without waiting.
    ///
    /// A handle that has already exited is left alone.
    pub async fn terminate(&mut self) -> io::Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        if self.signal_group("TERM").await {
            return Ok(());
        }

        self.child.start_kill()
    }

    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }

        let status = self.child.wait().await?;
        self.exit_status = Some(status);
        self.drain_output().await;

        Ok(status)
    }

    /// Terminates, waits up to `grace`, then kills whatever is left.
    pub async fn shutdown(&mut self, grace: Duration) -> io::Result<ExitStatus> {
        self.terminate().await?;

        match tokio::time::timeout(grace, self.wait()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} (pid {:?}) ignored SIGTERM for {:?}, killing it",
                    self.label, self.pid, grace
                );
                self.kill().await
            }
        }
    }

    pub async fn kill(&mut self) -> io::Result<ExitStatus> {
        if self.is_running() && !self.signal_group("KILL").await {
            self.child.start_kill()?;
        }

        self.wait().await
    }

    #[cfg(unix)]
    async fn signal_group(&self, signal: &str) -> bool {
        let Some(pid) = self.pid else {
            return false;
        };

        Command::new("kill")
            .args(["-s", signal, "--", &format!("-{}", pid)])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    async fn signal_group(&self, _signal: &str) -> bool {
        false
    }

    async fn drain_output(&mut self) {
        for forwarder in self.output_forwarders.drain(..) {
            let abort = forwarder.abort_handle();
            if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, forwarder).await.is_err() {
                abort.abort();
            }
        }
    }
}

fn forward_lines<R>(label: String, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(stage = %label, "{}", line);
        }
    })
}
