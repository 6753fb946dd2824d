use crate::security::ValidatedCommand;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};

pub const DEFAULT_SHELL: &str = "sh";

// How long to keep reading after a timeout kill
const DRAIN_GRACE: Duration = Duration::from_millis(200);
const READ_CHUNK: usize = 8192;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Failed to spawn shell '{shell}': {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },

    #[error("Command exited with status {0}")]
    NonZeroExit(i32),

    #[error("Command terminated by signal")]
    Terminated,

    #[error("Command timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("I/O error while running command: {0}")]
    Io(#[from] io::Error),
}

/// Combined output of a command plus the reason it failed, if it did
///
/// Output and error are independent: a failed command keeps whatever it
/// wrote before failing.
#[derive(Debug)]
pub struct ExecutionResult {
    pub output: Vec<u8>,
    pub exit_code: Option<i32>,
    pub error: Option<ExecutionError>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Exit code for audit purposes, -1 when the process never reported one
    pub fn audit_exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }
}

/// Runs validated commands through a shell so pipes are honored
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            timeout: None,
            working_dir: None,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Kill the command if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Execute a validated command as `<shell> -c <command>`
    ///
    /// Resolves when the command finishes or the timeout fires. Stdout and
    /// stderr share one pipe, so the output is interleaved as written. The
    /// shell leads its own process group; on timeout the whole group is
    /// killed, so no pipeline stage outlives the result.
    pub async fn execute(&self, command: &ValidatedCommand) -> ExecutionResult {
        let mut output = Vec::new();
        let (exit_code, error) = match self.run(command.as_str(), &mut output).await {
            Ok(status) => (status.code(), status_error(status)),
            Err(error) => (None, Some(error)),
        };

        ExecutionResult {
            output,
            exit_code,
            error,
        }
    }

    async fn run(&self, command: &str, output: &mut Vec<u8>) -> Result<ExitStatus, ExecutionError> {
        let (reader, writer) = io::pipe()?;
        let writer_err = writer.try_clone()?;
        let mut reader = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err)
            .process_group(0)
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let spawned = cmd.spawn();
        // Close our copies of the write end so the reader sees EOF
        drop(cmd);
        let mut child = spawned.map_err(|source| ExecutionError::Spawn {
            shell: self.shell.clone(),
            source,
        })?;
        let group = child.id();

        let Some(limit) = self.timeout else {
            return wait_with_output(&mut child, group, &mut reader, output).await;
        };

        let finished =
            tokio::time::timeout(limit, wait_with_output(&mut child, group, &mut reader, output))
                .await;
        match finished {
            Ok(result) => result,
            Err(_) => {
                kill_group(&mut child, group).await;
                let _ = tokio::time::timeout(DRAIN_GRACE, read_all(&mut reader, output)).await;
                Err(ExecutionError::TimedOut(limit))
            }
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn status_error(status: ExitStatus) -> Option<ExecutionError> {
    if status.success() {
        return None;
    }

    Some(match status.code() {
        Some(code) => ExecutionError::NonZeroExit(code),
        None => ExecutionError::Terminated,
    })
}

async fn wait_with_output(
    child: &mut Child,
    group: Option<u32>,
    reader: &mut pipe::Receiver,
    output: &mut Vec<u8>,
) -> Result<ExitStatus, ExecutionError> {
    let (read, status) = tokio::join!(read_all(reader, output), child.wait());
    let status = match status {
        Ok(status) => status,
        Err(e) => {
            kill_group(child, group).await;
            return Err(e.into());
        }
    };
    read?;
    Ok(status)
}

/// Append everything readable from the pipe until EOF
///
/// Each chunk is appended as soon as it is read, so cancelling this future
/// keeps the partial output.
async fn read_all(reader: &mut pipe::Receiver, output: &mut Vec<u8>) -> io::Result<()> {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        output.extend_from_slice(&chunk[..n]);
    }
}

/// SIGKILL the shell's process group, then reap the shell
async fn kill_group(child: &mut Child, group: Option<u32>) {
    if let Some(pid) = group {
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
            Err(e) => tracing::warn!(pgid = pid, error = %e, "failed to kill process group"),
        }
    }
    let _ = child.kill().await;
}
