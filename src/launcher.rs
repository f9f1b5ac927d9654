//! Workload launching
//!
//! Opens one terminal session per workload: the session primes the
//! privilege cache, changes into the working directory, runs the payload,
//! and drops into an interactive shell when the payload exits so the
//! window stays open for inspection. A headless mode spawns the payloads
//! directly for hosts without a display server.
//!
//! Launched workloads are handed back as [`WorkloadHandle`]s with a
//! minimal lifecycle (status, wait, stop). The default policy remains
//! launch-and-forget: nothing restarts or health-checks them.

use std::process::Stdio;

use crate::config::Config;
use crate::workload::{Workload, WorkloadRole};
use crate::{Error, Result};

/// Observed state of a launched workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadStatus {
    Running,
    /// Process exited; `None` when terminated by a signal
    Exited(Option<i32>),
}

/// A launched workload process
#[derive(Debug)]
pub struct WorkloadHandle {
    role: WorkloadRole,
    child: tokio::process::Child,
}

impl WorkloadHandle {
    /// The role this process was launched for
    #[must_use]
    pub fn role(&self) -> WorkloadRole {
        self.role
    }

    /// OS process id, if the process is still running
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Poll the process without blocking
    ///
    /// # Errors
    ///
    /// Returns error if the process state cannot be queried.
    pub fn status(&mut self) -> Result<WorkloadStatus> {
        match self.child.try_wait()? {
            Some(status) => Ok(WorkloadStatus::Exited(status.code())),
            None => Ok(WorkloadStatus::Running),
        }
    }

    /// Wait for the process to exit
    ///
    /// # Errors
    ///
    /// Returns error if waiting on the process fails.
    pub async fn wait(&mut self) -> Result<WorkloadStatus> {
        let status = self.child.wait().await?;
        Ok(WorkloadStatus::Exited(status.code()))
    }

    /// Terminate the process and reap it
    ///
    /// # Errors
    ///
    /// Returns error if the kill signal cannot be delivered.
    pub async fn stop(&mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}

/// Spawns the planned workloads and hands out their lifecycle handles
#[derive(Debug, Clone)]
pub struct Supervisor {
    terminal: String,
    primer: String,
    headless: bool,
}

impl Supervisor {
    /// Create a supervisor from the loaded configuration
    ///
    /// `primer` is the shell command each session runs first to refresh
    /// the privilege cache; pass an empty string to skip priming.
    #[must_use]
    pub fn new(config: &Config, primer: impl Into<String>) -> Self {
        Self {
            terminal: config.launch.terminal.clone(),
            primer: primer.into(),
            headless: config.launch.no_terminal,
        }
    }

    /// Launch every workload, skipping the ones that fail to spawn
    ///
    /// Failures are logged per workload; the remaining workloads still
    /// launch. Returns a handle per successfully spawned process.
    #[must_use]
    pub fn launch_all(&self, workloads: &[Workload]) -> Vec<WorkloadHandle> {
        let mut handles = Vec::with_capacity(workloads.len());
        for workload in workloads {
            match self.launch(workload) {
                Ok(handle) => {
                    tracing::info!(
                        role = %workload.role,
                        pid = handle.id(),
                        "workload launched"
                    );
                    handles.push(handle);
                }
                Err(e) => {
                    tracing::warn!(role = %workload.role, error = %e, "workload failed to launch");
                }
            }
        }
        handles
    }

    /// Spawn one workload
    fn launch(&self, workload: &Workload) -> Result<WorkloadHandle> {
        let child = if self.headless {
            self.spawn_direct(workload)
        } else {
            self.spawn_terminal(workload)
        }
        .map_err(|e| {
            Error::Launch(format!(
                "failed to spawn {} workload: {e}",
                workload.role
            ))
        })?;

        Ok(WorkloadHandle {
            role: workload.role,
            child,
        })
    }

    /// Open a terminal window running the session script
    fn spawn_terminal(&self, workload: &Workload) -> std::io::Result<tokio::process::Child> {
        tokio::process::Command::new(&self.terminal)
            .args(["--", "bash", "-c", &self.session_script(workload)])
            .stdin(Stdio::null())
            .spawn()
    }

    /// Spawn the payload directly as a child process
    fn spawn_direct(&self, workload: &Workload) -> std::io::Result<tokio::process::Child> {
        tokio::process::Command::new("bash")
            .args(["-c", &self.direct_script(workload)])
            .current_dir(&workload.workdir)
            .stdin(Stdio::null())
            .spawn()
    }

    /// Shell script run inside the terminal session
    ///
    /// The trailing `exec bash` keeps the window open after the payload
    /// exits.
    fn session_script(&self, workload: &Workload) -> String {
        let dir = shell_words::quote(&workload.workdir.to_string_lossy()).into_owned();
        if self.primer.is_empty() {
            format!("cd {dir}; {}; exec bash", workload.command)
        } else {
            format!("{}; cd {dir}; {}; exec bash", self.primer, workload.command)
        }
    }

    /// Shell script run for a headless launch
    fn direct_script(&self, workload: &Workload) -> String {
        if self.primer.is_empty() {
            format!("exec {}", workload.command)
        } else {
            format!("{}; exec {}", self.primer, workload.command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn workload(command: &str, workdir: &std::path::Path) -> Workload {
        Workload {
            role: WorkloadRole::Capture,
            command: command.to_string(),
            workdir: workdir.to_path_buf(),
        }
    }

    fn headless_supervisor(primer: &str) -> Supervisor {
        let mut config = Config::default();
        config.launch.no_terminal = true;
        Supervisor::new(&config, primer)
    }

    #[test]
    fn session_script_primes_then_enters_workdir() {
        let supervisor = Supervisor::new(&Config::default(), "/tmp/cache_sudo.sh");
        let script =
            supervisor.session_script(&workload("python3 client.py", &PathBuf::from("/opt/voice")));
        assert_eq!(
            script,
            "/tmp/cache_sudo.sh; cd /opt/voice; python3 client.py; exec bash"
        );
    }

    #[test]
    fn session_script_without_primer_has_no_dangling_separator() {
        let supervisor = Supervisor::new(&Config::default(), "");
        let script = supervisor.session_script(&workload("true", &PathBuf::from("/opt/voice")));
        assert_eq!(script, "cd /opt/voice; true; exec bash");
    }

    #[test]
    fn session_script_quotes_workdir() {
        let supervisor = Supervisor::new(&Config::default(), ":");
        let script =
            supervisor.session_script(&workload("true", &PathBuf::from("/opt/voice assets")));
        assert!(script.contains("cd '/opt/voice assets';"));
    }

    #[tokio::test]
    async fn headless_workload_reports_running_then_exit() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = headless_supervisor(":");

        let mut handles = supervisor.launch_all(&[workload("sleep 30", dir.path())]);
        assert_eq!(handles.len(), 1);

        let handle = &mut handles[0];
        assert_eq!(handle.status().unwrap(), WorkloadStatus::Running);

        handle.stop().await.unwrap();
        let status = handle.wait().await.unwrap();
        assert!(matches!(status, WorkloadStatus::Exited(_)));
    }

    #[tokio::test]
    async fn headless_exit_code_is_observed() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = headless_supervisor("");

        let mut handles = supervisor.launch_all(&[workload("false", dir.path())]);
        assert_eq!(handles.len(), 1);
        assert_eq!(
            handles[0].wait().await.unwrap(),
            WorkloadStatus::Exited(Some(1))
        );
    }

    #[tokio::test]
    async fn failed_spawn_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let supervisor = headless_supervisor("");

        // Spawning in a nonexistent working directory fails; the other
        // workload still launches.
        let mut handles = supervisor.launch_all(&[
            workload("true", &missing),
            workload("true", dir.path()),
        ]);
        assert_eq!(handles.len(), 1);
        let _ = handles[0].wait().await;
    }
}
