//! Shared subprocess lifecycle management used by the server, facilitator,
//! and client proxies below.
//!
//! A hybrid-mutex discipline for wrapping a child process:
//! `std::sync::Mutex`/`parking_lot::Mutex` for state that never crosses an
//! `.await` point, `tokio::sync::Mutex` for the `Child` handle itself
//! (I/O against it is async).

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex as TokioMutex;

#[derive(Debug, thiserror::Error)]
pub enum ChildProcessError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("process exited before producing output")]
    NoOutput,
}

/// Static launch configuration for one subprocess.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub command: String,
    pub args: Vec<String>,
    pub working_directory: Option<std::path::PathBuf>,
}

/// Owns (at most) one running child process, supervised across its
/// start/stop lifecycle. `stop()` is idempotent: calling it on an already-
/// stopped (or never-started) handle is a no-op.
pub struct ChildProcessHandle {
    spec: SpawnSpec,
    child: TokioMutex<Option<Child>>,
}

impl ChildProcessHandle {
    pub fn new(spec: SpawnSpec) -> Self {
        Self {
            spec,
            child: TokioMutex::new(None),
        }
    }

    pub async fn spawn(&self, env: HashMap<String, String>) -> Result<(), ChildProcessError> {
        let mut command = Command::new(&self.spec.command);
        command
            .args(&self.spec.args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.spec.working_directory {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| ChildProcessError::Spawn {
            command: self.spec.command.clone(),
            source,
        })?;

        *self.child.lock().await = Some(child);
        Ok(())
    }

    /// Spawns and waits for the process to exit, capturing combined stdout.
    /// Used by the client proxy, whose subprocess runs one call and exits.
    pub async fn spawn_and_collect_stdout(
        &self,
        env: HashMap<String, String>,
    ) -> Result<String, ChildProcessError> {
        let mut command = Command::new(&self.spec.command);
        command
            .args(&self.spec.args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.spec.working_directory {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|source| ChildProcessError::Spawn {
                command: self.spec.command.clone(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Idempotent stop: SIGTERM first, escalating to SIGKILL after 5s if
    /// the process hasn't exited (spec.md §6's process lifecycle
    /// convention). A no-op if nothing is running.
    pub async fn stop(&self) {
        let mut guard = self.child.lock().await;
        let Some(mut child) = guard.take() else {
            return;
        };

        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // SAFETY: `pid` is this child's own PID, obtained from the
            // `Child` handle we exclusively own; SIGTERM is a best-effort
            // graceful-shutdown request.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
        }
        #[cfg(not(unix))]
        let _ = child.start_kill();

        let graceful = tokio::time::timeout(Duration::from_secs(5), child.wait()).await;
        if graceful.is_err() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
    }

    pub async fn is_running(&self) -> bool {
        self.child.lock().await.is_some()
    }

    /// Takes ownership of the running child (if any) and waits for it to
    /// exit, returning its combined stdout. Used by the client proxy, whose
    /// subprocess performs one call and exits on its own; a subsequent
    /// `stop()` becomes a harmless no-op since the slot is already empty.
    pub async fn wait_for_exit_collecting_stdout(&self) -> Result<String, ChildProcessError> {
        let child = {
            let mut guard = self.child.lock().await;
            guard.take()
        };
        let Some(child) = child else {
            return Err(ChildProcessError::NoOutput);
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ChildProcessError::Spawn {
                command: self.spec.command.clone(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
