//! Backend Supervisor
//!
//! Owns the backend process handle for the lifetime of the application:
//! one spawn at startup, one termination at shutdown, no restarts.

use std::process::Child;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::time::Duration;

use super::config::SHUTDOWN_GRACE;
use super::process::{force_kill_process, forward_output, graceful_kill_process, spawn_backend};

/// Supervises the single backend process. At most one child exists at a
/// time; the handle is cleared when the backend exits or is terminated.
pub struct BackendSupervisor {
    process: Arc<Mutex<Option<Child>>>,
}

impl BackendSupervisor {
    pub fn new() -> Self {
        Self {
            process: Arc::new(Mutex::new(None)),
        }
    }

    /// Check if the backend process handle is held.
    pub async fn is_running(&self) -> bool {
        self.process.lock().await.is_some()
    }

    /// PID of the running backend, if any.
    pub async fn pid(&self) -> Option<u32> {
        self.process.lock().await.as_ref().map(|child| child.id())
    }

    /// Spawn the backend and install output forwarding. Idempotent if the
    /// backend is already running.
    pub async fn start(&self) -> Result<(), String> {
        if self.is_running().await {
            log::info!("[backend] already running");
            return Ok(());
        }

        let mut child =
            spawn_backend().map_err(|e| format!("failed to spawn backend: {}", e))?;
        let pid = child.id();

        forward_output(&mut child);
        *self.process.lock().await = Some(child);
        self.watch_exit();

        log::info!("[backend] started (pid {})", pid);
        Ok(())
    }

    /// Watch for the backend exiting on its own, log the exit status and
    /// release the handle. No automatic restart.
    fn watch_exit(&self) {
        let process = Arc::clone(&self.process);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;

                let mut guard = process.lock().await;
                match guard.as_mut() {
                    Some(child) => match child.try_wait() {
                        Ok(Some(status)) => {
                            log::info!("[backend] process exited: {}", status);
                            *guard = None;
                            break;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::error!("[backend] error checking process status: {}", e);
                            break;
                        }
                    },
                    // Handle released elsewhere (terminated), stop watching
                    None => break,
                }
            }
        });
    }

    /// Terminate the backend: soft signal first, bounded wait for exit,
    /// then forced kill. Termination failures are logged and discarded;
    /// shutdown proceeds regardless.
    pub async fn terminate(&self) {
        let mut guard = self.process.lock().await;
        let Some(child) = guard.as_mut() else {
            log::info!("[backend] not running");
            return;
        };

        let pid = child.id();
        log::info!("[backend] shutting down (pid {})", pid);
        graceful_kill_process(pid);

        let start = Instant::now();
        let mut wait_error = None;
        while start.elapsed() < SHUTDOWN_GRACE {
            match child.try_wait() {
                Ok(Some(status)) => {
                    log::info!("[backend] stopped gracefully: {}", status);
                    *guard = None;
                    return;
                }
                Ok(None) => tokio::time::sleep(Duration::from_millis(100)).await,
                Err(e) => {
                    wait_error = Some(e);
                    break;
                }
            }
        }

        match wait_error {
            Some(e) => log::error!("[backend] could not observe shutdown ({}), force killing", e),
            None => log::warn!("[backend] grace period elapsed, force killing"),
        }
        force_kill_process(pid);
        let _ = child.kill();
        let _ = child.wait();
        *guard = None;
    }

    #[cfg(test)]
    async fn adopt(&self, child: Child) {
        *self.process.lock().await = Some(child);
    }
}

impl Default for BackendSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackendSupervisor {
    fn drop(&mut self) {
        // Synchronous last-resort cleanup
        if let Ok(mut guard) = self.process.try_lock() {
            if let Some(child) = guard.as_mut() {
                force_kill_process(child.id());
                let _ = child.kill();
            }
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::PYTHON_ENV;
    use std::env;
    use std::process::{Command, Stdio};

    #[tokio::test]
    async fn test_terminate_without_process_is_noop() {
        let supervisor = BackendSupervisor::new();
        supervisor.terminate().await;
        assert!(!supervisor.is_running().await);
    }

    #[tokio::test]
    async fn test_spawn_failure_reports_error_without_panicking() {
        // Point the interpreter override at a binary that cannot exist;
        // the failure must come back as an Err, not a panic, and leave
        // no process handle behind.
        env::set_var(PYTHON_ENV, "/nonexistent/fausee-python");
        let supervisor = BackendSupervisor::new();
        let result = supervisor.start().await;
        env::remove_var(PYTHON_ENV);

        assert!(result.is_err());
        assert!(!supervisor.is_running().await);
    }

    #[cfg(unix)]
    fn spawn_sleeper() -> Child {
        Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_kills_running_child() {
        let supervisor = BackendSupervisor::new();
        supervisor.adopt(spawn_sleeper()).await;
        assert!(supervisor.is_running().await);

        let start = Instant::now();
        supervisor.terminate().await;

        assert!(!supervisor.is_running().await);
        // sleep dies on SIGINT, well inside the grace period
        assert!(start.elapsed() < SHUTDOWN_GRACE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_second_terminate_is_noop() {
        let supervisor = BackendSupervisor::new();
        supervisor.adopt(spawn_sleeper()).await;

        supervisor.terminate().await;
        // Handle already released, second call must not signal anything
        supervisor.terminate().await;
        assert!(!supervisor.is_running().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_force_kills_stubborn_child() {
        // A child that ignores SIGINT only dies to the forced kill after
        // the grace period.
        let supervisor = BackendSupervisor::new();
        let child = Command::new("sh")
            .arg("-c")
            .arg("trap '' INT; sleep 30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        supervisor.adopt(child).await;

        let start = Instant::now();
        supervisor.terminate().await;

        assert!(!supervisor.is_running().await);
        assert!(start.elapsed() >= SHUTDOWN_GRACE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_watch_exit_releases_handle_on_self_exit() {
        let supervisor = BackendSupervisor::new();
        let child = Command::new("true")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        supervisor.adopt(child).await;
        supervisor.watch_exit();

        // The watcher polls every 500ms; give it two ticks
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(!supervisor.is_running().await);
    }
}
