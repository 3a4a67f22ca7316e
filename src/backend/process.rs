//! Backend Process Management
//!
//! Handles Python interpreter detection, environment setup, process
//! spawning, and stdout/stderr forwarding for the Flask backend.

use std::collections::HashMap;
use std::env;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::config::{BACKEND_ENTRY, PYTHON_ENV, SHELL_MARKER_ENV};

/// Get the Python executable used to run the backend.
///
/// Resolution order: `FAUSEE_PYTHON` override, a local venv next to the
/// backend script, then whatever `python` is on PATH.
pub fn get_python_path(app_root: &Path) -> String {
    python_path_from(env::var(PYTHON_ENV).ok(), app_root)
}

fn python_path_from(override_val: Option<String>, app_root: &Path) -> String {
    if let Some(python) = override_val {
        if !python.is_empty() {
            return python;
        }
    }

    let venv_python = if cfg!(target_os = "windows") {
        app_root.join(".venv").join("Scripts").join("python.exe")
    } else {
        app_root.join(".venv").join("bin").join("python")
    };
    if venv_python.exists() {
        return venv_python.to_string_lossy().to_string();
    }

    // Fall back to system Python
    "python".to_string()
}

/// Get the application root: the directory containing the backend entry
/// script. The spawned process also uses this as its working directory.
pub fn get_app_root() -> PathBuf {
    // Packaged: the script ships next to the executable, or under resources/
    if let Ok(exe_path) = env::current_exe() {
        if let Some(parent) = exe_path.parent() {
            if parent.join(BACKEND_ENTRY).exists() {
                return parent.to_path_buf();
            }
            let resources = parent.join("resources");
            if resources.join(BACKEND_ENTRY).exists() {
                return resources;
            }
        }
    }

    // Development: current directory or a nearby ancestor
    if let Ok(cwd) = env::current_dir() {
        if let Some(root) = find_app_root_near(&cwd) {
            return root;
        }
        return cwd;
    }

    PathBuf::from(".")
}

fn find_app_root_near(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    for _ in 0..4 {
        if current.join(BACKEND_ENTRY).exists() {
            return Some(current);
        }
        current = current.parent()?.to_path_buf();
    }
    None
}

/// Build environment variables for the backend subprocess: the parent
/// environment plus the shell marker, with unbuffered Python output so
/// log forwarding is real-time.
pub fn backend_env() -> HashMap<String, String> {
    let mut env_vars: HashMap<String, String> = env::vars().collect();
    env_vars.insert("PYTHONUNBUFFERED".to_string(), "1".to_string());
    env_vars.insert(SHELL_MARKER_ENV.to_string(), "1".to_string());
    env_vars
}

/// Spawn the backend process.
pub fn spawn_backend() -> std::io::Result<Child> {
    let app_root = get_app_root();
    let python_path = get_python_path(&app_root);
    let script = app_root.join(BACKEND_ENTRY);

    log::info!("[backend] Python path: {}", python_path);
    log::info!("[backend] Working directory: {:?}", app_root);

    let mut cmd = Command::new(&python_path);
    cmd.arg(&script)
        .current_dir(&app_root)
        .envs(backend_env())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Windows-specific: hide console window
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
    }

    cmd.spawn()
}

/// Forward the child's stdout and stderr to the shell log, one line at a
/// time with a distinguishing prefix. Diagnostic visibility only.
pub fn forward_output(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        std::thread::spawn(move || {
            for line in reader.lines().map_while(Result::ok) {
                if !line.is_empty() {
                    log::info!("[backend] {}", line);
                }
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let reader = BufReader::new(stderr);
        std::thread::spawn(move || {
            for line in reader.lines().map_while(Result::ok) {
                if !line.is_empty() {
                    log::error!("[backend err] {}", line);
                }
            }
        });
    }
}

/// Send a soft termination signal so the backend can shut down cleanly.
#[cfg(not(target_os = "windows"))]
pub fn graceful_kill_process(pid: u32) {
    // SIGINT, the Ctrl+C equivalent Flask handles
    let _ = Command::new("kill")
        .args(["-2", &pid.to_string()])
        .output();
}

#[cfg(target_os = "windows")]
pub fn graceful_kill_process(pid: u32) {
    // Tree kill without /F first
    let _ = Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/T"])
        .output();
}

/// Force kill a process by PID.
#[cfg(not(target_os = "windows"))]
pub fn force_kill_process(pid: u32) {
    let _ = Command::new("kill")
        .args(["-9", &pid.to_string()])
        .output();
}

#[cfg(target_os = "windows")]
pub fn force_kill_process(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/T", "/F"])
        .output();
}
