//! Tauri Commands
//!
//! Exposes shell functionality to the backend-served UI via the preload
//! bridge.

use std::sync::Arc;

use serde::Serialize;
use tauri::{AppHandle, State};

use crate::backend::{config, BackendSupervisor};

/// State wrapper for the backend supervisor.
pub struct SupervisorState(pub Arc<BackendSupervisor>);

/// Backend status response
#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub running: bool,
    pub pid: Option<u32>,
    pub port: u16,
}

/// Report whether the backend process handle is held, and where the
/// backend is expected to listen.
#[tauri::command]
pub async fn backend_status(state: State<'_, SupervisorState>) -> Result<BackendStatus, String> {
    Ok(BackendStatus {
        running: state.0.is_running().await,
        pid: state.0.pid().await,
        port: config::BACKEND_PORT,
    })
}

/// Get app version
#[tauri::command]
pub fn get_app_version(app: AppHandle) -> String {
    app.config()
        .version
        .clone()
        .unwrap_or_else(|| "0.0.0".to_string())
}

/// Quit the application, terminating the backend first.
#[tauri::command]
pub async fn quit_app(app: AppHandle, state: State<'_, SupervisorState>) -> Result<(), String> {
    state.0.terminate().await;
    app.exit(0);
    Ok(())
}
