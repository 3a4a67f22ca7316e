use std::sync::Arc;

use tauri::window::Color;
use tauri::{AppHandle, RunEvent, WebviewUrl, WebviewWindowBuilder};

pub mod backend;
mod commands;

use backend::{config, wait_for_ready, BackendSupervisor, Readiness};
use commands::{backend_status, get_app_version, quit_app, SupervisorState};

/// Fixed window dimensions, matching the backend UI's layout.
const WINDOW_WIDTH: f64 = 1100.0;
const WINDOW_HEIGHT: f64 = 750.0;

/// Dark fill shown while the window is still blank (#0f1224).
const WINDOW_BACKGROUND: Color = Color(0x0f, 0x12, 0x24, 0xff);

/// Create the main window, then point it at the backend UI once the
/// status endpoint answers. A readiness timeout is swallowed: the window
/// navigates anyway and shows whatever the backend serves (or fails to).
fn create_main_window(app: &AppHandle) -> tauri::Result<()> {
    let blank = "about:blank".parse().expect("static url");

    let mut window = WebviewWindowBuilder::new(app, "main", WebviewUrl::External(blank))
        .title("Fausee")
        .inner_size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .background_color(WINDOW_BACKGROUND)
        .initialization_script(include_str!("../preload.js"))
        .build()?;

    tauri::async_runtime::spawn(async move {
        match wait_for_ready(config::STATUS_URL, config::READY_TIMEOUT).await {
            Readiness::Ready => {}
            Readiness::TimedOut => {
                log::warn!("[shell] backend unreachable, loading UI anyway");
            }
        }

        let ui_url = config::UI_URL.parse().expect("static url");
        if let Err(e) = window.navigate(ui_url) {
            log::error!("[shell] failed to load UI: {}", e);
        }
    });

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let supervisor = Arc::new(BackendSupervisor::new());
    let exit_supervisor = Arc::clone(&supervisor);

    tauri::Builder::default()
        .manage(SupervisorState(Arc::clone(&supervisor)))
        .setup(move |app| {
            app.handle().plugin(
                tauri_plugin_log::Builder::default()
                    .level(log::LevelFilter::Info)
                    .build(),
            )?;

            // Backend spawn and window creation run concurrently; the
            // readiness poller is the only thing tying them together.
            let startup_supervisor = Arc::clone(&supervisor);
            tauri::async_runtime::spawn(async move {
                if let Err(e) = startup_supervisor.start().await {
                    // Not surfaced to the user; the poller times out on
                    // its own and the window shows the unreachable page.
                    log::error!("[backend] {}", e);
                }
            });

            create_main_window(app.handle())?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            backend_status,
            get_app_version,
            quit_app,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(move |_app_handle, event| match event {
            // macOS convention: the app outlives its windows. Closing the
            // last window keeps the shell and the backend alive.
            #[cfg(target_os = "macos")]
            RunEvent::ExitRequested { code, api, .. } => {
                if code.is_none() {
                    api.prevent_exit();
                }
            }
            // Reactivation with no windows: recreate the window only, the
            // backend is assumed to still be running.
            #[cfg(target_os = "macos")]
            RunEvent::Reopen {
                has_visible_windows,
                ..
            } => {
                if !has_visible_windows {
                    if let Err(e) = create_main_window(_app_handle) {
                        log::error!("[shell] failed to recreate window: {}", e);
                    }
                }
            }
            RunEvent::Exit => {
                tauri::async_runtime::block_on(exit_supervisor.terminate());
            }
            _ => {}
        });
}
