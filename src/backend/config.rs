//! Backend Configuration
//!
//! Fixed endpoints, timeouts, and environment variable names for the
//! supervised Flask backend.

use std::time::Duration;

/// Port the Flask backend listens on.
pub const BACKEND_PORT: u16 = 5000;

/// Status endpoint polled during startup. Any HTTP response counts as ready.
pub const STATUS_URL: &str = "http://127.0.0.1:5000/api/status";

/// UI entry point loaded into the main window.
pub const UI_URL: &str = "http://127.0.0.1:5000/ui";

/// How long the readiness poller keeps retrying before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Delay between readiness poll attempts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Per-request timeout for a single readiness probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Optional override for the Python interpreter used to run the backend.
pub const PYTHON_ENV: &str = "FAUSEE_PYTHON";

/// Marker passed to the backend so it knows it runs inside the desktop
/// shell (e.g. to skip opening its own browser tab).
pub const SHELL_MARKER_ENV: &str = "FAUSEE_DESKTOP";

/// Backend entry script, resolved relative to the application root.
pub const BACKEND_ENTRY: &str = "app.py";

/// Grace period between the soft termination signal and the forced kill.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
