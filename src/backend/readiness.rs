//! Backend Readiness Polling
//!
//! Polls the backend's status endpoint until it answers or a deadline
//! passes. Any HTTP response counts as ready: the poll only proves the
//! port is accepting connections, not that the backend is functional.

use std::time::{Duration, Instant};

use super::config::{POLL_INTERVAL, PROBE_TIMEOUT};

/// Outcome of a readiness poll. Callers must handle the timeout case
/// explicitly; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
}

/// Poll `url` until any HTTP response arrives or `timeout` elapses.
///
/// One GET per attempt, 500ms between attempts. The status code is not
/// inspected. The deadline is only checked when an attempt fails, so a
/// slow-to-fail probe can overrun the nominal timeout slightly.
pub async fn wait_for_ready(url: &str, timeout: Duration) -> Readiness {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            log::error!("[backend] could not build readiness client: {}", e);
            return Readiness::TimedOut;
        }
    };

    let start = Instant::now();
    loop {
        match client.get(url).send().await {
            Ok(_) => {
                log::info!("[backend] server ready after {:?}", start.elapsed());
                return Readiness::Ready;
            }
            Err(_) => {
                if start.elapsed() > timeout {
                    log::warn!("[backend] not reachable after {:?}", timeout);
                    return Readiness::TimedOut;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }
}
