//! Backend Supervision Module
//!
//! Spawns the Flask backend as a subprocess, polls it for readiness, and
//! terminates it when the shell shuts down.

pub mod config;
pub mod process;
pub mod readiness;
pub mod supervisor;

pub use readiness::{wait_for_ready, Readiness};
pub use supervisor::BackendSupervisor;
