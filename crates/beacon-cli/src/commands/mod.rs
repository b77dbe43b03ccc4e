//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`run`] - One domain engine, or all of them in turn
//! - [`dashboard`] - Sampled view of the alert log
//! - [`config`] - Configuration loading and display

pub mod config;
pub mod dashboard;
pub mod run;

pub use config::{ConfigCommand, resolve_config};
pub use dashboard::DashboardCommand;
pub use run::{RunAllCommand, RunCommand};
