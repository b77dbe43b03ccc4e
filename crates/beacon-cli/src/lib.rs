//! # beacon-cli
//!
//! Command-line front end for the alerting pipeline.
//!
//! Provides commands for:
//! - Running one domain engine (`beacon run <domain>`)
//! - Running every engine in turn against the shared log (`beacon run-all`)
//! - Sampling the alert log for display (`beacon dashboard`)
//! - Printing the effective configuration (`beacon config`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, DashboardArgs, DomainArg, Format, LogFormat};
pub use error::CliError;
pub use output::OutputFormat;
