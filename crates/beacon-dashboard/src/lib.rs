//! Read-only views over the shared alert log.
//!
//! The dashboard samples at most a few alerts per category, shuffles them,
//! and reports severity counts over that sample together with a category
//! bar chart over the whole log.
//!
//! ```rust
//! use beacon_dashboard::{DashboardReport, DEFAULT_MAX_PER_CATEGORY};
//!
//! let report = DashboardReport::build(&[], DEFAULT_MAX_PER_CATEGORY, &mut rand::thread_rng())?;
//! assert_eq!(report.summary.total, 0);
//! # Ok::<(), beacon_dashboard::DashboardError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod report;
pub mod sampler;
pub mod summary;

pub use error::{DashboardError, DashboardResult};
pub use report::{DashboardReport, SampledAlert, truncate};
pub use sampler::{DEFAULT_MAX_PER_CATEGORY, sample, sample_random};
pub use summary::{CategoryCount, SeveritySummary, category_distribution};
