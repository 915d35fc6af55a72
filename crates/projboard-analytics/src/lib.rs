//! projboard-analytics: Concurrent read-side analytics for projboard
//!
//! Fans reads out over tokio tasks against a shared [`ProjectService`].
//! Project analytics join every read and fail as a whole; the quick health
//! check races probes and settles on the first problem found.
//!
//! [`ProjectService`]: projboard_core::ProjectService

pub mod aggregator;
pub mod error;
pub mod fanout;
pub mod probe;
pub mod stats;

pub use aggregator::{Analytics, HealthReport, ProjectAnalytics};
pub use error::Error;
pub use probe::{HealthProbe, ProbeOutcome};
pub use stats::ProjectStats;

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, Error>;
