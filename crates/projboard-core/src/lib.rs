//! projboard-core: Core library for the projboard project tracker
//!
//! Provides the entity model, lifecycle state machines, role-based
//! authorization and the in-memory store. All mutations go through
//! [`ProjectService`]; reads may go to the service or straight to the store.

pub mod bug;
pub mod config;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod milestone;
pub mod permission;
pub mod project;
pub mod role;
pub mod service;
pub mod store;
pub mod ticket;
pub mod user;

pub use bug::{BugPriority, BugReport, Severity};
pub use config::{AnalyticsConfig, Config, HealthConfig, PolicyConfig};
pub use error::{EntityKind, Error};
pub use id::{BugReportId, MilestoneId, ProjectId, TicketId, UserId};
pub use lifecycle::{BugReportStatus, Lifecycle, MilestoneStatus, TicketStatus};
pub use milestone::{Milestone, MilestoneReadiness};
pub use permission::Capability;
pub use project::{Project, TeamSummary};
pub use role::Role;
pub use service::ProjectService;
pub use store::{Collection, Store};
pub use ticket::Ticket;
pub use user::User;

/// Result type for projboard operations
pub type Result<T> = std::result::Result<T, Error>;
