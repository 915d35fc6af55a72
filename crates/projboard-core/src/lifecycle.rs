//! Lifecycle state machines for tickets, bug reports and milestones
//!
//! Every lifecycle is a strictly linear chain: the only legal move is to the
//! single next state. No skips, no backward moves, no self-transitions, and
//! nothing leaves the terminal state.

use crate::error::EntityKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A forward-only status chain
pub trait Lifecycle: Copy + Eq + std::fmt::Display {
    /// Entity kind the status belongs to, used in errors
    const ENTITY: EntityKind;

    /// The single state that may follow this one, `None` when terminal
    fn next(&self) -> Option<Self>;

    fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Check a transition, producing `InvalidTransition` when it is illegal
    fn check_transition(&self, to: Self) -> Result<()> {
        if self.can_transition_to(to) {
            return Ok(());
        }
        let reason = match self.next() {
            None => format!("{} is terminal", self),
            Some(next) => format!("only {} may follow {}", next, self),
        };
        Err(Error::InvalidTransition {
            entity: Self::ENTITY,
            from: self.to_string(),
            to: to.to_string(),
            reason,
        })
    }
}

/// Ticket status: New -> Accepted -> InProgress -> Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    New,
    Accepted,
    InProgress,
    Completed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::New,
        TicketStatus::Accepted,
        TicketStatus::InProgress,
        TicketStatus::Completed,
    ];

    pub fn is_completed(&self) -> bool {
        matches!(self, TicketStatus::Completed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TicketStatus::New => "New",
            TicketStatus::Accepted => "Accepted",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Completed => "Completed",
        }
    }
}

impl Lifecycle for TicketStatus {
    const ENTITY: EntityKind = EntityKind::Ticket;

    fn next(&self) -> Option<Self> {
        match self {
            TicketStatus::New => Some(TicketStatus::Accepted),
            TicketStatus::Accepted => Some(TicketStatus::InProgress),
            TicketStatus::InProgress => Some(TicketStatus::Completed),
            TicketStatus::Completed => None,
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(TicketStatus::New),
            "accepted" => Ok(TicketStatus::Accepted),
            "in_progress" | "in-progress" | "inprogress" | "in progress" => {
                Ok(TicketStatus::InProgress)
            }
            "completed" => Ok(TicketStatus::Completed),
            _ => Err(Error::InvalidArgument(format!("unknown ticket status: {s}"))),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::New => write!(f, "new"),
            TicketStatus::Accepted => write!(f, "accepted"),
            TicketStatus::InProgress => write!(f, "in_progress"),
            TicketStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Bug report status: New -> Fixed -> Tested -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BugReportStatus {
    #[default]
    New,
    Fixed,
    Tested,
    Closed,
}

impl BugReportStatus {
    pub const ALL: [BugReportStatus; 4] = [
        BugReportStatus::New,
        BugReportStatus::Fixed,
        BugReportStatus::Tested,
        BugReportStatus::Closed,
    ];

    pub fn is_closed(&self) -> bool {
        matches!(self, BugReportStatus::Closed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BugReportStatus::New => "New",
            BugReportStatus::Fixed => "Fixed",
            BugReportStatus::Tested => "Tested",
            BugReportStatus::Closed => "Closed",
        }
    }
}

impl Lifecycle for BugReportStatus {
    const ENTITY: EntityKind = EntityKind::BugReport;

    fn next(&self) -> Option<Self> {
        match self {
            BugReportStatus::New => Some(BugReportStatus::Fixed),
            BugReportStatus::Fixed => Some(BugReportStatus::Tested),
            BugReportStatus::Tested => Some(BugReportStatus::Closed),
            BugReportStatus::Closed => None,
        }
    }
}

impl std::str::FromStr for BugReportStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(BugReportStatus::New),
            "fixed" => Ok(BugReportStatus::Fixed),
            "tested" => Ok(BugReportStatus::Tested),
            "closed" => Ok(BugReportStatus::Closed),
            _ => Err(Error::InvalidArgument(format!(
                "unknown bug report status: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for BugReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugReportStatus::New => write!(f, "new"),
            BugReportStatus::Fixed => write!(f, "fixed"),
            BugReportStatus::Tested => write!(f, "tested"),
            BugReportStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Milestone status: Open -> Active -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Open,
    Active,
    Closed,
}

impl MilestoneStatus {
    pub const ALL: [MilestoneStatus; 3] = [
        MilestoneStatus::Open,
        MilestoneStatus::Active,
        MilestoneStatus::Closed,
    ];

    pub fn is_closed(&self) -> bool {
        matches!(self, MilestoneStatus::Closed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MilestoneStatus::Open => "Open",
            MilestoneStatus::Active => "Active",
            MilestoneStatus::Closed => "Closed",
        }
    }
}

impl Lifecycle for MilestoneStatus {
    const ENTITY: EntityKind = EntityKind::Milestone;

    fn next(&self) -> Option<Self> {
        match self {
            MilestoneStatus::Open => Some(MilestoneStatus::Active),
            MilestoneStatus::Active => Some(MilestoneStatus::Closed),
            MilestoneStatus::Closed => None,
        }
    }
}

impl std::str::FromStr for MilestoneStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(MilestoneStatus::Open),
            "active" => Ok(MilestoneStatus::Active),
            "closed" => Ok(MilestoneStatus::Closed),
            _ => Err(Error::InvalidArgument(format!(
                "unknown milestone status: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MilestoneStatus::Open => write!(f, "open"),
            MilestoneStatus::Active => write!(f, "active"),
            MilestoneStatus::Closed => write!(f, "closed"),
        }
    }
}
