//! Ticket data model

use crate::{Error, MilestoneId, ProjectId, Result, TicketId, TicketStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A unit of work inside a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: TicketStatus,

    pub project_id: ProjectId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,

    /// Replaced wholesale on reassignment
    #[serde(default)]
    pub assigned_developers: HashSet<UserId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(
        title: &str,
        description: Option<String>,
        project_id: ProjectId,
        milestone_id: Option<MilestoneId>,
    ) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::InvalidArgument("ticket title cannot be blank".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id: TicketId::new(),
            title: title.to_string(),
            description,
            status: TicketStatus::New,
            project_id,
            milestone_id,
            assigned_developers: HashSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_assigned(&self, user: UserId) -> bool {
        self.assigned_developers.contains(&user)
    }

    /// Set the status without checking the lifecycle; the service checks first
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn assign_developers(&mut self, developers: HashSet<UserId>) {
        self.assigned_developers = developers;
        self.updated_at = Utc::now();
    }

    pub fn status_description(&self) -> String {
        match self.status {
            TicketStatus::New => format!("Ticket '{}' is new and waiting to be accepted", self.title),
            TicketStatus::Accepted => {
                format!("Ticket '{}' has been accepted and is ready to work on", self.title)
            }
            TicketStatus::InProgress => format!(
                "Ticket '{}' is being worked on by {} developer(s)",
                self.title,
                self.assigned_developers.len()
            ),
            TicketStatus::Completed => format!("Ticket '{}' has been completed", self.title),
        }
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.id.short(), self.status, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ticket_defaults() {
        let ticket = Ticket::new("Task", None, ProjectId::new(), None).unwrap();
        assert_eq!(ticket.status, TicketStatus::New);
        assert!(ticket.assigned_developers.is_empty());
        assert!(Ticket::new("", None, ProjectId::new(), None).is_err());
    }

    #[test]
    fn test_assignment_replaces() {
        let mut ticket = Ticket::new("Task", None, ProjectId::new(), None).unwrap();
        let (a, b) = (UserId::new(), UserId::new());
        ticket.assign_developers(HashSet::from([a]));
        ticket.assign_developers(HashSet::from([b]));
        assert!(!ticket.is_assigned(a));
        assert!(ticket.is_assigned(b));
    }

    #[test]
    fn test_status_description() {
        let mut ticket = Ticket::new("Login", None, ProjectId::new(), None).unwrap();
        ticket.assign_developers(HashSet::from([UserId::new()]));
        ticket.set_status(TicketStatus::InProgress);
        assert!(ticket.status_description().contains("1 developer(s)"));
    }
}
