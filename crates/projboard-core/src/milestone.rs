//! Milestone data model

use crate::{Error, MilestoneId, MilestoneStatus, ProjectId, Result, Ticket, TicketId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A time-boxed group of tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: MilestoneStatus,

    pub project_id: ProjectId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Associated tickets in insertion order, no duplicates
    #[serde(default)]
    pub ticket_ids: Vec<TicketId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Outcome of the activation readiness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneReadiness {
    pub can_activate: bool,
    pub reason: String,
}

impl MilestoneReadiness {
    fn blocked(reason: &str) -> Self {
        Self {
            can_activate: false,
            reason: reason.to_string(),
        }
    }
}

impl Milestone {
    pub fn new(
        name: &str,
        description: Option<String>,
        project_id: ProjectId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument("milestone name cannot be blank".into()));
        }
        if let (Some(start), Some(end)) = (start_date, end_date)
            && start > end
        {
            return Err(Error::InvalidArgument(format!(
                "start date {start} is after end date {end}"
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: MilestoneId::new(),
            name: name.to_string(),
            description,
            status: MilestoneStatus::Open,
            project_id,
            start_date,
            end_date,
            ticket_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_status(&mut self, status: MilestoneStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Associate a ticket; duplicates are ignored
    pub fn add_ticket(&mut self, ticket: TicketId) {
        if !self.ticket_ids.contains(&ticket) {
            self.ticket_ids.push(ticket);
            self.updated_at = Utc::now();
        }
    }

    /// Linked through the ticket's `milestone_id` or listed in `ticket_ids`
    pub fn covers(&self, ticket: &Ticket) -> bool {
        ticket.milestone_id == Some(self.id) || self.ticket_ids.contains(&ticket.id)
    }

    /// Covered tickets among `tickets` that are not completed yet
    pub fn open_tickets(&self, tickets: &[Ticket]) -> usize {
        tickets
            .iter()
            .filter(|t| self.covers(t) && !t.status.is_completed())
            .count()
    }

    pub fn can_close(&self, tickets: &[Ticket]) -> bool {
        self.open_tickets(tickets) == 0
    }

    /// Past its end date while still active
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == MilestoneStatus::Active && self.end_date.is_some_and(|end| end < today)
    }

    pub fn progress_summary(&self, tickets: &[Ticket]) -> String {
        let ours: Vec<&Ticket> = tickets
            .iter()
            .filter(|t| self.ticket_ids.contains(&t.id))
            .collect();
        let completed = ours.iter().filter(|t| t.status.is_completed()).count();
        format!("{}: {}/{} tickets completed", self.name, completed, ours.len())
    }

    /// Advisory check before activation; does not gate the transition itself
    pub fn readiness(&self, team_size: usize, min_team_size: usize) -> MilestoneReadiness {
        match self.status {
            MilestoneStatus::Active => MilestoneReadiness::blocked("Milestone already active"),
            MilestoneStatus::Closed => MilestoneReadiness::blocked("Milestone is closed"),
            MilestoneStatus::Open if team_size < min_team_size => {
                MilestoneReadiness::blocked("Team too small to activate milestone")
            }
            MilestoneStatus::Open if self.ticket_ids.is_empty() => {
                MilestoneReadiness::blocked("No tickets assigned to milestone")
            }
            MilestoneStatus::Open => MilestoneReadiness {
                can_activate: true,
                reason: "Milestone ready to activate".into(),
            },
        }
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.id.short(), self.status, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TicketStatus;
    use chrono::Days;

    fn sprint() -> Milestone {
        let today = Utc::now().date_naive();
        Milestone::new(
            "Sprint 1",
            None,
            ProjectId::new(),
            Some(today),
            today.checked_add_days(Days::new(14)),
        )
        .unwrap()
    }

    #[test]
    fn test_dates_must_be_ordered() {
        let today = Utc::now().date_naive();
        let yesterday = today.checked_sub_days(Days::new(1));
        let result = Milestone::new("Sprint", None, ProjectId::new(), Some(today), yesterday);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_ticket_dedupes() {
        let mut milestone = sprint();
        let ticket = TicketId::new();
        milestone.add_ticket(ticket);
        milestone.add_ticket(ticket);
        assert_eq!(milestone.ticket_ids, vec![ticket]);
    }

    #[test]
    fn test_can_close() {
        let mut milestone = sprint();
        let mut ticket = Ticket::new("Task", None, milestone.project_id, Some(milestone.id)).unwrap();
        milestone.add_ticket(ticket.id);
        assert!(!milestone.can_close(std::slice::from_ref(&ticket)));
        assert_eq!(milestone.progress_summary(std::slice::from_ref(&ticket)), "Sprint 1: 0/1 tickets completed");

        ticket.set_status(TicketStatus::Completed);
        assert!(milestone.can_close(std::slice::from_ref(&ticket)));
    }

    #[test]
    fn test_can_close_counts_linked_tickets() {
        let milestone = sprint();
        let linked = Ticket::new("Linked", None, milestone.project_id, Some(milestone.id)).unwrap();
        let unrelated = Ticket::new("Other", None, milestone.project_id, None).unwrap();

        let tickets = [linked, unrelated];
        assert_eq!(milestone.open_tickets(&tickets), 1);
        assert!(!milestone.can_close(&tickets));
        assert!(milestone.can_close(&tickets[1..]));
    }

    #[test]
    fn test_readiness_small_team() {
        let readiness = sprint().readiness(2, 3);
        assert!(!readiness.can_activate);
        assert!(readiness.reason.contains("Team too small"));
    }

    #[test]
    fn test_readiness_no_tickets() {
        let readiness = sprint().readiness(5, 3);
        assert!(!readiness.can_activate);
        assert!(readiness.reason.contains("No tickets"));
    }

    #[test]
    fn test_readiness_ready() {
        let mut milestone = sprint();
        milestone.add_ticket(TicketId::new());
        let readiness = milestone.readiness(5, 3);
        assert!(readiness.can_activate);
        assert!(readiness.reason.contains("ready"));
    }

    #[test]
    fn test_overdue_only_when_active() {
        let mut milestone = sprint();
        let far_future = Utc::now().date_naive().checked_add_days(Days::new(30)).unwrap();
        assert!(!milestone.is_overdue(far_future));
        milestone.set_status(MilestoneStatus::Active);
        assert!(milestone.is_overdue(far_future));
    }
}
