//! Derived project statistics

use projboard_core::{BugReport, Milestone, MilestoneStatus, Severity, Ticket};
use serde::{Deserialize, Serialize};

/// Counters computed from one point-in-time read of a project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_tickets: usize,
    pub completed_tickets: usize,

    /// Bug reports still in `New`
    pub open_bugs: usize,

    /// Bug reports at the critical severity that are not closed
    pub critical_bugs: usize,

    pub active_milestones: usize,

    /// Completed over total, as a percentage; 0 for a project without tickets
    pub completion_percentage: f64,
}

impl ProjectStats {
    pub fn compute(
        tickets: &[Ticket],
        bugs: &[BugReport],
        milestones: &[Milestone],
        critical: &Severity,
    ) -> Self {
        let total_tickets = tickets.len();
        let completed_tickets = tickets.iter().filter(|t| t.status.is_completed()).count();
        let completion_percentage = if total_tickets == 0 {
            0.0
        } else {
            completed_tickets as f64 / total_tickets as f64 * 100.0
        };

        Self {
            total_tickets,
            completed_tickets,
            open_bugs: bugs
                .iter()
                .filter(|b| b.status == projboard_core::BugReportStatus::New)
                .count(),
            critical_bugs: bugs
                .iter()
                .filter(|b| &b.severity == critical && !b.status.is_closed())
                .count(),
            active_milestones: milestones
                .iter()
                .filter(|m| m.status == MilestoneStatus::Active)
                .count(),
            completion_percentage,
        }
    }
}

impl std::fmt::Display for ProjectStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} tickets completed ({:.1}%), {} open bugs ({} critical), {} active milestones",
            self.completed_tickets,
            self.total_tickets,
            self.completion_percentage,
            self.open_bugs,
            self.critical_bugs,
            self.active_milestones
        )
    }
}
