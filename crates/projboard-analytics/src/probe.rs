//! Health probes raced by the quick health check
//!
//! A probe answers one question about a project. Finding a problem is the
//! winning outcome; finding nothing is a decline, not an error. Only a read
//! that could not complete counts as a failure.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use projboard_core::{
    BugReport, BugReportStatus, Milestone, ProjectId, ProjectService, Severity, Ticket,
    TicketStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// What a probe reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A concrete problem, described for humans
    Found(String),

    /// Nothing to report
    Declined,

    /// The probe could not complete
    Failed(String),
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, project: ProjectId) -> ProbeOutcome;
}

fn outcome<T>(read: projboard_core::Result<T>, inspect: impl FnOnce(T) -> Option<String>) -> ProbeOutcome {
    match read {
        Ok(items) => inspect(items).map_or(ProbeOutcome::Declined, ProbeOutcome::Found),
        Err(err) => ProbeOutcome::Failed(err.to_string()),
    }
}

async fn pause(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// First critical bug report nobody has acted on yet
pub fn find_critical_bug<'a>(bugs: &'a [BugReport], critical: &Severity) -> Option<&'a BugReport> {
    bugs.iter()
        .find(|b| &b.severity == critical && b.status == BugReportStatus::New)
}

/// In-progress tickets untouched for more than `after_days`
///
/// A window shorter than a day, or one that does not fit the calendar, flags nothing.
pub fn count_stuck_tickets(tickets: &[Ticket], now: DateTime<Utc>, after_days: i64) -> usize {
    let cutoff = TimeDelta::try_days(after_days)
        .filter(|window| *window >= TimeDelta::days(1))
        .and_then(|window| now.checked_sub_signed(window));
    let Some(cutoff) = cutoff else {
        return 0;
    };
    tickets
        .iter()
        .filter(|t| t.status == TicketStatus::InProgress && t.updated_at < cutoff)
        .count()
}

/// First active milestone past its end date
pub fn find_overdue_milestone(milestones: &[Milestone], today: NaiveDate) -> Option<&Milestone> {
    milestones.iter().find(|m| m.is_overdue(today))
}

fn describe_days(days: i64) -> String {
    match days {
        1 => "a day".to_string(),
        7 => "a week".to_string(),
        n => format!("{n} days"),
    }
}

pub struct CriticalBugProbe {
    service: Arc<ProjectService>,
    critical: Severity,
    latency: Duration,
}

impl CriticalBugProbe {
    pub fn new(service: Arc<ProjectService>, critical: Severity, latency: Duration) -> Self {
        Self {
            service,
            critical,
            latency,
        }
    }
}

#[async_trait]
impl HealthProbe for CriticalBugProbe {
    fn name(&self) -> &str {
        "critical_bugs"
    }

    async fn check(&self, project: ProjectId) -> ProbeOutcome {
        pause(self.latency).await;
        let read = self.service.get_bug_reports_by_project(project);
        debug!(%project, probe = self.name(), "probe read complete");
        outcome(read, |bugs| {
            find_critical_bug(&bugs, &self.critical)
                .map(|bug| format!("Critical bug found: {}", bug.title))
        })
    }
}

pub struct StuckTicketProbe {
    service: Arc<ProjectService>,
    after_days: i64,
    latency: Duration,
}

impl StuckTicketProbe {
    pub fn new(service: Arc<ProjectService>, after_days: i64, latency: Duration) -> Self {
        Self {
            service,
            after_days,
            latency,
        }
    }
}

#[async_trait]
impl HealthProbe for StuckTicketProbe {
    fn name(&self) -> &str {
        "overdue_tickets"
    }

    async fn check(&self, project: ProjectId) -> ProbeOutcome {
        pause(self.latency).await;
        let read = self.service.get_tickets_by_project(project);
        debug!(%project, probe = self.name(), "probe read complete");
        outcome(read, |tickets| {
            let stuck = count_stuck_tickets(&tickets, Utc::now(), self.after_days);
            (stuck > 0).then(|| {
                format!(
                    "Found {stuck} tickets stuck in progress for over {}",
                    describe_days(self.after_days)
                )
            })
        })
    }
}

pub struct OverdueMilestoneProbe {
    service: Arc<ProjectService>,
    latency: Duration,
}

impl OverdueMilestoneProbe {
    pub fn new(service: Arc<ProjectService>, latency: Duration) -> Self {
        Self { service, latency }
    }
}

#[async_trait]
impl HealthProbe for OverdueMilestoneProbe {
    fn name(&self) -> &str {
        "stuck_milestones"
    }

    async fn check(&self, project: ProjectId) -> ProbeOutcome {
        pause(self.latency).await;
        let read = self.service.get_milestones_by_project(project);
        debug!(%project, probe = self.name(), "probe read complete");
        outcome(read, |milestones| {
            find_overdue_milestone(&milestones, Utc::now().date_naive())
                .map(|m| format!("Milestone '{}' is overdue", m.name))
        })
    }
}
