//! Read-side analytics over the project service

use crate::fanout::{AbortOnDrop, join_ordered, race_first_found, settle};
use crate::probe::{CriticalBugProbe, HealthProbe, OverdueMilestoneProbe, StuckTicketProbe};
use crate::stats::ProjectStats;
use crate::{Error, Result};
use projboard_core::{
    BugReport, EntityKind, Milestone, Project, ProjectId, ProjectService, Severity, Ticket,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One project with everything read for it and the derived statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    pub project: Project,
    pub tickets: Vec<Ticket>,
    pub bug_reports: Vec<BugReport>,
    pub milestones: Vec<Milestone>,
    pub stats: ProjectStats,
}

/// Result of a quick health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,

    pub issue: String,

    /// Probe that reported the issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,

    /// Probes that could not complete before the check resolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_probes: Vec<String>,
}

impl HealthReport {
    fn healthy(failed_probes: Vec<String>) -> Self {
        Self {
            healthy: true,
            issue: "All checks passed".to_string(),
            probe: None,
            failed_probes,
        }
    }

    fn problem(probe: &str, issue: String, failed_probes: Vec<String>) -> Self {
        Self {
            healthy: false,
            issue,
            probe: Some(probe.to_string()),
            failed_probes,
        }
    }
}

impl std::fmt::Display for HealthReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.healthy {
            write!(f, "Healthy: {}", self.issue)
        } else {
            write!(f, "Unhealthy: {}", self.issue)
        }
    }
}

/// Concurrent analytics; cheap to clone
#[derive(Clone)]
pub struct Analytics {
    service: Arc<ProjectService>,
    read_latency: Duration,
    timeout: Option<Duration>,
    overdue_after_days: i64,
    critical: Severity,
}

impl Analytics {
    /// Build from the service, taking settings from its config
    pub fn new(service: Arc<ProjectService>) -> Self {
        let config = service.config();
        let read_latency = Duration::from_millis(config.analytics.read_latency_ms);
        let timeout = config.analytics.timeout_ms.map(Duration::from_millis);
        let overdue_after_days = config.analytics.overdue_after_days;
        let critical = Severity::from(config.health.critical_severity.as_str());
        Self {
            service,
            read_latency,
            timeout,
            overdue_after_days,
            critical,
        }
    }

    fn resolve(&self, project_id: ProjectId) -> Result<Project> {
        let project = self
            .service
            .get_project(project_id)?
            .ok_or_else(|| projboard_core::Error::not_found(EntityKind::Project, project_id))?;
        Ok(project)
    }

    /// Spawn one guarded read against the service
    fn read<T, F>(&self, query: F) -> AbortOnDrop<projboard_core::Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(&ProjectService) -> projboard_core::Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        let latency = self.read_latency;
        AbortOnDrop::spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            query(service.as_ref())
        })
    }

    /// Read tickets, bug reports and milestones concurrently and reduce them
    ///
    /// All three reads must succeed. The first failure cancels the others.
    pub async fn get_project_analytics(&self, project_id: ProjectId) -> Result<ProjectAnalytics> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.collect(project_id))
                .await
                .map_err(|_| {
                    warn!(project = %project_id, ?limit, "project analytics timed out");
                    Error::Timeout(limit)
                })?,
            None => self.collect(project_id).await,
        }
    }

    async fn collect(&self, project_id: ProjectId) -> Result<ProjectAnalytics> {
        let project = self.resolve(project_id)?;

        let tickets = self.read(move |s| s.get_tickets_by_project(project_id));
        let bug_reports = self.read(move |s| s.get_bug_reports_by_project(project_id));
        let milestones = self.read(move |s| s.get_milestones_by_project(project_id));

        let (tickets, bug_reports, milestones) =
            tokio::try_join!(settle(tickets), settle(bug_reports), settle(milestones))?;

        let stats = ProjectStats::compute(&tickets, &bug_reports, &milestones, &self.critical);
        info!(project = %project_id, %stats, "project analytics computed");

        Ok(ProjectAnalytics {
            project,
            tickets,
            bug_reports,
            milestones,
            stats,
        })
    }

    /// Project analytics for every id, in the order given
    ///
    /// Each project runs its own join-all; the first failing project cancels
    /// the rest.
    pub async fn get_multiple_projects_analytics(
        &self,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectAnalytics>> {
        let jobs: Vec<_> = project_ids
            .iter()
            .map(|&project_id| {
                let this = self.clone();
                async move { this.get_project_analytics(project_id).await }
            })
            .collect();

        let results = join_ordered(jobs).await?;
        debug!(projects = results.len(), "multi-project analytics computed");
        Ok(results)
    }

    /// The built-in probes
    pub fn default_probes(&self) -> Vec<Arc<dyn HealthProbe>> {
        vec![
            Arc::new(CriticalBugProbe::new(
                self.service.clone(),
                self.critical.clone(),
                self.read_latency,
            )),
            Arc::new(StuckTicketProbe::new(
                self.service.clone(),
                self.overdue_after_days,
                self.read_latency,
            )),
            Arc::new(OverdueMilestoneProbe::new(
                self.service.clone(),
                self.read_latency,
            )),
        ]
    }

    /// Race the built-in probes; the first problem found wins
    pub async fn quick_health_check(&self, project_id: ProjectId) -> Result<HealthReport> {
        self.quick_health_check_with(project_id, self.default_probes())
            .await
    }

    /// Race `probes` against the project
    ///
    /// The first probe to find a problem decides the report and cancels the
    /// rest. When nothing is found the project is healthy, unless every probe
    /// failed outright.
    pub async fn quick_health_check_with(
        &self,
        project_id: ProjectId,
        probes: Vec<Arc<dyn HealthProbe>>,
    ) -> Result<HealthReport> {
        self.resolve(project_id)?;

        let names: Vec<String> = probes.iter().map(|p| p.name().to_string()).collect();
        let contenders: Vec<_> = probes
            .into_iter()
            .map(|probe| async move { probe.check(project_id).await })
            .collect();

        let race = race_first_found(contenders).await;

        let mut failed_probes = Vec::with_capacity(race.failed.len());
        let mut failures = Vec::with_capacity(race.failed.len());
        for (index, reason) in race.failed {
            let name = index
                .and_then(|i| names.get(i))
                .map_or("unknown", String::as_str);
            warn!(project = %project_id, probe = name, %reason, "health probe failed");
            failed_probes.push(name.to_string());
            failures.push(format!("{name}: {reason}"));
        }

        if let Some((index, issue)) = race.winner {
            let probe = names.get(index).map_or("unknown", String::as_str);
            info!(project = %project_id, probe, %issue, "health check found a problem");
            return Ok(HealthReport::problem(probe, issue, failed_probes));
        }

        if race.declined == 0 && !failures.is_empty() {
            return Err(Error::ProbesFailed(failures));
        }

        info!(project = %project_id, degraded = failed_probes.len(), "health check passed");
        Ok(HealthReport::healthy(failed_probes))
    }
}
