//! Domain service: the single mutation gateway
//!
//! Every mutation follows the same shape: resolve the referenced entities,
//! authorize the requester for the specific action, validate the lifecycle
//! transition and business gates, and only then write. A failed call leaves
//! the store untouched.
//!
//! Reads are unrestricted: any caller may look up any entity.

use crate::error::EntityKind;
use crate::lifecycle::Lifecycle;
use crate::permission::{self, Capability};
use crate::store::Store;
use crate::{
    BugPriority, BugReport, BugReportId, BugReportStatus, Config, Error, Milestone, MilestoneId,
    MilestoneReadiness, MilestoneStatus, Project, ProjectId, Result, Role, Severity, Ticket,
    TicketId, TicketStatus, User, UserId,
};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Orchestrates authorization, lifecycles and the store
pub struct ProjectService {
    store: Store,
    config: Config,
}

impl Default for ProjectService {
    fn default() -> Self {
        Self::new()
    }
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn denied(reason: String) -> Error {
    warn!(%reason, "request denied");
    Error::Unauthorized(reason)
}

impl ProjectService {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            store: Store::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying collections, for snapshot reads and raw seeding
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn user_or_not_found(&self, id: UserId) -> Result<User> {
        self.store
            .users
            .get(&id)?
            .ok_or_else(|| Error::not_found(EntityKind::User, id))
    }

    fn project_or_not_found(&self, id: ProjectId) -> Result<Project> {
        self.store
            .projects
            .get(&id)?
            .ok_or_else(|| Error::not_found(EntityKind::Project, id))
    }

    fn milestone_or_not_found(&self, id: MilestoneId) -> Result<Milestone> {
        self.store
            .milestones
            .get(&id)?
            .ok_or_else(|| Error::not_found(EntityKind::Milestone, id))
    }

    fn ticket_or_not_found(&self, id: TicketId) -> Result<Ticket> {
        self.store
            .tickets
            .get(&id)?
            .ok_or_else(|| Error::not_found(EntityKind::Ticket, id))
    }

    fn bug_report_or_not_found(&self, id: BugReportId) -> Result<BugReport> {
        self.store
            .bug_reports
            .get(&id)?
            .ok_or_else(|| Error::not_found(EntityKind::BugReport, id))
    }

    /// Resolve the requester and check `capability` against their project role
    fn authorize(
        &self,
        project: &Project,
        requester: UserId,
        capability: Capability,
    ) -> Result<Role> {
        self.user_or_not_found(requester)?;
        match project.role_of(requester) {
            Some(role) if permission::allows(role, capability) => Ok(role),
            Some(role) => Err(denied(format!(
                "{role} lacks {capability} in project {}",
                project.id
            ))),
            None => Err(denied(format!(
                "user {requester} is not a member of project {}",
                project.id
            ))),
        }
    }

    pub fn register_user(&self, username: &str, email: &str, display_name: &str) -> Result<User> {
        let user = User::new(username, email, display_name)?;
        let _gate = self.store.begin_write()?;
        self.store.users.put(user.id, user.clone())?;
        info!(user = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Create a project; the creator becomes its manager
    pub fn create_project(&self, name: &str, description: &str, creator: UserId) -> Result<Project> {
        let _gate = self.store.begin_write()?;
        self.user_or_not_found(creator)?;
        let project = Project::new(name, optional(description), creator)?;
        self.store.projects.put(project.id, project.clone())?;
        info!(project = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Add a member, or reassign the role of an existing one
    pub fn add_team_member(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role: Role,
        requester: UserId,
    ) -> Result<Project> {
        let _gate = self.store.begin_write()?;
        let mut project = self.project_or_not_found(project_id)?;
        self.user_or_not_found(user_id)?;
        self.authorize(&project, requester, Capability::ManageUsers)?;

        project.set_member(user_id, role);
        self.store.projects.put(project.id, project.clone())?;
        info!(project = %project_id, user = %user_id, %role, "team member set");
        Ok(project)
    }

    pub fn assign_team_leader(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        requester: UserId,
    ) -> Result<Project> {
        let _gate = self.store.begin_write()?;
        let mut project = self.project_or_not_found(project_id)?;
        self.user_or_not_found(user_id)?;
        self.authorize(&project, requester, Capability::ManageUsers)?;

        project.set_team_leader(user_id)?;
        self.store.projects.put(project.id, project.clone())?;
        info!(project = %project_id, user = %user_id, "team leader assigned");
        Ok(project)
    }

    pub fn create_milestone(
        &self,
        name: &str,
        description: &str,
        project_id: ProjectId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        requester: UserId,
    ) -> Result<Milestone> {
        let _gate = self.store.begin_write()?;
        let mut project = self.project_or_not_found(project_id)?;
        self.authorize(&project, requester, Capability::ManageMilestones)?;

        let milestone = Milestone::new(
            name,
            optional(description),
            project_id,
            start_date,
            end_date,
        )?;
        project.add_milestone(milestone.id);

        self.store.milestones.put(milestone.id, milestone.clone())?;
        self.store.projects.put(project.id, project)?;
        info!(project = %project_id, milestone = %milestone.id, "milestone created");
        Ok(milestone)
    }

    /// Move a milestone forward; closing requires every ticket to be completed
    pub fn change_milestone_status(
        &self,
        milestone_id: MilestoneId,
        status: MilestoneStatus,
        requester: UserId,
    ) -> Result<Milestone> {
        let _gate = self.store.begin_write()?;
        let mut milestone = self.milestone_or_not_found(milestone_id)?;
        let mut project = self.project_or_not_found(milestone.project_id)?;
        self.authorize(&project, requester, Capability::ManageMilestones)?;
        milestone.status.check_transition(status)?;

        if status == MilestoneStatus::Closed {
            let tickets = self.store.tickets.filter(|t| milestone.covers(t))?;
            if !milestone.can_close(&tickets) {
                let open = milestone.open_tickets(&tickets);
                warn!(milestone = %milestone_id, open, "milestone close rejected");
                return Err(Error::InvalidTransition {
                    entity: EntityKind::Milestone,
                    from: milestone.status.to_string(),
                    to: status.to_string(),
                    reason: format!("{open} of {} tickets are not completed", tickets.len()),
                });
            }
        }

        match status {
            MilestoneStatus::Active => project.set_active_milestone(Some(milestone_id))?,
            MilestoneStatus::Closed if project.active_milestone_id == Some(milestone_id) => {
                project.set_active_milestone(None)?
            }
            _ => {}
        }

        milestone.set_status(status);
        self.store.milestones.put(milestone.id, milestone.clone())?;
        self.store.projects.put(project.id, project)?;
        info!(milestone = %milestone_id, %status, "milestone status changed");
        Ok(milestone)
    }

    pub fn create_ticket(
        &self,
        title: &str,
        description: &str,
        project_id: ProjectId,
        milestone_id: Option<MilestoneId>,
        requester: UserId,
    ) -> Result<Ticket> {
        let _gate = self.store.begin_write()?;
        let project = self.project_or_not_found(project_id)?;
        self.authorize(&project, requester, Capability::CreateTickets)?;

        let milestone = match milestone_id {
            Some(id) => {
                let milestone = self.milestone_or_not_found(id)?;
                if milestone.project_id != project_id {
                    return Err(Error::InvalidArgument(format!(
                        "milestone {id} does not belong to project {project_id}"
                    )));
                }
                if milestone.status.is_closed() {
                    return Err(Error::InvalidArgument(format!(
                        "milestone {id} is closed"
                    )));
                }
                Some(milestone)
            }
            None => None,
        };

        let ticket = Ticket::new(title, optional(description), project_id, milestone_id)?;
        self.store.tickets.put(ticket.id, ticket.clone())?;
        if let Some(mut milestone) = milestone {
            milestone.add_ticket(ticket.id);
            self.store.milestones.put(milestone.id, milestone)?;
        }
        info!(project = %project_id, ticket = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Replace the ticket's developer set
    pub fn assign_developers_to_ticket(
        &self,
        ticket_id: TicketId,
        developers: HashSet<UserId>,
        requester: UserId,
    ) -> Result<Ticket> {
        let _gate = self.store.begin_write()?;
        let mut ticket = self.ticket_or_not_found(ticket_id)?;
        let project = self.project_or_not_found(ticket.project_id)?;
        self.authorize(&project, requester, Capability::ManageTickets)?;

        for developer in &developers {
            self.user_or_not_found(*developer)?;
            if !matches!(
                project.role_of(*developer),
                Some(Role::Developer | Role::TeamLeader)
            ) {
                return Err(Error::InvalidArgument(format!(
                    "user {developer} is not a developer in project {}",
                    project.id
                )));
            }
        }

        ticket.assign_developers(developers);
        self.store.tickets.put(ticket.id, ticket.clone())?;
        info!(
            ticket = %ticket_id,
            developers = ticket.assigned_developers.len(),
            "ticket developers assigned"
        );
        Ok(ticket)
    }

    pub fn update_ticket_status(
        &self,
        ticket_id: TicketId,
        status: TicketStatus,
        requester: UserId,
    ) -> Result<Ticket> {
        let _gate = self.store.begin_write()?;
        let mut ticket = self.ticket_or_not_found(ticket_id)?;
        let project = self.project_or_not_found(ticket.project_id)?;
        self.user_or_not_found(requester)?;

        let role = project.role_of(requester);
        if !permission::can_set_ticket_status(role, ticket.is_assigned(requester), status) {
            return Err(denied(format!(
                "user {requester} may not move ticket {ticket_id} to {status}"
            )));
        }
        ticket.status.check_transition(status)?;

        ticket.set_status(status);
        self.store.tickets.put(ticket.id, ticket.clone())?;
        info!(ticket = %ticket_id, %status, "ticket status updated");
        Ok(ticket)
    }

    pub fn create_bug_report(
        &self,
        title: &str,
        description: &str,
        project_id: ProjectId,
        reporter: UserId,
        severity: impl Into<Severity>,
    ) -> Result<BugReport> {
        let _gate = self.store.begin_write()?;
        let mut project = self.project_or_not_found(project_id)?;
        self.user_or_not_found(reporter)?;
        if !project.is_member(reporter) {
            return Err(Error::InvalidArgument(format!(
                "user {reporter} is not a member of project {project_id}"
            )));
        }

        let bug = BugReport::new(
            title,
            optional(description),
            project_id,
            reporter,
            severity.into(),
        )?;
        project.add_bug_report(bug.id);

        self.store.bug_reports.put(bug.id, bug.clone())?;
        self.store.projects.put(project.id, project)?;
        info!(project = %project_id, bug = %bug.id, severity = %bug.severity, "bug reported");
        Ok(bug)
    }

    pub fn assign_bug_report(
        &self,
        bug_id: BugReportId,
        developer: UserId,
        requester: UserId,
    ) -> Result<BugReport> {
        let _gate = self.store.begin_write()?;
        let mut bug = self.bug_report_or_not_found(bug_id)?;
        let project = self.project_or_not_found(bug.project_id)?;
        self.authorize(&project, requester, Capability::ManageTickets)?;
        self.user_or_not_found(developer)?;
        if !project.has_role(developer, Role::Developer) {
            return Err(Error::InvalidArgument(format!(
                "assignee {developer} must be a developer in project {}",
                project.id
            )));
        }

        bug.assign_to(developer);
        self.store.bug_reports.put(bug.id, bug.clone())?;
        info!(bug = %bug_id, developer = %developer, "bug report assigned");
        Ok(bug)
    }

    pub fn update_bug_report_status(
        &self,
        bug_id: BugReportId,
        status: BugReportStatus,
        requester: UserId,
    ) -> Result<BugReport> {
        let _gate = self.store.begin_write()?;
        let mut bug = self.bug_report_or_not_found(bug_id)?;
        let project = self.project_or_not_found(bug.project_id)?;
        self.user_or_not_found(requester)?;

        let role = project.role_of(requester);
        if !permission::can_set_bug_status(role, bug.is_assignee(requester), status) {
            return Err(denied(format!(
                "user {requester} may not move bug report {bug_id} to {status}"
            )));
        }
        bug.status.check_transition(status)?;

        bug.set_status(status);
        self.store.bug_reports.put(bug.id, bug.clone())?;
        info!(bug = %bug_id, %status, "bug report status updated");
        Ok(bug)
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.store.users.get(&id)
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        self.store.projects.get(&id)
    }

    pub fn get_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>> {
        self.store.milestones.get(&id)
    }

    pub fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        self.store.tickets.get(&id)
    }

    pub fn get_bug_report(&self, id: BugReportId) -> Result<Option<BugReport>> {
        self.store.bug_reports.get(&id)
    }

    /// Projects the user is a member of, oldest first
    pub fn get_user_projects(&self, user: UserId) -> Result<Vec<Project>> {
        let mut projects = self.store.projects.filter(|p| p.is_member(user))?;
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    /// Tickets the user is assigned to
    pub fn get_user_tickets(&self, user: UserId) -> Result<Vec<Ticket>> {
        let mut tickets = self.store.tickets.filter(|t| t.is_assigned(user))?;
        sort_tickets(&mut tickets);
        Ok(tickets)
    }

    /// Bug reports assigned to the user
    pub fn get_user_bug_reports(&self, user: UserId) -> Result<Vec<BugReport>> {
        let mut bugs = self.store.bug_reports.filter(|b| b.is_assignee(user))?;
        bugs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(bugs)
    }

    pub fn get_tickets_by_milestone(&self, milestone_id: MilestoneId) -> Result<Vec<Ticket>> {
        self.milestone_or_not_found(milestone_id)?;
        let mut tickets = self
            .store
            .tickets
            .filter(|t| t.milestone_id == Some(milestone_id))?;
        sort_tickets(&mut tickets);
        Ok(tickets)
    }

    pub fn get_tickets_by_project(&self, project_id: ProjectId) -> Result<Vec<Ticket>> {
        self.project_or_not_found(project_id)?;
        let mut tickets = self.store.tickets.filter(|t| t.project_id == project_id)?;
        sort_tickets(&mut tickets);
        debug!(project = %project_id, count = tickets.len(), "tickets read");
        Ok(tickets)
    }

    /// Bug reports in the order they were filed
    pub fn get_bug_reports_by_project(&self, project_id: ProjectId) -> Result<Vec<BugReport>> {
        let project = self.project_or_not_found(project_id)?;
        let bugs = self.store.bug_reports.get_many(&project.bug_report_ids)?;
        debug!(project = %project_id, count = bugs.len(), "bug reports read");
        Ok(bugs)
    }

    /// Milestones in the order they were created
    pub fn get_milestones_by_project(&self, project_id: ProjectId) -> Result<Vec<Milestone>> {
        let project = self.project_or_not_found(project_id)?;
        let milestones = self.store.milestones.get_many(&project.milestone_ids)?;
        debug!(project = %project_id, count = milestones.len(), "milestones read");
        Ok(milestones)
    }

    /// Whether a milestone looks ready to activate; does not gate activation
    pub fn milestone_readiness(&self, milestone_id: MilestoneId) -> Result<MilestoneReadiness> {
        let milestone = self.milestone_or_not_found(milestone_id)?;
        let project = self.project_or_not_found(milestone.project_id)?;
        Ok(milestone.readiness(
            project.team_members.len(),
            self.config.policy.min_team_size_for_activation,
        ))
    }

    pub fn bug_priority(&self, bug_id: BugReportId) -> Result<BugPriority> {
        let bug = self.bug_report_or_not_found(bug_id)?;
        Ok(bug.priority(
            Utc::now(),
            self.config.policy.low_severity_escalation_days,
        ))
    }
}

fn sort_tickets(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
