//! Project data model

use crate::{BugReportId, Error, MilestoneId, ProjectId, Result, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A project and its team
///
/// Membership and the milestone/bug lists only grow; the exceptions are role
/// reassignment and the active-milestone pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// One role per member
    pub team_members: HashMap<UserId, Role>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<UserId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_leader_id: Option<UserId>,

    /// Milestones in creation order
    #[serde(default)]
    pub milestone_ids: Vec<MilestoneId>,

    /// Bug reports in creation order
    #[serde(default)]
    pub bug_report_ids: Vec<BugReportId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_milestone_id: Option<MilestoneId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Headcount overview of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub team_size: usize,
    pub developers: usize,
    pub testers: usize,
    pub milestones: usize,
    pub bug_reports: usize,
}

impl std::fmt::Display for TeamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Project: {}", self.name)?;
        writeln!(f, "Team size: {}", self.team_size)?;
        writeln!(f, "Developers: {}", self.developers)?;
        writeln!(f, "Testers: {}", self.testers)?;
        writeln!(f, "Milestones: {}", self.milestones)?;
        write!(f, "Bug reports: {}", self.bug_reports)
    }
}

impl Project {
    /// Create a project; the creator becomes its manager
    pub fn new(name: &str, description: Option<String>, creator: UserId) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument("project name cannot be blank".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id: ProjectId::new(),
            name: name.to_string(),
            description,
            team_members: HashMap::from([(creator, Role::Manager)]),
            manager_id: Some(creator),
            team_leader_id: None,
            milestone_ids: Vec::new(),
            bug_report_ids: Vec::new(),
            active_milestone_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn role_of(&self, user: UserId) -> Option<Role> {
        self.team_members.get(&user).copied()
    }

    pub fn has_role(&self, user: UserId, role: Role) -> bool {
        self.role_of(user) == Some(role)
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.team_members.contains_key(&user)
    }

    /// Members holding `role`, sorted for stable output
    pub fn users_by_role(&self, role: Role) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .team_members
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(id, _)| *id)
            .collect();
        users.sort();
        users
    }

    /// Add a member or reassign an existing member's role
    pub fn set_member(&mut self, user: UserId, role: Role) {
        self.team_members.insert(user, role);
        self.updated_at = Utc::now();
    }

    /// Promote an existing member to team leader
    pub fn set_team_leader(&mut self, user: UserId) -> Result<()> {
        if !self.is_member(user) {
            return Err(Error::InvalidArgument(format!(
                "user {user} is not a member of project {}",
                self.id
            )));
        }
        self.team_members.insert(user, Role::TeamLeader);
        self.team_leader_id = Some(user);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_milestone(&mut self, milestone: MilestoneId) {
        self.milestone_ids.push(milestone);
        self.updated_at = Utc::now();
    }

    pub fn set_active_milestone(&mut self, milestone: Option<MilestoneId>) -> Result<()> {
        if let Some(id) = milestone
            && !self.milestone_ids.contains(&id)
        {
            return Err(Error::InvalidArgument(format!(
                "milestone {id} does not belong to project {}",
                self.id
            )));
        }
        self.active_milestone_id = milestone;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_bug_report(&mut self, bug: BugReportId) {
        self.bug_report_ids.push(bug);
        self.updated_at = Utc::now();
    }

    pub fn team_summary(&self) -> TeamSummary {
        let count = |role| self.team_members.values().filter(|r| **r == role).count();
        TeamSummary {
            name: self.name.clone(),
            team_size: self.team_members.len(),
            developers: count(Role::Developer),
            testers: count(Role::Tester),
            milestones: self.milestone_ids.len(),
            bug_reports: self.bug_report_ids.len(),
        }
    }
}
