//! Authorization engine
//!
//! Pure functions over a static role/capability table plus the
//! context-sensitive checks for ticket and bug report status changes.
//! Nothing here touches the store.

use crate::{BugReportStatus, Role, Ticket, TicketStatus, User};
use serde::{Deserialize, Serialize};

/// A named permission checked against a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageUsers,
    ManageMilestones,
    ManageTickets,
    CreateTickets,
    WorkOnTickets,
    CreateBugReports,
    FixBugReports,
    TestBugReports,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::ManageUsers,
        Capability::ManageMilestones,
        Capability::ManageTickets,
        Capability::CreateTickets,
        Capability::WorkOnTickets,
        Capability::CreateBugReports,
        Capability::FixBugReports,
        Capability::TestBugReports,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Capability::ManageUsers => "Add/remove team members and assign roles",
            Capability::ManageMilestones => "Create and manage project milestones",
            Capability::ManageTickets => "Assign developers to tickets and bug reports",
            Capability::CreateTickets => "Create new tickets for the project",
            Capability::WorkOnTickets => "Work on assigned tickets and update their status",
            Capability::CreateBugReports => "Report bugs found in the project",
            Capability::FixBugReports => "Fix reported bugs",
            Capability::TestBugReports => "Test and verify bug fixes",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::ManageUsers => "manage_users",
            Capability::ManageMilestones => "manage_milestones",
            Capability::ManageTickets => "manage_tickets",
            Capability::CreateTickets => "create_tickets",
            Capability::WorkOnTickets => "work_on_tickets",
            Capability::CreateBugReports => "create_bug_reports",
            Capability::FixBugReports => "fix_bug_reports",
            Capability::TestBugReports => "test_bug_reports",
        };
        f.write_str(name)
    }
}

/// The static role/capability table
pub fn allows(role: Role, capability: Capability) -> bool {
    use Role::*;
    match capability {
        Capability::ManageUsers | Capability::ManageMilestones => matches!(role, Manager),
        Capability::ManageTickets | Capability::CreateTickets => {
            matches!(role, Manager | TeamLeader)
        }
        Capability::WorkOnTickets => matches!(role, TeamLeader | Developer),
        Capability::CreateBugReports => matches!(role, Developer | Tester),
        Capability::FixBugReports => matches!(role, Developer),
        Capability::TestBugReports => matches!(role, Tester),
    }
}

/// Whether `user` acting as `role` may modify `ticket`
///
/// Managers always may; team leaders while the ticket is not completed;
/// developers only on tickets they are assigned to that are not completed.
pub fn can_modify_ticket(user: &User, role: Role, ticket: &Ticket) -> bool {
    match role {
        Role::Manager => true,
        Role::TeamLeader => !ticket.status.is_completed(),
        Role::Developer => ticket.is_assigned(user.id) && !ticket.status.is_completed(),
        Role::Tester => false,
    }
}

/// Who may move a ticket into `target`
///
/// `role` is the requester's role in the ticket's project, `None` for
/// non-members.
pub fn can_set_ticket_status(role: Option<Role>, is_assignee: bool, target: TicketStatus) -> bool {
    match target {
        TicketStatus::New => false,
        TicketStatus::Accepted => matches!(role, Some(Role::Manager | Role::TeamLeader)),
        TicketStatus::InProgress | TicketStatus::Completed => {
            is_assignee || role == Some(Role::TeamLeader)
        }
    }
}

/// Who may move a bug report into `target`
pub fn can_set_bug_status(role: Option<Role>, is_assignee: bool, target: BugReportStatus) -> bool {
    match target {
        BugReportStatus::New => false,
        BugReportStatus::Fixed => is_assignee,
        BugReportStatus::Tested => role == Some(Role::Tester),
        BugReportStatus::Closed => matches!(role, Some(Role::Manager | Role::TeamLeader)),
    }
}

/// Multi-line summary of what a role does
pub fn role_description(role: Role) -> String {
    let duties: &[&str] = match role {
        Role::Manager => &[
            "Manager: Full project control",
            "- Manage team members",
            "- Create and manage milestones",
            "- Create and assign tickets",
            "- Oversee all project activities",
        ],
        Role::TeamLeader => &[
            "Team Leader: Technical leadership",
            "- Create and assign tickets",
            "- Work on tickets",
            "- Guide development team",
            "- Support project manager",
        ],
        Role::Developer => &[
            "Developer: Development work",
            "- Work on assigned tickets",
            "- Report and fix bugs",
            "- Collaborate with team",
        ],
        Role::Tester => &[
            "Tester: Quality assurance",
            "- Test project functionality",
            "- Report bugs",
            "- Verify bug fixes",
        ],
    };
    duties.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProjectId;
    use std::collections::HashSet;

    fn expected_roles(capability: Capability) -> &'static [Role] {
        match capability {
            Capability::ManageUsers => &[Role::Manager],
            Capability::ManageMilestones => &[Role::Manager],
            Capability::ManageTickets => &[Role::Manager, Role::TeamLeader],
            Capability::CreateTickets => &[Role::Manager, Role::TeamLeader],
            Capability::WorkOnTickets => &[Role::TeamLeader, Role::Developer],
            Capability::CreateBugReports => &[Role::Developer, Role::Tester],
            Capability::FixBugReports => &[Role::Developer],
            Capability::TestBugReports => &[Role::Tester],
        }
    }

    #[test]
    fn test_table_matches_documented_roles() {
        for capability in Capability::ALL {
            let granted: Vec<Role> = Role::ALL
                .into_iter()
                .filter(|r| allows(*r, capability))
                .collect();
            assert_eq!(granted, expected_roles(capability), "{capability}");
        }
    }

    #[test]
    fn test_every_variant_handled() {
        // exhaustive matches: adding a variant without updating these fails to compile
        for role in Role::ALL {
            let _ = match role {
                Role::Manager | Role::TeamLeader | Role::Developer | Role::Tester => {
                    role_description(role)
                }
            };
        }
        for capability in Capability::ALL {
            assert!(!capability.description().is_empty());
        }
        assert_eq!(Role::ALL.len(), 4);
        assert_eq!(Capability::ALL.len(), 8);
    }

    #[test]
    fn test_manager_permissions() {
        assert!(allows(Role::Manager, Capability::ManageUsers));
        assert!(allows(Role::Manager, Capability::ManageMilestones));
        assert!(allows(Role::Manager, Capability::ManageTickets));
        assert!(!allows(Role::Manager, Capability::WorkOnTickets));
    }

    #[test]
    fn test_tester_permissions() {
        assert!(!allows(Role::Tester, Capability::WorkOnTickets));
        assert!(allows(Role::Tester, Capability::CreateBugReports));
        assert!(allows(Role::Tester, Capability::TestBugReports));
        assert!(!allows(Role::Tester, Capability::FixBugReports));
    }

    fn user(name: &str) -> User {
        User::new(name, &format!("{name}@test.com"), name).unwrap()
    }

    fn ticket() -> Ticket {
        Ticket::new("Task", None, ProjectId::new(), None).unwrap()
    }

    #[test]
    fn test_manager_can_always_modify() {
        let mut t = ticket();
        assert!(can_modify_ticket(&user("m"), Role::Manager, &t));
        t.set_status(TicketStatus::Completed);
        assert!(can_modify_ticket(&user("m"), Role::Manager, &t));
    }

    #[test]
    fn test_team_leader_blocked_on_completed() {
        let lead = user("lead");
        let mut t = ticket();
        assert!(can_modify_ticket(&lead, Role::TeamLeader, &t));
        t.set_status(TicketStatus::Completed);
        assert!(!can_modify_ticket(&lead, Role::TeamLeader, &t));
    }

    #[test]
    fn test_developer_needs_assignment() {
        let dev = user("dev");
        let other = user("other");
        let mut t = ticket();
        t.assign_developers(HashSet::from([other.id]));
        assert!(!can_modify_ticket(&dev, Role::Developer, &t));

        t.assign_developers(HashSet::from([dev.id]));
        assert!(can_modify_ticket(&dev, Role::Developer, &t));

        t.set_status(TicketStatus::Completed);
        assert!(!can_modify_ticket(&dev, Role::Developer, &t));
    }

    #[test]
    fn test_tester_never_modifies() {
        let tester = user("tester");
        let mut t = ticket();
        t.assign_developers(HashSet::from([tester.id]));
        assert!(!can_modify_ticket(&tester, Role::Tester, &t));
    }

    #[test]
    fn test_ticket_status_rules() {
        assert!(!can_set_ticket_status(Some(Role::Manager), true, TicketStatus::New));
        assert!(can_set_ticket_status(Some(Role::Manager), false, TicketStatus::Accepted));
        assert!(can_set_ticket_status(Some(Role::TeamLeader), false, TicketStatus::Accepted));
        assert!(!can_set_ticket_status(Some(Role::Developer), true, TicketStatus::Accepted));
        assert!(can_set_ticket_status(Some(Role::Developer), true, TicketStatus::InProgress));
        assert!(!can_set_ticket_status(Some(Role::Developer), false, TicketStatus::InProgress));
        assert!(can_set_ticket_status(Some(Role::TeamLeader), false, TicketStatus::Completed));
        assert!(!can_set_ticket_status(Some(Role::Manager), false, TicketStatus::Completed));
    }

    #[test]
    fn test_bug_status_rules() {
        assert!(can_set_bug_status(Some(Role::Developer), true, BugReportStatus::Fixed));
        assert!(!can_set_bug_status(Some(Role::Manager), false, BugReportStatus::Fixed));
        assert!(can_set_bug_status(Some(Role::Tester), false, BugReportStatus::Tested));
        assert!(!can_set_bug_status(Some(Role::Developer), true, BugReportStatus::Tested));
        assert!(can_set_bug_status(Some(Role::TeamLeader), false, BugReportStatus::Closed));
        assert!(!can_set_bug_status(None, false, BugReportStatus::Closed));
        assert!(!can_set_bug_status(Some(Role::Manager), true, BugReportStatus::New));
    }

    #[test]
    fn test_role_descriptions() {
        assert!(role_description(Role::Manager).contains("Manager"));
        assert!(role_description(Role::Developer).contains("Developer"));
    }
}
