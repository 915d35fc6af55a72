//! Project roles
//!
//! A user holds exactly one role per project; the same user may hold
//! different roles in different projects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    TeamLeader,
    Developer,
    Tester,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Manager,
        Role::TeamLeader,
        Role::Developer,
        Role::Tester,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::TeamLeader => "Team Leader",
            Role::Developer => "Developer",
            Role::Tester => "Tester",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "teamleader" | "team leader" | "team_leader" | "team-leader" => Ok(Role::TeamLeader),
            "developer" => Ok(Role::Developer),
            "tester" => Ok(Role::Tester),
            _ => Err(crate::Error::InvalidArgument(format!("unknown role: {s}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Role::Manager.display_name(), "Manager");
        assert_eq!(Role::TeamLeader.to_string(), "Team Leader");
        assert_eq!(Role::Developer.display_name(), "Developer");
        assert_eq!(Role::Tester.display_name(), "Tester");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Team Leader".parse::<Role>().unwrap(), Role::TeamLeader);
        assert_eq!("teamleader".parse::<Role>().unwrap(), Role::TeamLeader);
        assert_eq!("MANAGER".parse::<Role>().unwrap(), Role::Manager);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_display_agree() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
