//! Registered users

use crate::{Error, Result, UserId};
use serde::{Deserialize, Serialize};

/// A registered user. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
}

impl User {
    /// Build a user, rejecting blank names and emails without an `@`
    pub fn new(username: &str, email: &str, display_name: &str) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(Error::InvalidArgument("username cannot be blank".into()));
        }
        if !email.contains('@') {
            return Err(Error::InvalidArgument(format!(
                "invalid email address: {email}"
            )));
        }
        if display_name.trim().is_empty() {
            return Err(Error::InvalidArgument("display name cannot be blank".into()));
        }
        Ok(Self {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
        })
    }

    pub fn short_info(&self) -> String {
        format!("{} ({})", self.username, self.email)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.display_name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_info() {
        let user = User::new("testuser", "test@test.com", "Test User").unwrap();
        let info = user.short_info();
        assert!(info.contains("testuser"));
        assert!(info.contains("test@test.com"));
    }

    #[test]
    fn test_validation() {
        assert!(User::new("  ", "a@b.c", "Name").is_err());
        assert!(User::new("name", "nope", "Name").is_err());
        assert!(User::new("name", "a@b.c", "").is_err());
    }
}
