//! Bug report data model

use crate::{BugReportId, BugReportStatus, Error, ProjectId, Result, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bug severity
///
/// Open classification: unknown labels are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Other(s) => s,
        }
    }

    pub fn level_description(&self) -> String {
        match self {
            Severity::Critical => "CRITICAL - Immediate attention required".into(),
            Severity::High => "HIGH - Should be fixed soon".into(),
            Severity::Medium => "MEDIUM - Normal priority".into(),
            Severity::Low => "LOW - Can be addressed later".into(),
            Severity::Other(s) => format!("UNKNOWN - {s}"),
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Other(s.to_string()),
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::from(s.as_str())
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory triage priority derived from severity, status and age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugPriority {
    Urgent,
    High,
    MediumHigh,
    Medium,
    Normal,
}

impl std::fmt::Display for BugPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugPriority::Urgent => write!(f, "URGENT - Immediate attention needed"),
            BugPriority::High => write!(f, "HIGH - Critical but already being worked on"),
            BugPriority::MediumHigh => write!(f, "MEDIUM-HIGH - Should fix soon"),
            BugPriority::Medium => write!(f, "MEDIUM - Old low priority, escalating"),
            BugPriority::Normal => write!(f, "NORMAL"),
        }
    }
}

/// A reported defect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugReport {
    pub id: BugReportId,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: BugReportStatus,

    pub project_id: ProjectId,

    pub reported_by: UserId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,

    pub severity: Severity,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl BugReport {
    pub fn new(
        title: &str,
        description: Option<String>,
        project_id: ProjectId,
        reported_by: UserId,
        severity: Severity,
    ) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "bug report title cannot be blank".into(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: BugReportId::new(),
            title: title.to_string(),
            description,
            status: BugReportStatus::New,
            project_id,
            reported_by,
            assigned_to: None,
            severity,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_assignee(&self, user: UserId) -> bool {
        self.assigned_to == Some(user)
    }

    pub fn set_status(&mut self, status: BugReportStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn assign_to(&mut self, developer: UserId) {
        self.assigned_to = Some(developer);
        self.updated_at = Utc::now();
    }

    /// Triage priority; low bugs older than `escalation_days` are escalated
    pub fn priority(&self, now: DateTime<Utc>, escalation_days: i64) -> BugPriority {
        match &self.severity {
            Severity::Critical if self.status == BugReportStatus::New => BugPriority::Urgent,
            Severity::Critical => BugPriority::High,
            Severity::High => BugPriority::MediumHigh,
            Severity::Low if self.older_than(now, escalation_days) => BugPriority::Medium,
            _ => BugPriority::Normal,
        }
    }

    /// False when `days` does not fit a `TimeDelta` or reaches before the epoch range
    fn older_than(&self, now: DateTime<Utc>, days: i64) -> bool {
        Duration::try_days(days)
            .and_then(|age| now.checked_sub_signed(age))
            .is_some_and(|cutoff| self.created_at < cutoff)
    }

    pub fn status_description(&self) -> String {
        match self.status {
            BugReportStatus::New => format!(
                "Bug '{}' [{}] has been reported and needs attention",
                self.title, self.severity
            ),
            BugReportStatus::Fixed => {
                format!("Bug '{}' has been fixed and is ready for testing", self.title)
            }
            BugReportStatus::Tested => format!("Bug '{}' has been tested and verified", self.title),
            BugReportStatus::Closed => format!("Bug '{}' has been closed and resolved", self.title),
        }
    }
}

impl std::fmt::Display for BugReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] [{}] {}",
            self.id.short(),
            self.severity,
            self.status,
            self.title
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bug(severity: &str) -> BugReport {
        BugReport::new(
            "Crash",
            None,
            ProjectId::new(),
            UserId::new(),
            Severity::from(severity),
        )
        .unwrap()
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!(Severity::from("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::from("Low"), Severity::Low);
        assert_eq!(Severity::from("cosmetic"), Severity::Other("cosmetic".into()));
        assert!(Severity::from("cosmetic").level_description().starts_with("UNKNOWN"));
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");
        let back: Severity = serde_json::from_str("\"weird\"").unwrap();
        assert_eq!(back, Severity::Other("weird".into()));
    }

    #[test]
    fn test_priority_urgent_for_new_critical() {
        let bug = bug("critical");
        assert_eq!(bug.priority(Utc::now(), 30), BugPriority::Urgent);
        assert!(bug.priority(Utc::now(), 30).to_string().contains("URGENT"));
    }

    #[test]
    fn test_priority_high_for_fixed_critical() {
        let mut bug = bug("critical");
        bug.set_status(BugReportStatus::Fixed);
        assert_eq!(bug.priority(Utc::now(), 30), BugPriority::High);
    }

    #[test]
    fn test_priority_escalates_old_low() {
        let bug = bug("low");
        assert_eq!(bug.priority(Utc::now(), 30), BugPriority::Normal);
        let later = Utc::now() + Duration::days(31);
        assert_eq!(bug.priority(later, 30), BugPriority::Medium);
    }

    #[test]
    fn test_priority_with_out_of_range_escalation() {
        let bug = bug("low");
        assert_eq!(bug.priority(Utc::now(), i64::MAX), BugPriority::Normal);
        assert_eq!(bug.priority(Utc::now(), 400_000_000), BugPriority::Normal);
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = BugReport::new(" ", None, ProjectId::new(), UserId::new(), Severity::Low);
        assert!(result.is_err());
    }
}
