//! Configuration for projboard
//!
//! Stored as TOML, by default in `<config dir>/projboard/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest day count accepted for any day-based setting
pub const MAX_DAYS: i64 = 36_500;

/// projboard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analytics settings
    pub analytics: AnalyticsConfig,

    /// Health check settings
    pub health: HealthConfig,

    /// Advisory policy settings
    pub policy: PolicyConfig,
}

/// Read-side analytics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Artificial delay added to every fan-out read, in milliseconds
    pub read_latency_ms: u64,

    /// Upper bound on a join-all aggregation; unbounded when unset
    pub timeout_ms: Option<u64>,

    /// Days an in-progress ticket may go untouched before it counts as overdue
    pub overdue_after_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            read_latency_ms: 0,
            timeout_ms: None,
            overdue_after_days: 7,
        }
    }
}

/// Health check configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Severity label treated as critical
    pub critical_severity: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            critical_severity: "critical".to_string(),
        }
    }
}

/// Advisory policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Smallest team considered ready to activate a milestone
    pub min_team_size_for_activation: usize,

    /// Age in days after which low-severity bugs are escalated
    pub low_severity_escalation_days: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_team_size_for_activation: 3,
            low_severity_escalation_days: 30,
        }
    }
}

impl Config {
    /// Default config location in the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("projboard").join("config.toml"))
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Toml(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject day counts outside `0..=MAX_DAYS`; the overdue window must be at least a day
    pub fn validate(&self) -> crate::Result<()> {
        let overdue = self.analytics.overdue_after_days;
        if !(1..=MAX_DAYS).contains(&overdue) {
            return Err(crate::Error::Toml(format!(
                "Invalid config: analytics.overdue_after_days must be between 1 and {MAX_DAYS}, got {overdue}"
            )));
        }
        let escalation = self.policy.low_severity_escalation_days;
        if !(0..=MAX_DAYS).contains(&escalation) {
            return Err(crate::Error::Toml(format!(
                "Invalid config: policy.low_severity_escalation_days must be between 0 and {MAX_DAYS}, got {escalation}"
            )));
        }
        Ok(())
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Toml(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# projboard configuration

[analytics]
# Artificial delay added to every fan-out read (milliseconds)
read_latency_ms = 0

# Upper bound on a project analytics aggregation (milliseconds)
# timeout_ms = 5000

# Days an in-progress ticket may go untouched before it is overdue
overdue_after_days = 7

[health]
# Severity label treated as critical by the health check
critical_severity = "critical"

[policy]
# Smallest team considered ready to activate a milestone
min_team_size_for_activation = 3

# Age in days after which low-severity bugs are escalated
low_severity_escalation_days = 30
"#
        .to_string()
    }
}
