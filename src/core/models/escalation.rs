//! Escalation rule model
//!
//! A rule maps the elapsed age of a ticket with one priority onto tiers of
//! responsible assignees. Rules are validated when authored, never during a sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Priority;

/// One escalation level within a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTier {
    /// Level, positive and strictly increasing within a rule
    pub level: u32,
    /// Minutes after the reference time at which this tier becomes eligible
    pub threshold_minutes: u32,
    /// Users responsible at this tier, in selection order
    #[serde(default)]
    pub assignees: Vec<String>,
}

impl EscalationTier {
    /// Create a tier
    #[must_use]
    pub fn new(level: u32, threshold_minutes: u32, assignees: Vec<String>) -> Self {
        Self {
            level,
            threshold_minutes,
            assignees,
        }
    }

    /// A tier without assignees never produces an action
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !self.assignees.is_empty()
    }
}

/// Input for authoring a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDraft {
    /// Human-readable name (required)
    pub name: String,
    /// What the rule is for
    #[serde(default)]
    pub description: String,
    /// The single priority this rule applies to
    pub priority: Priority,
    /// Earliest minute any tier may fire; every tier threshold must be at least this
    #[serde(default)]
    pub threshold_minutes: u32,
    /// Tiers in ascending level order
    #[serde(default, rename = "tier")]
    pub tiers: Vec<EscalationTier>,
}

impl RuleDraft {
    /// Draft with no description and a zero base threshold
    #[must_use]
    pub fn new(name: impl Into<String>, priority: Priority, tiers: Vec<EscalationTier>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            priority,
            threshold_minutes: 0,
            tiers,
        }
    }
}

/// A validated escalation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) priority: Priority,
    pub(crate) threshold_minutes: u32,
    pub(crate) tiers: Vec<EscalationTier>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl EscalationRule {
    /// Rule id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rule name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Priority this rule targets
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Base threshold in minutes
    #[must_use]
    pub const fn threshold_minutes(&self) -> u32 {
        self.threshold_minutes
    }

    /// Tiers in ascending level order
    #[must_use]
    pub fn tiers(&self) -> &[EscalationTier] {
        &self.tiers
    }

    /// Look up a tier by level
    #[must_use]
    pub fn tier(&self, level: u32) -> Option<&EscalationTier> {
        self.tiers.iter().find(|t| t.level == level)
    }

    /// Creation time
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last change
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// What a sweep decided for one ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationAction {
    /// Ticket to escalate
    pub ticket_id: String,
    /// Rule that fired
    pub rule_id: String,
    /// Tier the ticket now belongs to
    pub tier_level: u32,
    /// Users responsible at that tier
    pub assignees: Vec<String>,
    /// Minutes elapsed since the reference time
    pub elapsed_minutes: i64,
}
