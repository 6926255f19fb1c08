//! Ticket model
//!
//! A ticket is a support request moving through a status/priority lifecycle.
//! Fields are crate-private: outside code reads through accessors and
//! changes tickets only through the lifecycle functions, which return a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A support ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) status: TicketStatus,
    pub(crate) priority: Priority,
    pub(crate) created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) attachments: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) status_changed_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the repository on every write
    #[serde(default)]
    pub(crate) version: u64,
}

impl Ticket {
    /// Ticket id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short summary
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    /// Current priority
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Id of the user who opened the ticket
    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Id of the current assignee, if any
    #[must_use]
    pub fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    /// Attachment references, in the order they were added
    #[must_use]
    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    /// Creation time
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last mutation
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Time the status last changed (equals `created_at` until the first transition)
    #[must_use]
    pub const fn status_changed_at(&self) -> DateTime<Utc> {
        self.status_changed_at
    }

    /// Stored version
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether `user_id` opened this ticket
    #[must_use]
    pub fn is_creator(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }

    /// Whether `user_id` is the current assignee
    #[must_use]
    pub fn is_assignee(&self, user_id: &str) -> bool {
        self.assigned_to.as_deref() == Some(user_id)
    }
}

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly reported, nobody working on it yet
    #[default]
    Open,
    /// Being worked on
    InProgress,
    /// Waiting on the customer or a third party
    Pending,
    /// Work done, awaiting verification or closure
    Resolved,
    /// Finished
    Closed,
}

impl TicketStatus {
    /// All statuses in lifecycle order
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::InProgress,
        Self::Pending,
        Self::Resolved,
        Self::Closed,
    ];

    /// Whether the ticket still takes part in escalation sweeps
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Resolved | Self::Closed)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "open" | "new" => Ok(Self::Open),
            "in_progress" | "inprogress" | "started" => Ok(Self::InProgress),
            "pending" | "waiting" => Ok(Self::Pending),
            "resolved" | "solved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!(
                "Invalid status: {s}. Use: open, in_progress, pending, resolved, closed"
            )),
        }
    }
}

/// Ticket priority, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,
    /// Normal handling (default)
    #[default]
    Medium,
    /// Needs attention soon
    High,
    /// Drop everything
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" | "critical" => Ok(Self::Urgent),
            _ => Err(format!("Invalid priority: {s}. Use: low, medium, high, urgent")),
        }
    }
}

/// Input for creating a ticket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Short summary (required)
    pub title: String,
    /// Full description (required)
    pub description: String,
    /// Priority, `medium` when omitted
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl TicketDraft {
    /// Draft with the default priority
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: None,
        }
    }

    /// Set an explicit priority
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Partial update; only fields that are `Some` are applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    /// New status
    #[serde(default)]
    pub status: Option<TicketStatus>,
    /// New priority
    #[serde(default)]
    pub priority: Option<Priority>,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New assignee
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl TicketPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.assigned_to.is_none()
    }
}

/// Filter for listing tickets; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Restrict to these statuses (empty = any)
    pub statuses: Vec<TicketStatus>,
    /// Restrict to one priority
    pub priority: Option<Priority>,
    /// Restrict to one creator
    pub created_by: Option<String>,
    /// Restrict to one assignee
    pub assigned_to: Option<String>,
}

impl TicketFilter {
    /// Tickets still eligible for escalation
    #[must_use]
    pub fn active() -> Self {
        Self {
            statuses: TicketStatus::ALL.into_iter().filter(|s| s.is_active()).collect(),
            ..Self::default()
        }
    }

    /// Whether a ticket passes this filter
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&ticket.status))
            && self.priority.is_none_or(|p| p == ticket.priority)
            && self.created_by.as_deref().is_none_or(|c| c == ticket.created_by)
            && self
                .assigned_to
                .as_deref()
                .is_none_or(|a| ticket.assigned_to.as_deref() == Some(a))
    }
}
