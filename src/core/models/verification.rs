//! Verification model
//!
//! A verification is the post-resolution approval record attached to a ticket:
//! somebody accepts the work (with a 1-5 rating) or rejects it with feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating
pub const MAX_RATING: i32 = 5;

/// A verification of the work done on a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub(crate) id: String,
    pub(crate) ticket_id: String,
    pub(crate) user_id: String,
    pub(crate) status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) feedback: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) version: u64,
}

impl Verification {
    /// Verification id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ticket being verified
    #[must_use]
    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    /// User whose work is verified
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> VerificationStatus {
        self.status
    }

    /// Rating, only present once accepted
    #[must_use]
    pub const fn rating(&self) -> Option<u8> {
        self.rating
    }

    /// Free-form feedback
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
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

    /// Stored version
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

/// Verification status; `pending` moves once to a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Awaiting a decision
    #[default]
    Pending,
    /// Work accepted
    Accepted,
    /// Work rejected
    Rejected,
}

impl VerificationStatus {
    /// Accepted and rejected are final
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" | "accept" | "approved" => Ok(Self::Accepted),
            "rejected" | "reject" => Ok(Self::Rejected),
            _ => Err(format!("Invalid verification status: {s}. Use: pending, accepted, rejected")),
        }
    }
}

/// How many verifications a ticket may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uniqueness {
    /// At most one verification per ticket, whatever its status
    #[default]
    Any,
    /// At most one pending verification per ticket
    Pending,
}

impl Uniqueness {
    /// Whether `existing` keeps another verification of its ticket from opening
    #[must_use]
    pub fn blocks(self, existing: &Verification) -> bool {
        match self {
            Self::Any => true,
            Self::Pending => existing.status == VerificationStatus::Pending,
        }
    }
}

/// Administrative correction of a verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPatch {
    /// Target status
    #[serde(default)]
    pub status: Option<VerificationStatus>,
    /// Rating, validated against the 1-5 range
    #[serde(default)]
    pub rating: Option<i32>,
    /// Replacement feedback
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Filter for listing verifications
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationFilter {
    /// Restrict to one ticket
    pub ticket_id: Option<String>,
    /// Restrict to one subject user
    pub user_id: Option<String>,
    /// Restrict to one status
    pub status: Option<VerificationStatus>,
}

impl VerificationFilter {
    /// All verifications of one ticket
    #[must_use]
    pub fn for_ticket(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: Some(ticket_id.into()),
            ..Self::default()
        }
    }

    /// Whether a verification passes this filter
    #[must_use]
    pub fn matches(&self, verification: &Verification) -> bool {
        self.ticket_id.as_deref().is_none_or(|t| t == verification.ticket_id)
            && self.user_id.as_deref().is_none_or(|u| u == verification.user_id)
            && self.status.is_none_or(|s| s == verification.status)
    }
}
