//! Ticket lifecycle
//!
//! Creation, field updates, status transitions, assignment and attachment
//! tracking. Every function takes the current ticket by reference and returns
//! the next value; nothing here persists anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::models::{Actor, Ticket, TicketDraft, TicketPatch, TicketStatus};

use super::authority::AssignmentPolicy;

/// Which status changes are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTable {
    /// open → in_progress → {pending, resolved} → closed, with
    /// pending → in_progress and resolved → open
    #[default]
    Strict,
    /// Any status may follow any other
    Permissive,
}

impl TransitionTable {
    /// Statuses reachable from `from` in one step (excluding `from` itself)
    #[must_use]
    pub fn successors(self, from: TicketStatus) -> Vec<TicketStatus> {
        use TicketStatus::{Closed, InProgress, Open, Pending, Resolved};

        match self {
            Self::Permissive => TicketStatus::ALL.into_iter().filter(|s| *s != from).collect(),
            Self::Strict => match from {
                Open => vec![InProgress],
                InProgress => vec![Pending, Resolved],
                Pending => vec![InProgress, Resolved, Closed],
                Resolved => vec![Closed, Open],
                Closed => Vec::new(),
            },
        }
    }

    /// Whether `from → to` is allowed; staying put always is
    #[must_use]
    pub fn allows(self, from: TicketStatus, to: TicketStatus) -> bool {
        from == to || self.successors(from).contains(&to)
    }
}

impl std::fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Permissive => write!(f, "permissive"),
        }
    }
}

impl std::str::FromStr for TransitionTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" | "any" => Ok(Self::Permissive),
            _ => Err(format!("Invalid transition table: {s}. Use: strict, permissive")),
        }
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Build a new open, unassigned ticket
pub fn create(
    id: impl Into<String>,
    draft: &TicketDraft,
    created_by: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    let title = required_text("title", &draft.title)?;
    let description = required_text("description", &draft.description)?;

    Ok(Ticket {
        id: id.into(),
        title,
        description,
        status: TicketStatus::Open,
        priority: draft.priority.unwrap_or_default(),
        created_by: created_by.into(),
        assigned_to: None,
        attachments: Vec::new(),
        created_at: now,
        updated_at: now,
        status_changed_at: now,
        version: 0,
    })
}

/// Move a ticket to `status` if `table` permits it
pub fn transition(
    ticket: &Ticket,
    status: TicketStatus,
    table: TransitionTable,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    if !table.allows(ticket.status, status) {
        return Err(Error::validation(format!(
            "ticket '{}' cannot move from {} to {status}",
            ticket.id, ticket.status
        )));
    }

    let mut next = ticket.clone();
    if next.status != status {
        next.status = status;
        next.status_changed_at = now;
    }
    next.updated_at = now;
    Ok(next)
}

/// Set the assignee; the user id is not checked here
#[must_use]
pub fn assign(ticket: &Ticket, user_id: impl Into<String>, now: DateTime<Utc>) -> Ticket {
    let mut next = ticket.clone();
    next.assigned_to = Some(user_id.into());
    next.updated_at = now;
    next
}

/// Apply the fields present in `patch`, after the ownership guard
pub fn update_fields(
    ticket: &Ticket,
    patch: &TicketPatch,
    actor: &Actor,
    table: TransitionTable,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    AssignmentPolicy.ensure_can_mutate(ticket, actor)?;

    let mut next = ticket.clone();
    if let Some(title) = &patch.title {
        next.title = required_text("title", title)?;
    }
    if let Some(description) = &patch.description {
        next.description = required_text("description", description)?;
    }
    if let Some(priority) = patch.priority {
        next.priority = priority;
    }
    if let Some(status) = patch.status {
        next = transition(&next, status, table, now)?;
    }
    if let Some(assignee) = &patch.assigned_to {
        next = assign(&next, required_text("assignee", assignee)?, now);
    }
    next.updated_at = now;
    Ok(next)
}

/// Guard for deletion: creator or admin only
pub fn ensure_can_delete(ticket: &Ticket, actor: &Actor) -> Result<()> {
    AssignmentPolicy.ensure_can_delete(ticket, actor)
}

/// Append an attachment reference; a reference already present is left alone
pub fn add_attachment(
    ticket: &Ticket,
    reference: &str,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    AssignmentPolicy.ensure_can_mutate(ticket, actor)?;
    let reference = required_text("attachment reference", reference)?;

    let mut next = ticket.clone();
    if !next.attachments.contains(&reference) {
        next.attachments.push(reference);
    }
    next.updated_at = now;
    Ok(next)
}

/// Drop an attachment reference
pub fn remove_attachment(
    ticket: &Ticket,
    reference: &str,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Ticket> {
    AssignmentPolicy.ensure_can_mutate(ticket, actor)?;

    let mut next = ticket.clone();
    let before = next.attachments.len();
    next.attachments.retain(|a| a != reference);
    if next.attachments.len() == before {
        return Err(Error::not_found("attachment", reference));
    }
    next.updated_at = now;
    Ok(next)
}
