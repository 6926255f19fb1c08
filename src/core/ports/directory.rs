//! User directory and notification ports

use crate::core::error::Result;
use crate::core::models::{EscalationAction, Ticket, User};

/// Resolves user ids issued by the identity collaborator
pub trait UserDirectory: Send + Sync {
    /// Find a user by id
    fn find_user(&self, id: &str) -> Result<Option<User>>;

    /// Whether a user id resolves
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.find_user(id)?.is_some())
    }
}

/// Delivers escalation notices; delivery is best-effort
pub trait Notifier: Send + Sync {
    /// Tell `recipient` that `ticket` escalated
    fn notify(&self, recipient: &str, ticket: &Ticket, action: &EscalationAction) -> Result<()>;
}

/// Notifier that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, recipient: &str, ticket: &Ticket, action: &EscalationAction) -> Result<()> {
        log::info!(
            "notify {recipient}: ticket {} ({}) escalated to tier {}",
            ticket.id(),
            ticket.priority(),
            action.tier_level
        );
        Ok(())
    }
}
