//! In-memory user directory and recording notifier

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use serde::Serialize;

use crate::core::error::Result;
use crate::core::models::{EscalationAction, Ticket, User};
use crate::core::ports::{Notifier, UserDirectory};

use super::{read, write};

/// User directory backed by a map
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserDirectory {
    /// Empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding `users`
    #[must_use]
    pub fn with_users(users: Vec<User>) -> Self {
        let dir = Self::new();
        for user in users {
            dir.insert(user);
        }
        dir
    }

    /// Add or replace a user
    pub fn insert(&self, user: User) {
        write(&self.users).insert(user.id.clone(), user);
    }
}

impl UserDirectory for MemoryUserDirectory {
    fn find_user(&self, id: &str) -> Result<Option<User>> {
        Ok(read(&self.users).get(id).cloned())
    }
}

/// A delivered escalation notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Who was told
    pub recipient: String,
    /// Which ticket escalated
    pub ticket_id: String,
    /// Tier reached
    pub tier_level: u32,
}

/// Notifier that keeps every notice in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    /// Empty notifier
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices delivered so far
    #[must_use]
    pub fn sent(&self) -> Vec<Notice> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, recipient: &str, ticket: &Ticket, action: &EscalationAction) -> Result<()> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(Notice {
            recipient: recipient.to_string(),
            ticket_id: ticket.id().to_string(),
            tier_level: action.tier_level,
        });
        Ok(())
    }
}
